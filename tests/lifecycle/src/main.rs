fn main() {
    println!("Run `cargo test -p stickynotes-lifecycle-tests` to execute the lifecycle scenarios.");
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{Map, Value, json};
    use stickynotes_controller::fake::Fakes;
    use stickynotes_controller::{AppController, ControllerConfig, NoteOverrides};
    use stickynotes_note_state::{ControllerLink, NoteSession};
    use stickynotes_protocol::messages::{InstanceIdReply, LoadNoteReply};
    use stickynotes_protocol::{Reply, Request};
    use stickynotes_store::{JsonFileStore, KeyValueStore, MemoryStore};
    use stickynotes_window::fake::FakeWindow;
    use stickynotes_window::{NativeWindow, WindowState};
    use tempfile::TempDir;

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    /// Quiet config rooted in `dir`: no stagger, no quit grace.
    fn config(dir: &TempDir) -> ControllerConfig {
        let mut config = ControllerConfig::new(dir.path());
        config.version = "1.0.0".into();
        config.restore_stagger = Duration::ZERO;
        config.quit_grace = Duration::ZERO;
        config
    }

    struct App {
        controller: Arc<AppController>,
        fakes: Fakes,
        dir: TempDir,
    }

    fn app_with(store: Arc<dyn KeyValueStore>, dir: TempDir) -> App {
        app_configured(store, dir, |_| {})
    }

    fn app_configured(
        store: Arc<dyn KeyValueStore>,
        dir: TempDir,
        tune: impl FnOnce(&mut ControllerConfig),
    ) -> App {
        let fakes = Fakes::new();
        let mut config = config(&dir);
        tune(&mut config);
        let controller = AppController::new(config, fakes.services(store)).unwrap();
        App {
            controller,
            fakes,
            dir,
        }
    }

    fn app() -> App {
        app_with(Arc::new(MemoryStore::new()), tempfile::tempdir().unwrap())
    }

    /// A window's end of the channel, wired straight into the controller.
    #[derive(Clone)]
    struct InProcess {
        controller: Arc<AppController>,
        label: String,
    }

    impl ControllerLink for InProcess {
        fn request(&self, request: Request) -> Pin<Box<dyn Future<Output = Reply> + Send + '_>> {
            Box::pin(self.controller.handle(&self.label, request))
        }
    }

    /// One note window: the native fake plus the UI session behind it.
    struct Pane {
        session: NoteSession<InProcess>,
        window: Arc<FakeWindow>,
        delivered: usize,
    }

    impl Pane {
        async fn open(app: &App, id: &str) -> Self {
            let label = format!("note-{id}");
            let window = app.fakes.host.window(&label).unwrap();
            let session = NoteSession::new(InProcess {
                controller: app.controller.clone(),
                label,
            });
            session.ready().await.unwrap();
            let mut pane = Self {
                session,
                window,
                delivered: 0,
            };
            pane.sync().await;
            pane
        }

        /// Delivers broadcasts the window received since the last sync.
        async fn sync(&mut self) {
            let received = self.window.received();
            for message in received[self.delivered..].iter().cloned() {
                self.session.handle_broadcast(message).await;
            }
            self.delivered = received.len();
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn creating_an_open_note_reuses_its_window() {
        let app = app();
        let c = &app.controller;
        let id = c.create_note(Some("n1".into()), NoteOverrides::default()).await.unwrap();
        c.window_ready("note-n1").await.unwrap();
        let again = c.create_note(Some(id.clone()), NoteOverrides::default()).await.unwrap();

        assert_eq!(again, id);
        assert_eq!(app.fakes.host.opened().len(), 1);
        assert_eq!(c.open_notes().await, ["n1"]);
    }

    #[tokio::test]
    async fn saved_content_loads_back_over_the_channel() {
        let app = app();
        let reply = app
            .controller
            .handle("manager", Request::CreateNewNote)
            .await
            .parse::<InstanceIdReply>()
            .unwrap();
        let mut pane = Pane::open(&app, &reply.instance_id).await;

        pane.session
            .edit(|n, now| n.update_content("remember the milk", now))
            .await;
        assert!(pane.session.save_now().await.unwrap());
        pane.sync().await;

        let loaded = app
            .controller
            .handle(
                "manager",
                Request::LoadNote {
                    instance_id: reply.instance_id.clone(),
                },
            )
            .await
            .parse::<LoadNoteReply>()
            .unwrap();
        let note = loaded.data.unwrap();
        assert_eq!(note.content, "remember the milk");
        assert_eq!(app.controller.analytics().await.total_words, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_of_edits_collapse_into_one_save() {
        let app = app();
        let c = &app.controller;
        c.create_note(Some("n1".into()), NoteOverrides::default()).await.unwrap();
        let pane = Pane::open(&app, "n1").await;

        for i in 0..10 {
            pane.session
                .edit(|n, now| n.update_content(format!("draft {i}"), now))
                .await;
            settle().await;
            tokio::time::advance(Duration::from_millis(200)).await;
        }
        assert_eq!(c.load_note("n1").unwrap(), None);

        tokio::time::advance(Duration::from_millis(3000)).await;
        settle().await;
        let stored = c.load_note("n1").unwrap().unwrap();
        assert_eq!(stored.content, "draft 9");
        assert_eq!(c.analytics().await.modified_today, 1);
    }

    #[tokio::test]
    async fn settings_change_reaches_every_window() {
        let app = app();
        let c = &app.controller;
        for id in ["a", "b"] {
            c.create_note(Some(id.into()), NoteOverrides::default()).await.unwrap();
        }
        let mut a = Pane::open(&app, "a").await;
        let mut b = Pane::open(&app, "b").await;

        let merged = a
            .session
            .update_settings(object(json!({"theme": "light", "opacity": 0.8})))
            .await
            .unwrap();
        assert_eq!(merged.theme, "light");

        a.sync().await;
        b.sync().await;
        for pane in [&a, &b] {
            let snap = pane.session.snapshot().await;
            assert_eq!(snap.settings.theme, "light");
            assert_eq!(pane.window.opacity(), 0.8);
        }
        assert_eq!(c.settings().await.theme, "light");
    }

    #[tokio::test]
    async fn close_hides_but_quit_destroys() {
        let app = app();
        let c = &app.controller;
        c.create_note(Some("n1".into()), NoteOverrides::default()).await.unwrap();
        let mut pane = Pane::open(&app, "n1").await;
        pane.session.edit(|n, now| n.update_title("Keep", now)).await;

        pane.session.close().await.unwrap();
        assert!(!pane.window.is_visible());
        assert!(!pane.window.is_destroyed());
        assert_eq!(c.window_state("note-n1").await, Some(WindowState::Hidden));
        assert_eq!(c.load_note("n1").unwrap().unwrap().title, "Keep");

        c.show_note("n1").await.unwrap();
        assert!(pane.window.is_visible());

        c.quit().await;
        assert!(pane.window.is_destroyed());
        assert!(c.window_labels().await.is_empty());
        assert!(app.fakes.shortcuts.bindings().is_empty());
        assert_eq!(c.list_backups().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_asks_windows_to_flush_first() {
        let app = app_configured(
            Arc::new(MemoryStore::new()),
            tempfile::tempdir().unwrap(),
            |config| config.quit_grace = Duration::from_millis(500),
        );
        let c = &app.controller;
        c.create_note(Some("n1".into()), NoteOverrides::default()).await.unwrap();
        let mut pane = Pane::open(&app, "n1").await;
        pane.session
            .edit(|n, now| n.update_content("typed just before quit", now))
            .await;

        let quitting = {
            let c = c.clone();
            tokio::spawn(async move { c.quit().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let names: Vec<_> = pane.window.received().iter().map(|m| m.name()).collect();
        assert_eq!(names.last(), Some(&"save-request"));
        assert!(!pane.window.is_destroyed());

        pane.sync().await;
        pane.session.cancel();
        quitting.await.unwrap();

        assert!(pane.window.is_destroyed());
        assert_eq!(
            c.load_note("n1").unwrap().unwrap().content,
            "typed just before quit"
        );
        let backups = c.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        let raw = std::fs::read(c.backup_dir().join(&backups[0].file_name)).unwrap();
        let backup: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(
            backup["instances"]["n1"]["content"],
            json!("typed just before quit")
        );
        assert!(c.create_note(None, NoteOverrides::default()).await.is_err());
    }

    #[tokio::test]
    async fn restart_restores_notes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::copy(fixtures_dir().join("store.json"), &path).unwrap();

        let store = Arc::new(JsonFileStore::open(path.clone()).unwrap());
        let app = app_with(store, dir);
        let c = &app.controller;
        assert_eq!(c.settings().await.theme, "light");

        let restored = c.start().await.unwrap();
        assert_eq!(restored, 2);
        let mut open = c.open_notes().await;
        open.sort();
        assert_eq!(open, ["groceries", "ideas"]);
        assert!(app.fakes.host.window("manager").is_none());

        let groceries = app.fakes.host.window("note-groceries").unwrap();
        assert_eq!(groceries.bounds().unwrap().x, 200);

        c.save_note("ideas", &object(json!({"content": "# Ideas\n- global shortcut"})))
            .await
            .unwrap();
        c.quit().await;

        let reopened = JsonFileStore::open(path).unwrap();
        let ideas = reopened.get("instances.ideas.content").unwrap();
        assert_eq!(ideas, Some(json!("# Ideas\n- global shortcut")));
        assert_eq!(
            reopened.get("instances.archive.autoRestore").unwrap(),
            Some(json!(false))
        );
        assert!(app.dir.path().join("backups").is_dir());
    }

    #[tokio::test(start_paused = true)]
    async fn autosaved_note_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = Arc::new(JsonFileStore::open(path.clone()).unwrap());
        let app = app_with(store, dir);
        let id = app
            .controller
            .create_note(None, NoteOverrides::default())
            .await
            .unwrap();
        let pane = Pane::open(&app, &id).await;

        app.fakes.clock.advance(chrono::Duration::seconds(5));
        pane.session
            .edit(|n, now| n.update_content("hello world", now))
            .await;
        settle().await;
        tokio::time::advance(Duration::from_millis(3500)).await;
        settle().await;
        // Process dies here: no quit, no final save.
        drop(pane);
        drop(app.controller);

        let store = Arc::new(JsonFileStore::open(path).unwrap());
        let restarted = app_with(store, tempfile::tempdir().unwrap());
        let note = restarted.controller.load_note(&id).unwrap().unwrap();
        assert_eq!(note.content, "hello world");
        assert!(note.last_modified.unwrap() > note.created.unwrap());
    }

    #[tokio::test]
    async fn backups_keep_only_the_newest() {
        let store = Arc::new(MemoryStore::with_document(object(json!({
            "settings": {"maxBackups": 2}
        }))));
        let app = app_with(store, tempfile::tempdir().unwrap());
        for _ in 0..4 {
            app.controller.create_backup().await.unwrap();
            app.fakes.clock.advance(chrono::Duration::seconds(1));
        }
        let backups = app.controller.list_backups().await.unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].timestamp > backups[1].timestamp);
    }

    #[tokio::test]
    async fn first_launch_opens_the_manager() {
        let app = app();
        assert_eq!(app.controller.start().await.unwrap(), 0);
        assert!(app.fakes.host.window("manager").is_some());
        app.controller.quit().await;
    }
}
