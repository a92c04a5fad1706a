//! Import from files and export of the full document.

use std::path::{Path, PathBuf};

use serde_json::Value;
use stickynotes_protocol::messages::{ExportReply, ImportFailure, ImportReply};
use stickynotes_protocol::{ExportDocument, NoteInstance};
use stickynotes_store::{StoreExt, key};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ControllerError;
use crate::controller::AppController;

impl AppController {
    /// Imports each file into the store.
    ///
    /// A JSON document with an `instances` object is merged note by note.
    /// Any other file becomes one new note titled after the file. A file
    /// that cannot be read or parsed is reported in `failed` and does not
    /// stop the others. Without `paths` the user picks files; cancelling
    /// the dialog is an error.
    pub async fn import_notes(&self, paths: Option<Vec<PathBuf>>) -> Result<ImportReply, ControllerError> {
        let paths = match paths {
            Some(paths) => paths,
            None => self
                .desktop
                .pick_import_files()
                .await
                .ok_or(ControllerError::Cancelled)?,
        };

        let mut reply = ImportReply::default();
        for path in paths {
            match self.import_file(&path).await {
                Ok(count) => reply.imported += count,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "import failed");
                    reply.failed.push(ImportFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(imported = reply.imported, failed = reply.failed.len(), "import finished");
        Ok(reply)
    }

    async fn import_file(&self, path: &Path) -> Result<usize, ControllerError> {
        let content = tokio::fs::read_to_string(path).await?;
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let notes = if ext == "json" {
            let value: Value = serde_json::from_str(&content)?;
            match value.get("instances") {
                Some(Value::Object(instances)) => {
                    let mut notes = Vec::with_capacity(instances.len());
                    for (id, raw) in instances {
                        key::validate_segment(id)?;
                        let mut note: NoteInstance = serde_json::from_value(raw.clone())?;
                        note.id = id.clone();
                        notes.push(note);
                    }
                    notes
                }
                _ => vec![self.wrap_file(path, content, true)],
            }
        } else {
            let markdown = matches!(ext.as_str(), "md" | "markdown");
            vec![self.wrap_file(path, content, markdown)]
        };

        // Writes are sequential; a crash part way leaves the notes written so far.
        let _st = self.state.lock().await;
        for note in &notes {
            self.store.set_typed(&Self::note_key(&note.id)?, note)?;
        }
        Ok(notes.len())
    }

    fn wrap_file(&self, path: &Path, content: String, markdown: bool) -> NoteInstance {
        let mut note = NoteInstance::new(Uuid::new_v4().to_string(), self.clock.now());
        note.title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        note.content = content;
        note.is_markdown = markdown;
        note
    }

    /// Writes every note plus settings and analytics to one JSON file.
    /// Without `path` the user picks the destination.
    pub async fn export_notes(&self, path: Option<PathBuf>) -> Result<ExportReply, ControllerError> {
        let path = match path {
            Some(path) => path,
            None => {
                let name = format!(
                    "stickynotes-export-{}.json",
                    self.clock.now().format("%Y-%m-%d")
                );
                self.desktop
                    .pick_export_path(&name)
                    .await
                    .ok_or(ControllerError::Cancelled)?
            }
        };

        let document = {
            let st = self.state.lock().await;
            let instances = self.load_instances()?;
            ExportDocument {
                export_date: self.clock.now(),
                version: self.config.version.clone(),
                total_notes: instances.len(),
                instances,
                settings: st.settings.clone(),
                analytics: st.analytics.clone(),
            }
        };
        tokio::fs::write(&path, serde_json::to_vec_pretty(&document)?).await?;
        info!(path = %path.display(), count = document.total_notes, "notes exported");
        Ok(ExportReply {
            path,
            count: document.total_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::controller::testing::{harness, harness_with};

    #[tokio::test]
    async fn imports_text_and_markdown() {
        let h = harness();
        let dir = h.dir.path();
        std::fs::write(dir.join("groceries.txt"), "milk\neggs").unwrap();
        std::fs::write(dir.join("Plan.MD"), "# Plan").unwrap();

        let reply = h
            .controller
            .import_notes(Some(vec![dir.join("groceries.txt"), dir.join("Plan.MD")]))
            .await
            .unwrap();
        assert_eq!(reply.imported, 2);
        assert!(reply.failed.is_empty());

        let notes = h.controller.load_instances().unwrap();
        let groceries = notes.values().find(|n| n.title == "groceries").unwrap();
        assert_eq!(groceries.content, "milk\neggs");
        assert!(!groceries.is_markdown);
        let plan = notes.values().find(|n| n.title == "Plan").unwrap();
        assert!(plan.is_markdown);
    }

    #[tokio::test]
    async fn bad_file_does_not_abort_the_rest() {
        let h = harness();
        let dir = h.dir.path();
        std::fs::write(dir.join("broken.json"), "{oops").unwrap();
        std::fs::write(dir.join("ok.txt"), "fine").unwrap();

        let reply = h
            .controller
            .import_notes(Some(vec![
                dir.join("broken.json"),
                dir.join("missing.txt"),
                dir.join("ok.txt"),
            ]))
            .await
            .unwrap();
        assert_eq!(reply.imported, 1);
        assert_eq!(reply.failed.len(), 2);
        assert_eq!(reply.failed[0].path, dir.join("broken.json"));
    }

    #[tokio::test]
    async fn json_without_instances_becomes_a_note() {
        let h = harness();
        let file = h.dir.path().join("data.json");
        std::fs::write(&file, r#"{"hello": "world"}"#).unwrap();
        let reply = h.controller.import_notes(Some(vec![file])).await.unwrap();
        assert_eq!(reply.imported, 1);
        let notes = h.controller.load_instances().unwrap();
        let note = notes.values().next().unwrap();
        assert_eq!(note.title, "data");
        assert!(note.is_markdown);
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let h = harness_with(
            json!({"instances": {
                "a": {"id": "a", "content": "first", "tags": ["x"]},
                "b": {"id": "b", "content": "second"}
            }})
            .as_object()
            .unwrap()
            .clone(),
        );
        let file = h.dir.path().join("export.json");
        let exported = h.controller.export_notes(Some(file.clone())).await.unwrap();
        assert_eq!(exported.count, 2);

        let other = harness();
        let reply = other.controller.import_notes(Some(vec![file])).await.unwrap();
        assert_eq!(reply.imported, 2);
        assert_eq!(
            other.controller.load_instances().unwrap(),
            h.controller.load_instances().unwrap()
        );
    }

    #[tokio::test]
    async fn dialogs_supply_paths_and_cancel() {
        let h = harness();
        h.fakes.desktop.answer_export(None);
        let err = h.controller.export_notes(None).await.unwrap_err();
        assert!(matches!(err, ControllerError::Cancelled));
        assert_eq!(
            h.fakes.desktop.export_prompts(),
            ["stickynotes-export-2024-03-01.json"]
        );

        let file = h.dir.path().join("picked.txt");
        std::fs::write(&file, "from dialog").unwrap();
        h.fakes.desktop.answer_import(Some(vec![file]));
        assert_eq!(h.controller.import_notes(None).await.unwrap().imported, 1);

        h.fakes.desktop.answer_import(None);
        assert!(matches!(
            h.controller.import_notes(None).await,
            Err(ControllerError::Cancelled)
        ));
    }
}
