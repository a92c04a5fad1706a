//! Debounced auto-save.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

enum Command {
    Touch,
    Configure { enabled: bool, interval: Duration },
    Flush(oneshot::Sender<()>),
}

/// Per-window debounce timer.
///
/// Every [`touch`](AutoSaver::touch) pushes the deadline out by one
/// interval; the save runs once the edits stop. A burst of N edits inside
/// the interval produces one save.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Starts the timer task. `save` runs on expiry and on flush.
    pub fn spawn<F, Fut>(interval: Duration, enabled: bool, save: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(rx, cancel.clone(), interval, enabled, save));
        Self {
            tx,
            cancel,
            task: Some(task),
        }
    }

    /// Records an edit and restarts the quiet period.
    pub fn touch(&self) {
        let _ = self.tx.send(Command::Touch);
    }

    /// Applies new auto-save settings. A pending save is re-timed.
    pub fn configure(&self, enabled: bool, interval: Duration) {
        let _ = self.tx.send(Command::Configure { enabled, interval });
    }

    /// Runs a pending save now, if any, and waits for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flushes once more and stops the timer. Used when the window closes.
    pub async fn close(mut self) {
        self.flush().await;
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Stops the timer, dropping any pending save.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<F, Fut>(
    mut rx: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
    mut interval: Duration,
    mut enabled: bool,
    save: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    // Set while an edit is waiting to be saved.
    let mut dirty = false;
    let mut deadline: Option<Instant> = None;

    loop {
        let at = deadline;
        let timer = async move {
            match at {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = timer => {
                deadline = None;
                dirty = false;
                debug!("auto-save fired");
                save().await;
            }
            cmd = rx.recv() => match cmd {
                Some(Command::Touch) => {
                    dirty = true;
                    if enabled {
                        deadline = Some(Instant::now() + interval);
                    }
                }
                Some(Command::Configure { enabled: on, interval: every }) => {
                    enabled = on;
                    interval = every;
                    deadline = (enabled && dirty).then(|| Instant::now() + interval);
                }
                Some(Command::Flush(ack)) => {
                    if dirty {
                        deadline = None;
                        dirty = false;
                        save().await;
                    }
                    let _ = ack.send(());
                }
                None => break,
            },
        }
    }
}
