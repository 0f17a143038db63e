use anyhow::Result;
use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tokio::sync::watch;

/// How often the blocking loop checks whether anyone is still listening.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Watches a single file and bumps a generation counter whenever it is modified.
///
/// Subscribers receive the counter through a `watch` channel, so bursts of
/// filesystem events collapse into a single wake-up.
pub struct FileWatcher {
    path: PathBuf,
    tx: watch::Sender<u64>,
}

impl FileWatcher {
    /// Creates a new watcher for `path`.
    ///
    /// Returns a tuple of the watcher and a receiver for change notifications.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> (Self, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (
            Self {
                path: path.into(),
                tx,
            },
            rx,
        )
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forwards filesystem events until every receiver has been dropped.
    ///
    /// Dropping the receivers stops the blocking loop within one poll
    /// interval, so a runtime shutting down never waits on it.
    ///
    /// # Errors
    ///
    /// Returns an error if file watching cannot be initiated or if the watcher task fails.
    pub async fn watch(&self) -> Result<()> {
        let tx = self.tx.clone();
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();

            let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            })?;

            watcher.watch(&path, RecursiveMode::NonRecursive)?;
            tracing::info!("Watching {} for changes", path.display());

            while !tx.is_closed() {
                match notify_rx.recv_timeout(POLL_INTERVAL) {
                    Ok(event) if is_content_change(&event) => {
                        tracing::info!("{} changed", path.display());
                        tx.send_modify(|generation| *generation += 1);
                    }
                    Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            tracing::debug!("Stopped watching {}", path.display());
            Ok::<_, anyhow::Error>(())
        })
        .await??;

        Ok(())
    }
}

fn is_content_change(event: &Event) -> bool {
    event.kind.is_modify() || event.kind.is_create()
}
