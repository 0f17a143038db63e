use anyhow::Context;
use predictoor_data::{DatabaseOptions, PredictionDatabase};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Shared handler state: the currently served database plus how to rebuild it.
#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Arc<PredictionDatabase>>>,
    options: Arc<DatabaseOptions>,
}

impl AppState {
    #[must_use]
    pub fn new(db: PredictionDatabase, options: DatabaseOptions) -> Self {
        Self {
            db: Arc::new(RwLock::new(Arc::new(db))),
            options: Arc::new(options),
        }
    }

    /// The database as of now. Queries keep working on it even if a reload swaps it out.
    pub async fn snapshot(&self) -> Arc<PredictionDatabase> {
        self.db.read().await.clone()
    }

    #[must_use]
    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Re-reads the CSV and rebuilds every derived table.
    ///
    /// The old database keeps being served until the new one is ready; on
    /// failure it stays in place.
    ///
    /// # Errors
    /// Returns an error if the CSV cannot be read or parsed.
    pub async fn reload(&self) -> anyhow::Result<Arc<PredictionDatabase>> {
        let options = self.options.clone();
        let db = tokio::task::spawn_blocking(move || PredictionDatabase::load(&options))
            .await
            .context("reload task panicked")?
            .with_context(|| format!("failed to reload {}", self.options.csv_path.display()))?;

        let db = Arc::new(db);
        *self.db.write().await = db.clone();
        tracing::info!("Reloaded {} predictions", db.len());
        Ok(db)
    }

    /// Reloads after every change notification until the sender goes away.
    ///
    /// A failed reload is logged and the previous data stays in place.
    pub async fn reload_on_change(&self, mut changes: watch::Receiver<u64>) {
        while changes.changed().await.is_ok() {
            if let Err(e) = self.reload().await {
                tracing::error!("Reload after file change failed: {:#}", e);
            }
        }
    }
}
