use crate::backend::Backend;
use crate::models::{Comment, DashboardView};
use crate::stats::build_dashboard;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The view-model behind the dashboard: everything fetched from the backend
/// and everything derived from it. Rebuilt wholesale on each refresh; reads
/// and writes go through the one mutex, and overlapping refreshes are fine
/// because the last completed write wins.
#[derive(Debug, Default)]
pub struct DashboardData {
    pub view: Option<DashboardView>,
    /// Last stats refresh failed. The view keeps its previous value, so the
    /// page shows the fixed error in the latest-response field while the
    /// other numbers stay stale.
    pub stats_failed: bool,
    /// Full fetched comment list; filter changes re-scan this, no re-fetch.
    pub comments: Vec<Comment>,
    pub comments_failed: bool,
    /// Set once the initial fetch pair has run (success or not).
    pub loaded_once: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub dashboard: Arc<Mutex<DashboardData>>,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            dashboard: Arc::new(Mutex::new(DashboardData::default())),
        }
    }

    /// Re-run the stats flow: fetch, derive a fresh view, swap it in.
    pub async fn refresh_stats(&self) {
        match self.backend.fetch_stats().await {
            Ok(stats) => {
                let view = build_dashboard(&stats);
                let total = view.total_responses;
                let mut data = self.dashboard.lock().await;
                data.view = Some(view);
                data.stats_failed = false;
                info!(total_responses = total, "stats refreshed");
            }
            Err(err) => {
                warn!("stats refresh failed: {err}");
                self.dashboard.lock().await.stats_failed = true;
            }
        }
    }

    /// Re-run the comments flow. Failures flag the comments region only;
    /// the stats view is untouched (flows stay isolated).
    pub async fn refresh_comments(&self) {
        match self.backend.fetch_comments().await {
            Ok(comments) => {
                let mut data = self.dashboard.lock().await;
                info!(count = comments.len(), "comments refreshed");
                data.comments = comments;
                data.comments_failed = false;
            }
            Err(err) => {
                warn!("comments refresh failed: {err}");
                self.dashboard.lock().await.comments_failed = true;
            }
        }
    }

    pub async fn refresh_all(&self) {
        self.refresh_stats().await;
        self.refresh_comments().await;
        self.dashboard.lock().await.loaded_once = true;
    }

    /// First page view triggers the initial fetch pair; later views reuse
    /// the cached state until the reload action or the periodic refresh.
    pub async fn ensure_loaded(&self) {
        let loaded = self.dashboard.lock().await.loaded_once;
        if !loaded {
            self.refresh_all().await;
        }
    }
}
