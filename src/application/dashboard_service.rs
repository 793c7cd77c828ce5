// Dashboard service - Use cases for the summary page
use crate::application::inventory_repository::InventoryRepository;
use crate::application::page_session::PageSession;
use crate::application::renderers::render_isolated;
use crate::domain::dashboard::Dashboard;
use crate::domain::date_range::DateRange;
use crate::domain::panel::{PanelId, PanelUpdate};
use crate::infrastructure::config::{PanelsConfig, SessionsConfig};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("session limit of {0} reached")]
pub struct SessionLimitReached(pub usize);

struct SessionEntry {
    session: Arc<PageSession>,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn InventoryRepository>,
    settings: Arc<PanelsConfig>,
    limits: SessionsConfig,
    sessions: Arc<RwLock<HashMap<u64, SessionEntry>>>,
    next_session_id: Arc<AtomicU64>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn InventoryRepository>,
        settings: PanelsConfig,
        limits: SessionsConfig,
    ) -> Self {
        Self {
            repository,
            settings: Arc::new(settings),
            limits,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            next_session_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn layout(&self) -> Dashboard {
        Dashboard::new(DateRange::default_today())
    }

    /// Renders every bound panel for `range` concurrently and waits for all
    /// of them. A failing panel carries its own error state.
    pub async fn render_all(&self, range: DateRange) -> Vec<PanelUpdate> {
        let renders = PanelId::BOUND.into_iter().map(|panel| {
            let repository = self.repository.clone();
            let settings = self.settings.clone();
            async move {
                let content = render_isolated(repository, panel, range, settings).await;
                PanelUpdate {
                    panel,
                    generation: 0,
                    range,
                    content,
                }
            }
        });

        join_all(renders).await
    }

    /// Opens a page session on the default range.
    pub async fn open_session(&self) -> Result<(u64, Arc<PageSession>), SessionLimitReached> {
        self.open_session_with(DateRange::default_today()).await
    }

    pub async fn open_session_with(
        &self,
        initial: DateRange,
    ) -> Result<(u64, Arc<PageSession>), SessionLimitReached> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limits.max_sessions {
            self.evict_idle(&mut sessions);
            if sessions.len() >= self.limits.max_sessions {
                tracing::warn!("Refusing new session, {} open", sessions.len());
                return Err(SessionLimitReached(self.limits.max_sessions));
            }
        }

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(PageSession::open(
            self.repository.clone(),
            self.settings.clone(),
            initial,
        ));
        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!("Opened dashboard session {} for {}", id, initial);

        Ok((id, session))
    }

    /// Looks up a session and marks it as used.
    pub async fn session(&self, id: u64) -> Option<Arc<PageSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn close_session(&self, id: u64) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!("Closed dashboard session {}", id);
        }
        removed
    }

    /// Drops sessions idle for at least the configured TTL. Returns how many
    /// were reclaimed.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions)
    }

    /// Sweeps expired sessions on the configured interval until aborted.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(service.limits.sweep_interval());
            loop {
                ticks.tick().await;
                service.sweep_expired().await;
            }
        })
    }

    fn evict_idle(&self, sessions: &mut HashMap<u64, SessionEntry>) -> usize {
        let ttl = self.limits.idle_ttl();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() < ttl;
            if !keep {
                tracing::info!("Reclaiming idle dashboard session {}", id);
            }
            keep
        });
        before - sessions.len()
    }
}
