// Page session - date range signal and the dispatcher that re-renders bound panels
use crate::application::inventory_repository::InventoryRepository;
use crate::application::renderers::render_isolated;
use crate::domain::date_range::DateRange;
use crate::domain::panel::{PanelId, PanelState, PanelUpdate};
use crate::infrastructure::config::PanelsConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::{JoinHandle, JoinSet};

const EVENT_BUFFER: usize = 64;

/// A date range published by the selector, numbered in publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub generation: u64,
    pub range: DateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub panel: PanelId,
    #[serde(flatten)]
    pub state: PanelState,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub selection: Option<Selection>,
    pub panels: Vec<PanelSnapshot>,
}

impl BoardSnapshot {
    /// A range has been published and no panel is waiting on an
    /// aggregation call for it.
    pub fn is_settled(&self) -> bool {
        self.selection.is_some() && !self.panels.iter().any(|p| p.state.is_computing())
    }
}

/// Latest state of every bound panel.
#[derive(Debug)]
pub struct PanelBoard {
    current: Option<Selection>,
    panels: HashMap<PanelId, PanelState>,
}

impl Default for PanelBoard {
    fn default() -> Self {
        let panels = PanelId::BOUND
            .into_iter()
            .map(|panel| {
                (
                    panel,
                    PanelState::Idle {
                        range: None,
                        content: None,
                    },
                )
            })
            .collect();

        Self {
            current: None,
            panels,
        }
    }
}

impl PanelBoard {
    /// Marks every bound panel as computing for `selection`.
    pub fn begin(&mut self, selection: Selection) {
        self.current = Some(selection);
        for state in self.panels.values_mut() {
            *state = PanelState::Computing {
                range: selection.range,
                generation: selection.generation,
            };
        }
    }

    /// Applies a finished render. Results for a superseded selection are
    /// dropped; returns whether the update was applied.
    pub fn apply(&mut self, update: &PanelUpdate) -> bool {
        let current = self.current.map(|s| s.generation);
        if current != Some(update.generation) {
            return false;
        }

        match self.panels.get_mut(&update.panel) {
            Some(state) => {
                *state = PanelState::Idle {
                    range: Some(update.range),
                    content: Some(update.content.clone()),
                };
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let panels = PanelId::BOUND
            .into_iter()
            .filter_map(|panel| {
                self.panels.get(&panel).map(|state| PanelSnapshot {
                    panel,
                    state: state.clone(),
                })
            })
            .collect();

        BoardSnapshot {
            selection: self.current,
            panels,
        }
    }
}

/// One open dashboard page: the range signal, its panel board and the
/// dispatcher task re-rendering panels on every change.
pub struct PageSession {
    selection: watch::Sender<Selection>,
    board: Arc<RwLock<PanelBoard>>,
    events: broadcast::Sender<PanelUpdate>,
    dispatcher: JoinHandle<()>,
}

impl PageSession {
    /// Opens a session and renders every bound panel for `initial`. The
    /// board already reports every panel as computing when this returns.
    pub fn open(
        repository: Arc<dyn InventoryRepository>,
        settings: Arc<PanelsConfig>,
        initial: DateRange,
    ) -> Self {
        let initial = Selection {
            generation: 1,
            range: initial,
        };
        let (selection, rx) = watch::channel(initial);

        let mut board = PanelBoard::default();
        board.begin(initial);
        let board = Arc::new(RwLock::new(board));
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let dispatcher = tokio::spawn(dispatch(
            rx,
            repository,
            settings,
            board.clone(),
            events.clone(),
        ));

        Self {
            selection,
            board,
            events,
            dispatcher,
        }
    }

    /// Publishes a new range to all bound panels. The board switches to the
    /// new generation before this returns.
    pub async fn select(&self, range: DateRange) -> Selection {
        let mut board = self.board.write().await;
        self.selection.send_modify(|current| {
            current.generation += 1;
            current.range = range;
        });

        let selection = *self.selection.borrow();
        board.begin(selection);
        selection
    }

    pub fn current(&self) -> Selection {
        *self.selection.borrow()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.board.read().await.snapshot()
    }

    /// Updates applied to the board from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PanelUpdate> {
        self.events.subscribe()
    }
}

impl Drop for PageSession {
    /// Aborting the dispatcher drops its in-flight renders, which closes
    /// the event stream.
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

async fn dispatch(
    mut rx: watch::Receiver<Selection>,
    repository: Arc<dyn InventoryRepository>,
    settings: Arc<PanelsConfig>,
    board: Arc<RwLock<PanelBoard>>,
    events: broadcast::Sender<PanelUpdate>,
) {
    let mut renders = JoinSet::new();

    loop {
        let selection = *rx.borrow_and_update();
        tracing::debug!(
            "Dispatching generation {} for {} to {} panels",
            selection.generation,
            selection.range,
            PanelId::BOUND.len()
        );

        for panel in PanelId::BOUND {
            let repository = repository.clone();
            let settings = settings.clone();
            let board = board.clone();
            let events = events.clone();

            renders.spawn(async move {
                let content = render_isolated(repository, panel, selection.range, settings).await;
                let update = PanelUpdate {
                    panel,
                    generation: selection.generation,
                    range: selection.range,
                    content,
                };

                if board.write().await.apply(&update) {
                    // No subscribers is fine.
                    let _ = events.send(update);
                } else {
                    tracing::debug!(
                        "Discarding stale {} result for generation {}",
                        panel,
                        selection.generation
                    );
                }
            });
        }

        // Reap finished renders until the next selection arrives.
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                Some(_) = renders.join_next(), if !renders.is_empty() => {}
            }
        }
    }
}
