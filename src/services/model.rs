//! Presentation-independent state for the "nearby services" screen.
//!
//! The model owns a resolver and one output slot. A request runs a whole
//! batch in a background task and publishes the list once, at the end.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use super::resolver::AddressResolver;
use super::types::{AddressItem, ResolvedService};

/// Published list; `None` until the first run completes.
pub type ServicesSnapshot = Option<Arc<Vec<ResolvedService>>>;

pub struct ServicesModel {
    resolver: AddressResolver,
    slot: Arc<watch::Sender<ServicesSnapshot>>,
    /// Bumped by every request; only the latest run may publish.
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl ServicesModel {
    pub fn new(resolver: AddressResolver) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            resolver,
            slot: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ServicesSnapshot> {
        self.slot.subscribe()
    }

    /// Latest published list.
    pub fn current(&self) -> ServicesSnapshot {
        self.slot.borrow().clone()
    }

    /// True while the most recent run has not finished.
    pub fn is_resolving(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|run| !run.is_finished())
    }

    /// Start resolving `items`. Must be called inside a tokio runtime.
    ///
    /// A run still in flight is aborted; at most one run works at a time and
    /// a superseded run never publishes. Dropping the returned handle leaves
    /// the task running, and its result is stored even if nobody is
    /// subscribed any more.
    pub fn request(&self, items: Vec<AddressItem>) -> ResolveHandle {
        let resolver = self.resolver.clone();
        let slot = Arc::clone(&self.slot);
        let latest = Arc::clone(&self.generation);
        let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;

        let task = tokio::spawn(async move {
            let services = Arc::new(resolver.resolve_all(&items).await);
            let published = slot.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = Some(Arc::clone(&services));
                true
            });
            if published {
                info!(generation, count = services.len(), "publishing resolved services");
            } else {
                debug!(generation, "superseded run not published");
            }
            services
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(run) = previous {
            if !run.is_finished() {
                debug!(generation, "aborting previous resolution run");
                run.abort();
            }
        }

        ResolveHandle { task }
    }
}

/// Handle to one resolution run.
pub struct ResolveHandle {
    task: JoinHandle<Arc<Vec<ResolvedService>>>,
}

impl ResolveHandle {
    /// Abort the run. Nothing is published.
    pub fn cancel(&self) {
        debug!("resolution cancelled");
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run; returns the list it produced, or `None` if it was
    /// cancelled or superseded before completing.
    pub async fn finished(self) -> ServicesSnapshot {
        self.task.await.ok()
    }
}
