use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::state::{position_for, PopoverState, Resolution};
use crate::core::cache::ExplanationCache;
use crate::core::explain::{Explanation, ExplanationClient};
use crate::core::selection::qualifying_text;
use crate::shared::emit::emit_event;
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::PopoverEvent;
use crate::shared::types::{PopoverSnapshot, PresentOutcome, Rect, ScrollOffset};
use crate::system::overlay::OverlaySurface;

/// What a `present` call did
#[derive(Debug)]
pub enum Presentation {
    /// Selection did not qualify; the overlay is hidden
    Hidden,
    /// Served from the cache, no request issued
    Cached,
    /// A request is in flight
    Dispatched(PendingExplanation),
    /// No async runtime to run the request on; the overlay shows the error
    Failed,
}

impl Presentation {
    pub fn outcome(&self) -> PresentOutcome {
        match self {
            Presentation::Hidden => PresentOutcome::Hidden,
            Presentation::Cached => PresentOutcome::Cached,
            Presentation::Dispatched(pending) => PresentOutcome::Dispatched {
                generation: pending.generation,
            },
            Presentation::Failed => PresentOutcome::Failed,
        }
    }

    pub fn into_pending(self) -> Option<PendingExplanation> {
        match self {
            Presentation::Dispatched(pending) => Some(pending),
            _ => None,
        }
    }
}

/// Handle on a dispatched explanation request
#[derive(Debug)]
pub struct PendingExplanation {
    generation: u64,
    handle: JoinHandle<()>,
}

impl PendingExplanation {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the request has been applied, discarded or cancelled
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            warn!(generation = self.generation, error = %e, "explanation task did not complete");
        }
    }
}

struct ControllerInner {
    surface: Arc<dyn OverlaySurface>,
    cache: ExplanationCache,
    client: ExplanationClient,
    state: Mutex<PopoverState>,
}

impl ControllerInner {
    fn lock_state(&self) -> MutexGuard<'_, PopoverState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("popover state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn render(&self, state: &PopoverState) {
        emit_event(self.surface.as_ref(), PopoverEvent::Rendered(state.snapshot().clone()));
    }

    /// Apply a request outcome. Stale generations are dropped without touching
    /// the overlay or the cache; errors are never cached.
    fn resolve(&self, generation: u64, key: &str, request_id: Uuid, outcome: AppResult<Explanation>) {
        {
            let mut state = self.lock_state();
            match state.resolve(generation, &outcome) {
                Resolution::Stale => {
                    debug!(
                        generation,
                        current = state.generation(),
                        %request_id,
                        "discarding stale explanation"
                    );
                    return;
                }
                Resolution::Displayed => self.render(&state),
                Resolution::AppliedHidden => {
                    debug!(generation, %request_id, "explanation arrived while hidden");
                    self.render(&state);
                }
            }
        }

        match outcome {
            Ok(explanation) => {
                let fallback = matches!(explanation, Explanation::Fallback);
                info!(generation, %request_id, fallback, "explanation resolved");
                if let Err(e) = self.cache.store(key, explanation.text()) {
                    warn!(error = %e, "failed to persist explanation cache");
                }
            }
            Err(e) => {
                error!(
                    generation,
                    %request_id,
                    error = %e,
                    request_failure = e.is_request_failure(),
                    "explanation request failed"
                );
            }
        }
    }
}

/// Owner of the single overlay.
///
/// Cheap to clone; clones share the same overlay, cache and generation
/// counter. Renders happen while the state lock is held, so surfaces must not
/// call back into the controller from `emit`.
#[derive(Clone)]
pub struct PopoverController {
    inner: Arc<ControllerInner>,
}

impl PopoverController {
    pub fn new(
        surface: Arc<dyn OverlaySurface>,
        cache: ExplanationCache,
        client: ExplanationClient,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                surface,
                cache,
                client,
                state: Mutex::new(PopoverState::new()),
            }),
        }
    }

    /// Show the overlay for a selection.
    ///
    /// The text is trimmed and used as the cache key. A hit renders
    /// immediately; a miss spawns one request on the current tokio runtime.
    /// Any request still in flight for an older selection is cancelled, and
    /// its result would be discarded even if it arrived.
    pub fn present(&self, text: &str, rect: Rect, scroll: ScrollOffset) -> Presentation {
        let Some(key) = qualifying_text(text) else {
            self.hide();
            return Presentation::Hidden;
        };

        let mut state = self.inner.lock_state();
        let (generation, superseded) = state.begin(position_for(&rect, &scroll));
        if let Some(token) = superseded {
            debug!(generation, "cancelling superseded explanation request");
            token.cancel();
        }
        self.inner.render(&state);

        if let Some(cached) = self.inner.cache.lookup(key) {
            info!(generation, "explanation served from cache");
            state.show_cached(cached);
            self.inner.render(&state);
            return Presentation::Cached;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                let outcome = Err(AppError::System(format!("No async runtime: {}", e)));
                error!(generation, error = %e, "cannot dispatch explanation request");
                state.resolve(generation, &outcome);
                self.inner.render(&state);
                return Presentation::Failed;
            }
        };

        let token = CancellationToken::new();
        state.arm(token.clone());
        drop(state);

        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        let request_id = Uuid::new_v4();
        info!(generation, %request_id, "dispatching explanation request");

        let handle = runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, %request_id, "explanation request cancelled");
                    return;
                }
                outcome = inner.client.request(&key) => outcome,
            };
            inner.resolve(generation, &key, request_id, outcome);
        });

        Presentation::Dispatched(PendingExplanation { generation, handle })
    }

    /// Hide the overlay. Idempotent; an in-flight request keeps running and
    /// its result is still cached.
    pub fn hide(&self) {
        let mut state = self.inner.lock_state();
        if state.hide() {
            debug!(generation = state.generation(), "hiding overlay");
            self.inner.render(&state);
        }
    }

    pub fn snapshot(&self) -> PopoverSnapshot {
        self.inner.lock_state().snapshot().clone()
    }

    pub fn cache(&self) -> &ExplanationCache {
        &self.inner.cache
    }
}
