use tokio_util::sync::CancellationToken;

use crate::config::{ERROR_TEXT, LOADING_TEXT, VERTICAL_OFFSET_PX};
use crate::core::explain::Explanation;
use crate::shared::error::AppResult;
use crate::shared::types::{PopoverPhase, PopoverSnapshot, Position, Rect, ScrollOffset};

/// Where the overlay goes for a selection: under its first range, in document
/// coordinates
pub fn position_for(rect: &Rect, scroll: &ScrollOffset) -> Position {
    Position {
        left: rect.left + scroll.x,
        top: rect.bottom() + scroll.y + VERTICAL_OFFSET_PX,
    }
}

/// What happened to a request resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Applied and the overlay shows it
    Displayed,
    /// Applied while the overlay is hidden; content updated, stays hidden
    AppliedHidden,
    /// A newer selection has superseded the request; nothing changed
    Stale,
}

/// The singleton overlay's state. Only the controller mutates it.
#[derive(Debug, Default)]
pub struct PopoverState {
    snapshot: PopoverSnapshot,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl PopoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &PopoverSnapshot {
        &self.snapshot
    }

    /// Generation of the latest qualifying selection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> PopoverPhase {
        self.snapshot.phase
    }

    /// Start a new selection: bump the generation, show the placeholder.
    /// Returns the new generation and the superseded request's token, if any.
    pub(crate) fn begin(&mut self, position: Position) -> (u64, Option<CancellationToken>) {
        self.generation += 1;
        self.snapshot = PopoverSnapshot {
            phase: PopoverPhase::Loading,
            visible: true,
            position,
            content: LOADING_TEXT.to_string(),
            generation: self.generation,
        };
        (self.generation, self.in_flight.take())
    }

    pub(crate) fn show_cached(&mut self, content: String) {
        self.snapshot.phase = PopoverPhase::DisplayingCached;
        self.snapshot.content = content;
    }

    /// Remember the token of the request dispatched for the current generation
    pub(crate) fn arm(&mut self, token: CancellationToken) {
        self.in_flight = Some(token);
    }

    /// Apply a request outcome if `generation` is still current
    pub(crate) fn resolve(
        &mut self,
        generation: u64,
        outcome: &AppResult<Explanation>,
    ) -> Resolution {
        if generation != self.generation {
            return Resolution::Stale;
        }
        self.in_flight = None;

        let (phase, content) = match outcome {
            Ok(explanation) => (PopoverPhase::DisplayingFetched, explanation.text().to_string()),
            Err(_) => (PopoverPhase::DisplayingError, ERROR_TEXT.to_string()),
        };
        self.snapshot.content = content;

        if self.snapshot.visible {
            self.snapshot.phase = phase;
            Resolution::Displayed
        } else {
            Resolution::AppliedHidden
        }
    }

    /// Hide from any phase. Leaves generation and any in-flight request alone.
    /// Returns whether anything changed.
    pub(crate) fn hide(&mut self) -> bool {
        let changed = self.snapshot.visible || self.snapshot.phase != PopoverPhase::Hidden;
        self.snapshot.visible = false;
        self.snapshot.phase = PopoverPhase::Hidden;
        changed
    }
}
