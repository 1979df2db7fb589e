// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The search state machine shared by both phases, and how a run reports failure.

use std::fmt;

use ommatidia_core::{RegionError, RendererError};

/// Why a search phase stopped without converging, stripped of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortKind {
    /// The search region is malformed or encloses no volume.
    InvalidRegion,
    /// The renderer failed or returned malformed data.
    RenderUnavailable,
    /// A statistic needed by the search is undefined.
    InsufficientData,
    /// The iteration or time cap was hit before convergence.
    BudgetExhausted,
}

impl fmt::Display for AbortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbortKind::InvalidRegion => "InvalidRegion",
            AbortKind::RenderUnavailable => "RenderUnavailable",
            AbortKind::InsufficientData => "InsufficientData",
            AbortKind::BudgetExhausted => "BudgetExhausted",
        };
        f.write_str(name)
    }
}

/// The lifecycle of one search phase.
///
/// `Init → Searching → Converged | Aborted`. Pre-flight checks may also move
/// straight from `Init` to `Aborted`. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// Inputs are being validated; the renderer has not been touched.
    #[default]
    Init,
    /// The search loop is running.
    Searching,
    /// The search met its stability criterion.
    Converged,
    /// The search stopped early.
    Aborted(AbortKind),
}

impl SearchPhase {
    /// Returns `true` for `Converged` and `Aborted`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Converged | SearchPhase::Aborted(_))
    }

    /// Checks whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: SearchPhase) -> bool {
        match (self, next) {
            (SearchPhase::Init, SearchPhase::Searching) => true,
            (
                SearchPhase::Init,
                SearchPhase::Aborted(AbortKind::InvalidRegion | AbortKind::InsufficientData),
            ) => true,
            (SearchPhase::Searching, SearchPhase::Converged | SearchPhase::Aborted(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::Init => f.write_str("INIT"),
            SearchPhase::Searching => f.write_str("SEARCHING"),
            SearchPhase::Converged => f.write_str("CONVERGED"),
            SearchPhase::Aborted(kind) => write!(f, "ABORTED({kind})"),
        }
    }
}

/// The full reason a search phase was aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    /// The search region failed validation.
    InvalidRegion(RegionError),
    /// A renderer call failed or its output was unusable.
    RenderUnavailable(RendererError),
    /// The standard deviation could not be computed.
    InsufficientData {
        /// The last sample count that produced a valid measurement.
        lower_bound: u32,
    },
    /// The budget ran out first.
    BudgetExhausted {
        /// Iterations completed before the budget ran out.
        iterations: u32,
    },
}

impl AbortReason {
    /// Returns the payload-free kind of this reason.
    pub fn kind(&self) -> AbortKind {
        match self {
            AbortReason::InvalidRegion(_) => AbortKind::InvalidRegion,
            AbortReason::RenderUnavailable(_) => AbortKind::RenderUnavailable,
            AbortReason::InsufficientData { .. } => AbortKind::InsufficientData,
            AbortReason::BudgetExhausted { .. } => AbortKind::BudgetExhausted,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::InvalidRegion(e) => write!(f, "invalid search region: {e}"),
            AbortReason::RenderUnavailable(e) => write!(f, "renderer unavailable: {e}"),
            AbortReason::InsufficientData { lower_bound } => write!(
                f,
                "insufficient data to compute a deviation (lower bound: {lower_bound} samples)"
            ),
            AbortReason::BudgetExhausted { iterations } => {
                write!(f, "budget exhausted after {iterations} iterations")
            }
        }
    }
}

impl std::error::Error for AbortReason {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AbortReason::InvalidRegion(e) => Some(e),
            AbortReason::RenderUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegionError> for AbortReason {
    fn from(e: RegionError) -> Self {
        AbortReason::InvalidRegion(e)
    }
}

impl From<RendererError> for AbortReason {
    fn from(e: RendererError) -> Self {
        AbortReason::RenderUnavailable(e)
    }
}

/// A terminal `ABORTED` outcome, carrying the best partial result if one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Aborted<T> {
    /// Why the search stopped.
    pub reason: AbortReason,
    /// The best result found before stopping. Always present for
    /// `BudgetExhausted` once the search has started.
    pub best: Option<T>,
}

impl<T> Aborted<T> {
    /// Returns the payload-free kind of the abort reason.
    pub fn kind(&self) -> AbortKind {
        self.reason.kind()
    }

    /// Maps the partial result, keeping the reason.
    pub fn map_best<U>(self, f: impl FnOnce(T) -> U) -> Aborted<U> {
        Aborted {
            reason: self.reason,
            best: self.best.map(f),
        }
    }
}

impl<T> fmt::Display for Aborted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search aborted: {}", self.reason)?;
        if self.best.is_some() {
            write!(f, " (a partial result is available)")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> std::error::Error for Aborted<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// The outcome of a search phase: `Ok` when converged.
pub type SearchResult<T> = Result<T, Aborted<T>>;

/// Tracks the phase of one search run and logs each transition.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    label: &'static str,
    phase: SearchPhase,
}

impl PhaseTracker {
    /// Starts a tracker in `Init`. `label` names the phase in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            phase: SearchPhase::Init,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Moves to `next` if the transition is legal.
    ///
    /// Returns `false` and leaves the phase unchanged otherwise.
    pub fn advance(&mut self, next: SearchPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            log::warn!(
                "{}: ignoring illegal transition {} -> {}",
                self.label,
                self.phase,
                next
            );
            return false;
        }
        log::debug!("{}: {} -> {}", self.label, self.phase, next);
        self.phase = next;
        true
    }

    /// Moves to `Aborted` and builds the matching outcome.
    pub fn abort<T>(&mut self, reason: AbortReason, best: Option<T>) -> Aborted<T> {
        self.advance(SearchPhase::Aborted(reason.kind()));
        log::info!("{}: aborted, {}", self.label, reason);
        Aborted { reason, best }
    }
}
