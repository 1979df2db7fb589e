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

//! # Ommatidia Search
//!
//! The two search phases that find how many samples per steradian a scene
//! needs, and the small amount of shared machinery they run on.
//!
//! - [`FrequencyLocator`] looks for the eye pose with the highest visual
//!   frequency inside a [`SearchRegion`](ommatidia_core::SearchRegion).
//! - [`SampleRateConverger`] raises the per-ommatidium sample count along
//!   the best direction of that pose until the noise stops changing.
//!
//! Both phases drive a borrowed [`RendererPort`](ommatidia_core::RendererPort)
//! synchronously and end in [`SearchPhase::Converged`] or
//! [`SearchPhase::Aborted`].

#![warn(missing_docs)]

pub mod budget;
pub mod config;
pub mod convergence;
pub mod eye_rate;
pub mod locator;
pub mod outcome;
pub mod scene;
pub mod stats;

pub use budget::IterationBudget;
pub use config::{ConfigError, ConvergenceConfig, LocatorConfig, SearchConfig};
pub use convergence::{
    ConvergenceState, ConvergenceStep, SampleRateConverger, SampleRateReport, SampleTarget,
};
pub use eye_rate::{eye_sample_rates, samples_per_ommatidium, EyeSampleRate};
pub use locator::{FrequencyLocator, LocatedPose};
pub use outcome::{AbortKind, AbortReason, Aborted, PhaseTracker, SearchPhase, SearchResult};
pub use scene::{find_camera_by_name, find_compound_eye};
