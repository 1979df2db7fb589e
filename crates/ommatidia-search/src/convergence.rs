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

//! The Sample-Rate Convergence Engine.
//!
//! Points a single 1 sr ommatidium along a fixed direction and raises its
//! sample count geometrically until the render-to-render standard deviation
//! of its luminance stops changing by more than the cutoff. An optional
//! binary search then tightens the result between the last two counts.
//!
//! Because the ommatidium covers exactly one steradian, the sample count it
//! settles on is the number of samples per steradian the scene needs.

use std::collections::BTreeMap;

use ommatidia_core::math::Vec3;
use ommatidia_core::{CameraHandle, Ommatidium, Pose, RendererError, RendererPort};

use crate::budget::IterationBudget;
use crate::config::ConvergenceConfig;
use crate::locator::LocatedPose;
use crate::outcome::{AbortReason, Aborted, PhaseTracker, SearchPhase, SearchResult};
use crate::stats;

/// Solid angle of the measuring ommatidium.
const UNIT_CONE_SR: f32 = 1.0;

/// Where to measure: an eye pose and a direction in the eye's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTarget {
    /// The eye pose.
    pub pose: Pose,
    /// The viewing direction, local to `pose`.
    pub direction: Vec3,
}

impl SampleTarget {
    /// Creates a target, normalizing the direction.
    pub fn new(pose: Pose, direction: Vec3) -> Self {
        Self {
            pose,
            direction: direction.normalize(),
        }
    }
}

impl From<&LocatedPose> for SampleTarget {
    fn from(located: &LocatedPose) -> Self {
        Self::new(located.pose, located.local_direction)
    }
}

/// The running state of the growth loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceState {
    /// Current sample count.
    pub samples: u32,
    /// Standard deviation measured at `samples`.
    pub std_dev: f32,
    /// The count measured before this one.
    pub previous_samples: Option<u32>,
    /// Standard deviation measured at `previous_samples`.
    pub previous_std_dev: Option<f32>,
}

impl ConvergenceState {
    fn advance(&self, samples: u32, std_dev: f32) -> Self {
        Self {
            samples,
            std_dev,
            previous_samples: Some(self.samples),
            previous_std_dev: Some(self.std_dev),
        }
    }
}

/// One comparison made during growth or refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceStep {
    /// The count under test.
    pub samples: u32,
    /// Its standard deviation.
    pub std_dev: f32,
    /// The count it was compared against.
    pub reference_samples: u32,
    /// The reference standard deviation.
    pub reference_std_dev: f32,
    /// `|std_dev - reference_std_dev| / reference_std_dev`.
    pub relative_change: f32,
    /// Whether the change was within the cutoff.
    pub stable: bool,
}

/// The result of a convergence run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRateReport {
    /// The minimum stable sample count for a 1 sr ommatidium.
    pub samples_per_steradian: u32,
    /// Standard deviation at that count.
    pub std_dev: f32,
    /// The count it was compared against.
    pub previous_samples: u32,
    /// Standard deviation at `previous_samples`.
    pub previous_std_dev: f32,
    /// Relative change between the two. At most the cutoff when converged.
    pub relative_change: f32,
    /// Comparisons made while growing the count.
    pub growth_steps: Vec<ConvergenceStep>,
    /// Comparisons made by the binary search.
    pub refinement_steps: Vec<ConvergenceStep>,
    /// Total renders issued, including reseed renders.
    pub renders: u32,
}

/// Finds the smallest per-steradian sample count whose noise is stable.
#[derive(Debug, Clone, Default)]
pub struct SampleRateConverger {
    config: ConvergenceConfig,
}

impl SampleRateConverger {
    /// Creates a converger with the given settings.
    pub fn new(config: ConvergenceConfig) -> Self {
        Self { config }
    }

    /// Returns the converger settings.
    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Runs the search at `target` using `camera`, which must be a compound eye.
    ///
    /// The eye is replaced by a single ommatidium; callers that need the
    /// original eye afterwards must restore it themselves.
    pub fn converge(
        &self,
        renderer: &mut dyn RendererPort,
        camera: CameraHandle,
        target: &SampleTarget,
        cutoff: f32,
    ) -> SearchResult<SampleRateReport> {
        let mut tracker = PhaseTracker::new("convergence");
        let start = self.config.start_samples.max(1);
        if self.config.renders_per_step < 2 {
            return Err(tracker.abort(AbortReason::InsufficientData { lower_bound: start }, None));
        }
        tracker.advance(SearchPhase::Searching);

        if let Err(e) = prepare_eye(renderer, camera, target) {
            return Err(tracker.abort(e.into(), None));
        }
        log::info!(
            "Converging sample rate along {} from {} samples (cutoff {:.1}%)",
            target.direction,
            start,
            cutoff * 100.0
        );

        let mut meter = Meter::new(renderer, &self.config, start);
        let mut budget = IterationBudget::new(self.config.max_iterations, self.config.time_limit());

        let start_sd = meter.measure(start).map_err(|r| tracker.abort(r, None))?;
        let mut state = ConvergenceState {
            samples: start,
            std_dev: start_sd,
            previous_samples: None,
            previous_std_dev: None,
        };
        if start_sd == 0.0 {
            tracker.advance(SearchPhase::Converged);
            log::info!("Signal is noise-free at {start} samples");
            return Ok(SampleRateReport {
                samples_per_steradian: start,
                std_dev: 0.0,
                previous_samples: start,
                previous_std_dev: 0.0,
                relative_change: 0.0,
                growth_steps: Vec::new(),
                refinement_steps: Vec::new(),
                renders: meter.renders,
            });
        }

        // Growth: multiply the count until one step changes the deviation by
        // no more than the cutoff.
        let mut growth_steps = Vec::new();
        let (mut lo, mut hi_step) = loop {
            if !budget.try_next() {
                let partial = partial_report(&state, &growth_steps, meter.renders);
                return Err(exhausted(&mut tracker, budget.used(), partial));
            }
            let next = match grow(state.samples, self.config.growth_factor, self.config.max_samples) {
                Some(next) => next,
                None => {
                    log::warn!(
                        "Next sample count after {} exceeds the maximum of {}",
                        state.samples,
                        self.config.max_samples
                    );
                    let partial = partial_report(&state, &growth_steps, meter.renders);
                    return Err(exhausted(&mut tracker, budget.used(), partial));
                }
            };

            let next_sd = meter.measure(next).map_err(|r| tracker.abort(r, None))?;
            let step = compare(next, next_sd, state.samples, state.std_dev, cutoff);
            log::debug!(
                "Growth {} -> {} samples: std dev {:.6} -> {:.6}, change {:.4}",
                state.samples,
                next,
                state.std_dev,
                next_sd,
                step.relative_change
            );
            growth_steps.push(step);
            state = state.advance(next, next_sd);
            if step.stable {
                break (step.reference_samples, step);
            }
        };

        let mut refinement_steps = Vec::new();
        if self.config.refine {
            while hi_step.samples - lo > 1 {
                if !budget.try_next() {
                    log::info!(
                        "Budget ran out while refining; keeping {} samples",
                        hi_step.samples
                    );
                    break;
                }
                let mid = lo + (hi_step.samples - lo) / 2;
                let reference = predecessor(mid, start, self.config.growth_factor);
                let reference_sd = meter.measure(reference).map_err(|r| tracker.abort(r, None))?;
                let mid_sd = meter.measure(mid).map_err(|r| tracker.abort(r, None))?;
                let step = compare(mid, mid_sd, reference, reference_sd, cutoff);
                log::debug!(
                    "Refine ({}, {}]: {} vs {} samples, change {:.4}, {}",
                    lo,
                    hi_step.samples,
                    mid,
                    reference,
                    step.relative_change,
                    if step.stable { "stable" } else { "unstable" }
                );
                refinement_steps.push(step);
                if step.stable {
                    hi_step = step;
                } else {
                    lo = mid;
                }
            }
        }

        tracker.advance(SearchPhase::Converged);
        log::info!(
            "Converged at {} samples per steradian ({} renders)",
            hi_step.samples,
            meter.renders
        );
        Ok(SampleRateReport {
            samples_per_steradian: hi_step.samples,
            std_dev: hi_step.std_dev,
            previous_samples: hi_step.reference_samples,
            previous_std_dev: hi_step.reference_std_dev,
            relative_change: hi_step.relative_change,
            growth_steps,
            refinement_steps,
            renders: meter.renders,
        })
    }
}

fn prepare_eye(
    renderer: &mut dyn RendererPort,
    camera: CameraHandle,
    target: &SampleTarget,
) -> Result<(), RendererError> {
    renderer.select_camera(camera)?;
    if !renderer.is_compound_eye(camera)? {
        return Err(RendererError::NotCompoundEye(camera.0));
    }
    renderer.set_ommatidia(&[Ommatidium::with_solid_angle(target.direction, UNIT_CONE_SR)])?;
    renderer.set_pose(target.pose)
}

/// Next count in the geometric schedule, or `None` past `max_samples`.
fn grow(samples: u32, factor: f32, max_samples: u32) -> Option<u32> {
    let scaled = (samples as f64 * factor as f64).ceil();
    let next = if scaled.is_finite() && scaled < u64::MAX as f64 {
        (scaled as u64).max(samples as u64 + 1)
    } else {
        u64::MAX
    };
    if next > max_samples as u64 {
        None
    } else {
        Some(next as u32)
    }
}

/// The count `samples` is compared against while refining.
fn predecessor(samples: u32, start: u32, factor: f32) -> u32 {
    let down = (samples as f64 / factor as f64).floor() as u32;
    down.max(start)
}

fn compare(
    samples: u32,
    std_dev: f32,
    reference_samples: u32,
    reference_std_dev: f32,
    cutoff: f32,
) -> ConvergenceStep {
    let relative_change = stats::relative_change(reference_std_dev, std_dev);
    ConvergenceStep {
        samples,
        std_dev,
        reference_samples,
        reference_std_dev,
        relative_change,
        stable: relative_change <= cutoff,
    }
}

fn exhausted(
    tracker: &mut PhaseTracker,
    iterations: u32,
    partial: SampleRateReport,
) -> Aborted<SampleRateReport> {
    tracker.abort(AbortReason::BudgetExhausted { iterations }, Some(partial))
}

fn partial_report(
    state: &ConvergenceState,
    growth_steps: &[ConvergenceStep],
    renders: u32,
) -> SampleRateReport {
    SampleRateReport {
        samples_per_steradian: state.samples,
        std_dev: state.std_dev,
        previous_samples: state.previous_samples.unwrap_or(state.samples),
        previous_std_dev: state.previous_std_dev.unwrap_or(state.std_dev),
        relative_change: growth_steps.last().map_or(0.0, |s| s.relative_change),
        growth_steps: growth_steps.to_vec(),
        refinement_steps: Vec::new(),
        renders,
    }
}

/// Measures the luminance spread at a sample count, caching by count.
struct Meter<'a> {
    renderer: &'a mut dyn RendererPort,
    renders_per_step: u32,
    reseed_render: bool,
    cache: BTreeMap<u32, f32>,
    renders: u32,
    lower_bound: u32,
}

impl<'a> Meter<'a> {
    fn new(renderer: &'a mut dyn RendererPort, config: &ConvergenceConfig, start: u32) -> Self {
        Self {
            renderer,
            renders_per_step: config.renders_per_step,
            reseed_render: config.reseed_render,
            cache: BTreeMap::new(),
            renders: 0,
            lower_bound: start,
        }
    }

    fn measure(&mut self, samples: u32) -> Result<f32, AbortReason> {
        if let Some(&sd) = self.cache.get(&samples) {
            return Ok(sd);
        }

        self.renderer.set_samples_per_ommatidium(samples)?;
        // The first frame after a sample-count change reseeds the sampler.
        if self.reseed_render {
            self.renderer.render()?;
            self.renders += 1;
        }

        let mut luminances = Vec::with_capacity(self.renders_per_step as usize);
        for _ in 0..self.renders_per_step {
            self.renderer.render()?;
            self.renders += 1;
            let values = self.renderer.ommatidial_values()?;
            match values.as_slice() {
                [] => return Err(self.insufficient(samples)),
                [value] => luminances.push(value.luminance()),
                _ => {
                    return Err(RendererError::MalformedOutput {
                        expected: 1,
                        actual: values.len(),
                    }
                    .into())
                }
            }
        }

        let sd = match stats::sample_std_dev(&luminances).filter(|sd| sd.is_finite()) {
            Some(sd) => sd,
            None => return Err(self.insufficient(samples)),
        };
        log::trace!("{samples} samples: std dev {sd:.6} over {} renders", luminances.len());
        self.cache.insert(samples, sd);
        self.lower_bound = self.lower_bound.max(samples);
        Ok(sd)
    }

    fn insufficient(&self, samples: u32) -> AbortReason {
        log::warn!("No usable deviation at {samples} samples");
        AbortReason::InsufficientData {
            lower_bound: self.lower_bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_doubles_and_always_advances() {
        assert_eq!(grow(1, 2.0, 100), Some(2));
        assert_eq!(grow(64, 2.0, 128), Some(128));
        assert_eq!(grow(64, 2.0, 127), None);
        assert_eq!(grow(1, 1.01, 100), Some(2));
        assert_eq!(grow(3, 1.5, 100), Some(5));
        assert_eq!(grow(u32::MAX, 2.0, u32::MAX), None);
    }

    #[test]
    fn test_predecessor_undoes_growth() {
        for factor in [1.5f32, 2.0, 3.0] {
            let mut n = 1;
            while let Some(next) = grow(n, factor, 10_000) {
                assert_eq!(predecessor(next, 1, factor), n);
                n = next;
            }
        }
        assert_eq!(predecessor(3, 4, 2.0), 4);
    }

    #[test]
    fn test_compare_marks_stability() {
        let step = compare(8, 0.96, 4, 1.0, 0.05);
        assert!(step.stable);
        let step = compare(8, 0.9, 4, 1.0, 0.05);
        assert!(!step.stable);
    }
}
