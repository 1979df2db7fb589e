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

//! The Frequency Locator: a stochastic local search for the eye pose with the
//! highest visual frequency.
//!
//! The eye is reconfigured as an isosphere of equal cones. Each pose is scored
//! by the sample variance of the luminance seen through those cones, and the
//! search keeps the best pose seen so far. Candidates are small random moves
//! of that incumbent: a translation inside the region plus a rotation no
//! larger than the gap between neighbouring cones.

use ommatidia_core::math::{LinearRgba, Quaternion, Vec3, TAU};
use ommatidia_core::{
    CameraHandle, Isosphere, Pose, RendererError, RendererPort, SearchRegion,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::budget::IterationBudget;
use crate::config::LocatorConfig;
use crate::outcome::{AbortReason, PhaseTracker, SearchPhase, SearchResult};
use crate::stats;

const NEIGHBOURHOOD_SPACINGS: f32 = 1.5;

/// The result of the pose search.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPose {
    /// The incumbent pose.
    pub pose: Pose,
    /// Luminance variance across the sampling pattern at `pose`.
    pub variance: f32,
    /// Index of the sample whose neighbourhood has the highest luminance variance.
    pub direction_index: usize,
    /// That sample's direction in the eye's local frame.
    pub local_direction: Vec3,
    /// That sample's direction in world space.
    pub world_direction: Vec3,
    /// Iterations run.
    pub iterations: u32,
    /// Poses rendered and scored, including the initial one.
    pub evaluations: u32,
    /// Incumbent variance after each iteration. Never decreases.
    pub variance_history: Vec<f32>,
}

struct Evaluation {
    pose: Pose,
    variance: f32,
    luminances: Vec<f32>,
}

/// Searches a region for the pose with the highest visual frequency.
#[derive(Debug, Clone, Default)]
pub struct FrequencyLocator {
    config: LocatorConfig,
}

impl FrequencyLocator {
    /// Creates a locator with the given settings.
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Returns the locator settings.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Runs the search on `camera`, which must be a compound eye.
    ///
    /// The region is validated before the renderer is touched. The search
    /// converges once the relative gain of the incumbent variance stays below
    /// `cutoff` for `stability_window` consecutive iterations; running out
    /// of budget first returns the incumbent as a partial result.
    pub fn locate(
        &self,
        renderer: &mut dyn RendererPort,
        camera: CameraHandle,
        region: &SearchRegion,
        cutoff: f32,
    ) -> SearchResult<LocatedPose> {
        let mut tracker = PhaseTracker::new("locator");
        if let Err(e) = region.validate() {
            return Err(tracker.abort(e.into(), None));
        }
        tracker.advance(SearchPhase::Searching);

        let (directions, spacing) = match self.prepare_eye(renderer, camera) {
            Ok(eye) => eye,
            Err(e) => return Err(tracker.abort(e.into(), None)),
        };

        let mut best = match evaluate(renderer, Pose::at(region.center()), directions.len()) {
            Ok(eval) => eval,
            Err(e) => return Err(tracker.abort(e.into(), None)),
        };
        let mut evaluations = 1u32;
        log::info!(
            "Locating peak visual frequency in {} with {} directions (spacing {:.2}°)",
            region,
            directions.len(),
            spacing.to_degrees()
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut budget = IterationBudget::new(self.config.max_iterations, self.config.time_limit());
        let mut history = Vec::new();
        let mut stable_run = 0u32;

        while budget.try_next() {
            let parent = best.pose;
            let before = best.variance;
            for _ in 0..self.config.population {
                let candidate = self.mutate(&parent, region, spacing, &mut rng);
                let eval = match evaluate(renderer, candidate, directions.len()) {
                    Ok(eval) => eval,
                    Err(e) => return Err(tracker.abort(e.into(), None)),
                };
                evaluations += 1;
                if eval.variance > best.variance {
                    log::trace!(
                        "New incumbent at {} with variance {:.6}",
                        eval.pose.position,
                        eval.variance
                    );
                    best = eval;
                }
            }

            history.push(best.variance);
            let change = stats::relative_change(before, best.variance);
            if change < cutoff {
                stable_run += 1;
            } else {
                stable_run = 0;
            }
            log::debug!(
                "Locator iteration {}: variance {:.6}, change {:.4}, stable for {}",
                budget.used(),
                best.variance,
                change,
                stable_run
            );

            if stable_run >= self.config.stability_window {
                tracker.advance(SearchPhase::Converged);
                let located = located_pose(best, &directions, spacing, budget.used(), evaluations, history);
                log::info!(
                    "Locator converged after {} iterations: variance {:.6} at {}",
                    located.iterations,
                    located.variance,
                    located.pose.position
                );
                return Ok(located);
            }
        }

        let iterations = budget.used();
        let partial = located_pose(best, &directions, spacing, iterations, evaluations, history);
        Err(tracker.abort(AbortReason::BudgetExhausted { iterations }, Some(partial)))
    }

    /// Turns `camera` into the sampling isosphere and reads its directions back.
    fn prepare_eye(
        &self,
        renderer: &mut dyn RendererPort,
        camera: CameraHandle,
    ) -> Result<(Vec<Vec3>, f32), RendererError> {
        renderer.select_camera(camera)?;
        if !renderer.is_compound_eye(camera)? {
            return Err(RendererError::NotCompoundEye(camera.0));
        }

        let sphere = Isosphere::new(self.config.subdivisions);
        renderer.set_ommatidia(&sphere.ommatidia(self.config.cone_solid_angle))?;
        renderer.set_samples_per_ommatidium(self.config.samples_per_ommatidium)?;

        let directions = renderer.ommatidial_directions(camera)?;
        if directions.len() < 2 {
            return Err(RendererError::MalformedOutput {
                expected: sphere.len(),
                actual: directions.len(),
            });
        }
        Ok((directions, sphere.angular_spacing()))
    }

    /// Proposes a neighbour of `parent` that stays inside `region`.
    fn mutate(
        &self,
        parent: &Pose,
        region: &SearchRegion,
        max_angle: f32,
        rng: &mut StdRng,
    ) -> Pose {
        let reach = region.extent() * self.config.translation_scale;
        let offset = Vec3::new(
            rng.gen_range(-1.0f32..=1.0) * reach.x,
            rng.gen_range(-1.0f32..=1.0) * reach.y,
            rng.gen_range(-1.0f32..=1.0) * reach.z,
        );
        let position = region.clamp(parent.position + offset);

        let angle = rng.gen_range(0.0f32..=max_angle.max(0.0));
        let turn = Quaternion::from_axis_angle(random_unit_axis(rng), angle);
        parent.with_position(position).rotated(turn)
    }
}

/// Uniform on the unit sphere (Archimedes' hat-box).
fn random_unit_axis(rng: &mut StdRng) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let phi: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

fn evaluate(
    renderer: &mut dyn RendererPort,
    pose: Pose,
    expected: usize,
) -> Result<Evaluation, RendererError> {
    renderer.set_pose(pose)?;
    renderer.render()?;
    let values = renderer.ommatidial_values()?;
    if values.len() != expected {
        return Err(RendererError::MalformedOutput {
            expected,
            actual: values.len(),
        });
    }

    let luminances: Vec<f32> = values.iter().map(LinearRgba::luminance).collect();
    let variance = stats::sample_variance(&luminances)
        .filter(|v| v.is_finite())
        .ok_or_else(|| RendererError::Backend("non-finite ommatidial values".to_string()))?;
    Ok(Evaluation {
        pose,
        variance,
        luminances,
    })
}

/// Index of the direction whose neighbourhood varies the most.
///
/// A neighbourhood is every direction within `radius` radians, the centre
/// included. Uniform patches score zero whatever their brightness, so a cone
/// that only sees sky is never preferred over one that sees edges. The lowest
/// index wins ties.
fn busiest_direction(directions: &[Vec3], luminances: &[f32], radius: f32) -> usize {
    let min_cos = radius.cos();
    let local: Vec<f32> = directions
        .iter()
        .map(|&centre| {
            let patch: Vec<f32> = directions
                .iter()
                .zip(luminances)
                .filter(|(&d, _)| centre.dot(d) >= min_cos)
                .map(|(_, &l)| l)
                .collect();
            stats::sample_variance(&patch).unwrap_or(0.0)
        })
        .collect();
    stats::max_index(&local).unwrap_or(0)
}

fn located_pose(
    best: Evaluation,
    directions: &[Vec3],
    spacing: f32,
    iterations: u32,
    evaluations: u32,
    variance_history: Vec<f32>,
) -> LocatedPose {
    // Adjacent isosphere vertices sit between one and ~1.2 spacings apart;
    // the next ring starts past 1.7.
    let radius = spacing * NEIGHBOURHOOD_SPACINGS;
    let direction_index = busiest_direction(directions, &best.luminances, radius);
    let local_direction = directions[direction_index];
    LocatedPose {
        pose: best.pose,
        variance: best.variance,
        direction_index,
        local_direction,
        world_direction: best.pose.to_world(local_direction),
        iterations,
        evaluations,
        variance_history,
    }
}
