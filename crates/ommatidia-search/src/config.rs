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

//! Tunables for both search phases.
//!
//! Everything has a default, so a config file only needs the values it
//! changes. Loading from disk is left to the caller.

use std::fmt;
use std::time::Duration;

use ommatidia_core::math::FULL_SPHERE_SR;
use ommatidia_core::{RegionError, SearchRegion};
use serde::{Deserialize, Serialize};

/// A configuration value was out of range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A cutoff was negative or not finite.
    InvalidCutoff {
        /// The configuration key.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The sample-count growth factor must be finite and greater than 1.
    InvalidGrowthFactor(f32),
    /// The locator cone must cover a solid angle in `(0, 4π]`.
    InvalidConeSolidAngle(f32),
    /// The translation scale must be finite and non-negative.
    InvalidTranslationScale(f32),
    /// A count that must be at least one was zero.
    Zero(&'static str),
    /// `max_samples` is below `start_samples`.
    SampleRange {
        /// The configured starting sample count.
        start: u32,
        /// The configured maximum sample count.
        max: u32,
    },
    /// A time limit was negative or not finite.
    InvalidTimeLimit(&'static str),
    /// The configured search region failed validation.
    InvalidRegion(RegionError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCutoff { name, value } => {
                write!(f, "'{name}' must be a finite, non-negative fraction (got {value})")
            }
            ConfigError::InvalidGrowthFactor(g) => {
                write!(f, "growth factor must be greater than 1 (got {g})")
            }
            ConfigError::InvalidConeSolidAngle(sr) => {
                write!(f, "cone solid angle must be in (0, 4π] steradians (got {sr})")
            }
            ConfigError::InvalidTranslationScale(s) => {
                write!(f, "translation scale must be non-negative (got {s})")
            }
            ConfigError::Zero(name) => write!(f, "'{name}' must be at least 1"),
            ConfigError::SampleRange { start, max } => write!(
                f,
                "max_samples ({max}) must not be below start_samples ({start})"
            ),
            ConfigError::InvalidTimeLimit(name) => {
                write!(f, "'{name}' must be a finite, non-negative number of seconds")
            }
            ConfigError::InvalidRegion(e) => write!(f, "invalid region: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the pose search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Isosphere subdivision level of the sampling pattern (2 gives 162 directions).
    pub subdivisions: u32,
    /// Solid angle covered by each sampling ommatidium, in steradians.
    pub cone_solid_angle: f32,
    /// Candidates proposed per iteration.
    pub population: u32,
    /// Largest translation per axis, as a fraction of the region extent.
    pub translation_scale: f32,
    /// Consecutive sub-cutoff iterations needed to converge.
    pub stability_window: u32,
    /// Iteration cap.
    pub max_iterations: u32,
    /// Samples per ommatidium while evaluating poses.
    pub samples_per_ommatidium: u32,
    /// Seed of the candidate generator.
    pub seed: u64,
    /// Optional wall-clock cap, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            subdivisions: 2,
            cone_solid_angle: 1.0,
            population: 8,
            translation_scale: 0.1,
            stability_window: 5,
            max_iterations: 200,
            samples_per_ommatidium: 32,
            seed: 0x5EED,
            time_limit_secs: None,
        }
    }
}

impl LocatorConfig {
    /// The wall-clock cap as a `Duration`, if one is set.
    ///
    /// A negative, NaN or overflowing value gives no cap; [`SearchConfig::validate`]
    /// rejects those.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Settings for the sample-rate convergence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// Sample count of the first measurement.
    pub start_samples: u32,
    /// Geometric growth of the sample count between measurements.
    pub growth_factor: f32,
    /// Renders whose spread makes up one measurement.
    pub renders_per_step: u32,
    /// Largest sample count the search may try.
    pub max_samples: u32,
    /// Cap on growth plus refinement steps.
    pub max_iterations: u32,
    /// Binary-search between the last two counts once growth stops.
    pub refine: bool,
    /// Discard the first render after every sample-count change.
    pub reseed_render: bool,
    /// Optional wall-clock cap, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            start_samples: 1,
            growth_factor: 2.0,
            renders_per_step: 8,
            max_samples: 65_536,
            max_iterations: 32,
            refine: true,
            reseed_render: true,
            time_limit_secs: None,
        }
    }
}

impl ConvergenceConfig {
    /// The wall-clock cap as a `Duration`, if one is set.
    ///
    /// A negative, NaN or overflowing value gives no cap; [`SearchConfig::validate`]
    /// rejects those.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Top-level configuration of a `find-rate` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Relative variance change below which the pose search counts as stable.
    pub locator_cutoff: f32,
    /// Relative deviation change below which a sample count counts as stable.
    pub sample_cutoff: f32,
    /// Pose search settings.
    pub locator: LocatorConfig,
    /// Sample-rate search settings.
    pub convergence: ConvergenceConfig,
    /// The region to search, unless given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SearchRegion>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            locator_cutoff: 0.01,
            sample_cutoff: 0.05,
            locator: LocatorConfig::default(),
            convergence: ConvergenceConfig::default(),
            region: None,
        }
    }
}

impl SearchConfig {
    /// Checks every value for range errors.
    ///
    /// `renders_per_step` is not checked here: fewer than two
    /// renders is reported by the convergence search as `InsufficientData`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_cutoff("locator_cutoff", self.locator_cutoff)?;
        check_cutoff("sample_cutoff", self.sample_cutoff)?;

        let loc = &self.locator;
        if !(loc.cone_solid_angle > 0.0 && loc.cone_solid_angle <= FULL_SPHERE_SR) {
            return Err(ConfigError::InvalidConeSolidAngle(loc.cone_solid_angle));
        }
        if !loc.translation_scale.is_finite() || loc.translation_scale < 0.0 {
            return Err(ConfigError::InvalidTranslationScale(loc.translation_scale));
        }
        check_nonzero("locator.population", loc.population)?;
        check_nonzero("locator.stability_window", loc.stability_window)?;
        check_nonzero("locator.max_iterations", loc.max_iterations)?;
        check_nonzero("locator.samples_per_ommatidium", loc.samples_per_ommatidium)?;
        check_time_limit("locator.time_limit_secs", loc.time_limit_secs)?;

        let conv = &self.convergence;
        if !conv.growth_factor.is_finite() || conv.growth_factor <= 1.0 {
            return Err(ConfigError::InvalidGrowthFactor(conv.growth_factor));
        }
        check_nonzero("convergence.start_samples", conv.start_samples)?;
        check_nonzero("convergence.max_iterations", conv.max_iterations)?;
        if conv.max_samples < conv.start_samples {
            return Err(ConfigError::SampleRange {
                start: conv.start_samples,
                max: conv.max_samples,
            });
        }
        check_time_limit("convergence.time_limit_secs", conv.time_limit_secs)?;

        if let Some(region) = &self.region {
            region.validate().map_err(ConfigError::InvalidRegion)?;
        }
        Ok(())
    }
}

fn check_cutoff(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCutoff { name, value })
    }
}

fn check_nonzero(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero(name))
    } else {
        Ok(())
    }
}

fn check_time_limit(name: &'static str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(secs) if !secs.is_finite() || secs < 0.0 => Err(ConfigError::InvalidTimeLimit(name)),
        _ => Ok(()),
    }
}
