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

//! Resolves the search settings of a `find-rate` run.
//!
//! Precedence, highest first: command-line flags, the `--config` file, the
//! built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ommatidia_core::SearchRegion;
use ommatidia_search::SearchConfig;

use crate::cli::{FindRateArgs, RegionShape};

/// Reads a TOML search configuration. Missing keys keep their defaults.
pub fn load(path: &Path) -> Result<SearchConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Builds the validated configuration and the region to search.
///
/// The region is returned unvalidated: a degenerate region is reported by
/// the search itself, as an aborted run.
pub fn resolve(args: &FindRateArgs) -> Result<(SearchConfig, SearchRegion)> {
    let mut config = match &args.config {
        Some(path) => load(path)?,
        None => SearchConfig::default(),
    };
    if let Some(cutoff) = args.sample_cutoff {
        config.sample_cutoff = cutoff;
    }
    if let Some(cutoff) = args.locator_cutoff {
        config.locator_cutoff = cutoff;
    }
    if let Some(seed) = args.seed {
        config.locator.seed = seed;
    }

    let from_file = config.region.take();
    let region = region_from_args(args, from_file)?;
    config.validate().context("Invalid search configuration")?;
    log::debug!("Resolved search configuration: {config:?}");
    Ok((config, region))
}

fn region_from_args(args: &FindRateArgs, from_file: Option<SearchRegion>) -> Result<SearchRegion> {
    let shape = match (args.shape, &args.bounds, &args.cylinder) {
        (Some(shape), _, _) => shape,
        (None, Some(_), _) => RegionShape::Box,
        (None, None, Some(_)) => RegionShape::Cylinder,
        (None, None, None) => {
            if let Some(region) = from_file {
                return Ok(region);
            }
            RegionShape::Box
        }
    };
    let region = match shape {
        RegionShape::Box => {
            SearchRegion::box_from_slice(args.bounds.as_deref().unwrap_or(&[0.0; 6][..]))
        }
        RegionShape::Cylinder => {
            SearchRegion::cylinder_from_slice(args.cylinder.as_deref().unwrap_or(&[0.0; 5][..]))
        }
    };
    region.context("Malformed search region")
}
