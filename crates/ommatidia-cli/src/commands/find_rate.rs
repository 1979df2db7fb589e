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

//! `find-rate`: locate the busiest pose, then converge the sample rate.

use anyhow::Result;
use ommatidia_core::RendererPort;
use ommatidia_search::{
    AbortKind, FrequencyLocator, LocatedPose, SampleRateConverger, SampleRateReport,
    SampleTarget, SearchPhase,
};

use super::Outcome;
use crate::cli::FindRateArgs;
use crate::config;

pub fn run(args: &FindRateArgs) -> Result<Outcome> {
    let (config, region) = config::resolve(args)?;
    let mut renderer = super::load_scene(&args.scene)?;
    let camera = super::select_eye(&mut renderer, args.camera.as_deref())?;
    log::info!(
        "Searching with eye '{}' in {}",
        renderer.camera_name(camera)?,
        region
    );

    let locator = FrequencyLocator::new(config.locator.clone());
    let located = match locator.locate(&mut renderer, camera, &region, config.locator_cutoff) {
        Ok(located) => located,
        Err(aborted) => match aborted.best {
            // An unfinished pose search still gives a usable pose.
            Some(best) if aborted.reason.kind() == AbortKind::BudgetExhausted => {
                log::warn!("Pose search stopped early ({}), using its best pose", aborted.reason);
                best
            }
            _ => {
                log::error!("Pose search failed: {}", aborted.reason);
                println!("Phase: {}", SearchPhase::Aborted(aborted.reason.kind()));
                return Ok(Outcome::Aborted(aborted.reason.kind()));
            }
        },
    };
    print_location(&located);

    let converger = SampleRateConverger::new(config.convergence.clone());
    let target = SampleTarget::from(&located);
    match converger.converge(&mut renderer, camera, &target, config.sample_cutoff) {
        Ok(report) => {
            print_rate(&report);
            println!("Phase: {}", SearchPhase::Converged);
            Ok(Outcome::Converged)
        }
        Err(aborted) => {
            log::error!("Sample-rate search failed: {}", aborted.reason);
            if let Some(partial) = &aborted.best {
                println!("Best so far:");
                print_rate(partial);
            }
            let kind = aborted.kind();
            println!("Phase: {}", SearchPhase::Aborted(kind));
            Ok(Outcome::Aborted(kind))
        }
    }
}

fn print_location(located: &LocatedPose) {
    let (axis, angle) = located.pose.orientation.to_axis_angle();
    println!("Location: {}", located.pose.position);
    println!("Heading: {:.2}° about {}", angle.to_degrees(), axis);
    println!(
        "Ommatidium #{} looks along {}",
        located.direction_index, located.world_direction
    );
    println!(
        "Visual frequency (variance): {:.6} after {} iterations",
        located.variance, located.iterations
    );
}

fn print_rate(report: &SampleRateReport) {
    println!("Samples per steradian: {}", report.samples_per_steradian);
    println!(
        "Std dev: {:.6} at {} samples, {:.6} at {} samples (change {:.2}%)",
        report.std_dev,
        report.samples_per_steradian,
        report.previous_std_dev,
        report.previous_samples,
        report.relative_change * 100.0
    );
    println!("Renders: {}", report.renders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn args(extra: &[&str]) -> FindRateArgs {
        let scene = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/arena.ron");
        let mut argv = vec!["ommatidia", "find-rate", "-f", scene];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("arguments should parse").command {
            Command::FindRate(args) => args,
            other => panic!("expected find-rate, got {other:?}"),
        }
    }

    #[test]
    fn test_default_region_aborts_as_invalid() {
        let outcome = run(&args(&[])).expect("an invalid region is an outcome, not an error");
        assert_eq!(outcome, Outcome::Aborted(AbortKind::InvalidRegion));
        assert_eq!(outcome.code(), 2);
    }

    #[test]
    fn test_unknown_camera_is_an_error() {
        assert!(run(&args(&["-b", "-1", "0", "-1", "1", "2", "1", "--camera", "nobody"])).is_err());
    }
}
