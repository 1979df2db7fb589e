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

//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Finds how many samples per steradian a compound-eye scene needs.
#[derive(Parser, Debug)]
#[command(name = "ommatidia", author, version, about, long_about = None)]
pub struct Cli {
    /// Log per-iteration detail (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Locate the busiest eye pose, then converge the sample rate there.
    FindRate(FindRateArgs),
    /// Turn a samples-per-steradian figure into per-ommatidium sample counts.
    EyeRate(EyeRateArgs),
    /// Walk the cameras of a scene and render each one once.
    Inspect(InspectArgs),
}

/// Shape of the search region.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionShape {
    /// Axis-aligned box, see `--box`.
    Box,
    /// Upright cylinder, see `--cylinder`.
    Cylinder,
}

#[derive(Args, Debug)]
pub struct FindRateArgs {
    /// Scene file to load.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub scene: PathBuf,

    /// Relative deviation change treated as converged [default: 0.05].
    #[arg(short = 'p', long = "percent", value_name = "FRACTION")]
    pub sample_cutoff: Option<f32>,

    /// Search region shape [default: box].
    #[arg(short = 's', long = "shape", value_enum)]
    pub shape: Option<RegionShape>,

    /// Box bounds, lowest corner first.
    #[arg(
        short = 'b',
        long = "box",
        num_args = 6,
        allow_negative_numbers = true,
        value_names = ["X0", "Y0", "Z0", "X1", "Y1", "Z1"]
    )]
    pub bounds: Option<Vec<f32>>,

    /// Cylinder base center, radius and height.
    #[arg(
        short = 'c',
        long = "cylinder",
        num_args = 5,
        allow_negative_numbers = true,
        value_names = ["X", "Y", "Z", "R", "H"]
    )]
    pub cylinder: Option<Vec<f32>>,

    /// TOML file with search settings; flags take precedence over it.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Relative variance gain treated as stable by the pose search.
    #[arg(long, value_name = "FRACTION")]
    pub locator_cutoff: Option<f32>,

    /// Seed of the pose search.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Compound eye to use instead of the first one in the scene.
    #[arg(long, value_name = "NAME")]
    pub camera: Option<String>,
}

#[derive(Args, Debug)]
pub struct EyeRateArgs {
    /// Scene file to load.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub scene: PathBuf,

    /// Samples per steradian, as reported by `find-rate`.
    #[arg(short = 'n', long = "samples", value_name = "SAMPLES_PER_SR")]
    pub samples_per_steradian: u32,

    /// Only report this compound eye.
    #[arg(long, value_name = "NAME")]
    pub camera: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Scene file to load.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub scene: PathBuf,

    /// Samples per ommatidium for the second compound-eye render.
    #[arg(long, default_value_t = 64)]
    pub samples: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_rate(argv: &[&str]) -> FindRateArgs {
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        match cli.command {
            Command::FindRate(args) => args,
            other => panic!("expected find-rate, got {other:?}"),
        }
    }

    #[test]
    fn test_find_rate_minimal() {
        let args = find_rate(&["ommatidia", "find-rate", "-f", "arena.ron"]);
        assert_eq!(args.scene, PathBuf::from("arena.ron"));
        assert_eq!(args.sample_cutoff, None);
        assert_eq!(args.shape, None);
        assert!(args.bounds.is_none());
    }

    #[test]
    fn test_find_rate_box_accepts_negative_bounds() {
        let args = find_rate(&[
            "ommatidia", "find-rate", "-f", "a.ron", "-p", "0.02", "-s", "box", "-b", "-1", "-1",
            "0", "1", "1", "2",
        ]);
        assert_eq!(args.sample_cutoff, Some(0.02));
        assert_eq!(args.shape, Some(RegionShape::Box));
        assert_eq!(args.bounds, Some(vec![-1.0, -1.0, 0.0, 1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_find_rate_cylinder_and_overrides() {
        let args = find_rate(&[
            "ommatidia",
            "find-rate",
            "-f",
            "a.ron",
            "-s",
            "cylinder",
            "-c",
            "0",
            "0",
            "0",
            "2",
            "1.5",
            "--locator-cutoff",
            "0.005",
            "--seed",
            "7",
            "--camera",
            "bee-eye",
        ]);
        assert_eq!(args.shape, Some(RegionShape::Cylinder));
        assert_eq!(args.cylinder, Some(vec![0.0, 0.0, 0.0, 2.0, 1.5]));
        assert_eq!(args.locator_cutoff, Some(0.005));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.camera.as_deref(), Some("bee-eye"));
    }

    #[test]
    fn test_box_needs_six_values() {
        let result = Cli::try_parse_from([
            "ommatidia", "find-rate", "-f", "a.ron", "-b", "0", "0", "0", "1", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scene_is_required() {
        assert!(Cli::try_parse_from(["ommatidia", "find-rate"]).is_err());
    }

    #[test]
    fn test_eye_rate_and_inspect() {
        let cli = Cli::try_parse_from(["ommatidia", "-v", "eye-rate", "-f", "a.ron", "-n", "190"])
            .expect("eye-rate should parse");
        assert!(cli.verbose);
        match cli.command {
            Command::EyeRate(args) => {
                assert_eq!(args.samples_per_steradian, 190);
                assert!(args.camera.is_none());
            }
            other => panic!("expected eye-rate, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["ommatidia", "inspect", "-f", "a.ron"])
            .expect("inspect should parse");
        match cli.command {
            Command::Inspect(args) => assert_eq!(args.samples, 64),
            other => panic!("expected inspect, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
