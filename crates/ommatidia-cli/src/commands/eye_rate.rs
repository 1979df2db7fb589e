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

//! `eye-rate`: per-ommatidium sample counts for a known steradian rate.

use anyhow::{bail, Result};
use ommatidia_search::{eye_sample_rates, find_camera_by_name};

use super::Outcome;
use crate::cli::EyeRateArgs;

pub fn run(args: &EyeRateArgs) -> Result<Outcome> {
    let mut renderer = super::load_scene(&args.scene)?;
    let camera = match args.camera.as_deref() {
        Some(name) => match find_camera_by_name(&renderer, name)? {
            Some(camera) => Some(camera),
            None => bail!("No camera named '{name}' in the scene"),
        },
        None => None,
    };

    let rates = eye_sample_rates(&mut renderer, args.samples_per_steradian, camera)?;
    if rates.is_empty() {
        log::warn!("No compound eye with ommatidia in {}", args.scene.display());
    }
    for rate in &rates {
        println!(
            "{}: {} ommatidia, widest cone {:.4} sr, {} samples per ommatidium",
            rate.name, rate.ommatidia, rate.max_solid_angle, rate.samples_per_ommatidium
        );
    }
    Ok(Outcome::Converged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn demo_scene() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/arena.ron")
    }

    #[test]
    fn test_eye_rate_for_all_eyes() {
        let args = EyeRateArgs {
            scene: demo_scene(),
            samples_per_steradian: 190,
            camera: None,
        };
        assert_eq!(run(&args).unwrap(), Outcome::Converged);
    }

    #[test]
    fn test_eye_rate_rejects_unknown_and_perspective_cameras() {
        for name in ["missing", "overview"] {
            let args = EyeRateArgs {
                scene: demo_scene(),
                samples_per_steradian: 190,
                camera: Some(name.to_string()),
            };
            assert!(run(&args).is_err(), "'{name}' should be rejected");
        }
    }
}
