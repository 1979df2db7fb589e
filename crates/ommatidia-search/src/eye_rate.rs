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

//! Scales a samples-per-steradian figure to the ommatidia of real eyes.
//!
//! An eye must give every ommatidium enough samples for its own cone, so
//! the widest ommatidium sets the per-ommatidium count.

use ommatidia_core::eye::max_solid_angle;
use ommatidia_core::{CameraHandle, RendererError, RendererPort};

/// The per-ommatidium sample count of one compound eye.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeSampleRate {
    /// The eye.
    pub camera: CameraHandle,
    /// Its display name.
    pub name: String,
    /// Ommatidia in the eye.
    pub ommatidia: usize,
    /// The widest ommatidial cone, in steradians.
    pub max_solid_angle: f32,
    /// Samples each ommatidium needs.
    pub samples_per_ommatidium: u32,
}

/// `ceil(samples_per_steradian × solid_angle)`, at least 1.
pub fn samples_per_ommatidium(samples_per_steradian: u32, solid_angle: f32) -> u32 {
    let scaled = (samples_per_steradian as f64 * solid_angle.max(0.0) as f64).ceil();
    if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        (scaled as u32).max(1)
    }
}

/// Computes the per-ommatidium sample count of every compound eye in the
/// scene, or only of `camera` when one is given.
///
/// Eyes without ommatidia are skipped. A named camera that is not a compound
/// eye is an error.
pub fn eye_sample_rates(
    renderer: &mut dyn RendererPort,
    samples_per_steradian: u32,
    camera: Option<CameraHandle>,
) -> Result<Vec<EyeSampleRate>, RendererError> {
    let cameras = match camera {
        Some(camera) => {
            if !renderer.is_compound_eye(camera)? {
                return Err(RendererError::NotCompoundEye(camera.0));
            }
            vec![camera]
        }
        None => renderer.list_cameras()?,
    };

    let mut rates = Vec::new();
    for camera in cameras {
        if !renderer.is_compound_eye(camera)? {
            continue;
        }
        let name = renderer.camera_name(camera)?;
        let ommatidia = renderer.ommatidia(camera)?;
        let Some(max_sr) = max_solid_angle(&ommatidia) else {
            log::warn!("Compound eye '{name}' has no ommatidia, skipping");
            continue;
        };
        let rate = EyeSampleRate {
            camera,
            name,
            ommatidia: ommatidia.len(),
            max_solid_angle: max_sr,
            samples_per_ommatidium: samples_per_ommatidium(samples_per_steradian, max_sr),
        };
        log::info!(
            "Eye '{}': widest cone {:.4} sr -> {} samples per ommatidium",
            rate.name,
            rate.max_solid_angle,
            rate.samples_per_ommatidium
        );
        rates.push(rate);
    }
    Ok(rates)
}
