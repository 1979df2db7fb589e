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

use std::fmt::{self, Debug};
use std::path::Path;
use std::time::Duration;

use super::error::RendererError;
use crate::eye::Ommatidium;
use crate::math::{LinearRgba, Vec3};
use crate::pose::Pose;

/// An opaque index into the loaded scene's camera list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraHandle(pub usize);

impl fmt::Display for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The contract between the search engine and a compound-eye renderer.
///
/// The engine owns the renderer exclusively for a run (`&mut dyn RendererPort`)
/// and drives it synchronously: configure the selected eye, place it, render,
/// then read one color back per ommatidium. Values are reported in the same
/// order as [`RendererPort::ommatidia`].
pub trait RendererPort: Debug {
    /// Loads a scene file, replacing any previously loaded scene.
    fn load_scene(&mut self, path: &Path) -> Result<(), RendererError>;

    /// Lists every camera in the loaded scene.
    fn list_cameras(&self) -> Result<Vec<CameraHandle>, RendererError>;

    /// Makes `camera` the target of subsequent configure and render calls.
    fn select_camera(&mut self, camera: CameraHandle) -> Result<(), RendererError>;

    /// Returns the display name of `camera`.
    fn camera_name(&self, camera: CameraHandle) -> Result<String, RendererError>;

    /// Returns whether `camera` is a compound eye.
    fn is_compound_eye(&self, camera: CameraHandle) -> Result<bool, RendererError>;

    /// Returns the ommatidia of `camera`, in the eye's local frame.
    fn ommatidia(&self, camera: CameraHandle) -> Result<Vec<Ommatidium>, RendererError>;

    /// Returns the viewing directions of `camera`'s ommatidia.
    fn ommatidial_directions(&self, camera: CameraHandle) -> Result<Vec<Vec3>, RendererError> {
        Ok(self
            .ommatidia(camera)?
            .into_iter()
            .map(|o| o.direction)
            .collect())
    }

    /// Replaces the ommatidia of the selected compound eye.
    fn set_ommatidia(&mut self, ommatidia: &[Ommatidium]) -> Result<(), RendererError>;

    /// Moves the selected camera.
    fn set_pose(&mut self, pose: Pose) -> Result<(), RendererError>;

    /// Sets how many samples each ommatidium averages per render.
    fn set_samples_per_ommatidium(&mut self, samples: u32) -> Result<(), RendererError>;

    /// Renders one frame with the selected camera and returns the time it took.
    fn render(&mut self) -> Result<Duration, RendererError>;

    /// Returns the colors produced by the last render, one per ommatidium.
    fn ommatidial_values(&self) -> Result<Vec<LinearRgba>, RendererError>;
}
