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

//! Subcommand implementations.

pub mod eye_rate;
pub mod find_rate;
pub mod inspect;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use ommatidia_core::{CameraHandle, RendererPort};
use ommatidia_infra::SyntheticRenderer;
use ommatidia_search::{find_camera_by_name, find_compound_eye, AbortKind};

/// How a command that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every search phase converged, or there was nothing to search.
    Converged,
    /// A search phase stopped early.
    Aborted(AbortKind),
}

impl Outcome {
    /// `0` when converged, `2` when a search aborted.
    pub fn code(self) -> u8 {
        match self {
            Outcome::Converged => 0,
            Outcome::Aborted(_) => 2,
        }
    }

    /// The process exit status for this outcome.
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Creates a renderer with the scene at `path` loaded.
pub fn load_scene(path: &Path) -> Result<SyntheticRenderer> {
    let mut renderer = SyntheticRenderer::new();
    renderer
        .load_scene(path)
        .with_context(|| format!("Failed to load scene {}", path.display()))?;
    Ok(renderer)
}

/// Picks the compound eye named `name`, or the first one in the scene.
///
/// The chosen camera is left selected.
pub fn select_eye(renderer: &mut dyn RendererPort, name: Option<&str>) -> Result<CameraHandle> {
    let camera = match name {
        Some(name) => {
            let Some(camera) = find_camera_by_name(renderer, name)? else {
                bail!("No camera named '{name}' in the scene");
            };
            if !renderer.is_compound_eye(camera)? {
                bail!("Camera '{name}' is not a compound eye");
            }
            renderer.select_camera(camera)?;
            camera
        }
        None => match find_compound_eye(renderer)? {
            Some(camera) => camera,
            None => bail!("The scene has no compound eye"),
        },
    };
    Ok(camera)
}
