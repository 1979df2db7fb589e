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

//! Camera discovery helpers.

use ommatidia_core::{CameraHandle, RendererError, RendererPort};

/// Selects and returns the first compound eye in the loaded scene.
///
/// Cameras are visited in list order; each one is selected while it is
/// inspected, so on `Ok(None)` the last camera remains selected.
pub fn find_compound_eye(
    renderer: &mut dyn RendererPort,
) -> Result<Option<CameraHandle>, RendererError> {
    for camera in renderer.list_cameras()? {
        renderer.select_camera(camera)?;
        if renderer.is_compound_eye(camera)? {
            let name = renderer.camera_name(camera)?;
            let count = renderer.ommatidia(camera)?.len();
            log::info!("Found compound eye '{name}' ({camera}) with {count} ommatidia");
            return Ok(Some(camera));
        }
    }
    log::warn!("No compound eye in the loaded scene");
    Ok(None)
}

/// Looks a camera up by its display name.
pub fn find_camera_by_name(
    renderer: &dyn RendererPort,
    name: &str,
) -> Result<Option<CameraHandle>, RendererError> {
    for camera in renderer.list_cameras()? {
        if renderer.camera_name(camera)? == name {
            return Ok(Some(camera));
        }
    }
    Ok(None)
}
