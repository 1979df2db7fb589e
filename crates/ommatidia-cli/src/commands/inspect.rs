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

//! `inspect`: render every camera of a scene once and report on it.

use anyhow::{Context, Result};
use ommatidia_core::RendererPort;
use ommatidia_infra::SyntheticRenderer;

use super::Outcome;
use crate::cli::InspectArgs;

pub fn run(args: &InspectArgs) -> Result<Outcome> {
    let mut renderer = super::load_scene(&args.scene)?;
    let cameras = renderer.list_cameras()?;
    println!("{} cameras in {}", cameras.len(), args.scene.display());

    for camera in cameras {
        let name = renderer.camera_name(camera)?;
        renderer.select_camera(camera)?;
        let compound = renderer.is_compound_eye(camera)?;
        let kind = if compound { "compound eye" } else { "perspective" };
        println!("{camera} '{name}' ({kind})");
        render_and_report(&mut renderer, &name)?;

        if compound {
            let count = renderer.ommatidia(camera)?.len();
            println!("  {count} ommatidia");
            change_samples(&mut renderer, args.samples)?;
            render_and_report(&mut renderer, &name)?;
            renderer.set_samples_per_ommatidium(1)?;
        }
    }
    Ok(Outcome::Converged)
}

/// Sets the sample count, then issues the discarded render that reseeds the
/// sampler for the new count.
fn change_samples(renderer: &mut dyn RendererPort, samples: u32) -> Result<()> {
    renderer.set_samples_per_ommatidium(samples)?;
    let elapsed = renderer.render().context("Reseed render failed")?;
    log::debug!("Reseed render at {samples} samples took {elapsed:?}");
    Ok(())
}

fn render_and_report(renderer: &mut SyntheticRenderer, name: &str) -> Result<()> {
    let elapsed = renderer
        .render()
        .with_context(|| format!("Failed to render camera '{name}'"))?;
    let luminance = renderer.last_frame_luminance().unwrap_or(0.0);
    println!(
        "  {} samples: rendered in {:.3} ms, mean luminance {:.4}",
        renderer.samples_per_ommatidium(),
        elapsed.as_secs_f64() * 1000.0,
        luminance
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ommatidia_core::math::LinearRgba;
    use ommatidia_core::{CameraHandle, Ommatidium, Pose, RendererError};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn demo_scene() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/arena.ron")
    }

    /// Forwards to a synthetic renderer and counts renders.
    #[derive(Debug)]
    struct CountingRenderer {
        inner: SyntheticRenderer,
        renders: u32,
    }

    impl RendererPort for CountingRenderer {
        fn load_scene(&mut self, path: &Path) -> Result<(), RendererError> {
            self.inner.load_scene(path)
        }
        fn list_cameras(&self) -> Result<Vec<CameraHandle>, RendererError> {
            self.inner.list_cameras()
        }
        fn select_camera(&mut self, camera: CameraHandle) -> Result<(), RendererError> {
            self.inner.select_camera(camera)
        }
        fn camera_name(&self, camera: CameraHandle) -> Result<String, RendererError> {
            self.inner.camera_name(camera)
        }
        fn is_compound_eye(&self, camera: CameraHandle) -> Result<bool, RendererError> {
            self.inner.is_compound_eye(camera)
        }
        fn ommatidia(&self, camera: CameraHandle) -> Result<Vec<Ommatidium>, RendererError> {
            self.inner.ommatidia(camera)
        }
        fn set_ommatidia(&mut self, ommatidia: &[Ommatidium]) -> Result<(), RendererError> {
            self.inner.set_ommatidia(ommatidia)
        }
        fn set_pose(&mut self, pose: Pose) -> Result<(), RendererError> {
            self.inner.set_pose(pose)
        }
        fn set_samples_per_ommatidium(&mut self, samples: u32) -> Result<(), RendererError> {
            self.inner.set_samples_per_ommatidium(samples)
        }
        fn render(&mut self) -> Result<Duration, RendererError> {
            self.renders += 1;
            self.inner.render()
        }
        fn ommatidial_values(&self) -> Result<Vec<LinearRgba>, RendererError> {
            self.inner.ommatidial_values()
        }
    }

    #[test]
    fn test_changing_samples_issues_one_reseed_render() {
        let mut renderer = CountingRenderer {
            inner: super::super::load_scene(&demo_scene()).unwrap(),
            renders: 0,
        };
        let eye = renderer
            .list_cameras()
            .unwrap()
            .into_iter()
            .find(|&c| renderer.is_compound_eye(c).unwrap())
            .expect("the demo scene has a compound eye");
        renderer.select_camera(eye).unwrap();

        change_samples(&mut renderer, 16).unwrap();

        assert_eq!(renderer.renders, 1);
        assert_eq!(renderer.inner.samples_per_ommatidium(), 16);
        assert!(!renderer.ommatidial_values().unwrap().is_empty());
    }

    #[test]
    fn test_reseed_render_failure_is_reported() {
        let mut renderer = SyntheticRenderer::new();
        assert!(change_samples(&mut renderer, 4).is_err(), "no scene, nothing to render");
    }

    #[test]
    fn test_inspect_demo_scene() {
        let args = InspectArgs {
            scene: demo_scene(),
            samples: 4,
        };
        assert_eq!(run(&args).unwrap(), Outcome::Converged);
    }
}
