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

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use ommatidia_core::math::{LinearRgba, Vec3, PI, TAU};
use ommatidia_core::{CameraHandle, Isosphere, Ommatidium, Pose, RendererError, RendererPort};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::scene::{Arena, CameraKind, SceneError, SyntheticScene};

#[derive(Debug)]
enum Optics {
    Perspective { fov: f32, width: u32, height: u32 },
    Compound { ommatidia: Vec<Ommatidium> },
}

#[derive(Debug)]
struct LiveCamera {
    name: String,
    pose: Pose,
    optics: Optics,
}

#[derive(Debug)]
struct LoadedScene {
    arena: Arena,
    noise: f32,
    cameras: Vec<LiveCamera>,
}

impl LoadedScene {
    fn camera(&self, handle: CameraHandle) -> Result<&LiveCamera, RendererError> {
        self.cameras
            .get(handle.0)
            .ok_or(RendererError::UnknownCamera(handle.0))
    }
}

/// A CPU renderer for [`SyntheticScene`]s.
///
/// Every ommatidium averages `samples` rays drawn uniformly from its cone,
/// then gets the scene's per-render noise added. All randomness comes from a
/// generator seeded by the scene, so a given call sequence always produces
/// the same values.
#[derive(Debug)]
pub struct SyntheticRenderer {
    scene: Option<LoadedScene>,
    selected: Option<CameraHandle>,
    samples: u32,
    rng: StdRng,
    values: Vec<LinearRgba>,
    frame_luminance: Option<f32>,
}

impl Default for SyntheticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticRenderer {
    /// Creates a renderer with no scene loaded.
    pub fn new() -> Self {
        Self {
            scene: None,
            selected: None,
            samples: 1,
            rng: StdRng::seed_from_u64(0),
            values: Vec::new(),
            frame_luminance: None,
        }
    }

    /// Creates a renderer with `scene` already loaded.
    pub fn from_scene(scene: SyntheticScene) -> Result<Self, SceneError> {
        scene.validate()?;
        let mut renderer = Self::new();
        renderer.install(scene);
        Ok(renderer)
    }

    /// Mean luminance of the last frame, for either camera kind.
    pub fn last_frame_luminance(&self) -> Option<f32> {
        self.frame_luminance
    }

    /// Current samples per ommatidium (or per pixel).
    pub fn samples_per_ommatidium(&self) -> u32 {
        self.samples
    }

    fn install(&mut self, scene: SyntheticScene) {
        let cameras = scene
            .cameras
            .into_iter()
            .map(|def| {
                let optics = match def.kind {
                    CameraKind::Perspective {
                        fov_deg,
                        width,
                        height,
                    } => Optics::Perspective {
                        fov: fov_deg.to_radians(),
                        width,
                        height,
                    },
                    CameraKind::Compound {
                        subdivisions,
                        acceptance_angle_deg,
                    } => {
                        let angle = acceptance_angle_deg.to_radians();
                        let ommatidia = Isosphere::new(subdivisions)
                            .directions()
                            .iter()
                            .map(|&d| Ommatidium::new(d, angle))
                            .collect();
                        Optics::Compound { ommatidia }
                    }
                };
                LiveCamera {
                    name: def.name,
                    pose: def.pose,
                    optics,
                }
            })
            .collect();

        self.scene = Some(LoadedScene {
            arena: scene.arena,
            noise: scene.noise,
            cameras,
        });
        self.rng = StdRng::seed_from_u64(scene.seed);
        self.selected = None;
        self.values.clear();
        self.frame_luminance = None;
    }

    fn scene(&self) -> Result<&LoadedScene, RendererError> {
        self.scene.as_ref().ok_or(RendererError::NoScene)
    }

    fn selected_mut(&mut self) -> Result<&mut LiveCamera, RendererError> {
        let handle = self
            .selected
            .ok_or_else(|| RendererError::InvalidArgument("no camera selected".to_string()))?;
        let scene = self.scene.as_mut().ok_or(RendererError::NoScene)?;
        scene
            .cameras
            .get_mut(handle.0)
            .ok_or(RendererError::UnknownCamera(handle.0))
    }
}

impl RendererPort for SyntheticRenderer {
    fn load_scene(&mut self, path: &Path) -> Result<(), RendererError> {
        let load_error = |reason: String| RendererError::SceneLoad {
            path: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let scene = SyntheticScene::from_ron(&text).map_err(|e| load_error(e.to_string()))?;
        log::info!(
            "Loaded synthetic scene '{}' with {} cameras",
            path.display(),
            scene.cameras.len()
        );
        self.install(scene);
        Ok(())
    }

    fn list_cameras(&self) -> Result<Vec<CameraHandle>, RendererError> {
        Ok((0..self.scene()?.cameras.len()).map(CameraHandle).collect())
    }

    fn select_camera(&mut self, camera: CameraHandle) -> Result<(), RendererError> {
        self.scene()?.camera(camera)?;
        if self.selected != Some(camera) {
            self.values.clear();
        }
        self.selected = Some(camera);
        Ok(())
    }

    fn camera_name(&self, camera: CameraHandle) -> Result<String, RendererError> {
        Ok(self.scene()?.camera(camera)?.name.clone())
    }

    fn is_compound_eye(&self, camera: CameraHandle) -> Result<bool, RendererError> {
        Ok(matches!(
            self.scene()?.camera(camera)?.optics,
            Optics::Compound { .. }
        ))
    }

    fn ommatidia(&self, camera: CameraHandle) -> Result<Vec<Ommatidium>, RendererError> {
        match &self.scene()?.camera(camera)?.optics {
            Optics::Compound { ommatidia } => Ok(ommatidia.clone()),
            Optics::Perspective { .. } => Err(RendererError::NotCompoundEye(camera.0)),
        }
    }

    fn set_ommatidia(&mut self, ommatidia: &[Ommatidium]) -> Result<(), RendererError> {
        let handle = self.selected;
        let camera = self.selected_mut()?;
        match &mut camera.optics {
            Optics::Compound { ommatidia: current } => {
                *current = ommatidia.to_vec();
            }
            Optics::Perspective { .. } => {
                return Err(RendererError::NotCompoundEye(handle.map_or(0, |h| h.0)));
            }
        }
        log::debug!("Eye '{}' now has {} ommatidia", camera.name, ommatidia.len());
        self.values.clear();
        Ok(())
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), RendererError> {
        self.selected_mut()?.pose = pose;
        Ok(())
    }

    fn set_samples_per_ommatidium(&mut self, samples: u32) -> Result<(), RendererError> {
        if samples == 0 {
            return Err(RendererError::InvalidArgument(
                "samples per ommatidium must be at least 1".to_string(),
            ));
        }
        self.samples = samples;
        Ok(())
    }

    fn render(&mut self) -> Result<Duration, RendererError> {
        let started = Instant::now();
        let handle = self
            .selected
            .ok_or_else(|| RendererError::InvalidArgument("no camera selected".to_string()))?;
        let Self {
            scene,
            samples,
            rng,
            values,
            frame_luminance,
            ..
        } = self;
        let scene = scene.as_ref().ok_or(RendererError::NoScene)?;
        let camera = scene.camera(handle)?;
        let origin = camera.pose.position;

        match &camera.optics {
            Optics::Compound { ommatidia } => {
                values.clear();
                values.extend(ommatidia.iter().map(|o| {
                    let axis = camera.pose.to_world(o.direction).normalize();
                    let half_angle = (o.acceptance_angle * 0.5).clamp(0.0, PI);
                    let mean = sample_cone(&scene.arena, origin, axis, half_angle, *samples, rng);
                    add_noise(mean, scene.noise, rng)
                }));
                *frame_luminance = mean_luminance(values.iter());
            }
            Optics::Perspective { fov, width, height } => {
                let tan = (fov * 0.5).tan();
                let aspect = *width as f32 / *height as f32;
                let mut pixels = Vec::with_capacity((*width * *height) as usize);
                for y in 0..*height {
                    for x in 0..*width {
                        let px = ((x as f32 + 0.5) / *width as f32 * 2.0 - 1.0) * tan * aspect;
                        let py = (1.0 - (y as f32 + 0.5) / *height as f32 * 2.0) * tan;
                        let dir = camera.pose.to_world(Vec3::new(px, py, -1.0)).normalize();
                        let color = scene.arena.shade(origin, dir);
                        pixels.push(add_noise(color, scene.noise, rng));
                    }
                }
                values.clear();
                *frame_luminance = mean_luminance(pixels.iter());
            }
        }

        let elapsed = started.elapsed();
        log::trace!("Rendered '{}' in {:?}", camera.name, elapsed);
        Ok(elapsed)
    }

    fn ommatidial_values(&self) -> Result<Vec<LinearRgba>, RendererError> {
        let handle = self
            .selected
            .ok_or_else(|| RendererError::InvalidArgument("no camera selected".to_string()))?;
        match self.scene()?.camera(handle)?.optics {
            Optics::Compound { .. } => Ok(self.values.clone()),
            Optics::Perspective { .. } => Err(RendererError::NotCompoundEye(handle.0)),
        }
    }
}

/// Averages `samples` rays drawn uniformly (by solid angle) from a cone.
fn sample_cone(
    arena: &Arena,
    origin: Vec3,
    axis: Vec3,
    half_angle: f32,
    samples: u32,
    rng: &mut StdRng,
) -> LinearRgba {
    let u = axis.any_orthonormal();
    let v = axis.cross(u);
    let cos_max = half_angle.cos();

    let mut sum = LinearRgba::new(0.0, 0.0, 0.0, 0.0);
    for _ in 0..samples {
        let cos_t = 1.0 - rng.gen::<f32>() * (1.0 - cos_max);
        let sin_t = (1.0 - cos_t * cos_t).max(0.0).sqrt();
        let phi = rng.gen_range(0.0..TAU);
        let dir = u * (sin_t * phi.cos()) + v * (sin_t * phi.sin()) + axis * cos_t;
        sum = sum + arena.shade(origin, dir);
    }
    sum / samples.max(1) as f32
}

/// Adds the same zero-mean uniform offset with deviation `sigma` to each channel.
fn add_noise(color: LinearRgba, sigma: f32, rng: &mut StdRng) -> LinearRgba {
    if sigma <= 0.0 {
        return color;
    }
    let offset = rng.gen_range(-1.0f32..=1.0) * sigma * 3.0f32.sqrt();
    LinearRgba::new(color.r + offset, color.g + offset, color.b + offset, color.a)
}

fn mean_luminance<'a>(colors: impl ExactSizeIterator<Item = &'a LinearRgba>) -> Option<f32> {
    let n = colors.len();
    if n == 0 {
        return None;
    }
    Some(colors.map(LinearRgba::luminance).sum::<f32>() / n as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::scene::CameraDefinition;
    use approx::assert_relative_eq;

    fn scene(noise: f32) -> SyntheticScene {
        SyntheticScene {
            noise,
            cameras: vec![
                CameraDefinition {
                    name: "overview".to_string(),
                    pose: Pose::at(Vec3::new(0.0, 1.5, 0.0)),
                    kind: CameraKind::Perspective {
                        fov_deg: 60.0,
                        width: 8,
                        height: 6,
                    },
                },
                CameraDefinition {
                    name: "eye".to_string(),
                    pose: Pose::at(Vec3::new(0.0, 1.5, 0.0)),
                    kind: CameraKind::Compound {
                        subdivisions: 1,
                        acceptance_angle_deg: 10.0,
                    },
                },
            ],
            ..SyntheticScene::default()
        }
    }

    fn std_dev(values: &[f32]) -> f32 {
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / (n - 1.0)).sqrt()
    }

    #[test]
    fn test_camera_listing() {
        let renderer = SyntheticRenderer::from_scene(scene(0.0)).unwrap();
        let cameras = renderer.list_cameras().unwrap();
        assert_eq!(cameras, vec![CameraHandle(0), CameraHandle(1)]);
        assert!(!renderer.is_compound_eye(CameraHandle(0)).unwrap());
        assert!(renderer.is_compound_eye(CameraHandle(1)).unwrap());
        assert_eq!(renderer.camera_name(CameraHandle(1)).unwrap(), "eye");
        assert_eq!(renderer.ommatidia(CameraHandle(1)).unwrap().len(), 42);
        assert_eq!(
            renderer.ommatidial_directions(CameraHandle(1)).unwrap().len(),
            42
        );
    }

    #[test]
    fn test_errors_without_scene_or_camera() {
        let mut renderer = SyntheticRenderer::new();
        assert_eq!(renderer.list_cameras(), Err(RendererError::NoScene));
        assert!(renderer.render().is_err());

        let mut renderer = SyntheticRenderer::from_scene(scene(0.0)).unwrap();
        assert_eq!(
            renderer.select_camera(CameraHandle(7)),
            Err(RendererError::UnknownCamera(7))
        );
        assert!(matches!(
            renderer.set_samples_per_ommatidium(0),
            Err(RendererError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_scene_file_is_scene_load_error() {
        let mut renderer = SyntheticRenderer::new();
        let err = renderer
            .load_scene(Path::new("/definitely/not/here.ron"))
            .unwrap_err();
        assert!(matches!(err, RendererError::SceneLoad { .. }));
    }

    #[test]
    fn test_compound_render_returns_one_value_per_ommatidium() {
        let mut renderer = SyntheticRenderer::from_scene(scene(0.0)).unwrap();
        renderer.select_camera(CameraHandle(1)).unwrap();
        renderer.render().unwrap();
        assert_eq!(renderer.ommatidial_values().unwrap().len(), 42);

        let single = [Ommatidium::with_solid_angle(Vec3::Y, 0.01)];
        renderer.set_ommatidia(&single).unwrap();
        renderer.render().unwrap();
        let values = renderer.ommatidial_values().unwrap();
        assert_eq!(values.len(), 1);
        // A narrow cone straight up sees only sky.
        assert_relative_eq!(
            values[0].luminance(),
            Arena::default().sky.luminance(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_perspective_render_has_no_ommatidial_values() {
        let mut renderer = SyntheticRenderer::from_scene(scene(0.0)).unwrap();
        renderer.select_camera(CameraHandle(0)).unwrap();
        renderer.render().unwrap();
        assert!(renderer.last_frame_luminance().is_some());
        assert_eq!(
            renderer.ommatidial_values(),
            Err(RendererError::NotCompoundEye(0))
        );
        assert!(renderer.set_ommatidia(&[]).is_err());
    }

    #[test]
    fn test_same_seed_renders_same_values() {
        let render = || {
            let mut renderer = SyntheticRenderer::from_scene(scene(0.05)).unwrap();
            renderer.select_camera(CameraHandle(1)).unwrap();
            renderer.set_samples_per_ommatidium(4).unwrap();
            renderer.render().unwrap();
            renderer.ommatidial_values().unwrap()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_more_samples_reduce_spread() {
        let mut renderer = SyntheticRenderer::from_scene(scene(0.0)).unwrap();
        renderer.select_camera(CameraHandle(1)).unwrap();
        // A wide cone aimed at the wall covers several stripes.
        renderer
            .set_ommatidia(&[Ommatidium::with_solid_angle(Vec3::X, 1.0)])
            .unwrap();

        let mut spread = |samples: u32| {
            renderer.set_samples_per_ommatidium(samples).unwrap();
            let lum: Vec<f32> = (0..32)
                .map(|_| {
                    renderer.render().unwrap();
                    renderer.ommatidial_values().unwrap()[0].luminance()
                })
                .collect();
            std_dev(&lum)
        };
        let coarse = spread(1);
        let fine = spread(256);
        assert!(fine < coarse * 0.5, "coarse {coarse}, fine {fine}");
    }

    #[test]
    fn test_noise_has_requested_deviation() {
        let mut renderer = SyntheticRenderer::from_scene(scene(0.1)).unwrap();
        renderer.select_camera(CameraHandle(1)).unwrap();
        renderer
            .set_ommatidia(&[Ommatidium::with_solid_angle(Vec3::Y, 0.01)])
            .unwrap();
        let lum: Vec<f32> = (0..2000)
            .map(|_| {
                renderer.render().unwrap();
                renderer.ommatidial_values().unwrap()[0].luminance()
            })
            .collect();
        assert_relative_eq!(std_dev(&lum), 0.1, epsilon = 0.01);
    }
}
