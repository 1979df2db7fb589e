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

//! The RON scene format of the synthetic renderer.
//!
//! A scene is a vertical cylindrical wall centred on the world Y axis,
//! painted as a checkerboard of azimuthal stripes and horizontal rings,
//! with a sky above it and a floor below. Rays are shaded analytically.

use std::collections::HashSet;
use std::fmt;

use ommatidia_core::math::{LinearRgba, Vec3, PI, TAU};
use ommatidia_core::Pose;
use serde::{Deserialize, Serialize};

/// Why a synthetic scene could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The text is not valid RON for a scene.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Parse(msg) => write!(f, "parse error: {msg}"),
            SceneError::Invalid(msg) => write!(f, "invalid scene: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// The painted wall, sky and floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    /// Wall radius around the Y axis.
    pub radius: f32,
    /// Wall height above the floor (`y = 0`).
    pub height: f32,
    /// Number of azimuthal stripes.
    pub stripes: u32,
    /// Number of horizontal rings.
    pub rings: u32,
    /// The two checker colors.
    pub palette: [LinearRgba; 2],
    /// Color of rays leaving over the wall.
    pub sky: LinearRgba,
    /// Color of rays hitting the floor.
    pub ground: LinearRgba,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            radius: 5.0,
            height: 3.0,
            stripes: 24,
            rings: 6,
            palette: [LinearRgba::gray(0.9), LinearRgba::gray(0.1)],
            sky: LinearRgba::rgb(0.55, 0.7, 0.95),
            ground: LinearRgba::rgb(0.3, 0.25, 0.2),
        }
    }
}

impl Arena {
    /// Shades a ray starting at `origin` travelling along unit `direction`.
    pub fn shade(&self, origin: Vec3, direction: Vec3) -> LinearRgba {
        let open = if direction.y >= 0.0 { self.sky } else { self.ground };

        // |(o + t·d).xz|² = r²
        let a = direction.x * direction.x + direction.z * direction.z;
        if a < 1e-12 {
            return open;
        }
        let b = 2.0 * (origin.x * direction.x + origin.z * direction.z);
        let c = origin.x * origin.x + origin.z * origin.z - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return open;
        }
        let t = (-b + disc.sqrt()) / (2.0 * a);
        if t < 0.0 {
            return open;
        }

        let hit = origin + direction * t;
        if hit.y > self.height {
            return self.sky;
        }
        if hit.y < 0.0 {
            return self.ground;
        }

        let azimuth = (hit.z.atan2(hit.x) + PI) / TAU;
        let stripe = ((azimuth * self.stripes as f32) as u32).min(self.stripes - 1);
        let ring = ((hit.y / self.height * self.rings as f32) as u32).min(self.rings - 1);
        self.palette[((stripe + ring) % 2) as usize]
    }
}

/// What kind of camera a scene entry describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraKind {
    /// A pinhole camera looking down its local -Z axis.
    Perspective {
        /// Vertical field of view, in degrees.
        fov_deg: f32,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// A compound eye whose ommatidia sit on an isosphere.
    Compound {
        /// Isosphere subdivision level.
        subdivisions: u32,
        /// Full cone angle of every ommatidium, in degrees.
        acceptance_angle_deg: f32,
    },
}

/// A named camera and its initial pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDefinition {
    /// Display name.
    pub name: String,
    /// Initial pose.
    #[serde(default)]
    pub pose: Pose,
    /// Camera type and its parameters.
    pub kind: CameraKind,
}

/// A complete synthetic scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticScene {
    /// The painted environment.
    pub arena: Arena,
    /// Standard deviation of the uniform noise added to every value per render.
    pub noise: f32,
    /// Seed of the sampling and noise generator.
    pub seed: u64,
    /// Cameras, in handle order.
    pub cameras: Vec<CameraDefinition>,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            noise: 0.01,
            seed: 0x0CE11,
            cameras: Vec::new(),
        }
    }
}

impl SyntheticScene {
    /// Parses and validates a scene from RON text.
    pub fn from_ron(text: &str) -> Result<Self, SceneError> {
        let scene: SyntheticScene =
            ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Serializes the scene as pretty RON.
    pub fn to_ron(&self) -> Result<String, SceneError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Checks value ranges and camera name uniqueness.
    pub fn validate(&self) -> Result<(), SceneError> {
        let arena = &self.arena;
        if !(arena.radius > 0.0 && arena.radius.is_finite()) {
            return Err(SceneError::Invalid(format!(
                "arena radius must be positive (got {})",
                arena.radius
            )));
        }
        if !(arena.height > 0.0 && arena.height.is_finite()) {
            return Err(SceneError::Invalid(format!(
                "arena height must be positive (got {})",
                arena.height
            )));
        }
        if arena.stripes == 0 || arena.rings == 0 {
            return Err(SceneError::Invalid(
                "arena needs at least one stripe and one ring".to_string(),
            ));
        }
        if !(self.noise >= 0.0 && self.noise.is_finite()) {
            return Err(SceneError::Invalid(format!(
                "noise must be non-negative (got {})",
                self.noise
            )));
        }

        let mut names = HashSet::new();
        for camera in &self.cameras {
            if !names.insert(camera.name.as_str()) {
                return Err(SceneError::Invalid(format!(
                    "duplicate camera name '{}'",
                    camera.name
                )));
            }
            match camera.kind {
                CameraKind::Perspective {
                    fov_deg,
                    width,
                    height,
                } => {
                    if !(fov_deg > 0.0 && fov_deg < 180.0) || width == 0 || height == 0 {
                        return Err(SceneError::Invalid(format!(
                            "camera '{}' has an unusable projection",
                            camera.name
                        )));
                    }
                }
                CameraKind::Compound {
                    acceptance_angle_deg,
                    ..
                } => {
                    if !(acceptance_angle_deg > 0.0 && acceptance_angle_deg <= 360.0) {
                        return Err(SceneError::Invalid(format!(
                            "camera '{}' acceptance angle must be in (0, 360] degrees",
                            camera.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../../../demos/arena.ron");

    #[test]
    fn test_demo_scene_parses() {
        let scene = SyntheticScene::from_ron(DEMO).unwrap();
        assert!(scene
            .cameras
            .iter()
            .any(|c| matches!(c.kind, CameraKind::Compound { .. })));
    }

    #[test]
    fn test_ron_round_trip_keeps_cameras() {
        let scene = SyntheticScene::from_ron(DEMO).unwrap();
        let again = SyntheticScene::from_ron(&scene.to_ron().unwrap()).unwrap();
        assert_eq!(scene, again);
    }

    #[test]
    fn test_default_scene_round_trips_through_ron() {
        let scene = SyntheticScene {
            cameras: vec![CameraDefinition {
                name: "eye".to_string(),
                pose: Pose::at(Vec3::new(0.0, 1.0, 0.0)),
                kind: CameraKind::Compound {
                    subdivisions: 1,
                    acceptance_angle_deg: 12.0,
                },
            }],
            ..SyntheticScene::default()
        };

        let text = scene.to_ron().unwrap();
        let again = SyntheticScene::from_ron(&text)
            .unwrap_or_else(|e| panic!("serialized scene should parse back: {e}\n{text}"));

        assert_eq!(scene, again);
    }

    #[test]
    fn test_palette_is_written_as_a_tuple() {
        let text = "(arena: (palette: ((r: 1.0, g: 0.0, b: 0.0), (r: 0.0, g: 0.0, b: 1.0))))";
        let scene = SyntheticScene::from_ron(text).unwrap();
        assert_eq!(scene.arena.palette[0], LinearRgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(scene.arena.palette[1], LinearRgba::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            SyntheticScene::from_ron("(arena: oops)"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_camera_names_are_rejected() {
        let camera = CameraDefinition {
            name: "eye".to_string(),
            pose: Pose::default(),
            kind: CameraKind::Compound {
                subdivisions: 0,
                acceptance_angle_deg: 10.0,
            },
        };
        let scene = SyntheticScene {
            cameras: vec![camera.clone(), camera],
            ..SyntheticScene::default()
        };
        assert!(matches!(scene.validate(), Err(SceneError::Invalid(_))));
    }

    #[test]
    fn test_shading_regions() {
        let arena = Arena::default();
        let origin = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(arena.shade(origin, Vec3::Y), arena.sky);
        assert_eq!(arena.shade(origin, -Vec3::Y), arena.ground);
        let wall = arena.shade(origin, Vec3::X);
        assert!(wall == arena.palette[0] || wall == arena.palette[1]);
    }

    #[test]
    fn test_adjacent_stripes_alternate() {
        let arena = Arena {
            stripes: 4,
            rings: 1,
            ..Arena::default()
        };
        let origin = Vec3::new(0.0, 1.5, 0.0);
        let a = arena.shade(origin, Vec3::new(1.0, 0.0, 0.2).normalize());
        let b = arena.shade(origin, Vec3::new(-1.0, 0.0, 0.2).normalize());
        assert_ne!(a, b);
    }
}
