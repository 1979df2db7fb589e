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

//! Provides the bounding volumes a pose search can be confined to.
//!
//! Both volumes treat their boundary as inside, with an [`EPSILON`] tolerance so
//! that points projected onto a curved surface still test as contained.

use serde::{Deserialize, Serialize};

use super::{Vec3, EPSILON, PI};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by its
/// minimum and maximum corner points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new `Aabb` from two corner points, keeping them as given.
    ///
    /// Unlike a sorting constructor this preserves an inverted box so that
    /// validation can reject it.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the full size (width, height, depth) of the `Aabb`.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Calculates the enclosed volume. Inverted boxes report `0.0`.
    #[inline]
    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x.max(0.0) * s.y.max(0.0) * s.z.max(0.0)
    }

    /// Checks if a point is contained within or on the boundary of the `Aabb`.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x - EPSILON
            && point.x <= self.max.x + EPSILON
            && point.y >= self.min.y - EPSILON
            && point.y <= self.max.y + EPSILON
            && point.z >= self.min.z - EPSILON
            && point.z <= self.max.z + EPSILON
    }

    /// Returns the point of the `Aabb` closest to `point`.
    #[inline]
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.max(self.min).min(self.max)
    }
}

/// An upright cylinder whose axis runs along world +Y from `base_center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// The center of the bottom cap.
    pub base_center: Vec3,
    /// The radius of the cylinder.
    pub radius: f32,
    /// The height of the cylinder along +Y.
    pub height: f32,
}

impl Cylinder {
    /// Creates a new cylinder.
    #[inline]
    pub const fn new(base_center: Vec3, radius: f32, height: f32) -> Self {
        Self {
            base_center,
            radius,
            height,
        }
    }

    /// Calculates the center point of the cylinder (half way up its axis).
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.base_center + Vec3::Y * (self.height * 0.5)
    }

    /// Calculates the enclosed volume.
    #[inline]
    pub fn volume(&self) -> f32 {
        PI * self.radius * self.radius * self.height
    }

    /// Returns the size of the cylinder's bounding box.
    #[inline]
    pub fn bounding_size(&self) -> Vec3 {
        Vec3::new(2.0 * self.radius, self.height, 2.0 * self.radius)
    }

    /// Checks if a point is contained within or on the boundary of the cylinder.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = point - self.base_center;
        let radial_sq = local.x * local.x + local.z * local.z;
        let limit = self.radius + EPSILON;
        local.y >= -EPSILON && local.y <= self.height + EPSILON && radial_sq <= limit * limit
    }

    /// Returns the point of the cylinder closest to `point`.
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        let local = point - self.base_center;
        let y = local.y.clamp(0.0, self.height);
        let radial = (local.x * local.x + local.z * local.z).sqrt();
        let (x, z) = if radial > self.radius && radial > 0.0 {
            let scale = self.radius / radial;
            (local.x * scale, local.z * scale)
        } else {
            (local.x, local.z)
        };
        self.base_center + Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_new_keeps_inverted_box() {
        let aabb = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(aabb.min, Vec3::ONE);
        assert_eq!(aabb.volume(), 0.0);
    }

    #[test]
    fn test_aabb_center_size_volume() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 1.5, 2.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(aabb.volume(), 24.0);
    }

    #[test]
    fn test_aabb_clamp_and_contains() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let outside = Vec3::new(2.0, -1.0, 0.5);
        assert!(!aabb.contains_point(outside));
        let clamped = aabb.clamp_point(outside);
        assert_eq!(clamped, Vec3::new(1.0, 0.0, 0.5));
        assert!(aabb.contains_point(clamped));
        assert!(aabb.contains_point(Vec3::ONE)); // Boundary counts as inside
    }

    #[test]
    fn test_cylinder_center_and_volume() {
        let c = Cylinder::new(Vec3::new(1.0, 0.0, 1.0), 2.0, 4.0);
        assert_eq!(c.center(), Vec3::new(1.0, 2.0, 1.0));
        assert_relative_eq!(c.volume(), PI * 16.0, epsilon = 1e-4);
        assert_eq!(c.bounding_size(), Vec3::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn test_cylinder_clamp_projects_onto_surface() {
        let c = Cylinder::new(Vec3::ZERO, 1.0, 2.0);
        let p = c.clamp_point(Vec3::new(3.0, 5.0, 4.0));
        assert_relative_eq!((p.x * p.x + p.z * p.z).sqrt(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(p.y, 2.0);
        assert!(c.contains_point(p));

        let inside = Vec3::new(0.2, 1.0, -0.3);
        assert_eq!(c.clamp_point(inside), inside);
        assert!(!c.contains_point(Vec3::new(0.0, -0.5, 0.0)));
    }
}
