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

//! Eye placement: a position plus a unit orientation.

use serde::{Deserialize, Serialize};

use crate::math::{Quaternion, Vec3};

/// The position and heading of an eye in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position of the eye.
    pub position: Vec3,
    /// Rotation from the eye's local frame into world space.
    #[serde(default)]
    pub orientation: Quaternion,
}

impl Pose {
    /// Creates a pose, normalizing the orientation.
    pub fn new(position: Vec3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// Creates an unrotated pose at `position`.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quaternion::IDENTITY)
    }

    /// Returns this pose moved to `position`, keeping the orientation.
    pub fn with_position(&self, position: Vec3) -> Self {
        Self {
            position,
            orientation: self.orientation,
        }
    }

    /// Returns this pose turned by `delta`, applied after the current orientation.
    pub fn rotated(&self, delta: Quaternion) -> Self {
        Self {
            position: self.position,
            orientation: (delta * self.orientation).normalize(),
        }
    }

    /// Maps a direction from the eye's local frame into world space.
    pub fn to_world(&self, local_direction: Vec3) -> Vec3 {
        self.orientation * local_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{EPSILON, FRAC_PI_2};
    use approx::assert_relative_eq;

    #[test]
    fn test_rotated_applies_delta_after_current() {
        let pose = Pose::at(Vec3::ONE).rotated(Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2));
        let forward = pose.to_world(Vec3::X);
        assert_relative_eq!(forward.z, -1.0, epsilon = EPSILON);
        assert_eq!(pose.position, Vec3::ONE);
        assert_relative_eq!(pose.orientation.magnitude(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_to_world_keeps_directions_unit() {
        let pose = Pose::new(
            Vec3::ZERO,
            Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.8),
        );
        let local = Vec3::new(0.0, 0.6, 0.8);
        let world = pose.to_world(local);
        assert_relative_eq!(world.length(), 1.0, epsilon = EPSILON);
        // The component along the rotation axis is unchanged.
        let axis = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(world.dot(axis), local.dot(axis), epsilon = EPSILON);
        assert!(world.angle_between(local) > 0.1);
    }
}
