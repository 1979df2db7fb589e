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

use serde::{Deserialize, Serialize};

use crate::math::{Vec3, FULL_SPHERE_SR, TAU};

/// A single directional sampling unit of a compound eye.
///
/// The ommatidium sees a cone around `direction` whose full opening angle is
/// `acceptance_angle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ommatidium {
    /// Unit viewing axis in the eye's local frame.
    pub direction: Vec3,
    /// Full cone angle in radians.
    pub acceptance_angle: f32,
}

impl Ommatidium {
    /// Creates an ommatidium, normalizing its direction.
    pub fn new(direction: Vec3, acceptance_angle: f32) -> Self {
        Self {
            direction: direction.normalize(),
            acceptance_angle,
        }
    }

    /// Creates an ommatidium whose cone covers `solid_angle` steradians.
    pub fn with_solid_angle(direction: Vec3, solid_angle: f32) -> Self {
        Self::new(direction, acceptance_angle_for(solid_angle))
    }

    /// Returns the solid angle of the viewing cone in steradians.
    pub fn solid_angle(&self) -> f32 {
        solid_angle_for(self.acceptance_angle)
    }
}

/// Solid angle (sr) of a cone with full opening angle `acceptance_angle`:
/// `Ω = 2π(1 − cos(a/2))`.
pub fn solid_angle_for(acceptance_angle: f32) -> f32 {
    TAU * (1.0 - (acceptance_angle * 0.5).cos())
}

/// Full opening angle of a cone covering `solid_angle` steradians.
///
/// The input is clamped to `[0, 4π]`.
pub fn acceptance_angle_for(solid_angle: f32) -> f32 {
    let sr = solid_angle.clamp(0.0, FULL_SPHERE_SR);
    2.0 * (1.0 - sr / TAU).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{EPSILON, PI};
    use approx::assert_relative_eq;

    #[test]
    fn test_one_steradian_cone() {
        let omm = Ommatidium::with_solid_angle(Vec3::Z, 1.0);
        assert_relative_eq!(omm.solid_angle(), 1.0, epsilon = 1e-4);
        // A 1 sr cone opens roughly 65.5 degrees.
        assert_relative_eq!(omm.acceptance_angle.to_degrees(), 65.54, epsilon = 0.05);
    }

    #[test]
    fn test_extreme_cones() {
        assert_relative_eq!(solid_angle_for(0.0), 0.0, epsilon = EPSILON);
        assert_relative_eq!(solid_angle_for(PI), TAU, epsilon = 1e-4);
        assert_relative_eq!(acceptance_angle_for(FULL_SPHERE_SR), TAU, epsilon = 1e-4);
        assert_relative_eq!(acceptance_angle_for(100.0), TAU, epsilon = 1e-4);
    }

    #[test]
    fn test_direction_is_normalized() {
        let omm = Ommatidium::new(Vec3::new(0.0, 3.0, 4.0), 0.1);
        assert_relative_eq!(omm.direction.length(), 1.0, epsilon = EPSILON);
    }
}
