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

//! Provides a Quaternion type for representing eye orientations.

use serde::{Deserialize, Serialize};

use super::{Vec3, EPSILON};
use std::ops::{Mul, MulAssign, Neg};

/// Represents a quaternion for 3D rotations.
///
/// A quaternion is stored as `(x, y, z, w)`, where `[x, y, z]` is the "vector" part
/// and `w` is the "scalar" part. Orientations are always kept as unit quaternions
/// where `x² + y² + z² + w² = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Creates a new quaternion from its raw components.
    ///
    /// Note: This does not guarantee a unit quaternion. For creating rotations,
    /// prefer `from_axis_angle`.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion representing a rotation around a given axis by a given angle.
    ///
    /// # Arguments
    ///
    /// * `axis`: The axis of rotation. It is normalized internally.
    /// * `angle_radians`: The angle of rotation in radians.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let normalized_axis = axis.normalize();
        let half_angle = angle_radians * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        Self {
            x: normalized_axis.x * s,
            y: normalized_axis.y * s,
            z: normalized_axis.z * s,
            w: c,
        }
    }

    /// Decomposes the rotation into a unit axis and an angle in `[0, 2π)`.
    ///
    /// The identity rotation reports `(Vec3::Y, 0.0)`.
    pub fn to_axis_angle(&self) -> (Vec3, f32) {
        let q = self.normalize();
        let sin_half = (1.0 - q.w * q.w).max(0.0).sqrt();
        if sin_half < EPSILON {
            return (Vec3::Y, 0.0);
        }
        let axis = Vec3::new(q.x, q.y, q.z) / sin_half;
        (axis, 2.0 * q.w.clamp(-1.0, 1.0).acos())
    }

    /// Calculates the squared length (magnitude) of the quaternion.
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Calculates the length (magnitude) of the quaternion.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a normalized version of the quaternion with a length of 1.
    /// If the quaternion has a near-zero magnitude, it returns the identity quaternion.
    pub fn normalize(&self) -> Self {
        let mag_sq = self.magnitude_squared();
        if mag_sq > EPSILON {
            let inv_mag = 1.0 / mag_sq.sqrt();
            Self {
                x: self.x * inv_mag,
                y: self.y * inv_mag,
                z: self.z * inv_mag,
                w: self.w * inv_mag,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Computes the conjugate of the quaternion, which negates the vector part.
    /// For a unit quaternion this is also the inverse rotation.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Computes the dot product of two quaternions.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Returns the smallest rotation angle (radians) taking `self` onto `other`.
    #[inline]
    pub fn angle_to(&self, other: Self) -> f32 {
        let d = self.normalize().dot(other.normalize()).abs().min(1.0);
        2.0 * d.acos()
    }

    /// Rotates a 3D vector by this quaternion.
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s: f32 = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }
}

// --- Operator Overloads ---

impl Default for Quaternion {
    /// Returns the identity quaternion, representing no rotation.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;
    /// Combines two rotations using the Hamilton product.
    /// `a * b` applies `b` first, then `a`.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

impl MulAssign<Quaternion> for Quaternion {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quaternion {
    type Output = Vec3;
    /// Rotates a `Vec3` by this quaternion.
    #[inline]
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.normalize().rotate_vec3(rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }
}

impl std::fmt::Display for Quaternion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[x: {:.4}, y: {:.4}, z: {:.4}, w: {:.4}]",
            self.x, self.y, self.z, self.w
        )
    }
}
