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

//! Defines the `LinearRgba` color type returned per ommatidium by a renderer.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul};

/// Represents a color in a **linear RGBA** color space using `f32` components.
///
/// Renderers report one `LinearRgba` per ommatidium. The search reduces it to a
/// scalar visual value with [`LinearRgba::luminance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct LinearRgba {
    /// The red component in linear space.
    pub r: f32,
    /// The green component in linear space.
    pub g: f32,
    /// The blue component in linear space.
    pub b: f32,
    /// The alpha (opacity) component.
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl LinearRgba {
    /// Opaque white (`[1.0, 1.0, 1.0, 1.0]`).
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black (`[0.0, 0.0, 0.0, 1.0]`).
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Creates a new `LinearRgba` with explicit RGBA values.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `LinearRgba` (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates an opaque gray with all color channels set to `value`.
    #[inline]
    pub const fn gray(value: f32) -> Self {
        Self::rgb(value, value, value)
    }

    /// Returns the Rec. 709 relative luminance of the color.
    ///
    /// Alpha is ignored.
    #[inline]
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

}

impl Default for LinearRgba {
    /// Returns `LinearRgba::WHITE`.
    #[inline]
    fn default() -> Self {
        Self::WHITE
    }
}

impl Add for LinearRgba {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Mul<f32> for LinearRgba {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self::Output {
        Self::new(
            self.r * scalar,
            self.g * scalar,
            self.b * scalar,
            self.a * scalar,
        )
    }
}

impl Div<f32> for LinearRgba {
    type Output = Self;
    #[inline]
    fn div(self, scalar: f32) -> Self::Output {
        let inv = 1.0 / scalar;
        self * inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;
    use approx::assert_relative_eq;

    #[test]
    fn test_luminance_weights() {
        assert_relative_eq!(LinearRgba::WHITE.luminance(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(LinearRgba::BLACK.luminance(), 0.0, epsilon = EPSILON);
        assert_relative_eq!(LinearRgba::rgb(0.0, 1.0, 0.0).luminance(), 0.7152, epsilon = EPSILON);
        assert_relative_eq!(LinearRgba::gray(0.5).luminance(), 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_accumulate_and_average() {
        let sum = LinearRgba::gray(0.2) + LinearRgba::gray(0.6);
        let avg = sum / 2.0;
        assert_relative_eq!(avg.g, 0.4, epsilon = EPSILON);
        assert_relative_eq!(avg.a, 1.0, epsilon = EPSILON);
    }
}
