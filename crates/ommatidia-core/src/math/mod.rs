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

//! Provides the 3D math primitives used by the search engine.
//!
//! The set is deliberately small: a vector, a rotation quaternion, the two
//! bounding volumes a search region can take, and a linear color with a
//! luminance reduction. All angular functions operate in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

// Re-export standard mathematical constants for convenience.
pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// The solid angle of the full sphere, in steradians.
pub const FULL_SPHERE_SR: f32 = 4.0 * PI;

// --- Declare Sub-Modules ---

pub mod color;
pub mod geometry;
pub mod quaternion;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::color::LinearRgba;
pub use self::geometry::{Aabb, Cylinder};
pub use self::quaternion::Quaternion;
pub use self::vector::Vec3;
