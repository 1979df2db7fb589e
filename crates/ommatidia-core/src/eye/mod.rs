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

//! The compound-eye model: individual ommatidia and equidistant direction sets.
//!
//! An eye is nothing more than a list of [`Ommatidium`] values in the eye's
//! local frame. The [`Isosphere`] builds the near-uniform lists the pose
//! search samples with.

mod isosphere;
mod ommatidium;

pub use self::isosphere::{Isosphere, MAX_SUBDIVISIONS};
pub use self::ommatidium::{acceptance_angle_for, solid_angle_for, Ommatidium};

/// Returns the largest solid angle (sr) among `ommatidia`, or `None` if empty.
pub fn max_solid_angle(ommatidia: &[Ommatidium]) -> Option<f32> {
    ommatidia
        .iter()
        .map(Ommatidium::solid_angle)
        .fold(None, |acc, sr| match acc {
            Some(best) if best >= sr => Some(best),
            _ => Some(sr),
        })
}
