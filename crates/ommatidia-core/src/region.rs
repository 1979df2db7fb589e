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

//! The bounded volume a pose search is allowed to explore.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::{Aabb, Cylinder, Vec3};

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Why a [`SearchRegion`] was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionError {
    /// A coordinate, radius or height is NaN or infinite.
    NonFinite,
    /// The box's `min` corner exceeds its `max` corner on an axis.
    Inverted {
        /// The offending axis (`'x'`, `'y'` or `'z'`).
        axis: char,
    },
    /// The box has zero extent on an axis, so it encloses no volume.
    Degenerate {
        /// The offending axis (`'x'`, `'y'` or `'z'`).
        axis: char,
    },
    /// The cylinder radius is zero or negative.
    NonPositiveRadius(f32),
    /// The cylinder height is zero or negative.
    NonPositiveHeight(f32),
    /// A flat parameter list had the wrong number of values.
    WrongArity {
        /// The region kind being parsed.
        kind: &'static str,
        /// The number of values the kind requires.
        expected: usize,
        /// The number of values supplied.
        actual: usize,
    },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::NonFinite => write!(f, "search region has a non-finite component"),
            RegionError::Inverted { axis } => {
                write!(f, "search box minimum exceeds maximum on the {axis} axis")
            }
            RegionError::Degenerate { axis } => {
                write!(f, "search box has zero extent on the {axis} axis")
            }
            RegionError::NonPositiveRadius(r) => {
                write!(f, "search cylinder radius must be positive (got {r})")
            }
            RegionError::NonPositiveHeight(h) => {
                write!(f, "search cylinder height must be positive (got {h})")
            }
            RegionError::WrongArity {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "a search {kind} takes {expected} values, {actual} were given"
            ),
        }
    }
}

impl std::error::Error for RegionError {}

/// A bounding volume for the pose search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchRegion {
    /// An axis-aligned box.
    Box(Aabb),
    /// An upright cylinder.
    Cylinder(Cylinder),
}

impl SearchRegion {
    /// Builds a box from `[x0, y0, z0, x1, y1, z1]` (lowest corner first).
    ///
    /// Only the arity is checked here; call [`SearchRegion::validate`] for the rest.
    pub fn box_from_slice(values: &[f32]) -> Result<Self, RegionError> {
        match values {
            [x0, y0, z0, x1, y1, z1] => Ok(SearchRegion::Box(Aabb::new(
                Vec3::new(*x0, *y0, *z0),
                Vec3::new(*x1, *y1, *z1),
            ))),
            _ => Err(RegionError::WrongArity {
                kind: "box",
                expected: 6,
                actual: values.len(),
            }),
        }
    }

    /// Builds a cylinder from `[x, y, z, radius, height]`, where `(x, y, z)`
    /// is the center of the base.
    pub fn cylinder_from_slice(values: &[f32]) -> Result<Self, RegionError> {
        match values {
            [x, y, z, radius, height] => Ok(SearchRegion::Cylinder(Cylinder::new(
                Vec3::new(*x, *y, *z),
                *radius,
                *height,
            ))),
            _ => Err(RegionError::WrongArity {
                kind: "cylinder",
                expected: 5,
                actual: values.len(),
            }),
        }
    }

    /// Checks that the region encloses a non-zero volume.
    pub fn validate(&self) -> Result<(), RegionError> {
        match self {
            SearchRegion::Box(aabb) => {
                if !aabb.min.is_finite() || !aabb.max.is_finite() {
                    return Err(RegionError::NonFinite);
                }
                for (i, axis) in AXES.iter().enumerate() {
                    let (lo, hi) = (aabb.min[i], aabb.max[i]);
                    if lo > hi {
                        return Err(RegionError::Inverted { axis: *axis });
                    }
                    if lo == hi {
                        return Err(RegionError::Degenerate { axis: *axis });
                    }
                }
                Ok(())
            }
            SearchRegion::Cylinder(cylinder) => {
                if !cylinder.base_center.is_finite()
                    || !cylinder.radius.is_finite()
                    || !cylinder.height.is_finite()
                {
                    return Err(RegionError::NonFinite);
                }
                if cylinder.radius <= 0.0 {
                    return Err(RegionError::NonPositiveRadius(cylinder.radius));
                }
                if cylinder.height <= 0.0 {
                    return Err(RegionError::NonPositiveHeight(cylinder.height));
                }
                Ok(())
            }
        }
    }

    /// Returns the short name of the region kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchRegion::Box(_) => "box",
            SearchRegion::Cylinder(_) => "cylinder",
        }
    }

    /// Returns the center of the region.
    pub fn center(&self) -> Vec3 {
        match self {
            SearchRegion::Box(aabb) => aabb.center(),
            SearchRegion::Cylinder(cylinder) => cylinder.center(),
        }
    }

    /// Returns the characteristic size of the region along each axis.
    pub fn extent(&self) -> Vec3 {
        match self {
            SearchRegion::Box(aabb) => aabb.size(),
            SearchRegion::Cylinder(cylinder) => cylinder.bounding_size(),
        }
    }

    /// Returns the enclosed volume.
    pub fn volume(&self) -> f32 {
        match self {
            SearchRegion::Box(aabb) => aabb.volume(),
            SearchRegion::Cylinder(cylinder) => cylinder.volume(),
        }
    }

    /// Checks whether `point` lies inside or on the boundary of the region.
    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            SearchRegion::Box(aabb) => aabb.contains_point(point),
            SearchRegion::Cylinder(cylinder) => cylinder.contains_point(point),
        }
    }

    /// Projects `point` onto the closest point of the region.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        match self {
            SearchRegion::Box(aabb) => aabb.clamp_point(point),
            SearchRegion::Cylinder(cylinder) => cylinder.clamp_point(point),
        }
    }
}

impl fmt::Display for SearchRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchRegion::Box(aabb) => write!(f, "box {} -> {}", aabb.min, aabb.max),
            SearchRegion::Cylinder(c) => write!(
                f,
                "cylinder base {} radius {:.3} height {:.3}",
                c.base_center, c.radius, c.height
            ),
        }
    }
}
