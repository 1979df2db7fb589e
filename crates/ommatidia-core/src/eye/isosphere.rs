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

//! Near-equidistant direction sets built by subdividing an icosahedron.

use std::collections::HashMap;

use super::Ommatidium;
use crate::math::Vec3;

/// Subdivision levels above this are clamped (40 962 directions).
pub const MAX_SUBDIVISIONS: u32 = 6;

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// The vertices of a subdivided icosahedron projected onto the unit sphere.
///
/// Every vertex is used as the viewing axis of one ommatidium, which gives an
/// eye whose sampling pattern is as close to equidistant as a mesh allows.
#[derive(Debug, Clone)]
pub struct Isosphere {
    directions: Vec<Vec3>,
    angular_spacing: f32,
    subdivisions: u32,
}

impl Isosphere {
    /// Builds an isosphere with `10 · 4ⁿ + 2` vertices for `n` subdivisions.
    pub fn new(subdivisions: u32) -> Self {
        let subdivisions = subdivisions.min(MAX_SUBDIVISIONS);
        let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let mut vertices: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();
        let mut faces: Vec<[usize; 3]> = ICOSAHEDRON_FACES.to_vec();

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
            let mut next_faces = Vec::with_capacity(faces.len() * 4);
            for &[a, b, c] in &faces {
                let ab = midpoint(&mut vertices, &mut midpoints, a, b);
                let bc = midpoint(&mut vertices, &mut midpoints, b, c);
                let ca = midpoint(&mut vertices, &mut midpoints, c, a);
                next_faces.push([a, ab, ca]);
                next_faces.push([b, bc, ab]);
                next_faces.push([c, ca, bc]);
                next_faces.push([ab, bc, ca]);
            }
            faces = next_faces;
        }

        let angular_spacing = faces
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .map(|(i, j)| vertices[i].angle_between(vertices[j]))
            .fold(f32::INFINITY, f32::min);

        log::trace!(
            "Built isosphere: {} subdivisions, {} directions, spacing {:.4} rad",
            subdivisions,
            vertices.len(),
            angular_spacing
        );

        Self {
            directions: vertices,
            angular_spacing,
            subdivisions,
        }
    }

    /// Returns the unit directions, in a stable order.
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Returns the number of directions.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// An isosphere always has at least the twelve icosahedron vertices.
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// The smallest angle (radians) between two adjacent directions.
    pub fn angular_spacing(&self) -> f32 {
        self.angular_spacing
    }

    /// The subdivision level actually used.
    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    /// Builds one ommatidium per direction, each covering `solid_angle` steradians.
    pub fn ommatidia(&self, solid_angle: f32) -> Vec<Ommatidium> {
        self.directions
            .iter()
            .map(|&d| Ommatidium::with_solid_angle(d, solid_angle))
            .collect()
    }
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
) -> usize {
    let key = (a.min(b), a.max(b));
    *cache.entry(key).or_insert_with(|| {
        vertices.push(((vertices[a] + vertices[b]) * 0.5).normalize());
        vertices.len() - 1
    })
}
