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

//! # Ommatidia Core
//!
//! Foundational crate containing the math primitives, compound-eye types and
//! the renderer port contract shared by the search engine and its renderers.

#![warn(missing_docs)]

pub mod eye;
pub mod math;
pub mod pose;
pub mod region;
pub mod renderer;

pub use eye::{Isosphere, Ommatidium};
pub use pose::Pose;
pub use region::{RegionError, SearchRegion};
pub use renderer::{CameraHandle, RendererError, RendererPort};
