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

//! Defines the error type reported by renderer implementations.

use std::fmt;

/// An error raised by a [`RendererPort`](super::RendererPort) implementation.
///
/// The search engine never retries on any of these; it aborts the current
/// phase and surfaces the error as the abort reason.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererError {
    /// The scene file could not be read or parsed.
    SceneLoad {
        /// The path that failed to load.
        path: String,
        /// A description of the underlying failure.
        reason: String,
    },
    /// An operation needing a scene was called before one was loaded.
    NoScene,
    /// The camera handle does not exist in the loaded scene.
    UnknownCamera(usize),
    /// The operation requires a compound eye, but the camera is a regular one.
    NotCompoundEye(usize),
    /// The renderer returned a value list that does not match the eye.
    MalformedOutput {
        /// The number of values the current eye should produce.
        expected: usize,
        /// The number of values actually produced.
        actual: usize,
    },
    /// An argument was rejected by the renderer.
    InvalidArgument(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererError::SceneLoad { path, reason } => {
                write!(f, "Failed to load scene '{path}': {reason}")
            }
            RendererError::NoScene => write!(f, "No scene is loaded"),
            RendererError::UnknownCamera(handle) => {
                write!(f, "Unknown camera handle: {handle}")
            }
            RendererError::NotCompoundEye(handle) => {
                write!(f, "Camera {handle} is not a compound eye")
            }
            RendererError::MalformedOutput { expected, actual } => write!(
                f,
                "Renderer returned {actual} ommatidial values, expected {expected}"
            ),
            RendererError::InvalidArgument(msg) => write!(f, "Invalid renderer argument: {msg}"),
            RendererError::Backend(msg) => write!(f, "Renderer backend error: {msg}"),
        }
    }
}

impl std::error::Error for RendererError {}
