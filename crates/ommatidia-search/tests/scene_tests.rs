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

//! Camera discovery and per-eye sample rates.

mod common;

use common::{constant, ScriptedRenderer, EYE, MAIN};
use ommatidia_core::RendererError;
use ommatidia_search::{eye_sample_rates, find_camera_by_name, find_compound_eye};

#[test]
fn test_find_compound_eye_skips_perspective_cameras() {
    let mut renderer = ScriptedRenderer::new(constant(0.5));

    let found = find_compound_eye(&mut renderer).unwrap();

    assert_eq!(found, Some(EYE));
}

#[test]
fn test_find_camera_by_name() {
    let renderer = ScriptedRenderer::new(constant(0.5));

    assert_eq!(find_camera_by_name(&renderer, "main").unwrap(), Some(MAIN));
    assert_eq!(find_camera_by_name(&renderer, "eye").unwrap(), Some(EYE));
    assert_eq!(find_camera_by_name(&renderer, "nope").unwrap(), None);
}

#[test]
fn test_eye_rate_scales_by_widest_cone() {
    // The scripted eye starts as twelve 0.1 sr cones.
    let mut renderer = ScriptedRenderer::new(constant(0.5));

    let rates = eye_sample_rates(&mut renderer, 195, None).unwrap();

    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].camera, EYE);
    assert_eq!(rates[0].name, "eye");
    assert_eq!(rates[0].ommatidia, 12);
    assert_eq!(rates[0].samples_per_ommatidium, 20);
}

#[test]
fn test_eye_rate_for_named_perspective_camera_fails() {
    let mut renderer = ScriptedRenderer::new(constant(0.5));

    let err = eye_sample_rates(&mut renderer, 100, Some(MAIN)).unwrap_err();

    assert_eq!(err, RendererError::NotCompoundEye(0));
}

#[test]
fn test_eye_without_ommatidia_is_skipped() {
    let mut renderer = ScriptedRenderer::new(constant(0.5));
    renderer.hide_directions = true;

    let rates = eye_sample_rates(&mut renderer, 100, Some(EYE)).unwrap();

    assert!(rates.is_empty());
}
