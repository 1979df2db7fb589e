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

//! A deterministic, scriptable `RendererPort` for driving the searches.
//!
//! The scene holds one perspective camera (`#0`, "main") and one compound
//! eye (`#1`, "eye"). Every render calls the script with the current frame
//! state; the script returns the values the eye will report.

#![allow(dead_code)]

use std::cell::Cell;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use ommatidia_core::math::{LinearRgba, Vec3};
use ommatidia_core::{
    CameraHandle, Isosphere, Ommatidium, Pose, RendererError, RendererPort, SearchRegion,
};

pub const MAIN: CameraHandle = CameraHandle(0);
pub const EYE: CameraHandle = CameraHandle(1);

/// The renderer state handed to the script on every render.
pub struct Frame<'a> {
    pub pose: Pose,
    pub samples: u32,
    /// Zero-based count of renders issued before this one.
    pub render_index: u32,
    pub ommatidia: &'a [Ommatidium],
}

type Script = Box<dyn Fn(&Frame<'_>) -> Vec<LinearRgba>>;

pub struct ScriptedRenderer {
    script: Script,
    eye: Vec<Ommatidium>,
    selected: Option<CameraHandle>,
    pose: Pose,
    samples: u32,
    renders: u32,
    last: Vec<LinearRgba>,
    calls: Cell<u32>,
    /// Report an empty direction list for the eye.
    pub hide_directions: bool,
    /// Fail every render once this many have succeeded.
    pub fail_after: Option<u32>,
}

impl fmt::Debug for ScriptedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedRenderer")
            .field("ommatidia", &self.eye.len())
            .field("selected", &self.selected)
            .field("samples", &self.samples)
            .field("renders", &self.renders)
            .field("calls", &self.calls.get())
            .finish()
    }
}

impl ScriptedRenderer {
    pub fn new(script: impl Fn(&Frame<'_>) -> Vec<LinearRgba> + 'static) -> Self {
        Self {
            script: Box::new(script),
            eye: Isosphere::new(0).ommatidia(0.1),
            selected: None,
            pose: Pose::default(),
            samples: 1,
            renders: 0,
            last: Vec::new(),
            calls: Cell::new(0),
            hide_directions: false,
            fail_after: None,
        }
    }

    /// Every port call made so far.
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub fn renders(&self) -> u32 {
        self.renders
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn check(&self, camera: CameraHandle) -> Result<(), RendererError> {
        if camera.0 > 1 {
            return Err(RendererError::UnknownCamera(camera.0));
        }
        Ok(())
    }
}

impl RendererPort for ScriptedRenderer {
    fn load_scene(&mut self, _path: &Path) -> Result<(), RendererError> {
        self.tick();
        Ok(())
    }

    fn list_cameras(&self) -> Result<Vec<CameraHandle>, RendererError> {
        self.tick();
        Ok(vec![MAIN, EYE])
    }

    fn select_camera(&mut self, camera: CameraHandle) -> Result<(), RendererError> {
        self.tick();
        self.check(camera)?;
        self.selected = Some(camera);
        Ok(())
    }

    fn camera_name(&self, camera: CameraHandle) -> Result<String, RendererError> {
        self.tick();
        self.check(camera)?;
        Ok(if camera == EYE { "eye" } else { "main" }.to_string())
    }

    fn is_compound_eye(&self, camera: CameraHandle) -> Result<bool, RendererError> {
        self.tick();
        self.check(camera)?;
        Ok(camera == EYE)
    }

    fn ommatidia(&self, camera: CameraHandle) -> Result<Vec<Ommatidium>, RendererError> {
        self.tick();
        self.check(camera)?;
        if camera != EYE {
            return Err(RendererError::NotCompoundEye(camera.0));
        }
        if self.hide_directions {
            return Ok(Vec::new());
        }
        Ok(self.eye.clone())
    }

    fn set_ommatidia(&mut self, ommatidia: &[Ommatidium]) -> Result<(), RendererError> {
        self.tick();
        if self.selected != Some(EYE) {
            return Err(RendererError::Backend("no compound eye selected".into()));
        }
        self.eye = ommatidia.to_vec();
        Ok(())
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), RendererError> {
        self.tick();
        self.pose = pose;
        Ok(())
    }

    fn set_samples_per_ommatidium(&mut self, samples: u32) -> Result<(), RendererError> {
        self.tick();
        if samples == 0 {
            return Err(RendererError::InvalidArgument("zero samples".into()));
        }
        self.samples = samples;
        Ok(())
    }

    fn render(&mut self) -> Result<Duration, RendererError> {
        self.tick();
        if matches!(self.fail_after, Some(limit) if self.renders >= limit) {
            return Err(RendererError::Backend("device lost".into()));
        }
        let frame = Frame {
            pose: self.pose,
            samples: self.samples,
            render_index: self.renders,
            ommatidia: &self.eye,
        };
        self.last = (self.script)(&frame);
        self.renders += 1;
        Ok(Duration::from_micros(250))
    }

    fn ommatidial_values(&self) -> Result<Vec<LinearRgba>, RendererError> {
        self.tick();
        Ok(self.last.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripts
// ─────────────────────────────────────────────────────────────────────────────

/// Applies `f(frame, world_direction)` to every ommatidium as a gray level.
pub fn per_direction(
    f: impl Fn(&Frame<'_>, Vec3) -> f32 + 'static,
) -> impl Fn(&Frame<'_>) -> Vec<LinearRgba> {
    move |frame| {
        frame
            .ommatidia
            .iter()
            .map(|o| LinearRgba::gray(f(frame, frame.pose.to_world(o.direction))))
            .collect()
    }
}

/// The same gray level everywhere, every time.
pub fn constant(level: f32) -> impl Fn(&Frame<'_>) -> Vec<LinearRgba> {
    per_direction(move |_, _| level)
}

/// Noise whose deviation depends only on the sample count: the value
/// alternates `1 ± spread(samples)` from one render to the next.
pub fn alternating_noise(
    spread: impl Fn(u32) -> f32 + 'static,
) -> impl Fn(&Frame<'_>) -> Vec<LinearRgba> {
    per_direction(move |frame, _| {
        let sign = if frame.render_index % 2 == 0 { 1.0 } else { -1.0 };
        1.0 + sign * spread(frame.samples)
    })
}

pub fn cube_region() -> SearchRegion {
    SearchRegion::box_from_slice(&[0.0, 0.0, 0.0, 2.0, 2.0, 2.0]).unwrap()
}
