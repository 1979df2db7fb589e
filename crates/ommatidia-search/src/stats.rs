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

//! Small descriptive statistics over luminance samples.
//!
//! Accumulation is done in `f64` so long sample runs do not drift.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Some((sum / values.len() as f64) as f32)
}

/// Unbiased (Bessel-corrected) sample variance.
///
/// Returns `None` when fewer than two values are given.
pub fn sample_variance(values: &[f32]) -> Option<f32> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let avg = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - avg;
            d * d
        })
        .sum();
    Some((sum_sq / (n - 1.0)) as f32)
}

/// Square root of [`sample_variance`].
pub fn sample_std_dev(values: &[f32]) -> Option<f32> {
    sample_variance(values).map(f32::sqrt)
}

/// Magnitude of the change from `previous` to `current`, relative to `previous`.
///
/// Two zeros give `0.0`; a change away from zero gives `f32::INFINITY`.
pub fn relative_change(previous: f32, current: f32) -> f32 {
    if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            f32::INFINITY
        }
    } else {
        ((current - previous) / previous).abs()
    }
}

/// Index of the largest value. The lowest index wins ties and NaN is skipped.
///
/// `None` when there is no comparable value.
pub fn max_index(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, best_v)) if v <= best_v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
