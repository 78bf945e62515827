//! Multi-segment animation paths parameterised by arc length
//!
//! A `Path` holds up to three typed segments. Callers advance it with the
//! cumulative distance travelled since the animation started; overflow
//! from a finished segment carries into the next one.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::error::{Error, Result};

pub const MAX_SEGMENTS: usize = 3;

/// Apex height of a `Parabola` bounce as a fraction of its span
const BOUNCE_RATIO: f32 = 0.25;

/// Shape of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathType {
    Line,
    /// Quarter ellipse leaving vertically, arriving horizontally (lift-off)
    Curve9To12,
    /// Quarter ellipse leaving horizontally, arriving vertically (descent)
    Curve12To3,
    /// Bounce with its apex half way along
    Parabola,
    /// Falling half of a bounce: apex at the start
    Parabola12To3,
}

impl PathType {
    pub fn is_curve(self) -> bool {
        matches!(self, PathType::Curve9To12 | PathType::Curve12To3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub kind: PathType,
    pub end: Vec3,
    /// Arc length, the distance `advance` consumes crossing this segment
    pub length: f32,
}

/// Result of advancing a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub point: Vec3,
    /// Tip-over blend in [0, 1]; only set for rotating paths
    pub rotate: Option<f32>,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Path {
    start: Vec3,
    segments: Vec<PathSegment>,
    /// Index of the active segment; `segments.len()` once finished
    state: usize,
    /// Arc length consumed by completed segments
    milestone: f32,
    rotates: bool,
}

impl Path {
    pub fn new(start: Vec3) -> Self {
        Self {
            start,
            segments: Vec::with_capacity(MAX_SEGMENTS),
            state: 0,
            milestone: 0.0,
            rotates: false,
        }
    }

    /// Report a tip-over fraction while descending onto the final point
    pub fn with_rotation(mut self) -> Self {
        self.rotates = true;
        self
    }

    /// Append a segment ending at `end`
    ///
    /// Zero-length segments are rejected; they would make the arc length
    /// parameterisation divide by zero.
    pub fn push(&mut self, kind: PathType, end: Vec3) -> Result<()> {
        assert!(
            self.segments.len() < MAX_SEGMENTS,
            "a path holds at most {MAX_SEGMENTS} segments"
        );

        let start = self.end_point();
        let length = segment_length(kind, start, end);
        if !(length > f32::EPSILON) {
            return Err(Error::DegenerateSegment { kind, at: start });
        }

        self.segments.push(PathSegment { kind, end, length });
        Ok(())
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn milestone(&self) -> f32 {
        self.milestone
    }

    pub fn rotates(&self) -> bool {
        self.rotates
    }

    pub fn is_finished(&self) -> bool {
        self.state == self.segments.len()
    }

    pub fn total_length(&self) -> f32 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Final point of the path (the start if nothing was added yet)
    pub fn end_point(&self) -> Vec3 {
        self.segments.last().map_or(self.start, |s| s.end)
    }

    fn segment_start(&self, index: usize) -> Vec3 {
        if index == 0 {
            self.start
        } else {
            self.segments[index - 1].end
        }
    }

    /// Rewind to the start so the path can be replayed
    pub fn restart(&mut self) {
        self.state = 0;
        self.milestone = 0.0;
    }

    /// Sample the path after travelling `distance` in total
    ///
    /// Once finished, returns the exact final endpoint on every call.
    pub fn advance(&mut self, distance: f32) -> PathSample {
        assert!(!self.segments.is_empty(), "advancing a path with no segments");

        while self.state < self.segments.len() {
            let segment = self.segments[self.state];
            let start = self.segment_start(self.state);
            let local = (distance - self.milestone).max(0.0);

            if let Some((point, fraction)) = advance_segment(segment.kind, start, segment.end, local)
            {
                return PathSample {
                    point,
                    rotate: self.rotation_at(fraction),
                    finished: false,
                };
            }

            self.milestone += segment.length;
            self.state += 1;
        }

        PathSample {
            point: self.end_point(),
            rotate: self.rotates.then_some(1.0),
            finished: true,
        }
    }

    /// Rotation only blends in along the closing curve
    fn rotation_at(&self, fraction: f32) -> Option<f32> {
        if !self.rotates {
            return None;
        }
        let last = self.segments.len() - 1;
        if self.state == last && self.segments[last].kind.is_curve() {
            Some(fraction.clamp(0.0, 1.0))
        } else {
            Some(0.0)
        }
    }
}

/// Arc length of a segment
///
/// Parabolas are parameterised by horizontal distance, so their length is
/// the horizontal span. Curves use Ramanujan's ellipse perimeter.
pub fn segment_length(kind: PathType, start: Vec3, end: Vec3) -> f32 {
    let horizontal = (end - start).truncate().length();
    match kind {
        PathType::Line => start.distance(end),
        PathType::Parabola | PathType::Parabola12To3 => horizontal,
        PathType::Curve9To12 | PathType::Curve12To3 => {
            quarter_ellipse(horizontal, (end.z - start.z).abs())
        }
    }
}

fn quarter_ellipse(a: f32, b: f32) -> f32 {
    let perimeter = PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt());
    perimeter / 4.0
}

/// Position `distance` along a single segment, with the fraction covered
///
/// Returns `None` once `distance` exceeds the segment's length.
pub fn advance_segment(
    kind: PathType,
    start: Vec3,
    end: Vec3,
    distance: f32,
) -> Option<(Vec3, f32)> {
    debug_assert!(distance >= 0.0);

    let length = segment_length(kind, start, end);
    if distance > length {
        return None;
    }
    if length <= 0.0 {
        return Some((end, 1.0));
    }
    let per = distance / length;

    let point = match kind {
        PathType::Line => start.lerp(end, per),
        PathType::Parabola => {
            let k = 4.0 * BOUNCE_RATIO / length;
            let mut p = start.lerp(end, per);
            p.z += k * (-distance * distance + length * distance);
            p
        }
        PathType::Parabola12To3 => {
            // Second half of a parabola spanning 2L: the apex sits at the start
            let k = (start.z - end.z) / (length * length);
            let mut p = start.lerp(end, per);
            p.z = start.z - k * distance * distance;
            p
        }
        PathType::Curve9To12 => {
            let theta = per * FRAC_PI_2;
            let across = (end - start).truncate();
            let xy = start.truncate() + across * (1.0 - theta.cos());
            xy.extend(start.z + (end.z - start.z) * theta.sin())
        }
        PathType::Curve12To3 => {
            let theta = per * FRAC_PI_2;
            let across = (end - start).truncate();
            let xy = start.truncate() + across * theta.sin();
            xy.extend(start.z + (end.z - start.z) * (1.0 - theta.cos()))
        }
    };

    Some((point, per))
}
