//! Crate error type
//!
//! Only recoverable conditions live here. Caller bugs (bad point index,
//! empty path, too many segments) are assertions instead.

use glam::Vec3;

use crate::anim::PathType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("degenerate {kind:?} segment: start and end coincide at {at}")]
    DegenerateSegment { kind: PathType, at: Vec3 },
    #[error("dice step size must be positive, got {0}")]
    InvalidStep(f32),
    #[error("invalid viewport aspect ratio {0}")]
    InvalidAspect(f32),
    #[error("field of view must be within (0, 180) degrees, got {0}")]
    InvalidFov(f32),
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
