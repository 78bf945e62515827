//! Camera and projection setup

pub mod volume;

pub use volume::{MIN_FIT_ASPECT, ViewAnchors, ViewArea, ViewVolume, fit_view_volume};
