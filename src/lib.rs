//! board3d - render-side core of a 3D backgammon board
//!
//! Core modules:
//! - `board`: Board geometry (point, dice and cube positions)
//! - `anim`: Piece and dice animation paths
//! - `view`: Frustum fitting for the tilted board
//! - `shadow`: Occluders and stencil shadow volumes
//! - `renderer`: WebGPU shadow volume pass
//! - `settings`: Persistent display settings

pub mod anim;
pub mod board;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod shadow;
pub mod view;

pub use anim::{DiceAnimation, Path, PathType, PieceAnimation, build_dice_path, build_move_path};
pub use board::{BoardConfig, CubeOwner, CubeState, DiceDisplay, Player};
pub use error::{Error, Result};
pub use settings::{Accuracy, Settings};
pub use shadow::{BoardSnapshot, Occluder, OccluderGeometry, ShadowCasters};
pub use view::{ViewAnchors, ViewVolume, fit_view_volume};
