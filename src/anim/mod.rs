//! Animation paths for pieces and dice
//!
//! - `path`: arc-length parameterised multi-segment paths
//! - `moves`: obstacle-avoiding piece move paths
//! - `dice`: bouncing dice throws
//! - `driver`: playback against elapsed time

pub mod dice;
pub mod driver;
pub mod moves;
pub mod path;

pub use dice::build_dice_path;
pub use driver::{DiceAnimation, DicePose, PieceAnimation, PiecePose};
pub use moves::build_move_path;
pub use path::{MAX_SEGMENTS, Path, PathSample, PathSegment, PathType, advance_segment, segment_length};
