//! Board geometry
//!
//! Pure functions mapping logical board state to board-local 3D positions.
//! Nothing here keeps state between calls; every function takes the
//! `BoardConfig` it needs.

pub mod config;
pub mod dice;
pub mod layout;

pub use config::BoardConfig;
pub use dice::{DiceDisplay, DicePlacement, scatter_dice};
pub use layout::{
    BAR_BOTTOM, BAR_TOP, HOME_BOTTOM, HOME_TOP, NUM_POINTS, dice_position, double_cube_position,
    mirror_point, piece_position, piece_rotation,
};

use serde::{Deserialize, Serialize};

/// The two sides of the table
///
/// `One` sits at the bottom of the board and rolls onto the right half;
/// `Two` sits at the top and rolls onto the left half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// Who holds the doubling cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CubeOwner {
    #[default]
    Centred,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CubeState {
    pub owner: CubeOwner,
    /// Set while a double is pending
    pub offered_by: Option<Player>,
}
