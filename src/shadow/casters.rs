//! The board's shadow casters
//!
//! Frame panels, bar, hinges, doubling cube, dice, pieces and the resign
//! flag, each an occluder placed from the current board snapshot.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use super::occluder::{Occluder, OccluderGeometry};
use super::tessellate::{Grid3, bevelled_cylinder};
use crate::anim::PiecePose;
use crate::board::{
    BoardConfig, CubeState, DiceDisplay, HOME_BOTTOM, HOME_TOP, NUM_POINTS, dice_position,
    double_cube_position, piece_position, piece_rotation,
};
use crate::settings::Accuracy;

/// Pieces on a backgammon board
pub const MAX_PIECES: usize = 30;
const FRAME_PANELS: usize = 7;

/// What the board looks like this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Pieces per point; positive for `Player::One`, negative for `Player::Two`
    pub points: [i32; NUM_POINTS],
    pub mirrored: bool,
    pub dice: DiceDisplay,
    pub cube: CubeState,
    /// Base of the resign flag pole, when one is shown
    pub flag: Option<Vec3>,
    /// Piece in flight, already removed from `points`
    pub moving_piece: Option<PiecePose>,
}

impl BoardSnapshot {
    /// Standard opening layout
    pub fn starting_position() -> Self {
        let mut points = [0; NUM_POINTS];
        for (point, count) in [(24, 2), (13, 5), (8, 3), (6, 5)] {
            points[point] = count;
            points[25 - point] = -count;
        }
        Self {
            points,
            ..Default::default()
        }
    }

    pub fn piece_count(&self) -> usize {
        self.points.iter().map(|c| c.unsigned_abs() as usize).sum::<usize>()
            + usize::from(self.moving_piece.is_some())
    }
}

/// All occluders for the board, repositioned every frame
#[derive(Debug)]
pub struct ShadowCasters {
    cfg: BoardConfig,
    accuracy: Accuracy,
    grid: Grid3,
    frame: Vec<Occluder>,
    hinges: [Occluder; 2],
    cube: Occluder,
    dice: [Occluder; 2],
    pieces: Vec<Occluder>,
    flag: Occluder,
    volume: Vec<Vec4>,
}

impl ShadowCasters {
    pub fn new(cfg: &BoardConfig, accuracy: Accuracy) -> Self {
        let mut grid = Grid3::new();
        let block = Rc::new(OccluderGeometry::cuboid(Vec3::ONE));
        let piece = Rc::new(piece_geometry(cfg, accuracy, &mut grid));
        let hinge = Rc::new(hinge_geometry(cfg, accuracy, &mut grid));

        let frame = frame_panels(cfg)
            .into_iter()
            .map(|(min, max)| {
                let mut panel = Occluder::new(block.clone());
                panel.transform = box_transform(min, max);
                panel
            })
            .collect();

        let hinges = hinge_positions(cfg).map(|at| {
            let mut occluder = Occluder::new(hinge.clone());
            // Lathe axis along board y, centred on `at`
            occluder.transform = Mat4::from_translation(at)
                * Mat4::from_rotation_x(-FRAC_PI_2)
                * Mat4::from_translation(Vec3::new(0.0, 0.0, -hinge_length(cfg) / 2.0));
            occluder
        });

        let pieces = (0..MAX_PIECES)
            .map(|_| {
                let mut occluder = Occluder::new(piece.clone());
                occluder.visible = false;
                occluder
            })
            .collect();

        let hidden = |geometry: &Rc<OccluderGeometry>| {
            let mut occluder = Occluder::new(geometry.clone());
            occluder.visible = false;
            occluder
        };

        log::info!("Shadow casters built at {} accuracy", accuracy.as_str());

        Self {
            cfg: cfg.clone(),
            accuracy,
            grid,
            frame,
            hinges,
            cube: hidden(&block),
            dice: [hidden(&block), hidden(&block)],
            pieces,
            flag: hidden(&block),
            volume: Vec::new(),
        }
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Retessellate the round occluders
    pub fn set_accuracy(&mut self, accuracy: Accuracy) {
        if accuracy == self.accuracy {
            return;
        }
        self.accuracy = accuracy;

        let piece = Rc::new(piece_geometry(&self.cfg, accuracy, &mut self.grid));
        for occluder in &mut self.pieces {
            occluder.set_geometry(piece.clone());
        }
        let hinge = Rc::new(hinge_geometry(&self.cfg, accuracy, &mut self.grid));
        for occluder in &mut self.hinges {
            occluder.set_geometry(hinge.clone());
        }
        log::debug!("Shadow casters retessellated at {} accuracy", accuracy.as_str());
    }

    /// Place every occluder for this frame
    pub fn update(&mut self, snapshot: &BoardSnapshot) {
        let cfg = &self.cfg;

        let cube = double_cube_position(cfg, &snapshot.cube);
        self.cube.transform = Mat4::from_scale_rotation_translation(
            Vec3::splat(cfg.cube_size()),
            Quat::IDENTITY,
            cube,
        );
        self.cube.visible = true;

        for (die, occluder) in self.dice.iter_mut().enumerate() {
            match dice_position(cfg, die, &snapshot.dice) {
                Some(centre) => {
                    let spin = match &snapshot.dice {
                        DiceDisplay::OnBoard(placement) => placement.spins[die],
                        _ => 0.0,
                    };
                    occluder.transform = Mat4::from_scale_rotation_translation(
                        Vec3::splat(cfg.dice_size()),
                        Quat::from_rotation_z(spin),
                        centre,
                    );
                    occluder.visible = true;
                }
                None => occluder.visible = false,
            }
        }

        let mut slots = self.pieces.iter_mut();
        if let Some(pose) = &snapshot.moving_piece
            && let Some(occluder) = slots.next()
        {
            occluder.transform = Mat4::from_rotation_translation(pose.rotation, pose.position);
            occluder.visible = true;
        }
        let mut placed = 0;
        'points: for (point, &count) in snapshot.points.iter().enumerate() {
            let point = point as u32;
            for depth in 1..=count.unsigned_abs() {
                let Some(occluder) = slots.next() else {
                    break 'points;
                };
                occluder.transform = piece_transform(cfg, point, depth, snapshot.mirrored);
                occluder.visible = true;
                placed += 1;
            }
        }
        for occluder in slots {
            occluder.visible = false;
        }
        if snapshot.piece_count() > MAX_PIECES {
            log::warn!(
                "{} pieces on the board, only {placed} cast shadows",
                snapshot.piece_count()
            );
        }

        match snapshot.flag {
            Some(base) => {
                // Pole only; the cloth is too thin to matter
                let half = cfg.piece_gap() / 2.0;
                self.flag.transform = box_transform(
                    base - Vec3::new(half, half, 0.0),
                    base + Vec3::new(half, half, cfg.piece_hole() * 2.0),
                );
                self.flag.visible = true;
            }
            None => self.flag.visible = false,
        }
    }

    pub fn occluders(&self) -> impl Iterator<Item = &Occluder> {
        self.frame
            .iter()
            .chain(self.hinges.iter())
            .chain(std::iter::once(&self.cube))
            .chain(self.dice.iter())
            .chain(self.pieces.iter())
            .chain(std::iter::once(&self.flag))
    }

    /// Shadow volume of every visible occluder for `light`
    ///
    /// The returned slice borrows a buffer reused between frames.
    pub fn shadow_volume(&mut self, light: Vec4) -> &[Vec4] {
        let mut volume = std::mem::take(&mut self.volume);
        volume.clear();
        for occluder in self.occluders() {
            occluder.silhouette_volume(light, &mut volume);
        }
        self.volume = volume;
        &self.volume
    }
}

/// Unit cube occluder stretched over `min..max`
fn box_transform(min: Vec3, max: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(max - min, Quat::IDENTITY, (min + max) / 2.0)
}

fn piece_transform(cfg: &BoardConfig, point: u32, depth: u32, mirrored: bool) -> Mat4 {
    let position = piece_position(cfg, point, depth, mirrored);
    let rotation = piece_rotation(point);
    let transform = Mat4::from_rotation_translation(rotation, position);
    if point == HOME_BOTTOM || point == HOME_TOP {
        // Tray positions are the piece's centre, not its base
        transform * Mat4::from_translation(Vec3::new(0.0, 0.0, -cfg.piece_depth() / 2.0))
    } else {
        transform
    }
}

/// Frame edges, bar and inner tray walls standing on the playing surface
fn frame_panels(cfg: &BoardConfig) -> [(Vec3, Vec3); FRAME_PANELS] {
    let (w, h) = (cfg.total_width(), cfg.total_height());
    let (ew, eh) = (cfg.edge_width(), cfg.edge_height());
    let (z0, z1) = (cfg.base_depth(), cfg.edge_top());
    let span = |x0: f32, x1: f32| (Vec3::new(x0, eh, z0), Vec3::new(x1, h - eh, z1));
    let (bar_lo, bar_hi) = cfg.bar_extent();
    let (left_lo, left_hi) = cfg.tray_wall_extent(true);
    let (right_lo, right_hi) = cfg.tray_wall_extent(false);
    [
        (Vec3::new(0.0, 0.0, z0), Vec3::new(w, eh, z1)),
        (Vec3::new(0.0, h - eh, z0), Vec3::new(w, h, z1)),
        span(0.0, ew),
        span(w - ew, w),
        span(bar_lo, bar_hi),
        span(left_lo, left_hi),
        span(right_lo, right_hi),
    ]
}

fn hinge_length(cfg: &BoardConfig) -> f32 {
    cfg.piece_hole() * 2.0
}

/// Hinge centres, lying on the bar a quarter of the way in from each end
fn hinge_positions(cfg: &BoardConfig) -> [Vec3; 2] {
    let radius = cfg.bar_width() * 0.15;
    let x = cfg.centre().x;
    let z = cfg.edge_top() + radius;
    let h = cfg.total_height();
    [Vec3::new(x, h * 0.25, z), Vec3::new(x, h * 0.75, z)]
}

fn piece_geometry(cfg: &BoardConfig, accuracy: Accuracy, grid: &mut Grid3) -> OccluderGeometry {
    let profile = bevelled_cylinder(
        cfg.piece_hole() / 2.0 * 0.95,
        cfg.piece_depth(),
        cfg.piece_depth() * 0.15,
    );
    OccluderGeometry::lathe(&profile, accuracy.curve_segments(), grid)
}

fn hinge_geometry(cfg: &BoardConfig, accuracy: Accuracy, grid: &mut Grid3) -> OccluderGeometry {
    let radius = cfg.bar_width() * 0.15;
    let length = hinge_length(cfg);
    let profile = [Vec2::new(radius, 0.0), Vec2::new(radius, length)];
    // Hinges are small; half the piece resolution is plenty
    OccluderGeometry::lathe(&profile, (accuracy.curve_segments() / 2).max(3), grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CubeOwner, Player, scatter_dice};
    use crate::shadow::VERTICES_PER_EDGE;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn light() -> Vec4 {
        Vec4::new(5.0, 20.0, 25.0, 1.0)
    }

    #[test]
    fn test_starting_position_has_thirty_pieces() {
        let snapshot = BoardSnapshot::starting_position();
        assert_eq!(snapshot.piece_count(), MAX_PIECES);
        assert_eq!(snapshot.points.iter().sum::<i32>(), 0);
    }

    #[test]
    fn test_occluder_inventory() {
        let casters = ShadowCasters::new(&BoardConfig::default(), Accuracy::Low);
        // 7 panels, 2 hinges, cube, 2 dice, 30 pieces, flag
        assert_eq!(casters.occluders().count(), 43);
        assert_eq!(casters.occluders().filter(|o| o.visible).count(), 9);
    }

    #[test]
    fn test_update_places_pieces_and_dice() {
        let cfg = BoardConfig::default();
        let mut casters = ShadowCasters::new(&cfg, Accuracy::Medium);
        let mut snapshot = BoardSnapshot::starting_position();
        casters.update(&snapshot);
        assert_eq!(casters.pieces.iter().filter(|o| o.visible).count(), 30);
        assert!(casters.dice.iter().all(|d| !d.visible));

        // First piece goes to the first occupied point
        let first = piece_position(&cfg, 1, 1, false);
        let placed = casters.pieces[0].transform.transform_point3(Vec3::ZERO);
        assert!((placed - first).length() < 1e-5);

        let mut rng = Pcg32::seed_from_u64(9);
        snapshot.dice = DiceDisplay::OnBoard(scatter_dice(&cfg, Player::Two, &mut rng));
        snapshot.points[6] -= 1;
        snapshot.cube.owner = CubeOwner::Bottom;
        casters.update(&snapshot);
        assert!(casters.dice.iter().all(|d| d.visible));
        assert_eq!(casters.pieces.iter().filter(|o| o.visible).count(), 29);
    }

    #[test]
    fn test_moving_piece_takes_a_slot() {
        let cfg = BoardConfig::default();
        let mut casters = ShadowCasters::new(&cfg, Accuracy::Low);
        let mut snapshot = BoardSnapshot::starting_position();
        snapshot.points[24] -= 1;
        let at = Vec3::new(3.0, 4.0, 1.5);
        snapshot.moving_piece = Some(PiecePose {
            position: at,
            rotation: Quat::IDENTITY,
            finished: false,
        });
        casters.update(&snapshot);
        assert_eq!(casters.pieces.iter().filter(|o| o.visible).count(), 30);
        assert!((casters.pieces[0].transform.transform_point3(Vec3::ZERO) - at).length() < 1e-6);
    }

    #[test]
    fn test_landed_piece_leaves_no_stale_shadow() {
        let cfg = BoardConfig::default();
        let mut casters = ShadowCasters::new(&cfg, Accuracy::Low);
        let mut flying = BoardSnapshot::starting_position();
        flying.points[24] -= 1;
        let at = Vec3::new(3.0, 4.0, 1.5);
        flying.moving_piece = Some(PiecePose {
            position: at,
            rotation: Quat::IDENTITY,
            finished: false,
        });
        casters.update(&flying);

        casters.update(&BoardSnapshot::starting_position());
        let visible: Vec<_> = casters.pieces.iter().filter(|o| o.visible).collect();
        assert_eq!(visible.len(), MAX_PIECES);
        for occluder in visible {
            let placed = occluder.transform.transform_point3(Vec3::ZERO);
            assert!((placed - at).length() > 1e-3, "piece left at the in-flight pose");
        }
    }

    #[test]
    fn test_tray_pieces_lie_on_their_side() {
        let cfg = BoardConfig::default();
        let transform = piece_transform(&cfg, HOME_BOTTOM, 1, false);
        let centre = transform.transform_point3(Vec3::new(0.0, 0.0, cfg.piece_depth() / 2.0));
        assert!((centre - piece_position(&cfg, HOME_BOTTOM, 1, false)).length() < 1e-5);
        let axis = transform.transform_vector3(Vec3::Z);
        assert!(axis.z.abs() < 1e-5);
    }

    #[test]
    fn test_shadow_volume_reuses_buffer() {
        let mut casters = ShadowCasters::new(&BoardConfig::default(), Accuracy::Medium);
        casters.update(&BoardSnapshot::starting_position());
        let first = casters.shadow_volume(light()).len();
        assert!(first > 0);
        assert_eq!(first % VERTICES_PER_EDGE, 0);
        let capacity = casters.volume.capacity();
        let second = casters.shadow_volume(light()).len();
        assert_eq!(first, second);
        assert_eq!(casters.volume.capacity(), capacity);
    }

    #[test]
    fn test_accuracy_changes_piece_silhouettes() {
        let mut casters = ShadowCasters::new(&BoardConfig::default(), Accuracy::Low);
        casters.update(&BoardSnapshot::starting_position());
        let low = casters.shadow_volume(light()).len();
        casters.set_accuracy(Accuracy::High);
        assert_eq!(casters.accuracy(), Accuracy::High);
        let high = casters.shadow_volume(light()).len();
        assert!(high > low);
    }

    #[test]
    fn test_flag_follows_snapshot() {
        let mut casters = ShadowCasters::new(&BoardConfig::default(), Accuracy::Low);
        let mut snapshot = BoardSnapshot::default();
        casters.update(&snapshot);
        assert!(!casters.flag.visible);
        snapshot.flag = Some(Vec3::new(2.0, 3.0, 0.3));
        casters.update(&snapshot);
        assert!(casters.flag.visible);
    }
}
