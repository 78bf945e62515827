//! board3d demo entry point
//!
//! Loads settings, fits the view for a 16:9 viewport, plays a move and a
//! dice throw and reports the shadow volume size. Everything is logged;
//! run with `RUST_LOG=debug` for the per-fit details.
//!
//! Usage: `board3d [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("board3d (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    if let Err(e) = demo::run(settings_path.as_deref(), seed) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on the web; the embedding page drives it
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use board3d::anim::{DiceAnimation, PieceAnimation};
    use board3d::board::{CubeState, DiceDisplay, Player, piece_position, scatter_dice};
    use board3d::shadow::{BoardSnapshot, ShadowCasters, VERTICES_PER_EDGE};
    use board3d::view::{ViewAnchors, fit_view_volume};
    use board3d::{Result, Settings};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ASPECT: f32 = 16.0 / 9.0;
    /// Frames sampled along each animation
    const SAMPLES: u32 = 8;

    pub fn run(settings_path: Option<&str>, seed: u64) -> Result<()> {
        let settings = match settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let cfg = &settings.board;
        log::info!(
            "Board {:.2} x {:.2} units, shadows {} at {} accuracy",
            cfg.total_width(),
            cfg.total_height(),
            if settings.shadows.enabled { "on" } else { "off" },
            settings.shadows.accuracy.as_str()
        );

        let anchors = ViewAnchors::for_board(
            cfg,
            &CubeState::default(),
            settings.view.dice_below_board,
        );
        let view = fit_view_volume(cfg, &settings.view, &anchors, ASPECT)?;
        log::info!(
            "View fitted: zoom {:.3}, frustum {:.4} x {:.4} at near {}, far {:.2}",
            view.zoom,
            view.hor_frustum,
            view.vert_frustum,
            view.near,
            view.far
        );

        // Back checker runs from the 24 point
        let mut snapshot = BoardSnapshot::starting_position();
        snapshot.points[24] -= 1;
        let mut piece = PieceAnimation::for_move(cfg, &settings.animation, (24, 2), (18, 1), false)?;
        let duration = piece.duration_ms();
        log::info!(
            "Move 24 -> 18: {:.2} units in {duration:.0} ms",
            piece.path().total_length()
        );
        for i in 0..=SAMPLES {
            let pose = piece.tick(duration * i as f32 / SAMPLES as f32);
            let ndc = view.project(pose.position);
            log::info!(
                "  t={:>5.0} ms at {:.3} (screen {:.2}, {:.2}){}",
                duration * i as f32 / SAMPLES as f32,
                pose.position,
                ndc.x,
                ndc.y,
                if pose.finished { " landed" } else { "" }
            );
        }
        let landed = piece_position(cfg, 18, 1, false);
        log::debug!("Landing point {landed:.3}");
        snapshot.points[18] += 1;

        let mut rng = Pcg32::seed_from_u64(seed);
        let placement = scatter_dice(cfg, Player::One, &mut rng);
        if settings.animation.animate_dice {
            let mut dice = DiceAnimation::new(cfg, &placement, &settings.animation, &mut rng)?;
            let duration = dice.duration_ms();
            log::info!("Dice throw over {duration:.0} ms");
            for i in 0..=SAMPLES {
                let [a, b] = dice.tick(duration * i as f32 / SAMPLES as f32);
                log::debug!("  dice at {:.3} and {:.3}", a.position, b.position);
            }
        }
        snapshot.dice = DiceDisplay::OnBoard(placement);

        if settings.shadows.enabled {
            let mut casters = ShadowCasters::new(cfg, settings.shadows.accuracy);
            casters.update(&snapshot);
            let volume = casters.shadow_volume(settings.shadows.light());
            log::info!(
                "Shadow volume: {} silhouette edges, {} vertices",
                volume.len() / VERTICES_PER_EDGE,
                volume.len()
            );
        }

        Ok(())
    }
}
