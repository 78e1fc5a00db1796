//! Cursor movement over the atlas grid.
//!
//! Direction input is held-state: the cursor keeps stepping cell by cell
//! while a key is down, one glide per cell. The logical cell updates the
//! moment a glide starts; only the sprite trails behind, so lookups and
//! the details panel always reflect the destination.

use bevy::prelude::*;

use super::{MapPhase, TownMapSession};
use crate::animate::Tween;
use crate::shared::*;

/// In-flight cursor animation, one tween per axis. Axes finish on their
/// own clocks; a straight move has a zero-duration tween on the idle axis.
#[derive(Debug, Clone, Copy)]
pub struct CursorGlide {
    pub x: Tween<f32>,
    pub y: Tween<f32>,
}

/// Starts a one-cell glide. The step must already be validated.
pub(super) fn start_glide(session: &mut TownMapSession, dx: i32, dy: i32) {
    let from = session.cursor;
    let to = IVec2::new(from.x + dx, from.y + dy);
    session.cursor = to;

    // Glide time scales with distance and zoom, per axis.
    let zoom = session.viewport.zoom;
    session.move_anim = Some(CursorGlide {
        x: Tween::new(
            from.x as f32,
            to.x as f32,
            CURSOR_MOVE_TIME * dx.abs() as f32 * zoom,
        ),
        y: Tween::new(
            from.y as f32,
            to.y as f32,
            CURSOR_MOVE_TIME * dy.abs() as f32 * zoom,
        ),
    });
    session.phase = MapPhase::CursorMoving;
}

/// Applies one frame of held direction input. Each axis is validated on
/// its own, so a diagonal against a grid edge degrades to the open axis
/// instead of stopping. Returns whether a glide started.
pub(super) fn direction_step(session: &mut TownMapSession, mut dx: i32, mut dy: i32) -> bool {
    if dx != 0 && !session.viewport.in_bounds(session.cursor.x + dx, session.cursor.y) {
        dx = 0;
    }
    if dy != 0 && !session.viewport.in_bounds(session.cursor.x, session.cursor.y + dy) {
        dy = 0;
    }
    if dx == 0 && dy == 0 {
        return false;
    }
    start_glide(session, dx, dy);
    true
}

/// Advances the glide, moves the sprite, and lets the viewport follow it.
pub(super) fn advance_glide(session: &mut TownMapSession, dt: f32) {
    let Some(mut glide) = session.move_anim else {
        session.phase = rest_phase(session);
        return;
    };

    let cell = Vec2::new(glide.x.advance(dt), glide.y.advance(dt));
    session.cursor_px = session.viewport.point_to_screen(cell);
    let px = session.cursor_px;
    session.viewport.follow(px);

    if glide.x.finished() && glide.y.finished() {
        session.move_anim = None;
        session.phase = rest_phase(session);
    } else {
        session.move_anim = Some(glide);
    }
}

fn rest_phase(session: &TownMapSession) -> MapPhase {
    if session.viewport.zoomed {
        MapPhase::Zoomed
    } else {
        MapPhase::Idle
    }
}

// ─── Systems ────────────────────────────────────────────────────────────

pub fn cursor_direction_input(mut session: ResMut<TownMapSession>, input: Res<PlayerInput>) {
    if !matches!(session.phase, MapPhase::Idle | MapPhase::Zoomed) {
        return;
    }
    let dx = (input.right as i32) - (input.left as i32);
    let dy = (input.down as i32) - (input.up as i32);
    if dx == 0 && dy == 0 {
        return;
    }
    direction_step(&mut session, dx, dy);
}

pub fn advance_cursor_glide(mut session: ResMut<TownMapSession>, time: Res<Time>) {
    if session.phase != MapPhase::CursorMoving {
        return;
    }
    advance_glide(&mut session, time.delta_secs());
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: (i32, i32)) -> TownMapSession {
        let region = RegionDef {
            id: "test".into(),
            id_number: 0,
            name: "Test".into(),
            map_image: "test.png".into(),
            size,
            margins: (0, 0),
            cell_size: (16, 16),
            points: vec![],
        };
        TownMapSession::new(region, MapMode::Normal)
    }

    #[test]
    fn the_logical_cell_updates_when_the_glide_starts() {
        let mut s = session((10, 10));
        s.warp_cursor(0, 0);

        assert!(direction_step(&mut s, 1, 0));
        assert_eq!(s.cursor, IVec2::new(1, 0));
        assert_eq!(s.phase, MapPhase::CursorMoving);
        // The sprite has not moved yet.
        assert_eq!(s.cursor_px, Vec2::new(8.0, 8.0));
    }

    #[test]
    fn a_glide_covers_one_cell_in_cursor_move_time() {
        let mut s = session((10, 10));
        s.warp_cursor(0, 0);
        direction_step(&mut s, 1, 0);

        advance_glide(&mut s, CURSOR_MOVE_TIME / 2.0);
        assert_eq!(s.cursor_px, Vec2::new(16.0, 8.0));
        assert_eq!(s.phase, MapPhase::CursorMoving);

        advance_glide(&mut s, CURSOR_MOVE_TIME);
        assert_eq!(s.cursor_px, Vec2::new(24.0, 8.0));
        assert_eq!(s.phase, MapPhase::Idle);
        assert!(s.move_anim.is_none());
    }

    #[test]
    fn zoom_stretches_the_glide_clock() {
        let mut s = session((30, 20));
        s.viewport.zoom = 2.0;
        s.viewport.zoomed = true;
        s.warp_cursor(5, 5);
        direction_step(&mut s, 1, 0);

        advance_glide(&mut s, CURSOR_MOVE_TIME);
        assert_eq!(s.phase, MapPhase::CursorMoving, "double time at zoom 2");

        advance_glide(&mut s, CURSOR_MOVE_TIME + 0.001);
        assert_eq!(s.phase, MapPhase::Zoomed, "rests zoomed, not idle");
    }

    #[test]
    fn diagonals_degrade_to_the_open_axis_at_an_edge() {
        let mut s = session((10, 10));
        s.warp_cursor(0, 0);

        // Up-right against the top edge: only the x step survives.
        assert!(direction_step(&mut s, 1, -1));
        assert_eq!(s.cursor, IVec2::new(1, 0));
    }

    #[test]
    fn a_fully_blocked_step_does_nothing() {
        let mut s = session((10, 10));
        s.warp_cursor(0, 0);

        assert!(!direction_step(&mut s, -1, -1));
        assert_eq!(s.cursor, IVec2::new(0, 0));
        assert_eq!(s.phase, MapPhase::Idle);
        assert!(s.move_anim.is_none());
    }

    #[test]
    fn a_diagonal_glide_finishes_both_axes() {
        let mut s = session((10, 10));
        s.warp_cursor(4, 4);
        direction_step(&mut s, 1, 1);
        assert_eq!(s.cursor, IVec2::new(5, 5));

        advance_glide(&mut s, CURSOR_MOVE_TIME * 2.0);
        assert_eq!(s.phase, MapPhase::Idle);
        assert_eq!(s.cursor_px, s.viewport.point_to_screen(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn the_viewport_follows_a_glide_into_the_edge_band() {
        let mut s = session((40, 30));
        // Start just left of the right-hand scroll band.
        s.warp_cursor(25, 10);
        assert_eq!(s.viewport.offset, Vec2::ZERO);

        direction_step(&mut s, 1, 0);
        advance_glide(&mut s, CURSOR_MOVE_TIME * 2.0);

        // Cell 26 centers at 424 px; its right edge crosses 480 - 64.
        assert_eq!(s.viewport.offset.x, 16.0);
        assert_eq!(s.viewport.offset.y, 0.0);
    }
}
