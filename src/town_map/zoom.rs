//! Detail zoom in and out of the atlas canvas.
//!
//! Zooming animates two viewport parameters together: the scale factor
//! and the scroll offset. Zooming in parks the cursor at a fixed screen
//! position so the detail panel never covers it; zooming out re-centers
//! the cursor in the full view.

use bevy::prelude::*;

use super::{MapPhase, TownMapSession};
use crate::animate::Tween;
use crate::shared::*;

/// In-flight zoom animation.
#[derive(Debug, Clone, Copy)]
pub struct ZoomGlide {
    pub zoom: Tween<f32>,
    pub offset: Tween<Vec2>,
    /// Zooming back out to the overview.
    pub out: bool,
}

/// Starts the zoom-in glide toward [`DETAIL_ZOOM`]. The offset target
/// pins the cursor at [`ZOOM_CURSOR_POS`], clamped to the zoomed canvas.
pub(super) fn start_zoom_in(session: &mut TownMapSession) {
    let cell = session.cursor.as_vec2();
    let cursor_px = session.viewport.point_to_screen_at(cell, DETAIL_ZOOM);
    let max = session.viewport.max_offset_for(DETAIL_ZOOM, true);
    let target = (cursor_px - ZOOM_CURSOR_POS).min(max).max(Vec2::ZERO);

    session.zoom_anim = Some(ZoomGlide {
        zoom: Tween::new(session.viewport.zoom, DETAIL_ZOOM, ZOOM_TIME),
        offset: Tween::new(session.viewport.offset, target, ZOOM_TIME),
        out: false,
    });
    session.viewport.zoomed = true;
    session.details_visible = true;
    session.phase = MapPhase::Zooming;
}

/// Starts the zoom-out glide back to scale 1, ending with the cursor as
/// close to the view center as the canvas allows.
pub(super) fn start_zoom_out(session: &mut TownMapSession) {
    let cell = session.cursor.as_vec2();
    let cursor_px = session.viewport.point_to_screen_at(cell, 1.0);
    let max = session.viewport.max_offset_for(1.0, false);
    let target = (cursor_px - MAP_VIEW_SIZE / 2.0).min(max).max(Vec2::ZERO);

    session.zoom_anim = Some(ZoomGlide {
        zoom: Tween::new(session.viewport.zoom, 1.0, ZOOM_TIME),
        offset: Tween::new(session.viewport.offset, target, ZOOM_TIME),
        out: true,
    });
    session.viewport.zoomed = false;
    session.phase = MapPhase::Zooming;
}

/// Advances the glide and keeps the cursor sprite glued to its cell,
/// which moves in screen space as the scale changes.
pub(super) fn advance(session: &mut TownMapSession, dt: f32) {
    let Some(mut glide) = session.zoom_anim else {
        session.phase = if session.viewport.zoomed {
            MapPhase::Zoomed
        } else {
            MapPhase::Idle
        };
        return;
    };

    session.viewport.zoom = glide.zoom.advance(dt);
    session.viewport.offset = glide.offset.advance(dt);
    session.cursor_px = session.viewport.point_to_screen(session.cursor.as_vec2());

    if glide.zoom.finished() && glide.offset.finished() {
        session.zoom_anim = None;
        if glide.out {
            session.details_visible = false;
            session.phase = MapPhase::Idle;
        } else {
            session.phase = MapPhase::Zoomed;
        }
    } else {
        session.zoom_anim = Some(glide);
    }
}

// ─── Systems ────────────────────────────────────────────────────────────

pub fn advance_zoom(mut session: ResMut<TownMapSession>, time: Res<Time>) {
    if session.phase != MapPhase::Zooming {
        return;
    }
    advance(&mut session, time.delta_secs());
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
