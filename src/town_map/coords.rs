//! Grid-to-canvas projection and viewport scrolling.
//!
//! The atlas artwork is laid out as a grid of fixed-size cells inside an
//! optional pixel border. Everything on the screen (cursor, pins, icons)
//! lives in *canvas* coordinates: pixels within the zoom-scaled artwork.
//! The view window shows a `MAP_VIEW_SIZE` cut-out of the canvas starting
//! at `offset`; scrolling and zooming only ever move that offset.

use bevy::prelude::*;

use crate::shared::*;

/// Scroll/zoom state of the atlas view window.
#[derive(Debug, Clone)]
pub struct MapViewport {
    /// Pixel size of one grid cell at zoom 1.
    pub cell: Vec2,
    /// Artwork border outside the grid at zoom 1.
    pub margins: Vec2,
    /// Grid extent in cells.
    pub grid: Vec2,
    /// Canvas position of the view window's top-left corner.
    pub offset: Vec2,
    pub zoom: f32,
    /// Detail mode: the window shows less of the canvas and the cursor is
    /// pinned to `ZOOM_CURSOR_POS` instead of edge-scrolling.
    pub zoomed: bool,
}

impl MapViewport {
    pub fn new(region: &RegionDef) -> Self {
        Self {
            cell: Vec2::new(region.cell_size.0 as f32, region.cell_size.1 as f32),
            margins: Vec2::new(region.margins.0 as f32, region.margins.1 as f32),
            grid: Vec2::new(region.size.0 as f32, region.size.1 as f32),
            offset: Vec2::ZERO,
            zoom: 1.0,
            zoomed: false,
        }
    }

    /// Canvas position of a cell's center. `cell` may be fractional while
    /// the cursor glides between two cells.
    pub fn point_to_screen(&self, cell: Vec2) -> Vec2 {
        self.point_to_screen_at(cell, self.zoom)
    }

    /// Same projection evaluated at an explicit zoom factor, for computing
    /// where things will sit once a zoom transition lands.
    pub fn point_to_screen_at(&self, cell: Vec2, zoom: f32) -> Vec2 {
        ((cell * self.cell) + self.cell * 0.5 + self.margins) * zoom
    }

    /// Full canvas size at the given zoom.
    pub fn canvas_size_at(&self, zoom: f32) -> Vec2 {
        (self.grid * self.cell + self.margins * 2.0) * zoom
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size_at(self.zoom)
    }

    /// How much of the canvas the view window exposes. Zoomed mode keeps
    /// the cursor at `ZOOM_CURSOR_POS`, which shrinks the reachable extent
    /// to twice that position rather than the full window.
    pub fn visible_size_for(zoomed: bool) -> Vec2 {
        if zoomed {
            ZOOM_CURSOR_POS * 2.0
        } else {
            MAP_VIEW_SIZE
        }
    }

    /// Largest legal offset for the given zoom state.
    pub fn max_offset_for(&self, zoom: f32, zoomed: bool) -> Vec2 {
        (self.canvas_size_at(zoom) - Self::visible_size_for(zoomed)).max(Vec2::ZERO)
    }

    pub fn max_offset(&self) -> Vec2 {
        self.max_offset_for(self.zoom, self.zoomed)
    }

    /// Pulls the offset back inside the canvas. Applying this twice changes
    /// nothing. When the canvas is smaller than the window the lower bound
    /// wins and the offset pins to zero.
    pub fn clamp_offset(&mut self) {
        let max = self.max_offset();
        self.offset = self.offset.min(max).max(Vec2::ZERO);
    }

    /// Jumps the window so `canvas_pos` sits in the middle, then clamps.
    pub fn center_on(&mut self, canvas_pos: Vec2) {
        self.offset = canvas_pos - MAP_VIEW_SIZE * 0.5;
        self.clamp_offset();
    }

    /// Scroll-follow for the gliding cursor.
    ///
    /// Zoomed, the window tracks the cursor exactly so it stays pinned at
    /// `ZOOM_CURSOR_POS`. Unzoomed, the window only moves once the cursor
    /// sprite crosses into the `MAP_SCROLL_PADDING` band along an edge, and
    /// then only enough to keep it on the band's boundary.
    pub fn follow(&mut self, cursor_px: Vec2) {
        if self.zoomed {
            let pinned = cursor_px - ZOOM_CURSOR_POS;
            if pinned != self.offset {
                self.offset = pinned;
                self.clamp_offset();
            }
            return;
        }

        let half = self.cell * 0.5;
        let mut changed = false;

        if cursor_px.x - half.x < self.offset.x + MAP_SCROLL_PADDING.x {
            self.offset.x = cursor_px.x - half.x - MAP_SCROLL_PADDING.x;
            changed = true;
        } else if cursor_px.x + half.x
            > self.offset.x + MAP_VIEW_SIZE.x - MAP_SCROLL_PADDING.x - self.margins.x
        {
            self.offset.x =
                cursor_px.x + half.x - MAP_VIEW_SIZE.x + MAP_SCROLL_PADDING.x + self.margins.x;
            changed = true;
        }

        if cursor_px.y - half.y < self.offset.y + MAP_SCROLL_PADDING.y {
            self.offset.y = cursor_px.y - half.y - MAP_SCROLL_PADDING.y;
            changed = true;
        } else if cursor_px.y + half.y
            > self.offset.y + MAP_VIEW_SIZE.y - MAP_SCROLL_PADDING.y - self.margins.y
        {
            self.offset.y =
                cursor_px.y + half.y - MAP_VIEW_SIZE.y + MAP_SCROLL_PADDING.y + self.margins.y;
            changed = true;
        }

        if changed {
            self.clamp_offset();
        }
    }

    /// Whether a cell lies on the grid at all.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as f32) < self.grid.x && (y as f32) < self.grid.y
    }
}
