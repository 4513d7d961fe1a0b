use glam::Vec2;
use gridcaster_core::{ActorView, CellCoord, ColumnStrip, Palette, Rgb, TileView};

use crate::framebuffer::{pack_rgb, FrameBuffer, Sprite};

/// Distance in pixels between the minimap and the top-left corner.
pub const MINIMAP_MARGIN: u32 = 6;

/// Top-down inputs for the minimap.
#[derive(Clone, Copy, Debug)]
pub struct MinimapScene<'a> {
    /// Grid to rasterize.
    pub tiles: TileView<'a>,
    /// Player position in world units.
    pub player: Vec2,
    /// Actors; only live ones are marked.
    pub actors: &'a ActorView,
}

/// Weapon sprite drawn at the bottom centre of the frame.
#[derive(Clone, Copy, Debug)]
pub struct WeaponOverlay<'a> {
    /// Sprite to draw.
    pub sprite: &'a Sprite,
    /// Remaining recoil in `0.0..=1.0`; scales the downward offset.
    pub recoil: f32,
}

/// Everything composed into a single frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// One strip per screen column.
    pub strips: &'a [ColumnStrip],
    /// Minimap inputs, or `None` when the minimap is hidden.
    pub minimap: Option<MinimapScene<'a>>,
    /// Weapon overlay, or `None` when no sprite was loaded.
    pub weapon: Option<WeaponOverlay<'a>>,
}

/// Writes sky, floor, strips, minimap and overlay into a [`FrameBuffer`].
#[derive(Clone, Debug)]
pub struct Compositor {
    palette: Palette,
    minimap_scale: u32,
    recoil_offset: u32,
}

impl Compositor {
    /// Creates a compositor drawing minimap cells as `minimap_scale`-pixel blocks.
    #[must_use]
    pub fn new(palette: Palette, minimap_scale: u32, recoil_offset: u32) -> Self {
        Self {
            palette,
            minimap_scale,
            recoil_offset,
        }
    }

    /// Overwrites `frame` with the composed scene.
    pub fn compose(&self, frame: &mut FrameBuffer, scene: &Scene<'_>) {
        self.fill_background(frame);
        Self::draw_strips(frame, scene.strips);
        if let Some(minimap) = scene.minimap {
            self.draw_minimap(frame, &minimap);
        }
        if let Some(weapon) = scene.weapon {
            self.draw_weapon(frame, &weapon);
        }
    }

    fn fill_background(&self, frame: &mut FrameBuffer) {
        let horizon = frame.height() / 2;
        frame.fill_rows(0, horizon, pack_rgb(self.palette.sky));
        frame.fill_rows(horizon, frame.height(), pack_rgb(self.palette.floor));
    }

    fn draw_strips(frame: &mut FrameBuffer, strips: &[ColumnStrip]) {
        let horizon = i64::from(frame.height() / 2);
        for strip in strips {
            let column = i64::from(strip.column);
            if let Some(wall) = strip.wall {
                draw_span(frame, column, horizon, wall.height, wall.color);
            }
            if let Some(actor) = strip.actor {
                debug_assert!(
                    strip.wall.map_or(true, |wall| actor.distance <= wall.distance),
                    "actor strip drawn over a nearer wall"
                );
                draw_span(frame, column, horizon, actor.height, actor.color);
            }
        }
    }

    fn draw_minimap(&self, frame: &mut FrameBuffer, minimap: &MinimapScene<'_>) {
        let tiles = minimap.tiles;
        let player = tiles.cell_at(minimap.player);
        let actors: Vec<CellCoord> = minimap
            .actors
            .iter_live()
            .filter_map(|actor| tiles.cell_at(actor.position))
            .collect();

        let origin = i64::from(MINIMAP_MARGIN);
        let scale = i64::from(self.minimap_scale);
        for (cell, tile) in tiles.iter() {
            let color = if player == Some(cell) {
                self.palette.minimap_player
            } else if actors.contains(&cell) {
                self.palette.minimap_actor
            } else if tile.is_solid() {
                self.palette.minimap_wall
            } else {
                self.palette.minimap_floor
            };
            frame.fill_block(
                origin + i64::from(cell.column()) * scale,
                origin + i64::from(cell.row()) * scale,
                self.minimap_scale,
                pack_rgb(color),
            );
        }
    }

    fn draw_weapon(&self, frame: &mut FrameBuffer, weapon: &WeaponOverlay<'_>) {
        let sprite = weapon.sprite;
        let offset = (weapon.recoil.clamp(0.0, 1.0) * self.recoil_offset as f32).round() as i64;
        let left = (i64::from(frame.width()) - i64::from(sprite.width())) / 2;
        let top = i64::from(frame.height()) - i64::from(sprite.height()) + offset;
        for (x, y, pixel) in sprite.opaque_pixels() {
            frame.set_pixel(left + i64::from(x), top + i64::from(y), pixel);
        }
    }
}

fn draw_span(frame: &mut FrameBuffer, column: i64, horizon: i64, height: f32, color: Rgb) {
    let extent = if height.is_finite() {
        height.round().clamp(0.0, i64::from(u32::MAX) as f32) as i64
    } else {
        0
    };
    frame.fill_column(column, horizon - extent, horizon + extent, pack_rgb(color));
}
