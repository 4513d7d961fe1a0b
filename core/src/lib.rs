#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridcaster engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`TileView`] and [`ActorView`], and respond exclusively with
//! new command batches. The ray caster additionally produces [`ColumnStrip`]
//! values that rendering adapters rasterise.

mod config;

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{
    ActorSpawn, ConfigError, MotionConfig, Palette, PlayerStart, ScreenConfig, ViewConfig,
    WeaponConfig, WorldConfig, DEFAULT_LAYOUT,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a new frame and advances the simulation clock by `dt`.
    ///
    /// Clears every actor's damaged-this-frame flag and counts down weapon timers.
    Tick {
        /// Duration of wall-clock time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Replaces the player pose with an integrated, collision-checked pose.
    UpdatePose {
        /// Pose the player should adopt.
        pose: Pose,
    },
    /// Requests that the player's weapon fire a single hit-scan shot.
    FireWeapon,
    /// Requests that one unit of damage is applied to an actor.
    DamageActor {
        /// Identifier of the actor struck by the shot.
        actor: ActorId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that a new frame started and the simulation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the frame.
        dt: Duration,
    },
    /// Confirms that the player pose changed.
    PoseUpdated {
        /// Pose held before the update.
        from: Pose,
        /// Pose held after the update.
        to: Pose,
    },
    /// Reports that the player stands inside the hit box of a live actor.
    ActorContact {
        /// Identifier of the actor touched by the player.
        actor: ActorId,
    },
    /// Confirms that the weapon fired during this frame.
    WeaponFired,
    /// Confirms that an actor lost one unit of health.
    ActorDamaged {
        /// Identifier of the damaged actor.
        actor: ActorId,
        /// Health remaining after the damage was applied.
        remaining: u32,
    },
    /// Announces that an actor's health reached zero.
    ActorKilled {
        /// Identifier of the actor that died.
        actor: ActorId,
    },
    /// Reports that a damage request was rejected by the world.
    DamageRejected {
        /// Identifier of the actor targeted by the request.
        actor: ActorId,
        /// Specific reason the damage was not applied.
        reason: DamageError,
    },
}

/// Reasons a damage request may be rejected by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum DamageError {
    /// No actor with the provided identifier exists.
    #[error("actor does not exist")]
    Missing,
    /// The actor's health already reached zero.
    #[error("actor is already dead")]
    Dead,
    /// The actor was already damaged during the current frame.
    #[error("actor was already damaged this frame")]
    AlreadyDamaged,
}

/// Classification of a single grid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCode {
    /// Walkable floor that rays pass through.
    #[default]
    Empty,
    /// Interior wall.
    Wall,
    /// Outer boundary, also reported for every query outside the grid.
    Boundary,
}

impl TileCode {
    /// Reports whether the tile stops rays and player motion.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Boundary)
    }

    /// Parses a layout glyph (`.` or space, `#`, `%`).
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            '%' => Some(Self::Boundary),
            _ => None,
        }
    }
}

/// Opaque RGB color used by strips, palettes and markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Subtracts `amount` from every channel, flooring each at zero.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let amount = amount.max(0.0);
        Self {
            red: darken_channel(self.red, amount),
            green: darken_channel(self.green, amount),
            blue: darken_channel(self.blue, amount),
        }
    }

    /// Multiplies every channel by `factor` clamped into `0.0..=1.0`.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            red: (f32::from(self.red) * factor) as u8,
            green: (f32::from(self.green) * factor) as u8,
            blue: (f32::from(self.blue) * factor) as u8,
        }
    }
}

fn darken_channel(channel: u8, amount: f32) -> u8 {
    (f32::from(channel) - amount).max(0.0) as u8
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Wraps an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_heading(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Continuous player position and heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position measured in world units.
    pub position: Vec2,
    /// Heading in radians, kept within `[0, 2π)`.
    pub heading: f32,
}

impl Pose {
    /// Creates a pose, normalising the heading.
    #[must_use]
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading: normalize_heading(heading),
        }
    }

    /// Unit vector pointing along the heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.heading.cos(), self.heading.sin())
    }
}

/// Requested translation along the heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MoveIntent {
    /// Move along the heading.
    Forward,
    /// Move against the heading.
    Backward,
    /// Stand still.
    #[default]
    None,
}

impl MoveIntent {
    /// Signed multiplier applied to the forward vector.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
            Self::None => 0.0,
        }
    }
}

/// Requested rotation of the heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnIntent {
    /// Rotate counter-clockwise on screen, decreasing the heading.
    Left,
    /// Rotate clockwise on screen, increasing the heading.
    Right,
    /// Keep the heading.
    #[default]
    None,
}

impl TurnIntent {
    /// Signed multiplier applied to the rotation speed.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::None => 0.0,
        }
    }
}

/// Movement and turn intents derived from one input snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MotionIntent {
    /// Requested translation.
    pub movement: MoveIntent,
    /// Requested rotation.
    pub turn: TurnIntent,
}

impl MotionIntent {
    /// Creates a new motion intent.
    #[must_use]
    pub const fn new(movement: MoveIntent, turn: TurnIntent) -> Self {
        Self { movement, turn }
    }
}

/// Read-only view into the immutable tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [TileCode],
    columns: u32,
    rows: u32,
    tile_size: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(tiles: &'a [TileCode], columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            tiles,
            columns,
            rows,
            tile_size,
        }
    }

    /// Side length of one cell in world units.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Total width of the grid in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size as f32
    }

    /// Total height of the grid in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size as f32
    }

    /// Returns the tile at the provided cell, or [`TileCode::Boundary`] outside the grid.
    #[must_use]
    pub fn tile_at(&self, column: i64, row: i64) -> TileCode {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return TileCode::Boundary;
        }
        let Ok(index) = usize::try_from(row * i64::from(self.columns) + column) else {
            return TileCode::Boundary;
        };
        self.tiles.get(index).copied().unwrap_or(TileCode::Boundary)
    }

    /// Reports whether the world-space point lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.is_finite()
            && point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.width()
            && point.y < self.height()
    }

    /// Converts a world-space point into the cell containing it.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if !self.contains(point) || self.tile_size == 0 {
            return None;
        }
        let size = self.tile_size as f32;
        let column = ((point.x / size).floor() as u32).min(self.columns.saturating_sub(1));
        let row = ((point.y / size).floor() as u32).min(self.rows.saturating_sub(1));
        Some(CellCoord::new(column, row))
    }

    /// Reports whether the point lies in a solid cell; points outside the grid are solid.
    #[must_use]
    pub fn is_solid_at(&self, point: Vec2) -> bool {
        match self.cell_at(point) {
            Some(cell) => self
                .tile_at(i64::from(cell.column()), i64::from(cell.row()))
                .is_solid(),
            None => true,
        }
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileCode)> + 'a {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Center of the actor in world units.
    pub position: Vec2,
    /// Half the side length of the actor's square hit box.
    pub half_width: f32,
    /// Remaining health; zero means dead.
    pub health: u32,
    /// Health the actor was created with.
    pub max_health: u32,
}

impl ActorSnapshot {
    /// Reports whether the actor still takes part in hit detection and rendering.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Reports whether the point lies inside the actor's square hit box.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = (point - self.position).abs();
        offset.x <= self.half_width && offset.y <= self.half_width
    }

    /// Remaining health as a fraction of the starting health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}

/// Read-only snapshot describing every actor in registry order.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over every actor, dead or alive, in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over actors with positive health.
    pub fn iter_live(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_alive())
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of registered actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the registry holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Borrows the snapshots as a slice in registry order.
    #[must_use]
    pub fn as_slice(&self) -> &[ActorSnapshot] {
        &self.snapshots
    }
}

/// Timers describing the weapon's readiness and recoil.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeaponSnapshot {
    /// Time remaining until the weapon may fire again.
    pub ready_in: Duration,
    /// Time remaining on the current recoil animation.
    pub recoil_remaining: Duration,
    /// Full length of a recoil animation.
    pub recoil_duration: Duration,
}

impl WeaponSnapshot {
    /// Reports whether the cooldown elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_in.is_zero()
    }

    /// Remaining recoil as a fraction of the full animation, `0.0..=1.0`.
    #[must_use]
    pub fn recoil_fraction(&self) -> f32 {
        if self.recoil_duration.is_zero() {
            return 0.0;
        }
        (self.recoil_remaining.as_secs_f32() / self.recoil_duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// First solid tile reached by a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallHit {
    /// March distance at which the wall cell was entered.
    pub distance: f32,
    /// Tile that stopped the ray.
    pub tile: TileCode,
}

/// First actor intersected by a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorHit {
    /// Identifier of the intersected actor.
    pub actor: ActorId,
    /// March distance at the first intersection.
    pub distance: f32,
}

/// Result of marching a single ray.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RayHit {
    /// Wall that stopped the ray; `None` when the ray left the grid or hit the distance cap.
    pub wall: Option<WallHit>,
    /// Nearest actor crossed before the march ended.
    pub actor: Option<ActorHit>,
}

/// Projected, shaded wall portion of a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallStrip {
    /// March distance to the wall.
    pub distance: f32,
    /// Tile that produced the strip.
    pub tile: TileCode,
    /// Projected half-extent in pixels above and below the horizon.
    pub height: f32,
    /// Distance-shaded color.
    pub color: Rgb,
}

/// Projected, shaded actor portion of a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorStrip {
    /// Identifier of the drawn actor.
    pub actor: ActorId,
    /// March distance to the actor.
    pub distance: f32,
    /// Projected half-extent in pixels above and below the horizon.
    pub height: f32,
    /// Distance- and health-shaded color.
    pub color: Rgb,
}

/// Everything the compositor needs to draw one screen column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnStrip {
    /// Screen column index.
    pub column: u32,
    /// Wall drawn first, if the ray hit one.
    pub wall: Option<WallStrip>,
    /// Actor drawn over the wall, if the ray crossed one.
    pub actor: Option<ActorStrip>,
}
