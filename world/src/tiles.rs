use glam::Vec2;
use gridcaster_core::{CellCoord, TileCode, TileView};

/// Errors that can occur while parsing a textual grid layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The layout contained no rows or only empty rows.
    #[error("layout must contain at least one non-empty row")]
    Empty,
    /// Tiles must span at least one world unit.
    #[error("tile_size must be non-zero")]
    ZeroTileSize,
    /// A row's length differed from the first row.
    #[error("layout row {row} has {found} tiles, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph did not map to any tile code.
    #[error("unknown layout glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending character.
        glyph: char,
    },
}

/// Immutable tile grid loaded once at world construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: u32,
    tiles: Vec<TileCode>,
}

impl TileMap {
    /// Parses a layout where each string is one row of glyphs.
    pub fn from_rows<S>(rows: &[S], tile_size: u32) -> Result<Self, LayoutError>
    where
        S: AsRef<str>,
    {
        if tile_size == 0 {
            return Err(LayoutError::ZeroTileSize);
        }

        let expected = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .unwrap_or(0);
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged {
                    row: row_index,
                    expected,
                    found,
                });
            }
            for (column, glyph) in row.chars().enumerate() {
                let tile = TileCode::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                    row: row_index,
                    column,
                    glyph,
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            columns: expected as u32,
            rows: rows.len() as u32,
            tile_size,
            tiles,
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of one cell in world units.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Returns the tile at the provided cell, or [`TileCode::Boundary`] outside the grid.
    #[must_use]
    pub fn tile_at(&self, column: i64, row: i64) -> TileCode {
        self.view().tile_at(column, row)
    }

    /// Converts a world-space point into the cell containing it.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        self.view().cell_at(point)
    }

    /// Reports whether the point lies in a solid cell or outside the grid.
    #[must_use]
    pub fn is_solid_at(&self, point: Vec2) -> bool {
        self.view().is_solid_at(point)
    }

    /// Borrows the grid as a read-only view for systems.
    #[must_use]
    pub fn view(&self) -> TileView<'_> {
        TileView::new(&self.tiles, self.columns, self.rows, self.tile_size)
    }
}
