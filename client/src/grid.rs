use landgrid_shared::LandRecord;

use crate::colors::owner_tint;

/// Axis-aligned square in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl TileRect {
    pub fn right(&self) -> f64 {
        self.x + self.size
    }
}

/// One grid cell derived from a land record.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Lookup key back into the land collection.
    pub land_id: u32,
    pub is_unclaimed: bool,
    /// Normalized owner address, `None` when unclaimed.
    pub owner: Option<String>,
    /// Pre-formatted owner fill, avoids a `format!` per tile per frame.
    pub tint: Option<String>,
    pub producing: bool,
    pub selected: bool,
}

impl Tile {
    pub fn rect(&self) -> TileRect {
        TileRect {
            x: self.x,
            y: self.y,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub tiles: usize,
    pub out_of_range: usize,
    pub duplicates: usize,
}

/// Row-major mapping from land ids to grid cells and pixel rectangles.
///
/// Tiles are stored in ascending `land_id` order alongside a dense
/// `id -> slot` index, so lookups by id are O(1) and no two tiles can share a
/// cell.
#[derive(Debug, Clone)]
pub struct GridMapper {
    rows: u32,
    cols: u32,
    tile_size: f64,
    tiles: Vec<Tile>,
    slots: Vec<Option<usize>>,
}

impl GridMapper {
    pub fn new(rows: u32, cols: u32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            tile_size: 0.0,
            tiles: Vec::new(),
            slots: vec![None; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Tile edge length that makes `cols` tiles span the viewport width.
    pub fn tile_size_for_width(&self, viewport_width: f64) -> f64 {
        (viewport_width / self.cols as f64).max(0.0)
    }

    pub fn cell_of(&self, id: u32) -> Option<(u32, u32)> {
        if id >= self.cell_count() {
            return None;
        }
        Some((id / self.cols, id % self.cols))
    }

    pub fn id_at(&self, row: u32, col: u32) -> Option<u32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    pub fn rect_for(&self, id: u32) -> Option<TileRect> {
        let (row, col) = self.cell_of(id)?;
        Some(TileRect {
            x: col as f64 * self.tile_size,
            y: row as f64 * self.tile_size,
            size: self.tile_size,
        })
    }

    /// Full content extent at zoom 1.
    pub fn content_size(&self) -> (f64, f64) {
        (
            self.cols as f64 * self.tile_size,
            self.rows as f64 * self.tile_size,
        )
    }

    /// Update geometry of every existing tile without reallocating them.
    pub fn set_tile_size(&mut self, size: f64) {
        self.tile_size = size.max(0.0);
        let size = self.tile_size;
        for tile in &mut self.tiles {
            tile.x = tile.col as f64 * size;
            tile.y = tile.row as f64 * size;
            tile.size = size;
        }
    }

    /// Derive tiles from a freshly delivered land collection.
    ///
    /// Records whose id falls outside the grid are dropped. When an id is
    /// repeated the first record wins.
    pub fn rebuild(&mut self, lands: &[LandRecord]) -> RebuildSummary {
        let mut summary = RebuildSummary::default();
        self.slots.iter_mut().for_each(|slot| *slot = None);

        let mut tiles: Vec<Tile> = Vec::with_capacity(lands.len());
        for land in lands {
            let Some((row, col)) = self.cell_of(land.id) else {
                summary.out_of_range += 1;
                continue;
            };
            let slot = &mut self.slots[land.id as usize];
            if slot.is_some() {
                summary.duplicates += 1;
                continue;
            }
            *slot = Some(0);
            let owner = land.normalized_owner();
            let tint = owner.as_deref().map(owner_tint);
            tiles.push(Tile {
                row,
                col,
                x: col as f64 * self.tile_size,
                y: row as f64 * self.tile_size,
                size: self.tile_size,
                land_id: land.id,
                is_unclaimed: land.is_unclaimed(),
                owner,
                tint,
                producing: land.is_producing(),
                selected: false,
            });
        }
        tiles.sort_unstable_by_key(|tile| tile.land_id);
        for (idx, tile) in tiles.iter().enumerate() {
            self.slots[tile.land_id as usize] = Some(idx);
        }
        self.tiles = tiles;

        summary.tiles = self.tiles.len();
        if summary.out_of_range > 0 || summary.duplicates > 0 {
            tracing::debug!(
                out_of_range = summary.out_of_range,
                duplicates = summary.duplicates,
                "dropped land records that do not map to a free grid cell"
            );
        }
        summary
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, land_id: u32) -> Option<&Tile> {
        let idx = (*self.slots.get(land_id as usize)?)?;
        self.tiles.get(idx)
    }

    pub fn tile_mut(&mut self, land_id: u32) -> Option<&mut Tile> {
        let idx = (*self.slots.get(land_id as usize)?)?;
        self.tiles.get_mut(idx)
    }

    /// Tiles whose cell overlaps the given content-space rectangle.
    pub fn tiles_in(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> impl Iterator<Item = &Tile> {
        let size = self.tile_size;
        let (col_start, col_end, row_start, row_end) = if size > 0.0 && x1 > x0 && y1 > y0 {
            (
                cell_floor(x0, size, self.cols),
                cell_ceil(x1, size, self.cols),
                cell_floor(y0, size, self.rows),
                cell_ceil(y1, size, self.rows),
            )
        } else {
            (0, 0, 0, 0)
        };
        (row_start..row_end)
            .flat_map(move |row| (col_start..col_end).map(move |col| row * self.cols + col))
            .filter_map(move |id| self.tile(id))
    }
}

fn cell_floor(v: f64, size: f64, limit: u32) -> u32 {
    (v / size).floor().clamp(0.0, limit as f64) as u32
}

fn cell_ceil(v: f64, size: f64, limit: u32) -> u32 {
    (v / size).ceil().clamp(0.0, limit as f64) as u32
}
