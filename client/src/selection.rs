use crate::grid::GridMapper;

/// Hover and single-tile selection, tracked by land id.
///
/// Holding ids instead of tile references keeps selection meaningful across
/// collection replacements: [`TileSelectionController::reconcile`] keeps the
/// selection while its land is still present and drops it otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileSelectionController {
    selected: Option<u32>,
    hovered: Option<u32>,
}

impl TileSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn hovered(&self) -> Option<u32> {
        self.hovered
    }

    /// Land id of the tile under a content-space point, if a tile is present there.
    pub fn hit_test(grid: &GridMapper, content_x: f64, content_y: f64) -> Option<u32> {
        let size = grid.tile_size();
        if grid.is_empty() || size <= 0.0 || !content_x.is_finite() || !content_y.is_finite() {
            return None;
        }
        let col = (content_x / size).floor();
        let row = (content_y / size).floor();
        if col < 0.0 || row < 0.0 || col >= grid.cols() as f64 || row >= grid.rows() as f64 {
            return None;
        }
        let id = grid.id_at(row as u32, col as u32)?;
        grid.tile(id).map(|tile| tile.land_id)
    }

    /// Record the hovered tile. Returns whether it changed.
    pub fn hover(&mut self, hit: Option<u32>) -> bool {
        if self.hovered == hit {
            return false;
        }
        self.hovered = hit;
        true
    }

    /// Apply a click on `hit`. Returns the new selection when it changed.
    ///
    /// Clicking the selected tile deselects it; clicking another tile moves
    /// the selection; clicking empty space clears it.
    pub fn click(&mut self, grid: &mut GridMapper, hit: Option<u32>) -> Option<Option<u32>> {
        let next = match hit {
            Some(id) if self.selected == Some(id) => None,
            other => other,
        };
        if next == self.selected {
            return None;
        }
        let before = self.selected;
        self.set_selected(grid, next);
        (self.selected != before).then_some(self.selected)
    }

    /// Re-apply selection flags after the grid was rebuilt from a new collection.
    /// Returns the new selection when the previously selected land disappeared.
    pub fn reconcile(&mut self, grid: &mut GridMapper) -> Option<Option<u32>> {
        if self.hovered.is_some_and(|id| grid.tile(id).is_none()) {
            self.hovered = None;
        }
        let id = self.selected?;
        match grid.tile_mut(id) {
            Some(tile) => {
                tile.selected = true;
                None
            }
            None => {
                self.selected = None;
                Some(None)
            }
        }
    }

    fn set_selected(&mut self, grid: &mut GridMapper, next: Option<u32>) {
        if let Some(prev) = self.selected.take()
            && let Some(tile) = grid.tile_mut(prev)
        {
            tile.selected = false;
        }
        if let Some(id) = next
            && let Some(tile) = grid.tile_mut(id)
        {
            tile.selected = true;
            self.selected = Some(id);
        }
    }
}
