use std::collections::HashMap;

use crate::types::Vec2;

/// Uniform grid over the canvas used to find collision candidates.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Re-index and adopt a new cell size. Buckets of occupied cells are
    /// reused; cells left empty are dropped.
    pub fn rebuild_with(&mut self, cell_size: f32, positions: impl Iterator<Item = Vec2>) {
        if cell_size.is_finite() && cell_size > 0.0 {
            self.cell_size = cell_size;
        }
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (idx, pos) in positions.enumerate() {
            let key = self.cell_key(pos);
            self.cells.entry(key).or_default().push(idx);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Indices in the 3x3 block of cells around `pos`.
    pub fn query_neighbors(&self, pos: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_key(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(indices);
                }
            }
        }
    }

    fn cell_key(&self, pos: Vec2) -> (i32, i32) {
        let cx = (pos.x / self.cell_size).floor() as i32;
        let cy = (pos.y / self.cell_size).floor() as i32;
        (cx, cy)
    }
}
