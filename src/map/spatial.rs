use std::collections::HashMap;

/// Spatial hash grid over lon/lat for fast "what is near this point" lookups.
/// Items keep their insertion order; cells store indices into `items`.
pub struct SpatialGrid<T> {
    /// Grid cells indexed by (cell_x, cell_y)
    cells: HashMap<(i32, i32), Vec<usize>>,
    items: Vec<T>,
    /// Cell size in degrees
    cell_size: f64,
}

impl<T> SpatialGrid<T> {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            items: Vec::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Insert an item at a geographic position
    pub fn insert(&mut self, lon: f64, lat: f64, item: T) {
        let idx = self.items.len();
        self.items.push(item);

        let cell = self.to_cell(lon, lat);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// Indices of items in every cell touched by a square of the given
    /// radius around the point. May include items slightly outside the
    /// radius; callers do the exact distance check.
    pub fn query_radius(&self, lon: f64, lat: f64, radius_degrees: f64) -> Vec<usize> {
        let center_cell = self.to_cell(lon, lat);
        let cell_radius = (radius_degrees / self.cell_size).ceil() as i32;

        let mut results = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(indices) = self.cells.get(&cell) {
                    results.extend_from_slice(indices);
                }
            }
        }

        results
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_nearby_only() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(79.2, 30.1, "near");
        grid.insert(79.9, 30.4, "edge of cell");
        grid.insert(-120.0, 45.0, "far");

        let hits: Vec<&str> = grid
            .query_radius(79.5, 30.2, 0.5)
            .into_iter()
            .filter_map(|i| grid.get(i).copied())
            .collect();

        assert!(hits.contains(&"near"));
        assert!(hits.contains(&"edge of cell"));
        assert!(!hits.contains(&"far"));
    }

    #[test]
    fn test_negative_coordinates_bucket_correctly() {
        let mut grid = SpatialGrid::new(0.5);
        grid.insert(-0.1, -0.1, 1);
        assert_eq!(grid.query_radius(-0.2, -0.2, 0.0), vec![0]);
        assert!(grid.query_radius(0.2, 0.2, 0.0).is_empty());
    }
}
