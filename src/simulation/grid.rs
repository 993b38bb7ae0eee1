use std::collections::HashMap;

use smallvec::SmallVec;

use crate::core::Point;

type CellKey = (i64, i64);

/// Uniform spatial hash over node positions.
///
/// With a cell size of at least twice the largest collision radius, every
/// pair that can overlap lies in the same or an adjacent cell, so a lookup
/// only visits the 3x3 block around the query point.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    cell_size: f64,
    cells: HashMap<CellKey, SmallVec<[usize; 8]>>,
    len: usize,
}

impl CollisionGrid {
    /// Empty grid; `cell_size` is clamped to a positive value.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    #[must_use]
    pub fn from_points(cell_size: f64, points: impl IntoIterator<Item = (usize, Point)>) -> Self {
        let mut grid = Self::new(cell_size);
        for (index, point) in points {
            grid.insert(index, point);
        }
        grid
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, index: usize, point: Point) {
        let key = self.cell_of(point);
        self.cells.entry(key).or_default().push(index);
        self.len += 1;
    }

    fn cell_of(&self, point: Point) -> CellKey {
        (
            (point.x / self.cell_size).floor() as i64,
            (point.y / self.cell_size).floor() as i64,
        )
    }

    /// Indices stored in the 3x3 block of cells around `point`.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(point);
        (-1_i64..=1)
            .flat_map(move |dx| {
                (-1_i64..=1).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy)))
            })
            .filter_map(|key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::CollisionGrid;
    use crate::core::Point;

    #[test]
    fn neighbors_cover_adjacent_cells_only() {
        let grid = CollisionGrid::from_points(
            10.0,
            [
                (0, Point::new(1.0, 1.0)),
                (1, Point::new(12.0, 3.0)),
                (2, Point::new(-5.0, -5.0)),
                (3, Point::new(45.0, 45.0)),
            ],
        );
        let mut found: Vec<usize> = grid.neighbors(Point::new(2.0, 2.0)).collect();
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2]);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn invalid_cell_size_falls_back_to_unit_cells() {
        let grid = CollisionGrid::new(f64::NAN);
        assert!((grid.cell_size() - 1.0).abs() <= 1e-12);
        assert!(grid.is_empty());
    }
}
