//! Uniform spatial grid for candidate pair generation.

use glam::DVec3;

use crate::aabb::Aabb;
use crate::constants::{MAX_GRID_DIM, TARGET_EDGES_PER_CELL};

/// Uniform grid over the boxes it was built from.
///
/// Each box lands in exactly one cell, keyed by its center. Pairs are drawn
/// from the same cell unconditionally and from the 26 neighboring cells with
/// an overlap check, so boxes larger than a cell can still miss pairs; the
/// caller compensates by enlarging boxes by the search margin first.
#[derive(Debug)]
pub struct SpatialGrid {
  dims: [usize; 3],
  cell_size: DVec3,
  origin: DVec3,
  cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
  /// Build a grid sized so cells hold a handful of boxes on average.
  pub fn build(aabbs: &[Aabb]) -> Self {
    let mut total = Aabb::empty();
    for aabb in aabbs {
      total.encapsulate_aabb(aabb);
    }
    if !total.is_valid() {
      return Self {
        dims: [1, 1, 1],
        cell_size: DVec3::ONE,
        origin: DVec3::ZERO,
        cells: vec![Vec::new()],
      };
    }

    let size = total.size();
    let cell_target = (aabbs.len() / TARGET_EDGES_PER_CELL).max(1);
    let avg_cell_volume = (size.x * size.y * size.z) / cell_target as f64;
    let cell_edge = avg_cell_volume.cbrt();

    // Saturating float-to-int casts make the degenerate axes safe here
    let dims = [
      ((size.x / cell_edge) as usize).clamp(1, MAX_GRID_DIM),
      ((size.y / cell_edge) as usize).clamp(1, MAX_GRID_DIM),
      ((size.z / cell_edge) as usize).clamp(1, MAX_GRID_DIM),
    ];
    let cell_size = DVec3::new(
      size.x / dims[0] as f64,
      size.y / dims[1] as f64,
      size.z / dims[2] as f64,
    );

    let mut cells = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
    for (index, aabb) in aabbs.iter().enumerate() {
      let cell = Self::cell_of(total.min, cell_size, dims, aabb.center());
      cells[Self::flat_index(dims, cell)].push(index);
    }

    Self {
      dims,
      cell_size,
      origin: total.min,
      cells,
    }
  }

  fn cell_of(origin: DVec3, cell_size: DVec3, dims: [usize; 3], point: DVec3) -> [usize; 3] {
    let offset = point - origin;
    [
      ((offset.x / cell_size.x) as usize).min(dims[0] - 1),
      ((offset.y / cell_size.y) as usize).min(dims[1] - 1),
      ((offset.z / cell_size.z) as usize).min(dims[2] - 1),
    ]
  }

  #[inline]
  fn flat_index(dims: [usize; 3], cell: [usize; 3]) -> usize {
    cell[0] * (dims[1] * dims[2]) + cell[1] * dims[2] + cell[2]
  }

  pub fn dims(&self) -> [usize; 3] {
    self.dims
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  /// Candidate index pairs, each reported once with `i < j`.
  ///
  /// Boxes in the same cell always pair up. Boxes in neighboring cells pair
  /// up only when their boxes overlap.
  pub fn candidate_pairs(&self, aabbs: &[Aabb]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let [dx, dy, dz] = self.dims;

    for x in 0..dx {
      for y in 0..dy {
        for z in 0..dz {
          let cell = &self.cells[Self::flat_index(self.dims, [x, y, z])];

          for (slot, &i) in cell.iter().enumerate() {
            for &j in &cell[slot + 1..] {
              if i < j {
                pairs.push((i, j));
              } else {
                pairs.push((j, i));
              }
            }
          }

          for nx in x.saturating_sub(1)..(x + 2).min(dx) {
            for ny in y.saturating_sub(1)..(y + 2).min(dy) {
              for nz in z.saturating_sub(1)..(z + 2).min(dz) {
                if [nx, ny, nz] == [x, y, z] {
                  continue;
                }
                let neighbor = &self.cells[Self::flat_index(self.dims, [nx, ny, nz])];
                for &i in cell {
                  for &j in neighbor {
                    if i < j && aabbs[i].overlaps(&aabbs[j]) {
                      pairs.push((i, j));
                    }
                  }
                }
              }
            }
          }
        }
      }
    }
    pairs
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
