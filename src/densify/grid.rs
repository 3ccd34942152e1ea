use super::DensifyError;
use super::geometry::range;
use super::sample::Sample;

/// Offset, in buckets, stamped around every positive sample.
pub const NEIGHBOR_RADIUS: i64 = 1;

/// Penalty reported by [`OccupancyGrid::value`] for a vetoed cell.
pub const VETO_WEIGHT: i64 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    stamps: u32,
    vetoed: bool,
}

/// Padded occupancy histogram over the (x, y, z) bucket lattice.
///
/// Each axis carries one padding bucket on both ends, so a lattice of
/// `c x c x i` real cells is stored as `(c+2) x (c+2) x (i+2)`. Padded index 0
/// and `buckets + 1` never hold a real cell.
///
/// A cell is eligible for a filler sample when it was stamped at least once and
/// was never vetoed. Vetoes are a flag rather than a numeric penalty, so no
/// number of neighbouring stamps can re-open a real sample's own cell.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    chromaticity_buckets: usize,
    intensity_buckets: usize,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Allocate an empty grid.
    pub fn new(chromaticity_buckets: usize, intensity_buckets: usize) -> Result<Self, DensifyError> {
        if chromaticity_buckets == 0 || intensity_buckets == 0 {
            return Err(DensifyError::ZeroBuckets {
                chromaticity: chromaticity_buckets,
                intensity: intensity_buckets,
            });
        }
        let side = chromaticity_buckets + 2;
        let len = side * side * (intensity_buckets + 2);
        Ok(Self {
            chromaticity_buckets,
            intensity_buckets,
            cells: vec![Cell::default(); len],
        })
    }

    /// Stamp every positive sample's neighbourhood into a fresh grid.
    ///
    /// Background samples (label `0`) leave the grid untouched. Unless
    /// `fill_interior` is set, each positive sample's own cell is vetoed.
    pub fn build(
        samples: &[Sample],
        chromaticity_buckets: usize,
        intensity_buckets: usize,
        fill_interior: bool,
    ) -> Result<Self, DensifyError> {
        let mut grid = Self::new(chromaticity_buckets, intensity_buckets)?;
        for sample in samples.iter().filter(|sample| sample.is_positive()) {
            grid.stamp(sample, fill_interior);
        }
        Ok(grid)
    }

    fn stamp(&mut self, sample: &Sample, fill_interior: bool) {
        let chroma = self.chromaticity_buckets as f64;
        let intensity = self.intensity_buckets as f64;
        let offsets = || range(-NEIGHBOR_RADIUS, NEIGHBOR_RADIUS + 1);
        for dz in offsets() {
            for dy in offsets() {
                for dx in offsets() {
                    let bx = bucket_index(sample.x + dx as f64 / chroma, self.chromaticity_buckets);
                    let by = bucket_index(sample.y + dy as f64 / chroma, self.chromaticity_buckets);
                    let bz = bucket_index(sample.z + dz as f64 / intensity, self.intensity_buckets);
                    let index = self.flat_index(bx, by, bz);
                    let cell = &mut self.cells[index];
                    if (dx, dy, dz) == (0, 0, 0) && !fill_interior {
                        cell.vetoed = true;
                    }
                    cell.stamps = cell.stamps.saturating_add(1);
                }
            }
        }
    }

    pub fn chromaticity_buckets(&self) -> usize {
        self.chromaticity_buckets
    }

    pub fn intensity_buckets(&self) -> usize {
        self.intensity_buckets
    }

    /// Padded extents `(x, y, z)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        let side = self.chromaticity_buckets + 2;
        (side, side, self.intensity_buckets + 2)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flatten padded coordinates; intensity is most significant, chromaticity-x least.
    pub fn flat_index(&self, bx: usize, by: usize, bz: usize) -> usize {
        let side = self.chromaticity_buckets + 2;
        bx + side * (by + side * bz)
    }

    /// Occupancy as a signed count: stamps, minus [`VETO_WEIGHT`] when vetoed.
    pub fn value(&self, bx: usize, by: usize, bz: usize) -> i64 {
        self.value_at(self.flat_index(bx, by, bz))
    }

    pub fn value_at(&self, index: usize) -> i64 {
        let cell = self.cells[index];
        let stamps = i64::from(cell.stamps);
        if cell.vetoed { stamps - VETO_WEIGHT } else { stamps }
    }

    pub fn stamps(&self, bx: usize, by: usize, bz: usize) -> u32 {
        self.cells[self.flat_index(bx, by, bz)].stamps
    }

    pub fn is_vetoed(&self, bx: usize, by: usize, bz: usize) -> bool {
        self.cells[self.flat_index(bx, by, bz)].vetoed
    }

    /// True when the cell may host a filler sample.
    pub fn is_eligible(&self, bx: usize, by: usize, bz: usize) -> bool {
        self.is_eligible_at(self.flat_index(bx, by, bz))
    }

    pub fn is_eligible_at(&self, index: usize) -> bool {
        let cell = self.cells[index];
        !cell.vetoed && cell.stamps > 0
    }

    /// Padded coordinates of every eligible cell, padding included, in flat order.
    pub fn eligible_cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (sx, sy, _) = self.dims();
        (0..self.cells.len())
            .filter(|&index| self.is_eligible_at(index))
            .map(move |index| (index % sx, (index / sx) % sy, index / (sx * sy)))
    }
}

/// Map a fractional coordinate to its padded bucket index.
///
/// `floor(coordinate * buckets)` is clamped to `[0, buckets]` and shifted by one
/// for the leading padding bucket, so the result always lies in `[1, buckets + 1]`.
pub fn bucket_index(coordinate: f64, buckets: usize) -> usize {
    let raw = (coordinate * buckets as f64).floor();
    raw.clamp(0.0, buckets as f64) as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(bucket: usize, buckets: usize) -> f64 {
        (bucket as f64 + 0.5) / buckets as f64
    }

    #[test]
    fn zero_buckets_are_rejected() {
        assert_eq!(
            OccupancyGrid::new(0, 6).unwrap_err(),
            DensifyError::ZeroBuckets {
                chromaticity: 0,
                intensity: 6
            }
        );
        assert!(OccupancyGrid::new(6, 0).is_err());
    }

    #[test]
    fn grid_is_padded_on_every_axis() {
        let grid = OccupancyGrid::new(6, 4).unwrap();
        assert_eq!(grid.dims(), (8, 8, 6));
        assert_eq!(grid.len(), 8 * 8 * 6);
        assert_eq!(grid.flat_index(7, 7, 5), grid.len() - 1);
        assert_eq!(grid.flat_index(1, 0, 0), 1);
        assert_eq!(grid.flat_index(0, 1, 0), 8);
        assert_eq!(grid.flat_index(0, 0, 1), 64);
    }

    #[test]
    fn bucket_index_stays_inside_padded_range() {
        for buckets in 1..=8 {
            for step in -20..=120 {
                let coordinate = step as f64 / 100.0;
                let index = bucket_index(coordinate, buckets);
                assert!((1..=buckets + 1).contains(&index), "{coordinate} -> {index}");
            }
        }
        assert_eq!(bucket_index(1.0, 6), 7);
        assert_eq!(bucket_index(0.0, 6), 1);
        assert_eq!(bucket_index(0.5, 2), 2);
    }

    #[test]
    fn background_samples_never_stamp() {
        let samples = [
            Sample::new(0.5, 0.5, 0.5, 0.0),
            Sample::new(0.1, 0.9, 0.3, 0.0),
        ];
        let grid = OccupancyGrid::build(&samples, 6, 6, false).unwrap();
        assert!((0..grid.len()).all(|index| grid.value_at(index) == 0));
        assert_eq!(grid.eligible_cells().count(), 0);
    }

    #[test]
    fn interior_sample_marks_its_26_neighbours() {
        let c = center(2, 6);
        let grid = OccupancyGrid::build(&[Sample::new(c, c, c, 1.0)], 6, 6, false).unwrap();
        let eligible: Vec<_> = grid.eligible_cells().collect();
        assert_eq!(eligible.len(), 26);
        for &(bx, by, bz) in &eligible {
            assert!((2..=4).contains(&bx) && (2..=4).contains(&by) && (2..=4).contains(&bz));
            assert_eq!(grid.value(bx, by, bz), 1);
        }
        assert!(grid.is_vetoed(3, 3, 3));
        assert_eq!(grid.value(3, 3, 3), 1 - VETO_WEIGHT);
    }

    #[test]
    fn fill_interior_leaves_own_cell_eligible() {
        let c = center(2, 6);
        let grid = OccupancyGrid::build(&[Sample::new(c, c, c, 1.0)], 6, 6, true).unwrap();
        assert_eq!(grid.eligible_cells().count(), 27);
        assert!(grid.is_eligible(3, 3, 3));
        assert_eq!(grid.value(3, 3, 3), 1);
    }

    #[test]
    fn corner_sample_folds_offsets_into_edge_cells() {
        let grid = OccupancyGrid::build(&[Sample::new(0.05, 0.05, 0.05, 1.0)], 6, 6, false).unwrap();
        let eligible: Vec<_> = grid.eligible_cells().collect();
        assert_eq!(eligible.len(), 7);
        assert!(eligible.iter().all(|&(x, y, z)| x <= 2 && y <= 2 && z <= 2));
        assert!(!grid.is_eligible(1, 1, 1));
        assert!(grid.stamps(1, 1, 1) > 1);
    }

    #[test]
    fn upper_edge_offsets_land_in_padding() {
        let grid = OccupancyGrid::build(&[Sample::new(0.95, 0.95, 0.95, 1.0)], 6, 6, false).unwrap();
        assert!(grid.is_eligible(7, 7, 7));
        let real: Vec<_> = grid
            .eligible_cells()
            .filter(|&(x, y, z)| x <= 6 && y <= 6 && z <= 6)
            .collect();
        assert_eq!(real.len(), 7);
    }

    #[test]
    fn veto_survives_many_neighbouring_stamps() {
        let c = center(2, 6);
        let neighbour = center(3, 6);
        let mut samples = vec![Sample::new(c, c, c, 1.0)];
        samples.extend((0..(VETO_WEIGHT as usize + 5)).map(|_| Sample::new(neighbour, c, c, 1.0)));
        let grid = OccupancyGrid::build(&samples, 6, 6, false).unwrap();
        assert!(grid.stamps(3, 3, 3) as i64 > VETO_WEIGHT);
        assert!(!grid.is_eligible(3, 3, 3));
    }
}
