use super::geometry::{Triangle, range_to};
use super::grid::OccupancyGrid;
use super::sample::Sample;

/// Emit one filler sample at the center of every eligible real cell.
///
/// Cells are visited z-major, then y, then x, so the output is reproducible.
/// Padding cells are never visited. With a `triangle`, only cells whose (x, y)
/// center lies strictly inside it are emitted.
pub fn synthesize_fillers(
    grid: &OccupancyGrid,
    filler_value: f64,
    triangle: Option<&Triangle>,
) -> Vec<Sample> {
    let chroma = grid.chromaticity_buckets();
    let intensity = grid.intensity_buckets();
    let mut fillers = Vec::new();
    for z in range_to(intensity as i64) {
        for y in range_to(chroma as i64) {
            for x in range_to(chroma as i64) {
                let (x, y, z) = (x as usize, y as usize, z as usize);
                if !grid.is_eligible(x + 1, y + 1, z + 1) {
                    continue;
                }
                let cx = cell_center(x, chroma);
                let cy = cell_center(y, chroma);
                if triangle.is_some_and(|triangle| !triangle.contains(cx, cy)) {
                    continue;
                }
                fillers.push(Sample::new(cx, cy, cell_center(z, intensity), filler_value));
            }
        }
    }
    fillers
}

fn cell_center(bucket: usize, buckets: usize) -> f64 {
    (bucket as f64 + 0.5) / buckets as f64
}
