//! 2-D type-II DCT over a square grid of `f64` samples.
//!
//! Implemented as rows-then-columns: a row-wise 1-D DCT, a transpose, a
//! second row-wise 1-D DCT (now running down what were originally the
//! columns), then a transpose back. `rustdct` only gives us a 1-D transform,
//! so the transpose step is what turns it into a 2-D one.

use rustdct::DctPlanner;

/// Run a 2-D DCT-II in place over `data`, which holds a `size x size` grid
/// in row-major order.
pub fn dct_2d(data: &mut [f64], size: usize) {
    assert_eq!(data.len(), size * size, "dct_2d: data is not a square grid");

    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(size);

    let mut scratch = vec![0.0_f64; size];

    // Row-wise pass.
    for row in data.chunks_exact_mut(size) {
        dct.process_dct2(row);
    }

    // Swap axes so the next row-wise pass operates on the original columns.
    transpose::transpose_inplace(data, &mut scratch, size, size);

    for row in data.chunks_exact_mut(size) {
        dct.process_dct2(row);
    }

    transpose::transpose_inplace(data, &mut scratch, size, size);
}
