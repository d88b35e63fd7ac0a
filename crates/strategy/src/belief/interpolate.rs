//! Cubic gap filling for belief curves.
//!
//! A run of undefined prices between two defined neighbours `(x0, y0)` and
//! `(x1, y1)` is filled with the cubic that matches both values and has zero
//! slope at both ends. The cubic is found from the 4×4 system
//!
//! ```text
//! | t0³   t0²  t0  1 |   | c3 |   | y0 |
//! | t1³   t1²  t1  1 | · | c2 | = | y1 |
//! | 3t0²  2t0  1   0 |   | c1 |   | 0  |
//! | 3t1²  2t1  1   0 |   | c0 |   | 0  |
//! ```
//!
//! written in local coordinates `t = x − x0` to keep it well conditioned.

const PIVOT_EPSILON: f64 = 1e-12;

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
/// `None` when the system is singular.
pub fn solve4(mut a: [[f64; 4]; 4], mut b: [f64; 4]) -> Option<[f64; 4]> {
    for col in 0..4 {
        let pivot = (col..4).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..4 {
            let factor = a[row][col] / a[col][col];
            for k in col..4 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 4];
    for row in (0..4).rev() {
        let tail: f64 = (row + 1..4).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Coefficients `[c3, c2, c1, c0]` in local coordinates of the flat-ended
/// cubic through `(0, y0)` and `(width, y1)`
pub fn flat_cubic(width: f64, y0: f64, y1: f64) -> Option<[f64; 4]> {
    let w = width;
    let a = [
        [0.0, 0.0, 0.0, 1.0],
        [w * w * w, w * w, w, 1.0],
        [0.0, 0.0, 1.0, 0.0],
        [3.0 * w * w, 2.0 * w, 1.0, 0.0],
    ];
    solve4(a, [y0, y1, 0.0, 0.0])
}

fn eval(c: &[f64; 4], t: f64) -> f64 {
    ((c[0] * t + c[1]) * t + c[2]) * t + c[3]
}

/// Fill every run of NaN in `curve`
///
/// Runs with a defined neighbour on both sides get the flat-ended cubic;
/// runs touching either end of the curve are set to 0. A singular system
/// leaves its run undefined.
pub fn fill_gaps(curve: &mut [f64]) {
    let mut i = 0;
    while i < curve.len() {
        if !curve[i].is_nan() {
            i += 1;
            continue;
        }
        let start = i;
        while i < curve.len() && curve[i].is_nan() {
            i += 1;
        }
        let end = i; // exclusive

        if start == 0 || end == curve.len() {
            curve[start..end].fill(0.0);
            continue;
        }

        let left = start - 1;
        let width = (end - left) as f64;
        let Some(coefficients) = flat_cubic(width, curve[left], curve[end]) else {
            continue;
        };
        for (offset, slot) in curve[start..end].iter_mut().enumerate() {
            *slot = eval(&coefficients, (offset + 1) as f64).clamp(0.0, 1.0);
        }
    }
}
