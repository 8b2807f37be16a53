//! Linear Lagrange basis on the reference element
//!
//! ```text
//!     N0 = 1           N1 = 1
//!       *---------------*
//!      -1       0       1
//! ```

/// Evaluate the two linear shape functions at a reference coordinate
pub fn linear_values(ref_coord: f64) -> [f64; 2] {
    [(1.0 - ref_coord) / 2.0, (1.0 + ref_coord) / 2.0]
}

/// Affine map from the reference element [-1, 1] onto the real interval [n1, n2]
pub fn reference_to_real(ref_coord: f64, n1: f64, n2: f64) -> f64 {
    ((1.0 - ref_coord) * n1 + (1.0 + ref_coord) * n2) / 2.0
}

/// Weighted sum of two nodal values using the shape functions' values at `ref_coord`
pub fn interpolate<T>(ref_coord: f64, [d0, d1]: [T; 2]) -> T
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Mul<f64, Output = T>,
{
    let [n0, n1] = linear_values(ref_coord);
    d0 * n0 + d1 * n1
}
