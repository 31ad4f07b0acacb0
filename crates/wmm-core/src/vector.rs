//! Slice adapters over nalgebra vector views.
//!
//! Points and axes are stored as `Vec<f64>`; these helpers borrow them as
//! column views so the linear algebra goes through nalgebra.

use nalgebra::{DVectorView, DVectorViewMut};

/// Borrow a slice as a column vector.
#[inline]
pub fn view(v: &[f64]) -> DVectorView<'_, f64> {
    DVectorView::from_slice(v, v.len())
}

/// Inner product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    view(a).dot(&view(b))
}

/// Euclidean norm.
#[inline]
pub fn norm(v: &[f64]) -> f64 {
    view(v).norm()
}

/// Scale `v` to unit length in place and return its original norm.
///
/// Leaves `v` untouched when the norm is zero or not finite.
pub fn normalize_in_place(v: &mut [f64]) -> f64 {
    let len = v.len();
    let mut column = DVectorViewMut::from_slice(v, len);
    let n = column.norm();
    if n > 0.0 && n.is_finite() {
        column.unscale_mut(n);
    }
    n
}
