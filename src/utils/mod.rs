//! Shared numeric helpers.

mod matrix;

pub use matrix::{center_vector, mat_vec, xtx_inverse, PivotedQr, SINGULAR_TOLERANCE};
