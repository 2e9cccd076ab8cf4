//! Shared infrastructure: filesystem scanning, path normalization, ids.

pub mod fs_scan;
pub mod ids;
pub mod normalize;
