// Re-export glam for convenience
pub use glam::*;

// Bounding types (double precision, city models live in projected CRS units)
mod interval;
mod aabb;
pub use interval::Interval;
pub use aabb::Aabb;
