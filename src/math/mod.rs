//! Grids and bounding volumes

pub mod aabb;
pub mod grid;

pub use aabb::Aabb;
pub use grid::Grid;
