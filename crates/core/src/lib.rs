pub mod camera;
pub mod detection;
pub mod geometry;
pub mod packaging;
pub mod recording;
pub mod session;
pub mod shared;
pub mod validation;
