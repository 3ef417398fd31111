/// Camera module - passive camera data read by passes

pub mod camera;

pub use camera::Camera;

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
