/// Graphics device module - handles, descriptors and the device trait

pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod frame_buffer;
pub mod pipeline;

pub use graphics_device::*;
pub use texture::*;
pub use buffer::*;
pub use frame_buffer::*;
pub use pipeline::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
