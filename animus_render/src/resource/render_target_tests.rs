/// Tests for RenderTarget
///
/// Creation, resize and teardown against the recording mock device.

use super::*;
use crate::graphics_device::mock_graphics_device::{DeviceCall, MockGraphicsDevice};

#[test]
fn test_create_with_depth() {
    let mut device = MockGraphicsDevice::new();
    let target = RenderTarget::create(
        &mut device, "Scene", 800, 600, TextureFormat::R8G8B8A8_UNORM, true).unwrap();

    assert!(target.is_live());
    assert_eq!(target.color_texture().unwrap().extent(), (800, 600));
    assert_eq!(target.depth_buffer().map(|d| (d.width, d.height)), Some((800, 600)));
    assert_eq!(device.live_texture_count(), 1);
    assert_eq!(device.live_depth_buffer_count(), 1);
    assert_eq!(device.live_framebuffer_count(), 1);
}

#[test]
fn test_create_without_depth() {
    let mut device = MockGraphicsDevice::new();
    let target = RenderTarget::create(
        &mut device, "Bloom", 320, 240, TextureFormat::R32G32B32A32_SFLOAT, false).unwrap();

    assert!(target.depth_buffer().is_none());
    assert!(!target.has_depth());
    assert_eq!(device.live_depth_buffer_count(), 0);
}

#[test]
fn test_create_failure_leaks_nothing() {
    let mut device = MockGraphicsDevice::new();
    // color + depth succeed, framebuffer is refused
    device.fail_allocations_after(2);

    let result = RenderTarget::create(
        &mut device, "Scene", 64, 64, TextureFormat::R8G8B8A8_UNORM, true);

    assert!(matches!(result, Err(Error::DeviceResourceError(_))));
    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(device.live_depth_buffer_count(), 0);
    assert_eq!(device.live_framebuffer_count(), 0);
}

#[test]
fn test_depth_failure_releases_color() {
    let mut device = MockGraphicsDevice::new();
    device.fail_allocations_after(1);

    let result = RenderTarget::create(
        &mut device, "Scene", 64, 64, TextureFormat::R8G8B8A8_UNORM, true);

    assert!(result.is_err());
    assert_eq!(device.live_texture_count(), 0);
}

#[test]
fn test_resize_destroys_before_recreating() {
    let mut device = MockGraphicsDevice::new();
    let mut target = RenderTarget::create(
        &mut device, "Scene", 800, 600, TextureFormat::R8G8B8A8_UNORM, true).unwrap();
    let old_color = target.color_texture().unwrap();
    device.clear_calls();

    target.resize(&mut device, 1024, 768).unwrap();

    let calls = device.calls();
    let destroy_pos = calls
        .iter()
        .position(|c| *c == DeviceCall::DestroyTexture(old_color.handle))
        .unwrap();
    let create_pos = calls
        .iter()
        .position(|c| matches!(c, DeviceCall::CreateTexture { .. }))
        .unwrap();
    assert!(destroy_pos < create_pos);

    assert!(!device.is_texture_live(old_color.handle));
    assert_eq!(target.color_texture().unwrap().extent(), (1024, 768));
    assert_eq!(target.depth_buffer().map(|d| (d.width, d.height)), Some((1024, 768)));
    assert_eq!(device.live_texture_count(), 1);
    assert_eq!(device.live_depth_buffer_count(), 1);
    assert!(device.violations().is_empty());
}

#[test]
fn test_resize_failure_leaves_target_destroyed() {
    let mut device = MockGraphicsDevice::new();
    let mut target = RenderTarget::create(
        &mut device, "Scene", 100, 100, TextureFormat::R8G8B8A8_UNORM, false).unwrap();
    device.fail_allocations_after(0);

    assert!(target.resize(&mut device, 200, 200).is_err());
    assert!(!target.is_live());
    assert!(matches!(target.color_texture(), Err(Error::UsageError(_))));
    assert_eq!(device.live_texture_count(), 0);
}

#[test]
fn test_destroy_is_idempotent() {
    let mut device = MockGraphicsDevice::new();
    let mut target = RenderTarget::create(
        &mut device, "Scene", 32, 32, TextureFormat::R8G8B8A8_UNORM, true).unwrap();

    target.destroy(&mut device);
    target.destroy(&mut device);

    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(device.live_framebuffer_count(), 0);
    assert!(device.violations().is_empty());
}

#[test]
fn test_color_texture_after_destroy_is_usage_error() {
    let mut device = MockGraphicsDevice::new();
    let mut target = RenderTarget::create(
        &mut device, "Scene", 32, 32, TextureFormat::R8G8B8A8_UNORM, false).unwrap();
    target.destroy(&mut device);

    assert!(matches!(target.color_texture(), Err(Error::UsageError(_))));
    assert!(matches!(target.framebuffer(), Err(Error::UsageError(_))));
}

#[test]
fn test_from_attachments_rejects_mismatched_depth() {
    let mut device = MockGraphicsDevice::new();
    let color = device
        .create_texture(&TextureDesc {
            width: 800,
            height: 600,
            format: TextureFormat::R8G8B8A8_UNORM,
            mip_level: 0,
        })
        .unwrap();
    let depth = device.create_depth_buffer(400, 300).unwrap();

    let result = RenderTarget::from_attachments(&mut device, "bad", color, Some(depth));

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(device.live_framebuffer_count(), 0);
}

#[test]
fn test_from_attachments_accepts_matching_depth() {
    let mut device = MockGraphicsDevice::new();
    let color = device
        .create_texture(&TextureDesc {
            width: 64,
            height: 64,
            format: TextureFormat::R8G8B8A8_UNORM,
            mip_level: 0,
        })
        .unwrap();
    let depth = device.create_depth_buffer(64, 64).unwrap();

    let mut target = RenderTarget::from_attachments(&mut device, "ok", color, Some(depth)).unwrap();
    assert_eq!(target.color_texture().unwrap(), color);

    target.destroy(&mut device);
    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(device.live_depth_buffer_count(), 0);
}
