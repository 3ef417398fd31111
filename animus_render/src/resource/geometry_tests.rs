/// Tests for Geometry and vertex data

use super::*;
use crate::graphics_device::mock_graphics_device::{DeviceCall, MockGraphicsDevice};

#[test]
fn test_vertex_layout_stride_and_offsets() {
    let layout = VertexLayout::position_normal_uv();
    assert_eq!(layout.stride(), 32);
    assert_eq!(layout.stride() as usize, std::mem::size_of::<Vertex>());
    assert_eq!(layout.offset_of("aPosition"), Some(0));
    assert_eq!(layout.offset_of("aNormal"), Some(12));
    assert_eq!(layout.offset_of("aUV"), Some(24));
    assert_eq!(layout.offset_of("aTangent"), None);
}

#[test]
fn test_square_is_indexed() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();

    let square = Geometry::square(&mut device, &mut arena).unwrap();

    assert_eq!(square.draw_call(), DrawCall::Indexed { index_count: 6 });
    assert_eq!(square.vertex_region().size, 4 * 32);
    assert_eq!(square.index_region().map(|r| r.size), Some(12));
}

#[test]
fn test_cube_is_non_indexed() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();

    let cube = Geometry::cube(&mut device, &mut arena).unwrap();

    assert_eq!(cube.draw_call(), DrawCall::Arrays { vertex_count: 36 });
    assert!(cube.index_region().is_none());
}

#[test]
fn test_cube_vertices_on_unit_cube() {
    let vertices = cube_vertices();
    assert_eq!(vertices.len(), 36);
    for v in &vertices {
        assert!(v.position.iter().all(|c| c.abs() <= 0.5 + f32::EPSILON));
        // Every vertex lies on the face its normal points to
        let along_normal: f32 = (0..3).map(|i| v.position[i] * v.normal[i]).sum();
        assert!((along_normal - 0.5).abs() < 1e-6);
    }
}

#[test]
fn test_geometries_share_arena() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();

    let square = Geometry::square(&mut device, &mut arena).unwrap();
    let cube = Geometry::cube(&mut device, &mut arena).unwrap();

    assert!(square.vertex_region().end() <= cube.vertex_region().offset);
    // Cube upload grew the vertex arena; both regions are still drawable
    square.draw(&mut device, &arena).unwrap();
    cube.draw(&mut device, &arena).unwrap();
    assert_eq!(device.live_buffer_count(), 2);
    assert!(device.violations().is_empty());
}

#[test]
fn test_draw_records_device_calls() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();
    let square = Geometry::square(&mut device, &mut arena).unwrap();
    device.clear_calls();

    square.draw(&mut device, &arena).unwrap();

    assert_eq!(device.calls(), vec![DeviceCall::DrawIndexed { index_count: 6 }]);
}

#[test]
fn test_upload_rejects_out_of_range_index() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();

    let result = Geometry::upload(
        &mut device, &mut arena, "bad", &SQUARE_VERTICES, Some(&[0, 1, 4]));

    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_upload_rejects_empty_vertices() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = GeometryArena::new();
    assert!(Geometry::upload(&mut device, &mut arena, "empty", &[], None).is_err());
}
