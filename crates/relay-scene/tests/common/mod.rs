//! Shared infrastructure for GPU integration tests.

use std::sync::Arc;

use relay_core::{Attachment, ColorComponentType, TargetId, TargetSet, wgpu};
use relay_scene::ColorLin;

/// Headless GPU context. `new` returns `None` when no adapter is available
/// so tests can skip instead of failing on GPU-less runners.
pub struct TestContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl TestContext {
    pub fn new() -> Option<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))?;
        let (device, queue) = pollster::block_on(
            adapter.request_device(&wgpu::DeviceDescriptor::default(), None),
        )
        .ok()?;
        Some(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}

/// An offscreen stand-in for the visible surface: a color target plus a
/// plain depth buffer for the composite pass's hardware test.
pub struct CompositeTarget {
    pub id: TargetId,
    pub depth: Attachment,
    pub width: u32,
    pub height: u32,
}

impl CompositeTarget {
    pub fn new(
        targets: &mut TargetSet,
        width: u32,
        height: u32,
        component: ColorComponentType,
    ) -> Self {
        let id = targets.create_render_target("composite", width, height, false, component);
        let depth = targets.surface_depth(width, height);
        Self { id, depth, width, height }
    }
}

/// Byte offset of pixel (x, y) in readback data (padding already stripped).
pub fn pixel_offset(width: u32, x: u32, y: u32, bytes_per_pixel: u32) -> usize {
    ((y * width + x) * bytes_per_pixel) as usize
}

/// Expected rgba8 bytes for a linear color written to an `Rgba8Unorm` target.
pub fn expected_rgba8(color: ColorLin) -> [u8; 4] {
    let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    [q(color.r), q(color.g), q(color.b), q(color.a)]
}

pub fn rgba8_close(actual: &[u8], expected: [u8; 4], tolerance: u8) -> bool {
    actual.len() == 4
        && actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| a.abs_diff(*e) <= tolerance)
}
