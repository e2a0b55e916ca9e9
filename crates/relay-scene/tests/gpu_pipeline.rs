//! GPU integration tests for the capture → relay → composite cycle.
//!
//! Tests skip with a note when no adapter is available.

mod common;

use common::{CompositeTarget, TestContext, expected_rgba8, pixel_offset, rgba8_close};
use glam::{Mat4, Vec4};
use relay_core::readback::{PixelBuffer, read_back, read_back_depth, read_back_depth_texture};
use relay_core::{
    ColorComponentType, CompositeDest, Orchestrator, OrchestratorConfig, RelayError, Shading,
    TagFilter, TargetSet, wgpu,
};
use relay_scene::{Camera, ObjectRegistry, upload_registry};

const SIZE: u32 = 64;

/// Sample pixels chosen from the standard scene's projection at 64x64:
/// the smallest quad spans about +/-15px around the center, the middle one
/// about +/-25px, and the largest covers the whole frame.
const CENTER: (u32, u32) = (32, 32);
const MIDDLE_ONLY: (u32, u32) = (52, 32);
const BACK_ONLY: (u32, u32) = (62, 32);

struct Harness {
    ctx: TestContext,
    targets: TargetSet,
    composite: CompositeTarget,
    orchestrator: Orchestrator,
    scene: relay_core::SceneBuffers,
    view_proj: [f32; 16],
    capture: relay_core::TargetId,
    relay: Option<relay_core::TargetId>,
}

fn build_harness(
    registry: ObjectRegistry,
    capture_filter: TagFilter,
    shading: Shading,
    with_relay: bool,
    composite_component: ColorComponentType,
) -> Option<Harness> {
    let ctx = TestContext::new()?;
    let mut targets = TargetSet::new(ctx.device.clone());
    let capture_component = match shading {
        Shading::Flat => ColorComponentType::UnormU8,
        Shading::DepthProbe => ColorComponentType::Float32,
    };
    let capture = targets.create_render_target("capture", SIZE, SIZE, true, capture_component);
    let relay = with_relay
        .then(|| targets.create_render_target("relay", SIZE, SIZE, false, ColorComponentType::Float32));
    let composite = CompositeTarget::new(&mut targets, SIZE, SIZE, composite_component);

    let scene = upload_registry(&ctx.device, &ctx.queue, &registry);
    let camera = Camera::standard(1.0);
    let orchestrator = Orchestrator::new(
        ctx.device.clone(),
        ctx.queue.clone(),
        &targets,
        OrchestratorConfig { capture, relay, capture_filter, shading },
        composite_component.texture_format(),
        (SIZE, SIZE),
    )
    .expect("orchestrator setup");

    Some(Harness {
        view_proj: camera.view_proj(),
        ctx,
        targets,
        composite,
        orchestrator,
        scene,
        capture,
        relay,
    })
}

impl Harness {
    fn render(&mut self) -> Vec<&'static str> {
        let color_view = &self.targets.get(self.composite.id).color.view;
        let dest = CompositeDest {
            color_view,
            depth_view: &self.composite.depth.view,
            width: self.composite.width,
            height: self.composite.height,
        };
        self.orchestrator
            .render(&self.targets, &self.scene, self.view_proj, &dest)
            .expect("render cycle")
    }

    fn composite_pixels(&self) -> Vec<u8> {
        let data = read_back(&self.ctx.device, &self.ctx.queue, self.targets.get(self.composite.id))
            .expect("composite readback");
        match data.buffer {
            PixelBuffer::Unorm8(v) => v,
            other => panic!("expected u8 pixels, got {other:?}"),
        }
    }

    fn composite_floats(&self) -> Vec<f32> {
        let data = read_back(&self.ctx.device, &self.ctx.queue, self.targets.get(self.composite.id))
            .expect("composite readback");
        match data.buffer {
            PixelBuffer::Float(v) => v,
            other => panic!("expected f32 pixels, got {other:?}"),
        }
    }
}

fn device_z(view_proj: [f32; 16], world_z: f32) -> f32 {
    let vp = Mat4::from_cols_array(&view_proj);
    let clip = vp * Vec4::new(0.0, 0.0, world_z, 1.0);
    clip.z / clip.w
}

#[test]
fn hardware_occlusion_orders_stacked_quads() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(false),
        TagFilter::All,
        Shading::Flat,
        true,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    let executed = harness.render();
    assert_eq!(executed, ["capture", "relay", "composite"]);

    let pixels = harness.composite_pixels();
    let at = |(x, y)| &pixels[pixel_offset(SIZE, x, y, 4)..pixel_offset(SIZE, x, y, 4) + 4];

    // Nearest quad wins at the center, middle at its ring, back fills the rest.
    assert!(rgba8_close(at(CENTER), expected_rgba8(relay_scene::pale_violet_red()), 2));
    assert!(rgba8_close(at(MIDDLE_ONLY), expected_rgba8(relay_scene::medium_violet_red()), 2));
    assert!(rgba8_close(at(BACK_ONLY), expected_rgba8(relay_scene::deep_pink()), 2));
}

#[test]
fn depth_readback_contains_quad_depths() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(false),
        TagFilter::All,
        Shading::Flat,
        false,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let data = read_back_depth(
        &harness.ctx.device,
        &harness.ctx.queue,
        harness.targets.get(harness.capture),
    )
    .expect("depth readback");

    let PixelBuffer::Float(depths) = &data.buffer else {
        panic!("depth readback must be f32");
    };
    assert_eq!(depths.len(), (SIZE * SIZE) as usize);

    // Largest quad covers the frame, so the clear value never survives and
    // every pixel holds one of the three quad depths.
    let PixelBuffer::Float(distinct) = &data.distinct else { unreachable!() };
    assert_eq!(distinct.len(), 3);
    for world_z in [1.0, 2.0, 3.0] {
        let expected = device_z(harness.view_proj, world_z);
        assert!(
            distinct.iter().any(|d| (d - expected).abs() < 1e-6),
            "depth for z={world_z} missing from {distinct:?}"
        );
    }

    let center = depths[(CENTER.1 * SIZE + CENTER.0) as usize];
    assert!((center - device_z(harness.view_proj, 3.0)).abs() < 1e-6);
}

#[test]
fn relay_pass_copies_depth_to_red_channel() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(false),
        TagFilter::All,
        Shading::Flat,
        true,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let relay_id = harness.relay.expect("relay target configured");
    let relay_data = read_back(&harness.ctx.device, &harness.ctx.queue, harness.targets.get(relay_id))
        .expect("relay readback");
    let depth_data = read_back_depth(
        &harness.ctx.device,
        &harness.ctx.queue,
        harness.targets.get(harness.capture),
    )
    .expect("depth readback");

    let PixelBuffer::Float(relay_px) = &relay_data.buffer else {
        panic!("relay target must be f32");
    };
    let PixelBuffer::Float(depths) = &depth_data.buffer else {
        panic!("depth readback must be f32");
    };

    // Red channel is the relayed depth, bit for bit; green/blue zero, alpha one.
    assert_eq!(relay_px.len(), depths.len() * 4);
    for (i, &d) in depths.iter().enumerate() {
        assert_eq!(relay_px[4 * i].to_bits(), d.to_bits(), "red channel at pixel {i}");
        assert_eq!(relay_px[4 * i + 1], 0.0);
        assert_eq!(relay_px[4 * i + 2], 0.0);
        assert_eq!(relay_px[4 * i + 3], 1.0);
    }
}

#[test]
fn manual_object_discards_behind_captured_depth() {
    // Middle quad is manually tested; the capture pass renders only the
    // hardware subset (front and back quads).
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(true),
        TagFilter::Hardware,
        Shading::Flat,
        true,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let pixels = harness.composite_pixels();
    let at = |(x, y)| &pixels[pixel_offset(SIZE, x, y, 4)..pixel_offset(SIZE, x, y, 4) + 4];

    // At the center the captured depth comes from the nearest quad, so the
    // manual middle quad sits behind it and is discarded.
    assert!(rgba8_close(at(CENTER), expected_rgba8(relay_scene::pale_violet_red()), 2));
    // Off-center only the back quad was captured; the manual quad is nearer
    // than the captured depth and passes its own test.
    assert!(rgba8_close(at(MIDDLE_ONLY), expected_rgba8(relay_scene::medium_violet_red()), 2));
    assert!(rgba8_close(at(BACK_ONLY), expected_rgba8(relay_scene::deep_pink()), 2));
}

#[test]
fn manual_draws_leave_hardware_depth_untouched() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(true),
        TagFilter::Hardware,
        Shading::Flat,
        false,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let data = read_back_depth_texture(
        &harness.ctx.device,
        &harness.ctx.queue,
        &harness.composite.depth.texture,
        harness.composite.width,
        harness.composite.height,
    )
    .expect("composite depth readback");

    let PixelBuffer::Float(distinct) = &data.distinct else {
        panic!("depth readback must be f32");
    };

    // The composite destination's depth buffer only sees the hardware-tagged
    // quads (back and front). The manual middle quad is visible in color but
    // draws with depth writes off, so its depth must never land here.
    let back = device_z(harness.view_proj, 1.0);
    let front = device_z(harness.view_proj, 3.0);
    let middle = device_z(harness.view_proj, 2.0);
    assert_eq!(distinct.len(), 2, "unexpected depth values: {distinct:?}");
    assert!(distinct.iter().any(|d| (d - back).abs() < 1e-6));
    assert!(distinct.iter().any(|d| (d - front).abs() < 1e-6));
    assert!(
        distinct.iter().all(|d| (d - middle).abs() > 1e-6),
        "manually tested quad wrote device depth: {distinct:?}"
    );
}

#[test]
fn layered_variant_skips_relay_pass() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(true),
        TagFilter::Hardware,
        Shading::Flat,
        false,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    let executed = harness.render();
    assert_eq!(executed, ["capture", "composite"]);

    // The manual-vs-hardware outcome is unchanged without the diagnostic pass.
    let pixels = harness.composite_pixels();
    let at = |(x, y)| &pixels[pixel_offset(SIZE, x, y, 4)..pixel_offset(SIZE, x, y, 4) + 4];
    assert!(rgba8_close(at(CENTER), expected_rgba8(relay_scene::pale_violet_red()), 2));
    assert!(rgba8_close(at(MIDDLE_ONLY), expected_rgba8(relay_scene::medium_violet_red()), 2));
}

#[test]
fn manual_tie_with_captured_depth_renders() {
    // The nearest two quads are manually tested and the capture pass draws
    // everything, so each manual fragment compares against a captured depth
    // that is either its own (a tie) or a nearer quad's.
    let mut registry = ObjectRegistry::new();
    registry.add(relay_scene::DrawableObject::new(
        "DeepPink",
        20.0,
        1.0,
        relay_scene::deep_pink(),
        relay_core::DepthMode::Hardware,
    ));
    registry.add(relay_scene::DrawableObject::new(
        "MediumVioletRed",
        4.0,
        2.0,
        relay_scene::medium_violet_red(),
        relay_core::DepthMode::Manual,
    ));
    registry.add(relay_scene::DrawableObject::new(
        "PaleVioletRed",
        2.0,
        3.0,
        relay_scene::pale_violet_red(),
        relay_core::DepthMode::Manual,
    ));

    let Some(mut harness) = build_harness(
        registry,
        TagFilter::All,
        Shading::Flat,
        false,
        ColorComponentType::UnormU8,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let pixels = harness.composite_pixels();
    let at = |(x, y)| &pixels[pixel_offset(SIZE, x, y, 4)..pixel_offset(SIZE, x, y, 4) + 4];

    // At the center the nearest quad ties with its own captured depth and
    // renders; the middle quad is strictly farther and is discarded.
    assert!(rgba8_close(at(CENTER), expected_rgba8(relay_scene::pale_violet_red()), 2));
    // On its ring the middle quad is itself the captured depth: a tie, visible.
    assert!(rgba8_close(at(MIDDLE_ONLY), expected_rgba8(relay_scene::medium_violet_red()), 2));
    assert!(rgba8_close(at(BACK_ONLY), expected_rgba8(relay_scene::deep_pink()), 2));
}

#[test]
fn depth_probe_emits_device_depth_as_color() {
    let Some(mut harness) = build_harness(
        ObjectRegistry::standard(false),
        TagFilter::All,
        Shading::DepthProbe,
        false,
        ColorComponentType::Float32,
    ) else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };

    harness.render();
    let pixels = harness.composite_floats();
    let offset = pixel_offset(SIZE, CENTER.0, CENTER.1, 4);

    // Nearest quad at world z=3: blue holds its device depth, alpha the
    // clip-space w (view distance).
    let vp = Mat4::from_cols_array(&harness.view_proj);
    let clip = vp * Vec4::new(0.0, 0.0, 3.0, 1.0);
    assert_eq!(pixels[offset], 0.0);
    assert_eq!(pixels[offset + 1], 0.0);
    assert!((pixels[offset + 2] - clip.z / clip.w).abs() < 1e-4);
    assert!((pixels[offset + 3] - clip.w).abs() < 1e-3);
}

#[test]
fn orchestrator_rejects_capture_as_its_own_relay() {
    let Some(ctx) = TestContext::new() else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };
    let mut targets = TargetSet::new(ctx.device.clone());
    let capture = targets.create_render_target("capture", SIZE, SIZE, true, ColorComponentType::Float32);

    let err = Orchestrator::new(
        ctx.device.clone(),
        ctx.queue.clone(),
        &targets,
        OrchestratorConfig {
            capture,
            relay: Some(capture),
            capture_filter: TagFilter::All,
            shading: Shading::Flat,
        },
        wgpu::TextureFormat::Rgba8Unorm,
        (SIZE, SIZE),
    )
    .err()
    .expect("same target as capture and relay must be rejected");
    assert!(matches!(err, RelayError::TargetBoundAsSampler { .. }));
}

#[test]
fn orchestrator_rejects_mismatched_composite_size() {
    let Some(ctx) = TestContext::new() else {
        eprintln!("no GPU adapter available, skipping");
        return;
    };
    let mut targets = TargetSet::new(ctx.device.clone());
    let capture = targets.create_render_target("capture", SIZE, SIZE, true, ColorComponentType::UnormU8);

    let err = Orchestrator::new(
        ctx.device.clone(),
        ctx.queue.clone(),
        &targets,
        OrchestratorConfig {
            capture,
            relay: None,
            capture_filter: TagFilter::All,
            shading: Shading::Flat,
        },
        wgpu::TextureFormat::Rgba8Unorm,
        (SIZE / 2, SIZE / 2),
    )
    .err()
    .expect("composite size mismatch must be rejected");
    assert!(matches!(err, RelayError::ResolutionMismatch { .. }));
}
