//! relay-core: render targets, pass orchestration, pixel readback and
//! texture introspection for the depth-texture relay experiments.

/// Re-export wgpu for downstream crates while avoiding direct dependency leakage.
pub use wgpu;

mod bindings;
mod error;
pub mod introspect;
mod orchestrator;
mod pipeline;
pub mod readback;
mod target;
mod upload;

pub use bindings::{BindingValue, ShaderBindings};
pub use error::RelayError;
pub use orchestrator::{
    CompositeDest, Orchestrator, OrchestratorConfig, PassDescriptor, PassTarget, Shading,
    validate_relay_component, validate_resolutions,
};
pub use pipeline::{DepthProbeRenderer, DepthRelayRenderer, ManualDepthRenderer, ObjectRenderer};
pub use target::{Attachment, BindingTracker, ColorComponentType, RenderTarget, TargetId, TargetSet};
pub use upload::{DepthMode, DrawCommand, SceneBuffers, TagFilter, Vertex, upload_scene};

/// Choose an sRGB surface format when available; otherwise, pick the first format.
pub fn choose_srgb_surface_format(adapter: &wgpu::Adapter, surface: &wgpu::Surface) -> wgpu::TextureFormat {
    let caps = surface.get_capabilities(adapter);
    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .unwrap_or(caps.formats[0])
}

/// Create a surface configuration for the given size, favoring FIFO present mode when present.
pub fn make_surface_config(
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    let caps = surface.get_capabilities(adapter);
    let format = choose_srgb_surface_format(adapter, surface);
    let present_mode = caps
        .present_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::PresentMode::Fifo)
        .unwrap_or(caps.present_modes[0]);
    let alpha_mode = caps
        .alpha_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::CompositeAlphaMode::Opaque)
        .unwrap_or(caps.alpha_modes[0]);
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 1,
    }
}
