//! Pass orchestrator: the fixed Capture → depth-bind → Relay → Composite
//! cycle. Later passes read the depth attachment written by the capture
//! pass, so the ordering is total and enforced by construction; a target is
//! never simultaneously a draw destination and a sampler source.

use std::sync::Arc;

use crate::bindings::{BindingValue, ShaderBindings};
use crate::error::RelayError;
use crate::pipeline::{DepthProbeRenderer, DepthRelayRenderer, ManualDepthRenderer, ObjectRenderer};
use crate::target::{BindingTracker, ColorComponentType, TargetId, TargetSet};
use crate::upload::{SceneBuffers, TagFilter};

/// Where a pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    Offscreen(TargetId),
    Surface,
}

/// One ordered pass step; passes execute strictly in declared order.
/// `bindings` names the bind-group inputs applied before drawing.
#[derive(Clone, Debug)]
pub struct PassDescriptor {
    pub label: &'static str,
    pub target: PassTarget,
    pub filter: TagFilter,
    pub bindings: &'static [&'static str],
}

/// Shading used for the capture and composite draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Flat colors; manually-tagged objects use the manual-depth program in
    /// the composite pass.
    Flat,
    /// Every object emits its own device-space depth as color.
    DepthProbe,
}

/// Static configuration for one orchestrator instance.
#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    /// The depth-enabled capture target.
    pub capture: TargetId,
    /// Optional diagnostic relay target; must be float-typed.
    pub relay: Option<TargetId>,
    /// Object subset drawn in the capture pass (`Hardware` in the split
    /// variants, `All` in the single-target ones).
    pub capture_filter: TagFilter,
    pub shading: Shading,
}

/// The composite pass destination: the visible surface (or a stand-in
/// offscreen target in headless runs), with its own hardware depth buffer.
pub struct CompositeDest<'a> {
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassState {
    Idle,
    Capture,
    Relay,
    Composite,
}

/// Renderer set for the configured shading, one pipeline per target format.
enum ShadingRenderers {
    Flat {
        capture: ObjectRenderer,
        composite: ObjectRenderer,
        manual: ManualDepthRenderer,
        manual_camera_bg: wgpu::BindGroup,
    },
    Probe {
        capture: DepthProbeRenderer,
        composite: DepthProbeRenderer,
    },
}

/// Resolution contract: capture and composite must agree exactly or the
/// screen-position → depth-texel mapping would silently misalign.
pub fn validate_resolutions(capture: (u32, u32), composite: (u32, u32)) -> Result<(), RelayError> {
    if capture != composite {
        return Err(RelayError::ResolutionMismatch { capture, composite });
    }
    Ok(())
}

/// The relay target visualizes raw depth values; a normalized 8-bit store
/// would quantize them beyond use.
pub fn validate_relay_component(component: ColorComponentType) -> Result<(), RelayError> {
    if !component.holds_depth_range() {
        return Err(RelayError::DepthRangeUnrepresentable { component });
    }
    Ok(())
}

pub struct Orchestrator {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: OrchestratorConfig,
    state: PassState,
    tracker: BindingTracker,

    camera_buffer: wgpu::Buffer,
    resolution_buffer: wgpu::Buffer,
    renderers: ShadingRenderers,
    relay: Option<DepthRelayRenderer>,
    capture_camera_bg: wgpu::BindGroup,
    composite_camera_bg: wgpu::BindGroup,

    /// Bindings of the manual-depth program; its depth texture entry is
    /// attached exactly once per run, after the capture pass.
    manual_bindings: ShaderBindings,
}

impl Orchestrator {
    /// Build the orchestrator, failing fast on configuration errors before
    /// any pipeline is created.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        targets: &TargetSet,
        config: OrchestratorConfig,
        surface_format: wgpu::TextureFormat,
        composite_size: (u32, u32),
    ) -> Result<Self, RelayError> {
        let capture_target = targets.get(config.capture);
        capture_target.depth()?;
        validate_resolutions(capture_target.size(), composite_size)?;
        if let Some(relay_id) = config.relay {
            let relay_target = targets.get(relay_id);
            validate_relay_component(relay_target.component)?;
            validate_resolutions(capture_target.size(), relay_target.size())?;
            // The relay pass samples the capture target's depth attachment.
            BindingTracker::ensure_disjoint(&relay_target.label, &[&capture_target.label])?;
        }

        let capture_format = capture_target.component.texture_format();
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera-uniform"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The depth-reading programs divide the fragment position by this to
        // address the matching capture texel.
        let resolution_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("resolution-uniform"),
            size: 8,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let resolution = [composite_size.0 as f32, composite_size.1 as f32];
        queue.write_buffer(&resolution_buffer, 0, bytemuck::bytes_of(&resolution));

        let relay = config
            .relay
            .map(|id| DepthRelayRenderer::new(device.clone(), targets.get(id).component.texture_format()));

        let mut manual_bindings = ShaderBindings::new();
        manual_bindings.set("tDepth", BindingValue::Texture(None));
        manual_bindings.set(
            "resolution",
            BindingValue::Vec2([composite_size.0 as f32, composite_size.1 as f32]),
        );

        let (renderers, capture_camera_bg, composite_camera_bg) = match config.shading {
            Shading::Flat => {
                let capture = ObjectRenderer::new(device.clone(), capture_format);
                let composite = ObjectRenderer::new(device.clone(), surface_format);
                let manual = ManualDepthRenderer::new(device.clone(), surface_format);
                let capture_bg = capture.camera_bind_group(&device, &camera_buffer);
                let composite_bg = composite.camera_bind_group(&device, &camera_buffer);
                let manual_camera_bg = manual.camera_bind_group(&device, &camera_buffer);
                (
                    ShadingRenderers::Flat { capture, composite, manual, manual_camera_bg },
                    capture_bg,
                    composite_bg,
                )
            }
            Shading::DepthProbe => {
                let capture = DepthProbeRenderer::new(device.clone(), capture_format);
                let composite = DepthProbeRenderer::new(device.clone(), surface_format);
                let capture_bg = capture.camera_bind_group(&device, &camera_buffer);
                let composite_bg = composite.camera_bind_group(&device, &camera_buffer);
                (ShadingRenderers::Probe { capture, composite }, capture_bg, composite_bg)
            }
        };

        Ok(Self {
            device,
            queue,
            config,
            state: PassState::Idle,
            tracker: BindingTracker::new(),
            camera_buffer,
            resolution_buffer,
            renderers,
            relay,
            capture_camera_bg,
            composite_camera_bg,
            manual_bindings,
        })
    }

    /// Bindings of the manual-depth program, for diagnostics.
    pub fn manual_bindings(&self) -> &ShaderBindings {
        &self.manual_bindings
    }

    /// True outside a render cycle. The cycle is synchronous, so this holds
    /// whenever control is back with the caller.
    pub fn is_idle(&self) -> bool {
        self.state == PassState::Idle
    }

    /// The declared pass sequence for this configuration.
    pub fn pass_plan(&self) -> Vec<PassDescriptor> {
        let mut plan = vec![PassDescriptor {
            label: "capture",
            target: PassTarget::Offscreen(self.config.capture),
            filter: self.config.capture_filter,
            bindings: &["camera"],
        }];
        if let Some(relay_id) = self.config.relay {
            plan.push(PassDescriptor {
                label: "relay",
                target: PassTarget::Offscreen(relay_id),
                filter: TagFilter::All,
                bindings: &["tDepth"],
            });
        }
        plan.push(PassDescriptor {
            label: "composite",
            target: PassTarget::Surface,
            filter: TagFilter::All,
            bindings: match self.config.shading {
                Shading::Flat => &["camera", "tDepth"],
                Shading::DepthProbe => &["camera"],
            },
        });
        plan
    }

    /// Execute one full cycle: capture, attach the depth texture to the
    /// manual bindings, optionally relay, then composite. Returns the
    /// labels of the executed passes in order.
    pub fn render(
        &mut self,
        targets: &TargetSet,
        scene: &SceneBuffers,
        view_proj: [f32; 16],
        dest: &CompositeDest<'_>,
    ) -> Result<Vec<&'static str>, RelayError> {
        let capture_target = targets.get(self.config.capture);
        validate_resolutions(capture_target.size(), (dest.width, dest.height))?;
        let capture_depth = capture_target.depth()?;

        // Reset the per-run inter-pass state.
        self.state = PassState::Idle;
        self.manual_bindings.set("tDepth", BindingValue::Texture(None));

        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&view_proj));

        let mut executed = Vec::new();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("relay-cycle") });

        // Capture pass: the depth attachment written here is the artifact
        // every later step consumes.
        self.state = PassState::Capture;
        if self.tracker.bind(&capture_target.label) {
            log::debug!(
                "capture pass -> '{}' ({:?})",
                capture_target.label,
                self.config.capture_filter
            );
        }
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("capture-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &capture_target.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &capture_depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            match &self.renderers {
                ShadingRenderers::Flat { capture, .. } => {
                    capture.record(&mut pass, &self.capture_camera_bg, scene, self.config.capture_filter);
                }
                ShadingRenderers::Probe { capture, .. } => {
                    capture.record(&mut pass, &self.capture_camera_bg, scene, self.config.capture_filter);
                }
            }
        }
        executed.push("capture");

        // Depth-relay binding step: attach the freshly captured depth to the
        // manually-tested objects' bindings. The capture pass is fully
        // encoded, so the attachment is no longer a draw destination.
        let manual_depth_bg = match &self.renderers {
            ShadingRenderers::Flat { manual, .. } => {
                let bg = manual.depth_bind_group(&self.device, &capture_depth.view, &self.resolution_buffer);
                self.manual_bindings
                    .set("tDepth", BindingValue::Texture(Some(capture_target.label.clone())));
                log::debug!("attached '{}' depth texture to manual bindings", capture_target.label);
                Some(bg)
            }
            ShadingRenderers::Probe { .. } => None,
        };

        // Optional diagnostic relay pass.
        if let (Some(relay_id), Some(relay_renderer)) = (self.config.relay, self.relay.as_ref()) {
            let relay_target = targets.get(relay_id);
            BindingTracker::ensure_disjoint(&relay_target.label, &[&capture_target.label])?;
            self.state = PassState::Relay;
            if self.tracker.bind(&relay_target.label) {
                log::debug!("relay pass -> '{}'", relay_target.label);
            }
            let relay_bg =
                relay_renderer.depth_bind_group(&self.device, &capture_depth.view, &self.resolution_buffer);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("relay-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &relay_target.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            relay_renderer.record(&mut pass, &relay_bg);
            drop(pass);
            executed.push("relay");
        }

        // Composite pass: all objects visible; hardware-tagged objects use
        // the API depth test against the destination's own depth buffer,
        // manual ones run the shader-side comparison.
        self.state = PassState::Composite;
        if self.tracker.bind("surface") {
            log::debug!("composite pass -> surface");
        }
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("composite-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: dest.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: dest.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            match (&self.renderers, manual_depth_bg.as_ref()) {
                (ShadingRenderers::Flat { composite, manual, manual_camera_bg, .. }, Some(depth_bg)) => {
                    composite.record(&mut pass, &self.composite_camera_bg, scene, TagFilter::Hardware);
                    manual.record(&mut pass, manual_camera_bg, depth_bg, scene, TagFilter::Manual);
                }
                (ShadingRenderers::Probe { composite, .. }, _) => {
                    composite.record(&mut pass, &self.composite_camera_bg, scene, TagFilter::All);
                }
                (ShadingRenderers::Flat { .. }, None) => unreachable!("flat shading always attaches depth"),
            }
        }
        executed.push("composite");

        self.queue.submit(Some(encoder.finish()));
        self.state = PassState::Idle;
        Ok(executed)
    }
}
