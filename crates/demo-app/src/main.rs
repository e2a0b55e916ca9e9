use anyhow::Result;
use relay_config::RelayConfig;
use relay_core::introspect::{DiagnosticSink, StdoutSink, describe_texture};
use relay_core::readback::{read_back, read_back_depth, report_pixels};
use relay_core::{
    CompositeDest, Orchestrator, OrchestratorConfig, Shading, SceneBuffers, TargetId, TargetSet,
};
use relay_scene::upload_registry;
use relay_window::{EventHandler, RelayWindow, WindowCtx};

mod variants;
use variants::{Variant, parse_component};

fn main() -> Result<()> {
    env_logger::init();

    let config = RelayConfig::load();
    let variant = Variant::select(&config);
    log::info!(
        "variant '{}', {}x{}",
        variant.name(),
        config.window.width,
        config.window.height
    );

    let window = RelayWindow::new(
        &format!("Depth Relay — {}", variant.name()),
        config.window.width,
        config.window.height,
        !config.experiment.keep_open,
    )?;
    window.run(Experiment::new(config, variant))
}

/// Per-run GPU state, built once the window and device exist.
struct RenderState {
    targets: TargetSet,
    capture: TargetId,
    relay: Option<TargetId>,
    scene: SceneBuffers,
    view_proj: [f32; 16],
    orchestrator: Orchestrator,
    surface_depth: relay_core::Attachment,
}

struct Experiment {
    config: RelayConfig,
    variant: Variant,
    state: Option<RenderState>,
    reported: bool,
}

impl Experiment {
    fn new(config: RelayConfig, variant: Variant) -> Self {
        Self { config, variant, state: None, reported: false }
    }
}

impl EventHandler for Experiment {
    fn init(&mut self, ctx: &mut WindowCtx) -> Result<()> {
        let device = ctx.device_arc();
        let queue = ctx.queue_arc();
        let size = ctx.size();
        let (width, height) = (size.width, size.height);

        let mut targets = TargetSet::new(device.clone());
        let capture = targets.create_render_target(
            "renderTarget",
            width,
            height,
            true,
            self.variant.capture_component(),
        );
        let relay = self.variant.wants_relay().then(|| {
            let component = self
                .config
                .relay
                .component
                .as_deref()
                .and_then(parse_component)
                .unwrap_or(relay_core::ColorComponentType::Float32);
            targets.create_render_target("renderTarget2", width, height, false, component)
        });

        let registry = self.variant.registry();
        let scene = upload_registry(&device, &queue, &registry);
        let camera = self.variant.camera(width as f32 / height as f32);

        let orchestrator = Orchestrator::new(
            device.clone(),
            queue.clone(),
            &targets,
            OrchestratorConfig {
                capture,
                relay,
                capture_filter: self.variant.capture_filter(),
                shading: self.variant.shading(),
            },
            ctx.surface_config().format,
            (width, height),
        )?;

        for pass in orchestrator.pass_plan() {
            log::info!(
                "pass '{}' -> {:?} ({:?}, bindings {:?})",
                pass.label,
                pass.target,
                pass.filter,
                pass.bindings
            );
        }

        let surface_depth = targets.surface_depth(width, height);

        let mut sink = StdoutSink;
        let capture_target = targets.get(capture);
        describe_texture("renderTarget.texture", &capture_target.color.descriptor, &mut sink);
        describe_texture(
            "renderTarget.depthTexture",
            &capture_target.depth()?.descriptor,
            &mut sink,
        );
        if let Some(relay_id) = relay {
            describe_texture(
                "renderTarget2.texture",
                &targets.get(relay_id).color.descriptor,
                &mut sink,
            );
        }

        self.state = Some(RenderState {
            targets,
            capture,
            relay,
            scene,
            view_proj: camera.view_proj(),
            orchestrator,
            surface_depth,
        });
        Ok(())
    }

    fn on_redraw(&mut self, ctx: &mut WindowCtx) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        let device = ctx.device_arc();
        let queue = ctx.queue_arc();
        let size = ctx.size();

        let frame = ctx.acquire_current_frame()?;
        let color_view = frame
            .texture
            .create_view(&relay_core::wgpu::TextureViewDescriptor::default());
        let dest = CompositeDest {
            color_view: &color_view,
            depth_view: &state.surface_depth.view,
            width: size.width,
            height: size.height,
        };

        let executed =
            state
                .orchestrator
                .render(&state.targets, &state.scene, state.view_proj, &dest)?;
        log::info!("executed passes: {executed:?}");

        // Readback diagnostics once; later frames (keep-open mode) just present.
        if !self.reported {
            self.reported = true;
            let mut sink = StdoutSink;
            let capture_target = state.targets.get(state.capture);

            let depth = read_back_depth(&device, &queue, capture_target)?;
            report_pixels("renderTarget depth pixels", &depth, &mut sink);

            let color = read_back(&device, &queue, capture_target)?;
            report_pixels("renderTarget color pixels", &color, &mut sink);
            if let Some(relay_id) = state.relay {
                let relay_pixels = read_back(&device, &queue, state.targets.get(relay_id))?;
                report_pixels("renderTarget2 color pixels", &relay_pixels, &mut sink);
            }
            if matches!(self.variant.shading(), Shading::Flat) {
                state.orchestrator.manual_bindings().report("manual depth bindings", &mut sink);
            }
            sink.line("");
        }

        frame.present();
        Ok(())
    }
}
