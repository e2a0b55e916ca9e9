//! relay-window: minimal winit + wgpu window wrapper for the relay demos.
//!
//! Responsibilities:
//! - Create window + surface + device/queue.
//! - Manage surface configuration and resizing.
//! - Dispatch redraw/resize to a handler; optionally exit after the first
//!   presented frame (the demos render once, report, and quit).

use anyhow::Result;
use relay_core::{make_surface_config, wgpu};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

pub struct RelayWindow {
    event_loop: EventLoop<()>,
    // We must leak the window to satisfy wgpu surface lifetime requirements.
    window: &'static Window,
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    _adapter: wgpu::Adapter,
    device: std::sync::Arc<wgpu::Device>,
    queue: std::sync::Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    /// Exit the loop after the first successful redraw.
    run_once: bool,
}

pub struct WindowCtx<'a> {
    window: &'a Window,
    device: &'a std::sync::Arc<wgpu::Device>,
    queue: &'a std::sync::Arc<wgpu::Queue>,
    surface: &'a wgpu::Surface<'static>,
    config: &'a mut wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    elwt: &'a EventLoopWindowTarget<()>,
}

impl<'a> WindowCtx<'a> {
    pub fn window(&self) -> &Window { self.window }
    pub fn device(&self) -> &wgpu::Device { &*self.device }
    pub fn queue(&self) -> &wgpu::Queue { &*self.queue }
    pub fn device_arc(&self) -> std::sync::Arc<wgpu::Device> { self.device.clone() }
    pub fn queue_arc(&self) -> std::sync::Arc<wgpu::Queue> { self.queue.clone() }
    pub fn surface_config(&self) -> &wgpu::SurfaceConfiguration { self.config }
    pub fn size(&self) -> PhysicalSize<u32> { self.size }
    pub fn request_redraw(&self) { self.window.request_redraw(); }
    pub fn acquire_current_frame(&self) -> Result<wgpu::SurfaceTexture> {
        Ok(self.surface.get_current_texture()?)
    }
    pub fn event_loop_target(&self) -> &EventLoopWindowTarget<()> { self.elwt }
}

pub trait EventHandler {
    fn init(&mut self, _ctx: &mut WindowCtx) -> Result<()> { Ok(()) }
    fn on_resize(&mut self, _ctx: &mut WindowCtx, _size: PhysicalSize<u32>) -> Result<()> { Ok(()) }
    fn on_redraw(&mut self, _ctx: &mut WindowCtx) -> Result<()> { Ok(()) }
}

impl RelayWindow {
    pub fn new(title: &str, width: u32, height: u32, run_once: bool) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false)
            .build(&event_loop)?;
        let window: &'static Window = Box::leak(Box::new(window));

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;

        let size = window.inner_size();
        let config = make_surface_config(&adapter, &surface, size.width, size.height);
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            event_loop,
            window,
            _instance: instance,
            surface,
            _adapter: adapter,
            device: std::sync::Arc::new(device),
            queue: std::sync::Arc::new(queue),
            config,
            size,
            run_once,
        })
    }

    pub fn run(mut self, mut handler: impl EventHandler + 'static) -> Result<()> {
        let mut needs_init = true;
        let run_once = self.run_once;

        Ok(self.event_loop.run(move |event, elwt| {
            match event {
                Event::Resumed => {
                    if needs_init {
                        let mut ctx = WindowCtx {
                            window: self.window,
                            device: &self.device,
                            queue: &self.queue,
                            surface: &self.surface,
                            config: &mut self.config,
                            size: self.size,
                            elwt,
                        };
                        if let Err(err) = handler.init(&mut ctx) {
                            log::error!("init failed: {err:#}");
                            elwt.exit();
                        }
                        needs_init = false;
                    }
                }
                Event::WindowEvent { window_id, event: WindowEvent::RedrawRequested }
                    if window_id == self.window.id() =>
                {
                    let mut ctx = WindowCtx {
                        window: self.window,
                        device: &self.device,
                        queue: &self.queue,
                        surface: &self.surface,
                        config: &mut self.config,
                        size: self.size,
                        elwt,
                    };
                    match handler.on_redraw(&mut ctx) {
                        Ok(()) if run_once => elwt.exit(),
                        Ok(()) => {}
                        Err(err) => {
                            log::error!("redraw failed: {err:#}");
                            elwt.exit();
                        }
                    }
                }
                Event::WindowEvent { window_id, event } if window_id == self.window.id() => {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(new_size) => {
                            self.size = new_size;
                            if new_size.width > 0 && new_size.height > 0 {
                                self.config.width = new_size.width;
                                self.config.height = new_size.height;
                                self.surface.configure(&self.device, &self.config);
                            }
                            let mut ctx = WindowCtx {
                                window: self.window,
                                device: &self.device,
                                queue: &self.queue,
                                surface: &self.surface,
                                config: &mut self.config,
                                size: self.size,
                                elwt,
                            };
                            if let Err(err) = handler.on_resize(&mut ctx, new_size) {
                                log::error!("resize failed: {err:#}");
                                elwt.exit();
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Ensure at least one redraw after init on platforms where
                    // request_redraw during init may be deferred.
                    self.window.request_redraw();
                }
                _ => {}
            }
        })?)
    }

    pub fn window(&self) -> &Window { self.window }
}
