//! wgpu renderer for the raindrop effect
//!
//! Construction only sets up the surface. Pipelines and the background
//! texture are created by the futures returned from `load_assets` and
//! `reload_background`; those futures own clones of the device and queue
//! plus a shared slot they install their results into.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use futures::future::{self, FutureExt};
use raindrop_core::{
    AssetError, Background, FrameClock, LoadFuture, RenderError, RenderOptions, Renderer, Viewport,
};
use raindrop_sim::RaindropSimulator;
use winit::dpi::PhysicalSize;

use crate::background::{self, BackgroundPixels};
use crate::canvas::WindowCanvas;
use crate::context::RenderContext;
use crate::pipeline::{
    BackgroundLayer, BackgroundPipeline, DropInstance, DropPipeline, FrameBindings, FrameUniforms,
    TextureBindings,
};

/// Holds the value from the newest request that has completed
///
/// Background loads may finish out of order. A result is only kept if no
/// newer request has already been installed.
#[derive(Debug)]
struct LatestSlot<T> {
    value: Option<T>,
    generation: u64,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            generation: 0,
        }
    }
}

impl<T> LatestSlot<T> {
    /// Offer a result; returns whichever value lost (the old one or the offer)
    fn offer(&mut self, generation: u64, value: T) -> Option<T> {
        if self.value.is_some() && generation < self.generation {
            return Some(value);
        }
        self.generation = generation;
        self.value.replace(value)
    }

    fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

/// Pipelines and bindings created on first load
struct GpuResources {
    frame: FrameBindings,
    textures: TextureBindings,
    background_pipeline: BackgroundPipeline,
    drop_pipeline: DropPipeline,
}

impl GpuResources {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let frame = FrameBindings::new(device);
        let textures = TextureBindings::new(device);
        let background_pipeline = BackgroundPipeline::new(device, format, &frame, &textures);
        let drop_pipeline = DropPipeline::new(device, format, &frame, &textures);
        Self {
            frame,
            textures,
            background_pipeline,
            drop_pipeline,
        }
    }
}

#[derive(Default)]
struct LoadedState {
    resources: Option<GpuResources>,
    background: LatestSlot<BackgroundLayer>,
}

/// Everything an in-flight load needs, detached from the renderer borrow
#[derive(Clone)]
struct Loader {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    state: Rc<RefCell<LoadedState>>,
    destroyed: Rc<Cell<bool>>,
}

impl Loader {
    /// Decode `background`, then upload it (creating pipelines first if needed)
    async fn load(self, background: Background, generation: u64) -> Result<(), AssetError> {
        let source = background.to_string();
        let pixels = background::load_async(background).await?;
        if self.destroyed.get() {
            log::debug!("Renderer destroyed while loading {}; discarding", source);
            return Ok(());
        }
        self.install(&pixels, generation);
        log::info!(
            "Loaded background {} ({}x{})",
            source,
            pixels.width,
            pixels.height
        );
        Ok(())
    }

    fn install(&self, pixels: &BackgroundPixels, generation: u64) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let resources = state
            .resources
            .get_or_insert_with(|| GpuResources::new(&self.device, self.format));
        let layer = resources.textures.upload(&self.device, &self.queue, pixels);
        let (width, height) = layer.size();
        log::debug!("Uploaded {}x{} background (request {})", width, height, generation);
        if let Some(displaced) = state.background.offer(generation, layer) {
            displaced.release();
        }
    }
}

/// Draws a [`RaindropSimulator`] over a background into a window
pub struct RaindropRenderer {
    context: Option<RenderContext>,
    options: RenderOptions,
    state: Rc<RefCell<LoadedState>>,
    destroyed: Rc<Cell<bool>>,
    /// Generation handed to the most recent background request
    background_requests: u64,
    instances: Vec<DropInstance>,
}

impl RaindropRenderer {
    fn loader(&self) -> Option<Loader> {
        let context = self.context.as_ref()?;
        Some(Loader {
            device: context.device.clone(),
            queue: context.queue.clone(),
            format: context.format(),
            state: self.state.clone(),
            destroyed: self.destroyed.clone(),
        })
    }

    fn request_background(&mut self) -> LoadFuture {
        let Some(loader) = self.loader() else {
            return future::ready(Err(AssetError::Cancelled)).boxed_local();
        };
        self.background_requests += 1;
        loader
            .load(self.options.background.clone(), self.background_requests)
            .boxed_local()
    }

    fn draw(&mut self, context: &RenderContext, simulator: &RaindropSimulator, clock: FrameClock) {
        let mut state = self.state.borrow_mut();
        let LoadedState {
            resources: Some(resources),
            background,
        } = &mut *state
        else {
            log::trace!("Skipping frame: assets not loaded");
            return;
        };
        let Some(layer) = background.get() else {
            return;
        };

        let (width, height) = (context.size.width, context.size.height);
        resources.frame.update(
            &context.queue,
            &FrameUniforms::new(&self.options, width, height, clock),
        );

        self.instances.clear();
        self.instances
            .extend(simulator.raindrops().map(DropInstance::from));
        resources
            .drop_pipeline
            .upload(&context.device, &context.queue, &self.instances);

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost; reconfiguring");
                context.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory acquiring surface texture");
                return;
            }
            Err(e) => {
                log::warn!("Dropped frame: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Raindrop Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raindrop Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

            resources
                .background_pipeline
                .draw(&mut pass, &resources.frame, layer);
            resources
                .drop_pipeline
                .draw(&mut pass, &resources.frame, layer);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

impl Renderer<RaindropSimulator> for RaindropRenderer {
    type Canvas = WindowCanvas;

    fn new(canvas: WindowCanvas, options: &RenderOptions, viewport: Viewport) -> Result<Self, RenderError> {
        let mut context = pollster::block_on(RenderContext::with_vsync(
            canvas.window().clone(),
            options.vsync,
        ))?;
        context.resize(PhysicalSize::new(viewport.width, viewport.height));

        Ok(Self {
            context: Some(context),
            options: options.clone(),
            state: Rc::new(RefCell::new(LoadedState::default())),
            destroyed: Rc::new(Cell::new(false)),
            background_requests: 0,
            instances: Vec::new(),
        })
    }

    fn load_assets(&mut self) -> LoadFuture {
        log::debug!("Loading renderer assets");
        self.request_background()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(context) = self.context.as_mut() {
            context.resize(PhysicalSize::new(width, height));
        }
    }

    fn set_background(&mut self, background: Background) {
        self.options.background = background;
    }

    fn reload_background(&mut self) -> LoadFuture {
        self.request_background()
    }

    fn render(&mut self, simulator: &RaindropSimulator, clock: FrameClock) {
        if self.destroyed.get() {
            return;
        }
        let Some(context) = self.context.take() else {
            return;
        };
        self.draw(&context, simulator, clock);
        self.context = Some(context);
    }

    fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn destroy(&mut self) {
        if self.destroyed.replace(true) {
            return;
        }
        let mut state = self.state.borrow_mut();
        if let Some(layer) = state.background.take() {
            layer.release();
        }
        if let Some(resources) = state.resources.take() {
            resources.drop_pipeline.release();
        }
        drop(state);
        self.instances = Vec::new();
        self.context = None;
        log::info!("Renderer destroyed");
    }
}
