//! Instanced raindrop pass
//!
//! Each drop is a quad expanded in the vertex shader from its instance
//! data. The fragment shader masks it to a soft circle and samples the
//! background through it.

use super::bindings::{BackgroundLayer, FrameBindings, TextureBindings};
use super::types::DropInstance;

/// Instances the buffer starts out with
pub const INITIAL_INSTANCE_CAPACITY: usize = 256;

/// Vertices per drop quad (two triangles, no index buffer)
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Render pipeline and instance buffer for raindrops
pub struct DropPipeline {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instance_count: u32,
}

impl DropPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame: &FrameBindings,
        textures: &TextureBindings,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Drop Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &textures.layout],
            push_constant_ranges: &[],
        });

        let shader_source = concat!(
            include_str!("../shaders/common.wgsl"),
            include_str!("../shaders/drops.wgsl"),
        );
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Drop Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Drop Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Self::instance_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = Self::create_instance_buffer(device, INITIAL_INSTANCE_CAPACITY);

        Self {
            pipeline,
            instance_buffer,
            capacity: INITIAL_INSTANCE_CAPACITY,
            instance_count: 0,
        }
    }

    /// Get the vertex buffer layout for DropInstance
    fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DropInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // center: vec2<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                // velocity: vec2<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
                // radius: f32
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 16,
                    shader_location: 2,
                },
                // age: f32
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 20,
                    shader_location: 3,
                },
            ],
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Drop Instance Buffer"),
            size: (capacity * std::mem::size_of::<DropInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Upload this frame's drops, growing the buffer when needed
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[DropInstance]) {
        if instances.len() > self.capacity {
            let capacity = grown_capacity(self.capacity, instances.len());
            log::debug!("Growing drop instance buffer to {} instances", capacity);
            self.instance_buffer.destroy();
            self.instance_buffer = Self::create_instance_buffer(device, capacity);
            self.capacity = capacity;
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.instance_count = instances.len() as u32;
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame: &FrameBindings, layer: &BackgroundLayer) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame.bind_group(), &[]);
        pass.set_bind_group(1, layer.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..QUAD_VERTEX_COUNT, 0..self.instance_count);
    }

    pub fn release(self) {
        self.instance_buffer.destroy();
    }
}

/// Next power of two at or above `needed`, never below `current`
fn grown_capacity(current: usize, needed: usize) -> usize {
    needed.next_power_of_two().max(current)
}
