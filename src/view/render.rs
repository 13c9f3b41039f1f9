use wgpu::util::DeviceExt;
use wgpu::*;

use crate::controller::RenderDelegate;
use crate::model::{Camera, MeshBuffer, SceneGraph, ToonGradient, Vertex};
use crate::view::GpuContext;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniform {
    pub color: [f32; 4],
    pub size: f32,
    /// Pixels per unit of `size / depth`; zero disables attenuation
    pub scale: f32,
    pub viewport: [f32; 2],
}

impl CameraUniform {
    pub fn from_scene(scene: &SceneGraph, camera: &Camera) -> Self {
        Self {
            view: camera.view(&scene.rig).to_cols_array_2d(),
            proj: camera.projection().to_cols_array_2d(),
        }
    }
}

impl LightingUniform {
    pub fn from_scene(scene: &SceneGraph) -> Self {
        Self {
            direction: scene.light.direction().to_array(),
            intensity: scene.light.intensity,
            color: scene.light.color.to_linear(),
            _pad: 0.0,
        }
    }
}

/// Backing-store size for a logical size at a pixel ratio, never zero
pub fn physical_size(width: u32, height: u32, pixel_ratio: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * pixel_ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// egui output waiting to be drawn over the next frame
pub struct UiOverlay {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl UiOverlay {
    /// Replace an undrawn overlay with a newer one. Shapes come from `newer`,
    /// texture uploads and frees of both are kept in order.
    pub fn superseded_by(self, newer: UiOverlay) -> UiOverlay {
        let mut textures_delta = self.textures_delta;
        textures_delta.append(newer.textures_delta);
        UiOverlay {
            primitives: newer.primitives,
            textures_delta,
            pixels_per_point: newer.pixels_per_point,
        }
    }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> TextureView {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&TextureViewDescriptor::default())
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer<T: bytemuck::Pod>(device: &Device, label: &str, value: &T) -> Buffer {
    device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

/// Upload the toon ramp as a one-row R8 texture with nearest sampling
fn create_gradient_texture(device: &Device, queue: &Queue, gradient: &ToonGradient) -> (TextureView, Sampler) {
    let size = Extent3d { width: gradient.width(), height: 1, depth_or_array_layers: 1 };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("toon_gradient"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::R8Unorm,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: Origin3d::ZERO,
            aspect: TextureAspect::All,
        },
        gradient.texels(),
        TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(gradient.width()),
            rows_per_image: Some(1),
        },
        size,
    );

    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("toon_gradient_sampler"),
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        mag_filter: FilterMode::Nearest,
        min_filter: FilterMode::Nearest,
        ..Default::default()
    });

    (texture.create_view(&TextureViewDescriptor::default()), sampler)
}

fn create_pipeline(
    device: &Device,
    label: &str,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    buffers: &[VertexBufferLayout],
    format: TextureFormat,
    cull_mode: Option<Face>,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

struct SectionDraw {
    mesh: MeshBuffer,
    uniform: Buffer,
    bind_group: BindGroup,
}

/// Draws a [`SceneGraph`] into a surface. Owns every GPU resource.
pub struct Renderer {
    gpu: GpuContext,
    width: u32,
    height: u32,
    pixel_ratio: f64,
    depth_view: TextureView,

    camera_buffer: Buffer,
    lighting_buffer: Buffer,
    frame_bind_group: BindGroup,

    toon_pipeline: RenderPipeline,
    sections: Vec<SectionDraw>,

    points_pipeline: RenderPipeline,
    points_buffer: Buffer,
    points_bind_group: BindGroup,
    particle_buffer: Buffer,
    particle_count: u32,

    egui_renderer: egui_wgpu::Renderer,
    overlay: Option<UiOverlay>,

    #[cfg(target_arch = "wasm32")]
    canvas: Option<web_sys::HtmlCanvasElement>,
}

impl Renderer {
    /// Build pipelines and upload the scene's static geometry.
    /// `width`/`height` are logical; the surface in `gpu` must already be
    /// configured at `physical_size(width, height, pixel_ratio)`.
    pub fn new(gpu: GpuContext, scene: &SceneGraph, width: u32, height: u32, pixel_ratio: f64) -> Self {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();
        let camera = &scene.camera;

        let depth_view = create_depth_texture(device, gpu.config.width, gpu.config.height);

        // Group 0: per-frame camera and light
        let frame_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[
                uniform_entry(0, ShaderStages::VERTEX),
                uniform_entry(1, ShaderStages::FRAGMENT),
            ],
        });
        let camera_buffer = uniform_buffer(device, "camera_buffer", &CameraUniform::from_scene(scene, camera));
        let lighting_buffer = uniform_buffer(device, "lighting_buffer", &LightingUniform::from_scene(scene));
        let frame_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_bgl,
            entries: &[
                BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
            ],
        });

        // Group 1 (toon): model + color, gradient ramp
        let toon_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("toon_bgl"),
            entries: &[
                uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let (gradient_view, gradient_sampler) = create_gradient_texture(device, queue, &scene.toon.gradient);

        let toon_color = scene.toon.color.to_linear();
        let sections = scene
            .sections
            .iter()
            .map(|section| {
                let uniform = uniform_buffer(
                    device,
                    "section_uniform",
                    &ModelUniform {
                        model: section.model_matrix().to_cols_array_2d(),
                        color: [toon_color[0], toon_color[1], toon_color[2], 1.0],
                    },
                );
                let bind_group = device.create_bind_group(&BindGroupDescriptor {
                    label: Some("section_bind_group"),
                    layout: &toon_bgl,
                    entries: &[
                        BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() },
                        BindGroupEntry { binding: 1, resource: BindingResource::TextureView(&gradient_view) },
                        BindGroupEntry { binding: 2, resource: BindingResource::Sampler(&gradient_sampler) },
                    ],
                });
                SectionDraw { mesh: section.shape.mesh().upload(device), uniform, bind_group }
            })
            .collect();

        let toon_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("toon_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/toon.wgsl").into()),
        });
        let toon_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("toon_pipeline_layout"),
            bind_group_layouts: &[&frame_bgl, &toon_bgl],
            push_constant_ranges: &[],
        });
        let toon_pipeline = create_pipeline(
            device,
            "toon_pipeline",
            &toon_layout,
            &toon_shader,
            &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                ],
            }],
            gpu.format,
            None,
        );

        // Particles: one instance per point, quad expanded in the shader
        let points_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("points_bgl"),
            entries: &[uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)],
        });
        let (pw, ph) = physical_size(width, height, pixel_ratio);
        let points_buffer = uniform_buffer(device, "points_uniform", &points_uniform(scene, pw, ph));
        let points_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("points_bind_group"),
            layout: &points_bgl,
            entries: &[BindGroupEntry { binding: 0, resource: points_buffer.as_entire_binding() }],
        });
        let particle_positions: Vec<[f32; 3]> = scene.particles.positions.iter().map(|p| p.to_array()).collect();
        let particle_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("particle_positions"),
            contents: bytemuck::cast_slice(&particle_positions),
            usage: BufferUsages::VERTEX,
        });

        let points_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });
        let points_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("points_pipeline_layout"),
            bind_group_layouts: &[&frame_bgl, &points_bgl],
            push_constant_ranges: &[],
        });
        let points_pipeline = create_pipeline(
            device,
            "points_pipeline",
            &points_layout,
            &points_shader,
            &[VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as BufferAddress,
                step_mode: VertexStepMode::Instance,
                attributes: &[VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 }],
            }],
            gpu.format,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        tracing::info!(sections = scene.sections.len(), particles = particle_positions.len(), "renderer ready");

        Self {
            width,
            height,
            pixel_ratio,
            depth_view,
            camera_buffer,
            lighting_buffer,
            frame_bind_group,
            toon_pipeline,
            sections,
            points_pipeline,
            points_buffer,
            points_bind_group,
            particle_buffer,
            particle_count: particle_positions.len() as u32,
            egui_renderer,
            overlay: None,
            #[cfg(target_arch = "wasm32")]
            canvas: None,
            gpu,
        }
    }

    /// Keep the canvas backing store and CSS size in step with the surface
    #[cfg(target_arch = "wasm32")]
    pub fn attach_canvas(&mut self, canvas: web_sys::HtmlCanvasElement) {
        self.canvas = Some(canvas);
        self.reconfigure();
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn physical_size(&self) -> (u32, u32) {
        physical_size(self.width, self.height, self.pixel_ratio)
    }

    /// Queue the overlay for the next drawn frame. An overlay left over from
    /// a skipped frame still has texture updates to upload, so they are merged.
    pub fn set_overlay(&mut self, overlay: UiOverlay) {
        self.overlay = Some(match self.overlay.take() {
            Some(pending) => pending.superseded_by(overlay),
            None => overlay,
        });
    }

    fn reconfigure(&mut self) {
        let (pw, ph) = self.physical_size();

        #[cfg(target_arch = "wasm32")]
        if let Some(canvas) = &self.canvas {
            canvas.set_width(pw);
            canvas.set_height(ph);
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", self.width));
            let _ = style.set_property("height", &format!("{}px", self.height));
        }

        if self.gpu.config.width == pw && self.gpu.config.height == ph {
            return;
        }
        self.gpu.config.width = pw;
        self.gpu.config.height = ph;
        self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
        self.depth_view = create_depth_texture(&self.gpu.device, pw, ph);
        tracing::debug!(width = pw, height = ph, "surface reconfigured");
    }

    fn write_uniforms(&self, scene: &SceneGraph, camera: &Camera) {
        let queue = self.gpu.queue.as_ref();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_scene(scene, camera)));
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::from_scene(scene)));

        let [r, g, b] = scene.toon.color.to_linear();
        for (draw, section) in self.sections.iter().zip(scene.sections.iter()) {
            let uniform = ModelUniform { model: section.model_matrix().to_cols_array_2d(), color: [r, g, b, 1.0] };
            queue.write_buffer(&draw.uniform, 0, bytemuck::bytes_of(&uniform));
        }

        let (pw, ph) = self.physical_size();
        queue.write_buffer(&self.points_buffer, 0, bytemuck::bytes_of(&points_uniform(scene, pw, ph)));
    }

    fn acquire_frame(&mut self) -> Option<SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
                tracing::warn!("surface lost, reconfigured; skipping frame");
                None
            }
            Err(e) => {
                tracing::warn!(error = ?e, "failed to acquire frame");
                None
            }
        }
    }
}

fn points_uniform(scene: &SceneGraph, physical_width: u32, physical_height: u32) -> PointsUniform {
    let [r, g, b] = scene.points.color.to_linear();
    PointsUniform {
        color: [r, g, b, 1.0],
        size: scene.points.size,
        scale: if scene.points.size_attenuation { physical_height as f32 * 0.5 } else { 0.0 },
        viewport: [physical_width as f32, physical_height as f32],
    }
}

impl RenderDelegate for Renderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.reconfigure();
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        self.reconfigure();
    }

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        self.write_uniforms(scene, camera);

        let Some(frame) = self.acquire_frame() else {
            return;
        };
        let device = self.gpu.device.clone();
        let queue = self.gpu.queue.clone();

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Clear(Color::TRANSPARENT), store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.toon_pipeline);
            rp.set_bind_group(0, &self.frame_bind_group, &[]);
            for draw in &self.sections {
                rp.set_bind_group(1, &draw.bind_group, &[]);
                rp.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(draw.mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
            }

            if self.particle_count > 0 {
                rp.set_pipeline(&self.points_pipeline);
                rp.set_bind_group(1, &self.points_bind_group, &[]);
                rp.set_vertex_buffer(0, self.particle_buffer.slice(..));
                rp.draw(0..6, 0..self.particle_count);
            }
        }

        let mut command_buffers = Vec::new();
        let overlay = self.overlay.take();
        if let Some(overlay) = &overlay {
            let (pw, ph) = self.physical_size();
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [pw, ph],
                pixels_per_point: overlay.pixels_per_point,
            };

            for (id, image_delta) in &overlay.textures_delta.set {
                self.egui_renderer.update_texture(&device, &queue, *id, image_delta);
            }
            command_buffers = self.egui_renderer.update_buffers(
                &device,
                &queue,
                &mut encoder,
                &overlay.primitives,
                &screen_descriptor,
            );

            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &overlay.primitives, &screen_descriptor);
        }

        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);
        frame.present();

        if let Some(overlay) = overlay {
            for id in &overlay.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size_rounds_and_never_zero() {
        assert_eq!(physical_size(800, 600, 1.0), (800, 600));
        assert_eq!(physical_size(801, 601, 1.5), (1202, 902));
        assert_eq!(physical_size(0, 0, 2.0), (1, 1));
    }

    #[test]
    fn test_uniform_layouts_match_shaders() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 128);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 32);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 80);
        assert_eq!(std::mem::size_of::<PointsUniform>(), 32);
    }

    #[test]
    fn test_lighting_points_toward_light() {
        use crate::config::SceneConfig;
        let scene = SceneGraph::new(&SceneConfig::default(), ToonGradient::three_tone(), 800, 600);
        let light = LightingUniform::from_scene(&scene);
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!((light.direction[0] - s).abs() < 1e-6);
        assert!((light.direction[1] - s).abs() < 1e-6);
        assert_eq!(light.direction[2], 0.0);
        assert_eq!(light.intensity, 1.0);
    }

    #[test]
    fn test_points_scale_with_drawing_buffer_height() {
        use crate::config::SceneConfig;
        let mut scene = SceneGraph::new(&SceneConfig::default(), ToonGradient::three_tone(), 800, 600);
        let uniform = points_uniform(&scene, 1600, 1200);
        assert_eq!(uniform.size, 0.03);
        assert_eq!(uniform.scale, 600.0);
        assert_eq!(uniform.viewport, [1600.0, 1200.0]);

        scene.points.size_attenuation = false;
        assert_eq!(points_uniform(&scene, 1600, 1200).scale, 0.0);
    }

    fn overlay_with(set: Vec<(egui::TextureId, egui::epaint::ImageDelta)>, free: Vec<egui::TextureId>, ppp: f32) -> UiOverlay {
        UiOverlay {
            primitives: Vec::new(),
            textures_delta: egui::TexturesDelta { set, free },
            pixels_per_point: ppp,
        }
    }

    #[test]
    fn test_skipped_overlay_keeps_texture_uploads() {
        let atlas = egui::ColorImage::from_rgba_unmultiplied([1, 1], &[255, 255, 255, 255]);
        let full = egui::epaint::ImageDelta::full(atlas, egui::TextureOptions::LINEAR);
        let font = egui::TextureId::Managed(0);
        let icon = egui::TextureId::Managed(1);

        let first = overlay_with(vec![(font, full)], Vec::new(), 1.0);
        let second = overlay_with(Vec::new(), vec![icon], 2.0);
        let merged = first.superseded_by(second);

        assert_eq!(merged.textures_delta.set.len(), 1);
        assert_eq!(merged.textures_delta.set[0].0, font);
        assert!(merged.textures_delta.set[0].1.is_whole());
        assert_eq!(merged.textures_delta.free, vec![icon]);
        assert_eq!(merged.pixels_per_point, 2.0);
    }
}
