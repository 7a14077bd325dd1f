//! GPU rendering of the scene
//!
//! Stars are drawn as camera-facing sprites instanced over a unit quad, atoms
//! as instanced lit spheres and bonds as a line list rebuilt every frame.
//! Everything is drawn 4x multisampled and resolved into the surface texture.

use common::{
    create_dynamic_vertex_buffer, create_index_buffer, create_uniform_buffer,
    create_vertex_buffer, CameraUniform, GraphicsContext, Vertex,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::geometry::{MeshVertex, SphereMesh};
use crate::molecule::{
    BOND_COLOR, CENTER_COLOR, CENTER_RADIUS, CENTER_SEGMENTS, SATELLITE_COLOR, SATELLITE_RADIUS,
    SATELLITE_SEGMENTS,
};
use crate::scene::Scene;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SAMPLE_COUNT: u32 = 4;

/// Phong shininess and specular strength shared by both atom materials
const SHININESS: f32 = 30.0;
const SPECULAR: f32 = 0x11 as f32 / 255.0;

/// Everything the shaders read once per frame
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub camera: CameraUniform,
    pub star_model: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
    /// x: sprite edge in world units, y: alpha test threshold
    pub star_params: [f32; 4],
    /// x: shininess, y: specular strength
    pub material: [f32; 4],
}

impl FrameUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let lighting = &scene.lighting;
        let [r, g, b] = lighting.point_color;
        let [ar, ag, ab] = lighting.ambient_color;
        let intensity = lighting.point_intensity;

        Self {
            camera: CameraUniform::from_camera(&scene.camera),
            star_model: scene.star_matrix().to_cols_array_2d(),
            light_position: lighting.point_position.extend(1.0).to_array(),
            light_color: [r * intensity, g * intensity, b * intensity, 1.0],
            ambient_color: [ar, ag, ab, 1.0],
            star_params: [
                scene.camera.point_world_size(scene.star_point_size),
                scene.star_alpha_test,
                0.0,
                0.0,
            ],
            material: [SHININESS, SPECULAR, 0.0, 0.0],
        }
    }
}

/// Per-atom instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AtomInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl AtomInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<AtomInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Quad corner for star sprites
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Star positions are uploaded straight from the packed `f32` buffer
fn star_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBS,
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, mesh: &SphereMesh) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(device, label, &mesh.vertices),
            index_buffer: create_index_buffer(device, label, &mesh.indices),
            index_count: mesh.index_count(),
        }
    }
}

/// Number of instances/vertices written for the current frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounts {
    pub centers: u32,
    pub satellites: u32,
    pub bond_vertices: u32,
}

pub struct Renderer {
    star_pipeline: wgpu::RenderPipeline,
    satellite_pipeline: wgpu::RenderPipeline,
    center_pipeline: wgpu::RenderPipeline,
    bond_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    star_buffer: wgpu::Buffer,
    star_count: u32,
    center_mesh: GpuMesh,
    satellite_mesh: GpuMesh,
    center_buffer: wgpu::Buffer,
    satellite_buffer: wgpu::Buffer,
    bond_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sprite_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    msaa_texture: wgpu::TextureView,
    color_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
    max_molecules: usize,
}

impl Renderer {
    pub fn new(ctx: &GraphicsContext, scene: &Scene) -> Self {
        let device = &ctx.device;
        let max_molecules = scene.state.group.len();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let frame_buffer = create_uniform_buffer(device, &FrameUniform::from_scene(scene));

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // The sprite is generated once and shared by stars and carbon atoms
        let sprite_view = scene.sprite.upload(device, &ctx.queue);
        let sprite_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sprite_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let sprite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &sprite_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sprite_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &sprite_bind_group_layout],
            push_constant_ranges: &[],
        });

        let color_format = ctx.config.format;
        let (width, height) = (ctx.config.width, ctx.config.height);
        let depth_texture =
            create_render_target(device, "Depth Texture", width, height, DEPTH_FORMAT);
        let msaa_texture =
            create_render_target(device, "MSAA Texture", width, height, color_format);

        // Star sprites: depth tested, never written, so their transparent
        // edges don't punch holes in what is drawn after them
        let star_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Star Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_star",
                buffers: &[QuadVertex::layout(), star_instance_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_star",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(false)),
            multisample: multisample_state(),
            multiview: None,
        });

        let satellite_pipeline = atom_pipeline(
            device,
            &pipeline_layout,
            &shader,
            color_format,
            "Satellite Pipeline",
            "fs_satellite",
            None,
            true,
        );

        let center_pipeline = atom_pipeline(
            device,
            &pipeline_layout,
            &shader,
            color_format,
            "Center Pipeline",
            "fs_center",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        let bond_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Bond Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_bond",
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_bond",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true)),
            multisample: multisample_state(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let star_buffer = create_vertex_buffer(device, "Star Buffer", scene.stars.positions());

        let center_mesh = GpuMesh::new(
            device,
            "Center Sphere",
            &SphereMesh::new(CENTER_RADIUS, CENTER_SEGMENTS.0, CENTER_SEGMENTS.1),
        );
        let satellite_mesh = GpuMesh::new(
            device,
            "Satellite Sphere",
            &SphereMesh::new(SATELLITE_RADIUS, SATELLITE_SEGMENTS.0, SATELLITE_SEGMENTS.1),
        );

        let center_buffer =
            create_dynamic_vertex_buffer::<AtomInstance>(device, "Center Instances", max_molecules);
        let satellite_buffer = create_dynamic_vertex_buffer::<AtomInstance>(
            device,
            "Satellite Instances",
            max_molecules * 4,
        );
        // Two vertices per bond, four bonds per molecule
        let bond_buffer =
            create_dynamic_vertex_buffer::<Vertex>(device, "Bond Buffer", max_molecules * 8);

        Self {
            star_pipeline,
            satellite_pipeline,
            center_pipeline,
            bond_pipeline,
            quad_buffer,
            star_buffer,
            star_count: scene.stars.len() as u32,
            center_mesh,
            satellite_mesh,
            center_buffer,
            satellite_buffer,
            bond_buffer,
            frame_buffer,
            frame_bind_group,
            sprite_bind_group,
            depth_texture,
            msaa_texture,
            color_format,
            clear_color: scene.clear_color,
            max_molecules,
        }
    }

    /// Recreate the multisampled color and depth targets at the new size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture =
            create_render_target(device, "Depth Texture", width, height, DEPTH_FORMAT);
        self.msaa_texture =
            create_render_target(device, "MSAA Texture", width, height, self.color_format);
    }

    /// Upload this frame's uniforms, atom instances and bond lines
    pub fn update_scene(&self, queue: &wgpu::Queue, scene: &Scene) -> FrameCounts {
        let uniform = FrameUniform::from_scene(scene);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let mut transforms = scene.molecule_transforms();
        transforms.sort_centers_back_to_front(scene.camera.view_matrix());

        let centers: Vec<AtomInstance> = transforms
            .centers
            .iter()
            .take(self.max_molecules)
            .map(|m| AtomInstance::new(*m, CENTER_COLOR))
            .collect();

        let satellites: Vec<AtomInstance> = transforms
            .satellites
            .iter()
            .take(self.max_molecules * 4)
            .map(|m| AtomInstance::new(*m, SATELLITE_COLOR))
            .collect();

        let bond_vertices: Vec<Vertex> = transforms
            .bonds
            .iter()
            .take(self.max_molecules * 4)
            .flat_map(|(start, end)| {
                [
                    Vertex::new(start.to_array(), BOND_COLOR),
                    Vertex::new(end.to_array(), BOND_COLOR),
                ]
            })
            .collect();

        if !centers.is_empty() {
            queue.write_buffer(&self.center_buffer, 0, bytemuck::cast_slice(&centers));
            queue.write_buffer(&self.satellite_buffer, 0, bytemuck::cast_slice(&satellites));
            queue.write_buffer(&self.bond_buffer, 0, bytemuck::cast_slice(&bond_vertices));
        }

        FrameCounts {
            centers: centers.len() as u32,
            satellites: satellites.len() as u32,
            bond_vertices: bond_vertices.len() as u32,
        }
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        counts: FrameCounts,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.msaa_texture,
                resolve_target: Some(view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Discard,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.sprite_bind_group, &[]);

        // Opaque first: hydrogen spheres and bonds
        if counts.satellites > 0 {
            render_pass.set_pipeline(&self.satellite_pipeline);
            render_pass.set_vertex_buffer(0, self.satellite_mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.satellite_buffer.slice(..));
            render_pass.set_index_buffer(
                self.satellite_mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint16,
            );
            render_pass.draw_indexed(0..self.satellite_mesh.index_count, 0, 0..counts.satellites);
        }

        if counts.bond_vertices > 0 {
            render_pass.set_pipeline(&self.bond_pipeline);
            render_pass.set_vertex_buffer(0, self.bond_buffer.slice(..));
            render_pass.draw(0..counts.bond_vertices, 0..1);
        }

        // Then the blended layers, which test depth but don't write it
        if self.star_count > 0 {
            render_pass.set_pipeline(&self.star_pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.star_buffer.slice(..));
            render_pass.draw(0..6, 0..self.star_count);
        }

        if counts.centers > 0 {
            render_pass.set_pipeline(&self.center_pipeline);
            render_pass.set_vertex_buffer(0, self.center_mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.center_buffer.slice(..));
            render_pass.set_index_buffer(
                self.center_mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint16,
            );
            render_pass.draw_indexed(0..self.center_mesh.index_count, 0, 0..counts.centers);
        }
    }
}

fn multisample_state() -> wgpu::MultisampleState {
    wgpu::MultisampleState {
        count: SAMPLE_COUNT,
        mask: !0,
        alpha_to_coverage_enabled: false,
    }
}

fn render_target_descriptor(
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: SAMPLE_COUNT,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Multisampled attachment matching the surface size
fn create_render_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    device
        .create_texture(&render_target_descriptor(label, width, height, format))
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[allow(clippy::too_many_arguments)]
fn atom_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    fragment_entry: &str,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_atom",
            buffers: &[MeshVertex::layout(), AtomInstance::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(depth_write)),
        multisample: multisample_state(),
        multiview: None,
    })
}
