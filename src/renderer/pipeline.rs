//! wgpu pipeline for drawing a `MeshBatch`
//!
//! The host owns the device, queue and surface. Each frame it hands over an
//! encoder and a target view; the batch is drawn on top of whatever the view
//! already holds.
//!
//! `TriangleOptions` are honoured per `DrawCall`:
//! * consecutive calls with the same `anti_alias` share a render pass;
//!   anti-aliased passes go through a 4x multisampled layer that is resolved
//!   and composited over the view, so draw order is kept across passes
//! * `NonZero` / `EvenOdd` calls count coverage into the stencil buffer,
//!   then a cover draw paints each counted pixel once and resets the stencil

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::target::{DrawCall, FillRule, MeshBatch};
use super::vertex::Vertex;

/// Samples per pixel for anti-aliased passes
pub const MSAA_SAMPLES: u32 = 4;

const STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Stencil8;

/// Viewport size in pixels (must match shader)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

impl ViewportUniform {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: [width.max(1) as f32, height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }
}

/// What one indexed draw does to the color and stencil buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Paint every triangle
    Color,
    /// Front faces increment, back faces decrement; no color
    StencilNonZero,
    /// Every face inverts; no color
    StencilEvenOdd,
    /// Paint where the stencil is non-zero, zeroing it behind
    Cover,
}

impl Stage {
    const ALL: [Stage; 4] = [
        Stage::Color,
        Stage::StencilNonZero,
        Stage::StencilEvenOdd,
        Stage::Cover,
    ];

    fn label(self) -> &'static str {
        match self {
            Stage::Color => "physdraw_color",
            Stage::StencilNonZero => "physdraw_stencil_nonzero",
            Stage::StencilEvenOdd => "physdraw_stencil_evenodd",
            Stage::Cover => "physdraw_cover",
        }
    }

    fn writes_color(self) -> bool {
        matches!(self, Stage::Color | Stage::Cover)
    }

    fn stencil(self) -> wgpu::StencilState {
        let face = |compare, pass_op| wgpu::StencilFaceState {
            compare,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op,
        };
        let (front, back) = match self {
            Stage::Color => return wgpu::StencilState::default(),
            Stage::StencilNonZero => (
                face(wgpu::CompareFunction::Always, wgpu::StencilOperation::IncrementWrap),
                face(wgpu::CompareFunction::Always, wgpu::StencilOperation::DecrementWrap),
            ),
            Stage::StencilEvenOdd => {
                let f = face(wgpu::CompareFunction::Always, wgpu::StencilOperation::Invert);
                (f, f)
            }
            Stage::Cover => {
                let f = face(wgpu::CompareFunction::NotEqual, wgpu::StencilOperation::Zero);
                (f, f)
            }
        };
        wgpu::StencilState {
            front,
            back,
            read_mask: 0xff,
            write_mask: 0xff,
        }
    }
}

/// One indexed draw inside a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStep {
    pub stage: Stage,
    pub first_index: u32,
    pub index_count: u32,
}

/// Draw steps sharing one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPlan {
    pub anti_alias: bool,
    pub steps: Vec<DrawStep>,
}

impl PassPlan {
    fn push_call(&mut self, call: &DrawCall) {
        let step = |stage| DrawStep {
            stage,
            first_index: call.first_index,
            index_count: call.index_count,
        };
        match call.options.fill_rule {
            FillRule::FillAll => self.steps.push(step(Stage::Color)),
            FillRule::NonZero => self
                .steps
                .extend([step(Stage::StencilNonZero), step(Stage::Cover)]),
            FillRule::EvenOdd => self
                .steps
                .extend([step(Stage::StencilEvenOdd), step(Stage::Cover)]),
        }
    }
}

/// Group calls into passes by `anti_alias`, in submission order
pub fn plan_passes(calls: &[DrawCall]) -> Vec<PassPlan> {
    let mut passes: Vec<PassPlan> = Vec::new();
    for call in calls {
        let anti_alias = call.options.anti_alias;
        if passes.last().is_none_or(|p| p.anti_alias != anti_alias) {
            passes.push(PassPlan {
                anti_alias,
                steps: Vec::new(),
            });
        }
        if let Some(pass) = passes.last_mut() {
            pass.push_call(call);
        }
    }
    passes
}

/// One pipeline per `Stage` at a fixed sample count
struct PipelineSet {
    pipelines: [wgpu::RenderPipeline; 4],
}

impl PipelineSet {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        samples: u32,
    ) -> Self {
        let pipelines = Stage::ALL.map(|stage| {
            let write_mask = if stage.writes_color() {
                wgpu::ColorWrites::ALL
            } else {
                wgpu::ColorWrites::empty()
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(stage.label()),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                        write_mask,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Both windings show up after a y-flip, and non-zero
                    // counting needs back faces
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: STENCIL_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: stage.stencil(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: samples,
                    ..Default::default()
                },
                multiview_mask: None,
                cache: None,
            })
        });
        Self { pipelines }
    }

    fn get(&self, stage: Stage) -> &wgpu::RenderPipeline {
        match stage {
            Stage::Color => &self.pipelines[0],
            Stage::StencilNonZero => &self.pipelines[1],
            Stage::StencilEvenOdd => &self.pipelines[2],
            Stage::Cover => &self.pipelines[3],
        }
    }
}

/// Size-dependent attachments, rebuilt on resize
struct FrameTargets {
    stencil: wgpu::TextureView,
    msaa_color: wgpu::TextureView,
    msaa_stencil: wgpu::TextureView,
    layer_bind_group: wgpu::BindGroup,
    // Resolve target of the anti-aliased passes; bound for compositing
    layer: wgpu::TextureView,
}

fn attachment(
    device: &wgpu::Device,
    label: &str,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
    samples: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

impl FrameTargets {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        layer_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let target = wgpu::TextureUsages::RENDER_ATTACHMENT;
        let layer = attachment(
            device,
            "physdraw_layer",
            size,
            format,
            1,
            target | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let layer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("physdraw_layer_bind_group"),
            layout: layer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&layer),
            }],
        });
        Self {
            stencil: attachment(device, "physdraw_stencil", size, STENCIL_FORMAT, 1, target),
            msaa_color: attachment(device, "physdraw_msaa", size, format, MSAA_SAMPLES, target),
            msaa_stencil: attachment(
                device,
                "physdraw_msaa_stencil",
                size,
                STENCIL_FORMAT,
                MSAA_SAMPLES,
                target,
            ),
            layer_bind_group,
            layer,
        }
    }
}

/// Triangle pipelines plus per-frame buffers
pub struct GpuRenderer {
    format: wgpu::TextureFormat,
    aliased: PipelineSet,
    smooth: PipelineSet,
    composite: wgpu::RenderPipeline,
    viewport_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layer_layout: wgpu::BindGroupLayout,
    targets: FrameTargets,
    /// Viewport size in pixels; the target view must have this size
    pub size: (u32, u32),
}

impl GpuRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("physdraw_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("physdraw_composite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("composite.wgsl").into()),
        });

        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("viewport"),
            contents: bytemuck::bytes_of(&ViewportUniform::new(width, height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viewport_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("viewport_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("physdraw_layer_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("physdraw_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let aliased = PipelineSet::new(device, &pipeline_layout, &shader, format, 1);
        let smooth = PipelineSet::new(device, &pipeline_layout, &shader, format, MSAA_SAMPLES);

        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("physdraw_composite_layout"),
            bind_group_layouts: &[&layer_layout],
            immediate_size: 0,
        });
        let composite = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("physdraw_composite"),
            layout: Some(&composite_layout),
            vertex: wgpu::VertexState {
                module: &composite_shader,
                entry_point: Some("vs_main"),
                buffers: &[], // Fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &composite_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let size = (width, height);
        let targets = FrameTargets::new(device, format, size, &layer_layout);
        log::debug!("GpuRenderer created: {:?} {}x{}", format, width, height);

        Self {
            format,
            aliased,
            smooth,
            composite,
            viewport_buffer,
            bind_group,
            layer_layout,
            targets,
            size,
        }
    }

    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        new_width: u32,
        new_height: u32,
    ) {
        if new_width > 0 && new_height > 0 && (new_width, new_height) != self.size {
            self.size = (new_width, new_height);
            queue.write_buffer(
                &self.viewport_buffer,
                0,
                bytemuck::bytes_of(&ViewportUniform::new(new_width, new_height)),
            );
            self.targets = FrameTargets::new(device, self.format, self.size, &self.layer_layout);
        }
    }

    /// Record the passes that draw `batch` over `view`
    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        batch: &MeshBatch,
    ) {
        if batch.is_empty() {
            return;
        }

        // Recreated per frame; batches are small debug overlays
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("physdraw_vertices"),
            contents: bytemuck::cast_slice(batch.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("physdraw_indices"),
            contents: bytemuck::cast_slice(batch.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        for plan in plan_passes(batch.calls()) {
            if plan.anti_alias {
                {
                    let mut pass = begin_pass(
                        encoder,
                        &self.targets.msaa_color,
                        Some(&self.targets.layer),
                        wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        Some(&self.targets.msaa_stencil),
                    );
                    self.record(&mut pass, &self.smooth, &plan, &vertex_buffer, &index_buffer);
                }
                let mut pass = begin_pass(encoder, view, None, wgpu::LoadOp::Load, None);
                pass.set_pipeline(&self.composite);
                pass.set_bind_group(0, &self.targets.layer_bind_group, &[]);
                pass.draw(0..3, 0..1);
            } else {
                let mut pass = begin_pass(
                    encoder,
                    view,
                    None,
                    wgpu::LoadOp::Load,
                    Some(&self.targets.stencil),
                );
                self.record(&mut pass, &self.aliased, &plan, &vertex_buffer, &index_buffer);
            }
        }
    }

    fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &PipelineSet,
        plan: &PassPlan,
        vertex_buffer: &wgpu::Buffer,
        index_buffer: &wgpu::Buffer,
    ) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_stencil_reference(0);
        for step in &plan.steps {
            pass.set_pipeline(pipelines.get(step.stage));
            let range = step.first_index..step.first_index + step.index_count;
            pass.draw_indexed(range, 0, 0..1);
        }
    }
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    resolve_target: Option<&wgpu::TextureView>,
    load: wgpu::LoadOp<wgpu::Color>,
    stencil: Option<&wgpu::TextureView>,
) -> wgpu::RenderPass<'e> {
    // The multisampled color is only needed until it is resolved
    let store = if resolve_target.is_some() {
        wgpu::StoreOp::Discard
    } else {
        wgpu::StoreOp::Store
    };
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("physdraw_pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            resolve_target,
            ops: wgpu::Operations { load, store },
            depth_slice: None,
        })],
        depth_stencil_attachment: stencil.map(|view| wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: None,
            stencil_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Discard,
            }),
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::target::TriangleOptions;

    fn call(first_index: u32, fill_rule: FillRule, anti_alias: bool) -> DrawCall {
        DrawCall {
            first_index,
            index_count: 3,
            options: TriangleOptions {
                fill_rule,
                anti_alias,
            },
        }
    }

    #[test]
    fn test_viewport_uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
    }

    #[test]
    fn test_viewport_never_zero() {
        let v = ViewportUniform::new(0, 600);
        assert_eq!(v.size, [1.0, 600.0]);
    }

    #[test]
    fn test_passes_split_on_anti_alias_in_order() {
        let calls = [
            call(0, FillRule::FillAll, true),
            call(3, FillRule::FillAll, true),
            call(6, FillRule::FillAll, false),
            call(9, FillRule::FillAll, true),
        ];
        let plans = plan_passes(&calls);
        let shape: Vec<(bool, usize)> = plans.iter().map(|p| (p.anti_alias, p.steps.len())).collect();
        assert_eq!(shape, vec![(true, 2), (false, 1), (true, 1)]);
        assert_eq!(plans[1].steps[0].first_index, 6);
    }

    #[test]
    fn test_winding_rules_stencil_then_cover() {
        let plans = plan_passes(&[
            call(0, FillRule::NonZero, false),
            call(3, FillRule::EvenOdd, false),
            call(6, FillRule::FillAll, false),
        ]);
        assert_eq!(plans.len(), 1);
        let stages: Vec<(Stage, u32)> = plans[0]
            .steps
            .iter()
            .map(|s| (s.stage, s.first_index))
            .collect();
        assert_eq!(
            stages,
            vec![
                (Stage::StencilNonZero, 0),
                (Stage::Cover, 0),
                (Stage::StencilEvenOdd, 3),
                (Stage::Cover, 3),
                (Stage::Color, 6),
            ]
        );
    }

    #[test]
    fn test_empty_batch_plans_nothing() {
        assert!(plan_passes(&[]).is_empty());
    }

    #[test]
    fn test_stencil_stages_write_no_color() {
        assert!(Stage::Color.writes_color());
        assert!(Stage::Cover.writes_color());
        assert!(!Stage::StencilNonZero.writes_color());
        assert!(!Stage::StencilEvenOdd.writes_color());
        assert!(!Stage::Color.stencil().is_enabled());
        let cover = Stage::Cover.stencil();
        assert_eq!(cover.front.compare, wgpu::CompareFunction::NotEqual);
        assert_eq!(cover.front.pass_op, wgpu::StencilOperation::Zero);
        let nonzero = Stage::StencilNonZero.stencil();
        assert_eq!(nonzero.front.pass_op, wgpu::StencilOperation::IncrementWrap);
        assert_eq!(nonzero.back.pass_op, wgpu::StencilOperation::DecrementWrap);
    }
}
