use super::context::AnyContext;

pub const STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Stencil8;

pub struct PipelineBuilder<'a> {
    label: String,
    shader: &'a wgpu::ShaderModule,
    vertex_entry: &'a str,
    vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    fragment_entry: &'a str,
    targets: Vec<Option<wgpu::ColorTargetState>>,
    stencil: Option<wgpu::StencilState>,
    sample_count: u32,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn for_render(label: impl Into<String>, shader: &'a wgpu::ShaderModule) -> Self {
        Self {
            label: label.into(),
            shader,
            vertex_entry: "vs_main",
            vertex_buffers: &[],
            fragment_entry: "fs_main",
            targets: Vec::new(),
            stencil: None,
            sample_count: 1,
            bind_group_layouts: Vec::new(),
        }
    }

    pub fn vertex(mut self, buffers: &'a [wgpu::VertexBufferLayout<'a>]) -> Self {
        self.vertex_buffers = buffers;
        self
    }

    pub fn fragment(mut self, entry: &'a str, targets: &[Option<wgpu::ColorTargetState>]) -> Self {
        self.fragment_entry = entry;
        self.targets = targets.to_vec();
        self
    }

    /// Same stencil test on both faces, no depth test.
    pub fn stencil(
        mut self,
        face: wgpu::StencilFaceState,
        read_mask: u32,
        write_mask: u32,
    ) -> Self {
        self.stencil = Some(wgpu::StencilState {
            front: face,
            back: face,
            read_mask,
            write_mask,
        });
        self
    }

    pub fn multisample(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn add_bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn build(self, ctx: &impl AnyContext) -> wgpu::RenderPipeline {
        let layout = ctx
            .device()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&self.label),
                bind_group_layouts: &self.bind_group_layouts,
                push_constant_ranges: &[],
            });

        ctx.device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&self.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: self.vertex_entry,
                    buffers: self.vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.shader,
                    entry_point: self.fragment_entry,
                    targets: &self.targets,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                // fans and stroke quads come in either winding
                primitive: wgpu::PrimitiveState {
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: self.stencil.map(|stencil| wgpu::DepthStencilState {
                    format: STENCIL_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil,
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: self.sample_count,
                    ..Default::default()
                },
                multiview: None,
                cache: None,
            })
    }
}
