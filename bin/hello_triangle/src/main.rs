use std::f32::consts::FRAC_PI_2;

use bytemuck::{Pod, Zeroable};
use eyre::{Context, Result};
use glam::Mat4;

use iris::prelude::*;
use iris_gl::GlContext;
use iris_platform::{Application, PhysicalSize, RenderContext, WindowDesc};

const PURPLE: [u8; 3] = [128, 0, 128];

#[derive(Debug, Clone, Copy, Pod, Zeroable, Vertex)]
#[repr(C)]
struct ColouredVertex {
    #[attribute(name = "vPosition")]
    position: [f32; 3],
    #[attribute(name = "vColor")]
    color: [f32; 4],
}

impl ColouredVertex {
    const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

struct TriangleApp {
    program: ShaderProgram,
    buffer: VertexBuffer<ColouredVertex>,
    array: VertexArray<ColouredVertex>,
    projection: Matrix4Uniform,
}

impl Application for TriangleApp {
    #[tracing::instrument(skip_all)]
    fn setup(gc: &GlContext, _size: PhysicalSize<u32>) -> Result<Self> {
        let program = ShaderProgram::from_sources(
            gc,
            include_str!("../assets/shaders/triangle.vert.glsl"),
            include_str!("../assets/shaders/triangle.frag.glsl"),
        )
        .context("Cannot build triangle program")?;

        let mut buffer = VertexBuffer::new(gc)?;
        buffer.extend([
            ColouredVertex::new([-1., -1., -1.5], [0., 1., 0., 1.]),
            ColouredVertex::new([1., 1., -1.5], [1., 0., 0., 1.]),
            ColouredVertex::new([1., -1., -1.5], [0., 0., 1., 1.]),
        ]);
        let array = VertexArray::from_layout(gc, &buffer, &program)
            .context("Cannot describe vertex layout")?;

        let projection = Matrix4Uniform::new(
            "projectionMatrix",
            Mat4::perspective_rh_gl(FRAC_PI_2, 16. / 9., 0.1, 100.),
        );
        Ok(Self {
            program,
            buffer,
            array,
            projection,
        })
    }

    fn render(&mut self, ctx: RenderContext) -> Result<()> {
        let mut frame = Frame::begin(ctx.gc, PURPLE);
        frame.activate(&self.program)?;
        frame.push_uniform(&self.program, &self.projection)?;
        frame.bind(&self.buffer, &self.array)?;
        frame.upload(&mut self.buffer)?;
        frame.draw(&self.buffer)?;
        frame.finish();
        Ok(())
    }

    fn teardown(self, gc: &GlContext) {
        self.array.destroy(gc);
        self.buffer.destroy(gc);
        self.program.destroy(gc);
    }
}

fn main() -> Result<()> {
    iris_platform::run::<TriangleApp>(WindowDesc::new("Hello Triangle"))
}
