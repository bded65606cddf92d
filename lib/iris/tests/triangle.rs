use std::f32::consts::FRAC_PI_2;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use iris::{
    context::Slot,
    headless::{DrawCall, HeadlessContext},
    prelude::*,
};

const VERTEX: &str = r#"
#version 330 core
uniform mat4 projectionMatrix;
in vec3 vPosition;
in vec4 vColor;
out vec4 fColor;

void main() {
    gl_Position = projectionMatrix * vec4(vPosition, 1.0);
    fColor = vColor;
}
"#;

const FRAGMENT: &str = r#"
#version 330 core
in vec4 fColor;
out vec4 fragColor;

void main() {
    fragColor = fColor;
}
"#;

const PURPLE: [f32; 3] = [0.5, 0., 0.5];

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Vertex)]
#[repr(C)]
struct ColouredVertex {
    #[attribute(name = "vPosition")]
    position: [f32; 3],
    #[attribute(name = "vColor")]
    color: [f32; 4],
}

fn triangle() -> [ColouredVertex; 3] {
    [
        ColouredVertex {
            position: [-1., -1., -1.5],
            color: [0., 1., 0., 1.],
        },
        ColouredVertex {
            position: [1., 1., -1.5],
            color: [1., 0., 0., 1.],
        },
        ColouredVertex {
            position: [1., -1., -1.5],
            color: [0., 0., 1., 1.],
        },
    ]
}

fn projection() -> Matrix4Uniform {
    Matrix4Uniform::new(
        "projectionMatrix",
        Mat4::perspective_rh_gl(FRAC_PI_2, 16. / 9., 0.1, 100.),
    )
}

struct Scene {
    program: ShaderProgram,
    buffer: VertexBuffer<ColouredVertex>,
    array: VertexArray<ColouredVertex>,
}

fn setup(gc: &HeadlessContext) -> iris::Result<Scene> {
    let program = ShaderProgram::from_sources(gc, VERTEX, FRAGMENT)?;
    let mut buffer = VertexBuffer::new(gc)?;
    buffer.extend(triangle());
    let array = VertexArray::from_layout(gc, &buffer, &program)?;
    Ok(Scene {
        program,
        buffer,
        array,
    })
}

#[test]
fn vertex_array_construction_sequence() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let program = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT)?;
    let buffer = VertexBuffer::<ColouredVertex>::new(&gc)?;
    gc.take_commands();

    let _array = VertexArray::from_layout(&gc, &buffer, &program)?;
    let log = gc
        .take_commands()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(log, @r###"
    create vertex array 1
    bind vertex array: vertex array 1
    bind array buffer: buffer 1
    enable attribute 0
    attribute 0: 3xF32 stride 28 offset 0
    enable attribute 1
    attribute 1: 4xF32 stride 28 offset 12
    bind vertex array: none
    bind array buffer: none
    "###);
    Ok(())
}

#[test]
fn renders_one_frame() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        mut buffer,
        array,
    } = setup(&gc)?;
    let projection = projection();

    let mut frame = Frame::begin(&gc, PURPLE);
    frame.activate(&program)?;
    assert!(frame.push_uniform(&program, &projection)?);
    frame.bind(&buffer, &array)?;
    assert_eq!(frame.upload(&mut buffer)?, 3 * 28);
    frame.draw(&buffer)?;
    assert_eq!(frame.state(), FrameState::Drawn);
    frame.finish();

    assert_eq!(gc.clear_color(), Some(Color::from(PURPLE)));
    assert_eq!(
        gc.draw_calls(),
        [DrawCall {
            mode: DrawMode::Triangles,
            first: 0,
            count: 3,
            program: program.id(),
            vertex_array: array.id(),
        }]
    );
    assert_eq!(
        gc.uniform_value(program.id(), "projectionMatrix"),
        Some(Uniform::from(*projection.value()))
    );
    assert_eq!(
        gc.buffer_contents(buffer.id()).as_deref(),
        Some(bytemuck::cast_slice::<_, u8>(&triangle()))
    );

    assert_eq!(gc.bound_vertex_array(), None);
    assert_eq!(gc.bound_array_buffer(), None);
    assert_eq!(gc.active_program(), None);
    Ok(())
}

#[test]
fn frames_repeat() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        mut buffer,
        array,
    } = setup(&gc)?;
    let projection = projection();

    for _ in 0..3 {
        let mut frame = Frame::begin(&gc, PURPLE);
        frame.activate(&program)?;
        frame.push_uniform(&program, &projection)?;
        frame.bind(&buffer, &array)?;
        frame.upload(&mut buffer)?;
        frame.draw(&buffer)?;
    }
    assert_eq!(gc.draw_calls().len(), 3);
    Ok(())
}

#[test]
fn incomplete_triangle_is_not_drawn() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        mut buffer,
        array,
    } = setup(&gc)?;
    buffer.append(triangle()[0]);
    assert_eq!(buffer.len(), 4);

    {
        let mut frame = Frame::begin(&gc, PURPLE);
        frame.activate(&program)?;
        frame.bind(&buffer, &array)?;
        assert_eq!(frame.upload(&mut buffer)?, 4 * 28);
        let err = frame.draw(&buffer).unwrap_err();
        assert!(
            matches!(
                err,
                Error::IncompletePrimitive {
                    count: 4,
                    per_primitive: 3,
                    ..
                }
            ),
            "got {err:?}"
        );
        assert_eq!(frame.state(), FrameState::DataUploaded);
    }

    assert!(gc.draw_calls().is_empty());
    assert_eq!(gc.bound_vertex_array(), None);
    assert_eq!(gc.bound_array_buffer(), None);
    assert_eq!(gc.active_program(), None);
    Ok(())
}

#[test]
fn drawing_requires_every_slot() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        buffer,
        array,
    } = setup(&gc)?;

    buffer.bind(&gc);
    let err = buffer.draw(&gc).unwrap_err();
    assert!(
        matches!(err, Error::Unbound { slot: Slot::VertexArray, .. }),
        "got {err:?}"
    );

    array.bind(&gc);
    let err = buffer.draw(&gc).unwrap_err();
    assert!(
        matches!(err, Error::Unbound { slot: Slot::Program, .. }),
        "got {err:?}"
    );

    program.activate(&gc);
    buffer.draw(&gc)?;
    assert_eq!(gc.draw_calls().len(), 1);
    Ok(())
}

#[test]
fn uniform_needs_active_program() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene { program, .. } = setup(&gc)?;
    let projection = projection();

    let err = projection.set(&gc, &program).unwrap_err();
    assert!(
        matches!(err, Error::Unbound { slot: Slot::Program, .. }),
        "got {err:?}"
    );

    program.activate(&gc);
    let missing = Matrix4Uniform::named("viewMatrix");
    assert!(!missing.set(&gc, &program)?);
    assert!(projection.set(&gc, &program)?);
    Ok(())
}

#[test]
fn out_of_order_frame_step() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        mut buffer,
        array,
    } = setup(&gc)?;

    let mut frame = Frame::begin(&gc, PURPLE);
    frame.activate(&program)?;
    let err = frame.upload(&mut buffer).unwrap_err();
    assert!(
        matches!(
            err,
            Error::OutOfOrder {
                state: FrameState::ProgramActive,
                step: FrameState::DataUploaded
            }
        ),
        "got {err:?}"
    );
    frame.bind(&buffer, &array)?;
    assert_eq!(frame.state(), FrameState::BuffersBound);
    Ok(())
}

#[test]
fn upload_sends_records_not_capacity() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let mut buffer = VertexBuffer::<ColouredVertex>::new(&gc)?;
    buffer.extend((0..5).map(|_| triangle()[1]));
    assert_eq!(buffer.capacity(), 8);

    buffer.bind(&gc);
    assert_eq!(buffer.upload(&gc)?, 5 * 28);
    assert_eq!(gc.buffer_contents(buffer.id()).map(|data| data.len()), Some(140));
    Ok(())
}

#[test]
fn layout_survives_buffer_growth() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        mut buffer, array, ..
    } = setup(&gc)?;
    let recorded = gc.layout(array.id());
    assert_eq!(recorded.as_ref().map(Vec::len), Some(2));

    buffer.extend(triangle());
    buffer.bind(&gc);
    buffer.upload(&gc)?;
    buffer.unbind(&gc);

    array.bind(&gc);
    assert_eq!(gc.current_layout(), recorded);
    Ok(())
}

#[test]
fn uniform_push_follows_latest_value() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene { program, .. } = setup(&gc)?;
    let mut projection = projection();
    program.activate(&gc);

    assert!(projection.set(&gc, &program)?);
    assert!(projection.set(&gc, &program)?);
    assert_eq!(
        gc.uniform_value(program.id(), "projectionMatrix"),
        Some(Uniform::from(*projection.value()))
    );

    let orthographic = Mat4::orthographic_rh_gl(-1., 1., -1., 1., 0.1, 100.);
    projection.set_value(orthographic);
    assert_eq!(
        gc.uniform_value(program.id(), "projectionMatrix"),
        Some(Uniform::from(Mat4::perspective_rh_gl(FRAC_PI_2, 16. / 9., 0.1, 100.)))
    );
    assert!(projection.set(&gc, &program)?);
    assert_eq!(
        gc.uniform_value(program.id(), "projectionMatrix"),
        Some(Uniform::from(orthographic))
    );
    Ok(())
}

#[test]
fn array_is_tied_to_its_program() -> iris::Result<()> {
    let gc = HeadlessContext::new();
    let Scene {
        program,
        buffer,
        array,
    } = setup(&gc)?;
    let other = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT)?;
    assert_eq!(array.program(), program.id());

    let mut frame = Frame::begin(&gc, PURPLE);
    frame.activate(&other)?;
    let err = frame.bind(&buffer, &array).unwrap_err();
    assert!(
        matches!(err, Error::ProgramMismatch { built_for, active: Some(active) }
            if built_for == program.id() && active == other.id()),
        "got {err:?}"
    );
    assert_eq!(frame.state(), FrameState::ProgramActive);
    assert_eq!(gc.bound_vertex_array(), None);
    Ok(())
}
