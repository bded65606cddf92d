//! Thin typed layer over a GL-style graphics context: vertex buffers, vertex layouts, shader
//! programs, uniforms and the per-frame draw sequence.
//!
//! Every operation takes the graphics context explicitly. The context owns the global
//! binding slots; the types here only remember their own handles and check the slots before
//! acting on them.

extern crate self as iris;

pub mod array;
pub mod attribute;
pub mod bind;
pub mod buffer;
pub mod context;
pub mod error;
pub mod frame;
pub mod headless;
pub mod program;
pub mod shader;
pub mod uniform;
pub mod value;
pub mod vertex;

pub use context::GraphicsContext;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::array::VertexArray;
    pub use crate::attribute::{AttributeBinding, VertexAttribute};
    pub use crate::bind::Bind;
    pub use crate::buffer::VertexBuffer;
    pub use crate::context::{
        BufferUsage, ClearBuffers, Color, DrawMode, GraphicsContext, ShaderStage,
    };
    pub use crate::error::Error;
    pub use crate::frame::{Frame, FrameState};
    pub use crate::program::ShaderProgram;
    pub use crate::shader::Shader;
    pub use crate::uniform::{Matrix4Uniform, Uniform, UniformBinding};
    pub use crate::value::ScalarType;
    pub use crate::vertex::Vertex;
}
