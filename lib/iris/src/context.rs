use std::{error::Error, fmt, num::NonZeroU32};

use bitflags::bitflags;
use duplicate::duplicate_item;

use crate::{uniform::Uniform, value::ScalarType};

#[duplicate_item(
    name            what;
    [BufferId]      ["buffer"];
    [VertexArrayId] ["vertex array"];
    [ShaderId]      ["shader"];
    [ProgramId]     ["program"];
)]
#[doc = concat!("Native handle of a ", what, " object.")]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct name(NonZeroU32);

#[duplicate_item(name; [BufferId]; [VertexArrayId]; [ShaderId]; [ProgramId])]
impl name {
    pub const fn new(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    /// Returns `None` for the reserved name `0`.
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Resolved location of an attribute or uniform inside a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Location(u32);

impl Location {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Global binding slots of the graphics context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Slot {
    ArrayBuffer,
    VertexArray,
    Program,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayBuffer => f.write_str("an array buffer"),
            Self::VertexArray => f.write_str("a vertex array"),
            Self::Program => f.write_str("a shader program"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
    Stream,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    Triangles,
}

impl DrawMode {
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
        }
    }
}

bitflags! {
    pub struct ClearBuffers: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color(pub [f32; 4]);

impl From<[u8; 3]> for Color {
    fn from(arr: [u8; 3]) -> Self {
        Self::from(arr.map(|x| x as f32 / 255.))
    }
}

impl From<[u8; 4]> for Color {
    fn from(arr: [u8; 4]) -> Self {
        Self::from(arr.map(|x| x as f32 / 255.))
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self([r, g, b, 1.])
    }
}

impl From<[f32; 4]> for Color {
    fn from(arr: [f32; 4]) -> Self {
        Self(arr)
    }
}

impl Color {
    pub const BLACK: Self = Self([0., 0., 0., 1.]);

    pub fn into_array(self) -> [f32; 4] {
        self.0
    }
}

/// How the bytes of one vertex attribute are laid out inside the bound array buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribPointer {
    pub components: u8,
    pub scalar: ScalarType,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

/// The graphics context: handle allocation, the global binding slots, and the commands
/// that read them.
///
/// Binding state is global and mutable. Every `bind_*`/`use_program` call overwrites a slot,
/// and uploads, attribute configuration, uniform pushes and draws all implicitly act on
/// whatever the slots currently hold. Implementations are single-threaded and report the
/// slot contents back through `bound_array_buffer`, `bound_vertex_array` and
/// `active_program`, which the core uses to reject out-of-order calls.
pub trait GraphicsContext {
    type Err: Error + Send + Sync + 'static;

    fn create_buffer(&self) -> Result<BufferId, Self::Err>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_array_buffer(&self, buffer: Option<BufferId>);
    fn bound_array_buffer(&self) -> Option<BufferId>;
    /// Replace the contents of the bound array buffer.
    fn buffer_data(&self, data: &[u8], usage: BufferUsage) -> Result<(), Self::Err>;

    fn create_vertex_array(&self) -> Result<VertexArrayId, Self::Err>;
    fn delete_vertex_array(&self, array: VertexArrayId);
    fn bind_vertex_array(&self, array: Option<VertexArrayId>);
    fn bound_vertex_array(&self) -> Option<VertexArrayId>;
    /// Enable an attribute channel of the bound vertex array.
    fn enable_vertex_attrib(&self, location: Location) -> Result<(), Self::Err>;
    /// Configure an attribute channel of the bound vertex array to read from the bound
    /// array buffer.
    fn vertex_attrib_pointer(
        &self,
        location: Location,
        pointer: &AttribPointer,
    ) -> Result<(), Self::Err>;

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, Self::Err>;
    fn delete_shader(&self, shader: ShaderId);
    fn compile_shader(&self, shader: ShaderId, source: &str) -> Result<(), Self::Err>;
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;

    fn create_program(&self) -> Result<ProgramId, Self::Err>;
    fn delete_program(&self, program: ProgramId);
    fn attach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err>;
    fn detach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err>;
    fn link_program(&self, program: ProgramId) -> Result<(), Self::Err>;
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<Location>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<Location>;
    fn use_program(&self, program: Option<ProgramId>);
    fn active_program(&self) -> Option<ProgramId>;
    /// Push a value into a uniform of the active program.
    fn set_uniform(&self, location: Location, value: &Uniform) -> Result<(), Self::Err>;

    fn set_clear_color(&self, color: Color);
    fn clear(&self, buffers: ClearBuffers);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn draw_arrays(&self, mode: DrawMode, first: usize, count: usize) -> Result<(), Self::Err>;
}
