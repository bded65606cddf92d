use std::{
    cell::Cell,
    ffi::{c_void, CString},
    marker::PhantomData,
};

use iris::{
    context::{
        AttribPointer, BufferId, BufferUsage, ClearBuffers, Color, DrawMode, GraphicsContext,
        Location, ProgramId, ShaderId, ShaderStage, VertexArrayId,
    },
    uniform::Uniform,
    value::ScalarType,
};

use crate::{
    error::{guard, GlError},
    gl::{self, types::*},
};

fn gl_scalar_type(typ: ScalarType) -> GLenum {
    match typ {
        ScalarType::U8 => gl::UNSIGNED_BYTE,
        ScalarType::U16 => gl::UNSIGNED_SHORT,
        ScalarType::U32 => gl::UNSIGNED_INT,
        ScalarType::I8 => gl::BYTE,
        ScalarType::I16 => gl::SHORT,
        ScalarType::I32 => gl::INT,
        ScalarType::F32 => gl::FLOAT,
        ScalarType::F64 => gl::DOUBLE,
    }
}

fn gl_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::Static => gl::STATIC_DRAW,
        BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
        BufferUsage::Stream => gl::STREAM_DRAW,
    }
}

fn gl_stage(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        ShaderStage::Geometry => gl::GEOMETRY_SHADER,
    }
}

fn gl_draw_mode(mode: DrawMode) -> GLenum {
    match mode {
        DrawMode::Points => gl::POINTS,
        DrawMode::Lines => gl::LINES,
        DrawMode::Triangles => gl::TRIANGLES,
    }
}

fn gl_clear_mask(buffers: ClearBuffers) -> GLbitfield {
    let mut mask = 0;
    if buffers.contains(ClearBuffers::COLOR) {
        mask |= gl::COLOR_BUFFER_BIT;
    }
    if buffers.contains(ClearBuffers::DEPTH) {
        mask |= gl::DEPTH_BUFFER_BIT;
    }
    if buffers.contains(ClearBuffers::STENCIL) {
        mask |= gl::STENCIL_BUFFER_BIT;
    }
    mask
}

fn info_log(len: GLint, read: impl FnOnce(GLsizei, &mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written = 0;
    read(len, &mut written, buf.as_mut_ptr().cast());
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Graphics context backed by the OpenGL context current on this thread.
///
/// The binding slots are mirrored in `Cell`s so that queries do not round-trip to the
/// driver; every bind goes through this type, so the mirror stays exact as long as nothing
/// else issues GL calls on the same context.
pub struct GlContext {
    gl: gl::Gl,
    array_buffer: Cell<Option<BufferId>>,
    vertex_array: Cell<Option<VertexArrayId>>,
    program: Cell<Option<ProgramId>>,
    __non_send: PhantomData<*mut ()>,
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("array_buffer", &self.array_buffer.get())
            .field("vertex_array", &self.vertex_array.get())
            .field("program", &self.program.get())
            .finish_non_exhaustive()
    }
}

impl GlContext {
    /// Load the function pointers of the context current on this thread.
    pub fn load_with(loader: impl FnMut(&'static str) -> *const c_void) -> Self {
        Self {
            gl: gl::Gl::load_with(loader),
            array_buffer: Cell::new(None),
            vertex_array: Cell::new(None),
            program: Cell::new(None),
            __non_send: PhantomData,
        }
    }

    /// Raw bindings, for calls this type does not wrap.
    pub fn gl(&self) -> &gl::Gl {
        &self.gl
    }

    pub fn enable_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.Enable(gl::DEPTH_TEST);
            } else {
                self.gl.Disable(gl::DEPTH_TEST);
            }
        }
    }
}

impl GraphicsContext for GlContext {
    type Err = GlError;

    fn create_buffer(&self) -> Result<BufferId, Self::Err> {
        let mut id = 0;
        unsafe { self.gl.GenBuffers(1, &mut id) };
        BufferId::from_raw(id).ok_or_else(|| GlError::allocation(&self.gl, "buffer"))
    }

    fn delete_buffer(&self, buffer: BufferId) {
        if self.array_buffer.get() == Some(buffer) {
            self.array_buffer.set(None);
        }
        unsafe { self.gl.DeleteBuffers(1, &buffer.get()) };
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .BindBuffer(gl::ARRAY_BUFFER, buffer.map_or(0, BufferId::get))
        };
        self.array_buffer.set(buffer);
    }

    fn bound_array_buffer(&self) -> Option<BufferId> {
        self.array_buffer.get()
    }

    fn buffer_data(&self, data: &[u8], usage: BufferUsage) -> Result<(), Self::Err> {
        unsafe {
            self.gl.BufferData(
                gl::ARRAY_BUFFER,
                data.len() as GLsizeiptr,
                data.as_ptr().cast(),
                gl_usage(usage),
            );
        }
        guard(&self.gl)
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, Self::Err> {
        let mut id = 0;
        unsafe { self.gl.GenVertexArrays(1, &mut id) };
        VertexArrayId::from_raw(id).ok_or_else(|| GlError::allocation(&self.gl, "vertex array"))
    }

    fn delete_vertex_array(&self, array: VertexArrayId) {
        if self.vertex_array.get() == Some(array) {
            self.vertex_array.set(None);
        }
        unsafe { self.gl.DeleteVertexArrays(1, &array.get()) };
    }

    fn bind_vertex_array(&self, array: Option<VertexArrayId>) {
        unsafe { self.gl.BindVertexArray(array.map_or(0, VertexArrayId::get)) };
        self.vertex_array.set(array);
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.vertex_array.get()
    }

    fn enable_vertex_attrib(&self, location: Location) -> Result<(), Self::Err> {
        unsafe { self.gl.EnableVertexAttribArray(location.get()) };
        guard(&self.gl)
    }

    fn vertex_attrib_pointer(
        &self,
        location: Location,
        pointer: &AttribPointer,
    ) -> Result<(), Self::Err> {
        let integer = !matches!(pointer.scalar, ScalarType::F32 | ScalarType::F64);
        unsafe {
            if integer && !pointer.normalized {
                self.gl.VertexAttribIPointer(
                    location.get(),
                    pointer.components as _,
                    gl_scalar_type(pointer.scalar),
                    pointer.stride as _,
                    pointer.offset as *const _,
                );
            } else {
                self.gl.VertexAttribPointer(
                    location.get(),
                    pointer.components as _,
                    gl_scalar_type(pointer.scalar),
                    if pointer.normalized { gl::TRUE } else { gl::FALSE },
                    pointer.stride as _,
                    pointer.offset as *const _,
                );
            }
        }
        guard(&self.gl)
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, Self::Err> {
        let id = unsafe { self.gl.CreateShader(gl_stage(stage)) };
        ShaderId::from_raw(id).ok_or_else(|| GlError::allocation(&self.gl, "shader"))
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.DeleteShader(shader.get()) };
    }

    fn compile_shader(&self, shader: ShaderId, source: &str) -> Result<(), Self::Err> {
        let source = CString::new(source)?;
        unsafe {
            self.gl
                .ShaderSource(shader.get(), 1, &source.as_ptr(), std::ptr::null());
            self.gl.CompileShader(shader.get());
        }
        guard(&self.gl)
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        let mut status = 0;
        unsafe {
            self.gl
                .GetShaderiv(shader.get(), gl::COMPILE_STATUS, &mut status)
        };
        status as GLboolean == gl::TRUE
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        let mut len = 0;
        unsafe {
            self.gl
                .GetShaderiv(shader.get(), gl::INFO_LOG_LENGTH, &mut len)
        };
        info_log(len, |size, written, buf| unsafe {
            self.gl.GetShaderInfoLog(shader.get(), size, written, buf)
        })
    }

    fn create_program(&self) -> Result<ProgramId, Self::Err> {
        let id = unsafe { self.gl.CreateProgram() };
        ProgramId::from_raw(id).ok_or_else(|| GlError::allocation(&self.gl, "program"))
    }

    fn delete_program(&self, program: ProgramId) {
        if self.program.get() == Some(program) {
            self.program.set(None);
        }
        unsafe { self.gl.DeleteProgram(program.get()) };
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err> {
        unsafe { self.gl.AttachShader(program.get(), shader.get()) };
        guard(&self.gl)
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err> {
        unsafe { self.gl.DetachShader(program.get(), shader.get()) };
        guard(&self.gl)
    }

    fn link_program(&self, program: ProgramId) -> Result<(), Self::Err> {
        unsafe { self.gl.LinkProgram(program.get()) };
        guard(&self.gl)
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        let mut status = 0;
        unsafe {
            self.gl
                .GetProgramiv(program.get(), gl::LINK_STATUS, &mut status)
        };
        status as GLboolean == gl::TRUE
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        let mut len = 0;
        unsafe {
            self.gl
                .GetProgramiv(program.get(), gl::INFO_LOG_LENGTH, &mut len)
        };
        info_log(len, |size, written, buf| unsafe {
            self.gl.GetProgramInfoLog(program.get(), size, written, buf)
        })
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<Location> {
        let name = CString::new(name).ok()?;
        let location = unsafe { self.gl.GetAttribLocation(program.get(), name.as_ptr()) };
        (location >= 0).then(|| Location::new(location as _))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<Location> {
        let name = CString::new(name).ok()?;
        let location = unsafe { self.gl.GetUniformLocation(program.get(), name.as_ptr()) };
        (location >= 0).then(|| Location::new(location as _))
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.UseProgram(program.map_or(0, ProgramId::get)) };
        self.program.set(program);
    }

    fn active_program(&self) -> Option<ProgramId> {
        self.program.get()
    }

    fn set_uniform(&self, location: Location, value: &Uniform) -> Result<(), Self::Err> {
        let location = location.get() as GLint;
        unsafe {
            match value {
                Uniform::Int(i) => self.gl.Uniform1i(location, *i),
                Uniform::Uint(i) => self.gl.Uniform1ui(location, *i),
                Uniform::Float(f) => self.gl.Uniform1f(location, *f),
                Uniform::Vec2(v) => self.gl.Uniform2fv(location, 1, v.as_ptr()),
                Uniform::Vec3(v) => self.gl.Uniform3fv(location, 1, v.as_ptr()),
                Uniform::Vec4(v) => self.gl.Uniform4fv(location, 1, v.as_ptr()),
                Uniform::Mat2(m) => {
                    self.gl
                        .UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr().cast())
                }
                Uniform::Mat3(m) => {
                    self.gl
                        .UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr().cast())
                }
                Uniform::Mat4(m) => {
                    self.gl
                        .UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr().cast())
                }
            }
        }
        guard(&self.gl)
    }

    fn set_clear_color(&self, color: Color) {
        let [r, g, b, a] = color.into_array();
        unsafe { self.gl.ClearColor(r, g, b, a) };
    }

    fn clear(&self, buffers: ClearBuffers) {
        unsafe { self.gl.Clear(gl_clear_mask(buffers)) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.Viewport(x, y, width, height) };
    }

    fn draw_arrays(&self, mode: DrawMode, first: usize, count: usize) -> Result<(), Self::Err> {
        unsafe {
            self.gl
                .DrawArrays(gl_draw_mode(mode), first as _, count as _)
        };
        guard(&self.gl)
    }
}
