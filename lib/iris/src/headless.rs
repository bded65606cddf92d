//! In-memory graphics context.
//!
//! Simulates the object model and binding slots of a GL 3.3 core context closely enough to
//! exercise the whole core without a display: handles are allocated per object kind starting
//! at 1, shader sources are scanned for `main` and for their `in`/`uniform` declarations, and
//! every call is recorded as a [`Command`] for inspection.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt,
    marker::PhantomData,
    num::NonZeroU32,
};

use lazy_regex::{lazy_regex, Lazy, Regex};
use thiserror::Error;

use crate::{
    context::{
        AttribPointer, BufferId, BufferUsage, ClearBuffers, Color, DrawMode, GraphicsContext,
        Location, ProgramId, ShaderId, ShaderStage, VertexArrayId,
    },
    uniform::Uniform,
};

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
    #[error("Out of {0} handles")]
    Exhausted(&'static str),
}

/// One recorded call into the context.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    BindArrayBuffer(Option<BufferId>),
    BufferData {
        buffer: BufferId,
        bytes: usize,
        usage: BufferUsage,
    },
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    EnableVertexAttrib(Location),
    VertexAttribPointer {
        location: Location,
        pointer: AttribPointer,
    },
    CreateShader {
        shader: ShaderId,
        stage: ShaderStage,
    },
    DeleteShader(ShaderId),
    CompileShader(ShaderId),
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    AttachShader {
        program: ProgramId,
        shader: ShaderId,
    },
    DetachShader {
        program: ProgramId,
        shader: ShaderId,
    },
    LinkProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform {
        location: Location,
        value: Uniform,
    },
    ClearColor(Color),
    Clear(ClearBuffers),
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    DrawArrays {
        mode: DrawMode,
        first: usize,
        count: usize,
    },
}

struct Handle<'a>(Option<u32>, &'a str);

impl fmt::Display for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{} {id}", self.1),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBuffer(id) => write!(f, "create buffer {}", id.get()),
            Self::DeleteBuffer(id) => write!(f, "delete buffer {}", id.get()),
            Self::BindArrayBuffer(id) => {
                write!(f, "bind array buffer: {}", Handle(id.map(BufferId::get), "buffer"))
            }
            Self::BufferData {
                buffer,
                bytes,
                usage,
            } => write!(f, "buffer data: buffer {} <- {bytes} bytes ({usage:?})", buffer.get()),
            Self::CreateVertexArray(id) => write!(f, "create vertex array {}", id.get()),
            Self::DeleteVertexArray(id) => write!(f, "delete vertex array {}", id.get()),
            Self::BindVertexArray(id) => write!(
                f,
                "bind vertex array: {}",
                Handle(id.map(VertexArrayId::get), "vertex array")
            ),
            Self::EnableVertexAttrib(location) => {
                write!(f, "enable attribute {}", location.get())
            }
            Self::VertexAttribPointer { location, pointer } => write!(
                f,
                "attribute {}: {}x{:?}{} stride {} offset {}",
                location.get(),
                pointer.components,
                pointer.scalar,
                if pointer.normalized { " normalized" } else { "" },
                pointer.stride,
                pointer.offset
            ),
            Self::CreateShader { shader, stage } => {
                write!(f, "create {stage:?} shader {}", shader.get())
            }
            Self::DeleteShader(id) => write!(f, "delete shader {}", id.get()),
            Self::CompileShader(id) => write!(f, "compile shader {}", id.get()),
            Self::CreateProgram(id) => write!(f, "create program {}", id.get()),
            Self::DeleteProgram(id) => write!(f, "delete program {}", id.get()),
            Self::AttachShader { program, shader } => {
                write!(f, "attach shader {} to program {}", shader.get(), program.get())
            }
            Self::DetachShader { program, shader } => {
                write!(f, "detach shader {} from program {}", shader.get(), program.get())
            }
            Self::LinkProgram(id) => write!(f, "link program {}", id.get()),
            Self::UseProgram(id) => {
                write!(f, "use program: {}", Handle(id.map(ProgramId::get), "program"))
            }
            Self::SetUniform { location, value } => {
                write!(f, "uniform {}: {value:?}", location.get())
            }
            Self::ClearColor(Color([r, g, b, a])) => write!(f, "clear color {r} {g} {b} {a}"),
            Self::Clear(buffers) => write!(f, "clear {buffers:?}"),
            Self::Viewport {
                x,
                y,
                width,
                height,
            } => write!(f, "viewport {x} {y} {width}x{height}"),
            Self::DrawArrays { mode, first, count } => {
                write!(f, "draw {mode:?} {first}..{}", first + count)
            }
        }
    }
}

/// One enabled and configured attribute channel of a vertex array.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub location: Location,
    pub enabled: bool,
    pub pointer: AttribPointer,
    /// Array buffer bound when the pointer was configured.
    pub buffer: Option<BufferId>,
}

/// A draw call along with the binding state it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: DrawMode,
    pub first: usize,
    pub count: usize,
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
}

#[derive(Debug, Default)]
struct BufferObject {
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct ArraySlot {
    enabled: bool,
    pointer: Option<(AttribPointer, Option<BufferId>)>,
}

#[derive(Debug, Default)]
struct ArrayObject {
    slots: BTreeMap<u32, ArraySlot>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ShaderId>,
    linked: bool,
    log: String,
    attributes: Vec<(String, Location)>,
    uniforms: Vec<(String, Location)>,
    values: HashMap<Location, Uniform>,
}

#[derive(Debug)]
struct Counters {
    buffer: u32,
    vertex_array: u32,
    shader: u32,
    program: u32,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            buffer: 1,
            vertex_array: 1,
            shader: 1,
            program: 1,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    counters: Counters,
    buffers: HashMap<BufferId, BufferObject>,
    arrays: HashMap<VertexArrayId, ArrayObject>,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    array_buffer: Option<BufferId>,
    vertex_array: Option<VertexArrayId>,
    program: Option<ProgramId>,
    clear_color: Option<Color>,
    viewport: Option<[i32; 4]>,
    draws: Vec<DrawCall>,
    commands: Vec<Command>,
    quiet: bool,
}

impl State {
    fn log(&mut self, command: Command) {
        if !self.quiet {
            self.commands.push(command);
        }
    }

    fn log_draw(&mut self, draw: DrawCall) {
        if !self.quiet {
            self.draws.push(draw);
        }
    }
}

fn next_id(counter: &mut u32, kind: &'static str) -> Result<NonZeroU32, HeadlessError> {
    let id = NonZeroU32::new(*counter).ok_or(HeadlessError::Exhausted(kind))?;
    *counter = counter.checked_add(1).unwrap_or(0);
    Ok(id)
}

/// Graphics context that keeps every object in memory and never touches a GPU.
///
/// Recorded commands and draw calls accumulate until drained with [`Self::take_commands`]
/// and [`Self::take_draw_calls`]. Long-running users that only need the object model can
/// turn recording off with [`Self::set_recording`].
#[derive(Debug, Default)]
pub struct HeadlessContext {
    state: RefCell<State>,
    __non_send: PhantomData<*mut ()>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far.
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Drain the recorded calls.
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    /// Drain the recorded draw calls.
    pub fn take_draw_calls(&self) -> Vec<DrawCall> {
        std::mem::take(&mut self.state.borrow_mut().draws)
    }

    /// Start or stop recording commands and draw calls. Already recorded entries are kept.
    pub fn set_recording(&self, recording: bool) {
        self.state.borrow_mut().quiet = !recording;
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .map(|buffer| buffer.data.clone())
    }

    /// Configured attribute channels of a vertex array, ordered by location.
    pub fn layout(&self, array: VertexArrayId) -> Option<Vec<AttributeSlot>> {
        let state = self.state.borrow();
        let array = state.arrays.get(&array)?;
        Some(
            array
                .slots
                .iter()
                .filter_map(|(&location, slot)| {
                    let (pointer, buffer) = slot.pointer?;
                    Some(AttributeSlot {
                        location: Location::new(location),
                        enabled: slot.enabled,
                        pointer,
                        buffer,
                    })
                })
                .collect(),
        )
    }

    /// Layout of the currently bound vertex array.
    pub fn current_layout(&self) -> Option<Vec<AttributeSlot>> {
        let array = self.state.borrow().vertex_array?;
        self.layout(array)
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    /// Last value pushed into the named uniform of `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<Uniform> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = lookup(&program.uniforms, name)?;
        program.values.get(&location).cloned()
    }

    pub fn attached_shaders(&self, program: ProgramId) -> Vec<ShaderId> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.attached.clone())
            .unwrap_or_default()
    }

    pub fn shader_exists(&self, shader: ShaderId) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.state.borrow().clear_color
    }

    pub fn viewport_rect(&self) -> Option<[i32; 4]> {
        self.state.borrow().viewport
    }

    fn record(&self, command: Command) {
        self.state.borrow_mut().log(command);
    }
}

fn lookup(table: &[(String, Location)], name: &str) -> Option<Location> {
    table
        .iter()
        .find(|(entry, _)| entry == name)
        .map(|(_, location)| *location)
}

static COMMENT_RE: Lazy<Regex> = lazy_regex!(r"//[^\n]*|(?s)/\*.*?\*/");
static MAIN_RE: Lazy<Regex> = lazy_regex!(r"\bvoid\s+main\s*\(\s*(void)?\s*\)");
static DECL_RE: Lazy<Regex> = lazy_regex!(
    r"(?m)^\s*(?:layout\s*\(\s*location\s*=\s*(?P<location>\d+)\s*\)\s*)?(?P<qualifier>in|attribute|uniform)\s+(?:(?:lowp|mediump|highp)\s+)?(?P<ty>\w+)\s+(?P<name>\w+)\s*(?:\[\s*\d+\s*\])?\s*;"
);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    uniform: bool,
    name: String,
    location: Option<u32>,
}

fn declarations(source: &str) -> Vec<Declaration> {
    let source = COMMENT_RE.replace_all(source, "");
    DECL_RE
        .captures_iter(&source)
        .map(|captures| Declaration {
            uniform: &captures["qualifier"] == "uniform",
            name: captures["name"].to_string(),
            location: captures
                .name("location")
                .and_then(|location| location.as_str().parse().ok()),
        })
        .collect()
}

fn assign_locations<'a>(
    decls: impl IntoIterator<Item = (&'a str, Option<u32>)>,
) -> Vec<(String, Location)> {
    let decls = decls.into_iter().collect::<Vec<_>>();
    let mut taken = decls.iter().filter_map(|(_, loc)| *loc).collect::<Vec<_>>();
    let mut next = 0;
    let mut table = Vec::with_capacity(decls.len());
    for (name, location) in decls {
        if table.iter().any(|(entry, _): &(String, Location)| entry == name) {
            continue;
        }
        let location = location.unwrap_or_else(|| {
            while taken.contains(&next) {
                next += 1;
            }
            taken.push(next);
            next
        });
        table.push((name.to_string(), Location::new(location)));
    }
    table
}

impl GraphicsContext for HeadlessContext {
    type Err = HeadlessError;

    fn create_buffer(&self) -> Result<BufferId, Self::Err> {
        let mut state = self.state.borrow_mut();
        let id = BufferId::new(next_id(&mut state.counters.buffer, "buffer")?);
        state.buffers.insert(id, BufferObject::default());
        state.log(Command::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
        state.log(Command::DeleteBuffer(buffer));
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        state.array_buffer = buffer;
        state.log(Command::BindArrayBuffer(buffer));
    }

    fn bound_array_buffer(&self) -> Option<BufferId> {
        self.state.borrow().array_buffer
    }

    fn buffer_data(&self, data: &[u8], usage: BufferUsage) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let buffer = state
            .array_buffer
            .ok_or(HeadlessError::InvalidOperation("no array buffer bound"))?;
        let object = state
            .buffers
            .get_mut(&buffer)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "buffer",
                id: buffer.get(),
            })?;
        object.data = data.to_vec();
        state.log(Command::BufferData {
            buffer,
            bytes: data.len(),
            usage,
        });
        Ok(())
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, Self::Err> {
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId::new(next_id(&mut state.counters.vertex_array, "vertex array")?);
        state.arrays.insert(id, ArrayObject::default());
        state.log(Command::CreateVertexArray(id));
        Ok(id)
    }

    fn delete_vertex_array(&self, array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        state.arrays.remove(&array);
        if state.vertex_array == Some(array) {
            state.vertex_array = None;
        }
        state.log(Command::DeleteVertexArray(array));
    }

    fn bind_vertex_array(&self, array: Option<VertexArrayId>) {
        let mut state = self.state.borrow_mut();
        state.vertex_array = array;
        state.log(Command::BindVertexArray(array));
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().vertex_array
    }

    fn enable_vertex_attrib(&self, location: Location) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let array = state
            .vertex_array
            .ok_or(HeadlessError::InvalidOperation("no vertex array bound"))?;
        let object = state
            .arrays
            .get_mut(&array)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "vertex array",
                id: array.get(),
            })?;
        object.slots.entry(location.get()).or_default().enabled = true;
        state.log(Command::EnableVertexAttrib(location));
        Ok(())
    }

    fn vertex_attrib_pointer(
        &self,
        location: Location,
        pointer: &AttribPointer,
    ) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let array = state
            .vertex_array
            .ok_or(HeadlessError::InvalidOperation("no vertex array bound"))?;
        let buffer = state
            .array_buffer
            .ok_or(HeadlessError::InvalidOperation("no array buffer bound"))?;
        let object = state
            .arrays
            .get_mut(&array)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "vertex array",
                id: array.get(),
            })?;
        object.slots.entry(location.get()).or_default().pointer = Some((*pointer, Some(buffer)));
        state.log(Command::VertexAttribPointer {
            location,
            pointer: *pointer,
        });
        Ok(())
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, Self::Err> {
        let mut state = self.state.borrow_mut();
        let id = ShaderId::new(next_id(&mut state.counters.shader, "shader")?);
        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.log(Command::CreateShader { shader: id, stage });
        Ok(id)
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.log(Command::DeleteShader(shader));
    }

    fn compile_shader(&self, shader: ShaderId, source: &str) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let object = state
            .shaders
            .get_mut(&shader)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "shader",
                id: shader.get(),
            })?;
        object.source = source.to_string();
        object.compiled = MAIN_RE.is_match(&COMMENT_RE.replace_all(source, ""));
        object.log = if object.compiled {
            String::new()
        } else {
            "ERROR: 0:1: 'main' : function not defined".to_string()
        };
        state.log(Command::CompileShader(shader));
        Ok(())
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |shader| shader.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn create_program(&self) -> Result<ProgramId, Self::Err> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId::new(next_id(&mut state.counters.program, "program")?);
        state.programs.insert(id, ProgramObject::default());
        state.log(Command::CreateProgram(id));
        Ok(id)
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.program == Some(program) {
            state.program = None;
        }
        state.log(Command::DeleteProgram(program));
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            return Err(HeadlessError::UnknownHandle {
                kind: "shader",
                id: shader.get(),
            });
        }
        let object = state
            .programs
            .get_mut(&program)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "program",
                id: program.get(),
            })?;
        if object.attached.contains(&shader) {
            return Err(HeadlessError::InvalidOperation("shader already attached"));
        }
        object.attached.push(shader);
        state.log(Command::AttachShader { program, shader });
        Ok(())
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let object = state
            .programs
            .get_mut(&program)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "program",
                id: program.get(),
            })?;
        let Some(index) = object.attached.iter().position(|&id| id == shader) else {
            return Err(HeadlessError::InvalidOperation("shader not attached"));
        };
        object.attached.remove(index);
        state.log(Command::DetachShader { program, shader });
        Ok(())
    }

    fn link_program(&self, program: ProgramId) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .get(&program)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "program",
                id: program.get(),
            })?
            .attached
            .clone();

        let stages = attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect::<Vec<_>>();
        let mut log = String::new();
        if let Some(stage) = stages.iter().find(|shader| !shader.compiled) {
            log = format!("error: {:?} shader was not successfully compiled", stage.stage);
        } else {
            for (stage, name) in [(ShaderStage::Vertex, "vertex"), (ShaderStage::Fragment, "fragment")] {
                if !stages.iter().any(|shader| shader.stage == stage) {
                    log = format!("error: program lacks a {name} shader");
                    break;
                }
            }
        }

        let linked = log.is_empty();
        let (attributes, uniforms) = if linked {
            let vertex_decls = stages
                .iter()
                .filter(|shader| shader.stage == ShaderStage::Vertex)
                .flat_map(|shader| declarations(&shader.source))
                .filter(|decl| !decl.uniform)
                .collect::<Vec<_>>();
            let uniform_decls = stages
                .iter()
                .flat_map(|shader| declarations(&shader.source))
                .filter(|decl| decl.uniform)
                .collect::<Vec<_>>();
            (
                assign_locations(vertex_decls.iter().map(|d| (d.name.as_str(), d.location))),
                assign_locations(uniform_decls.iter().map(|d| (d.name.as_str(), None))),
            )
        } else {
            Default::default()
        };

        if let Some(object) = state.programs.get_mut(&program) {
            object.linked = linked;
            object.log = log;
            object.attributes = attributes;
            object.uniforms = uniforms;
            object.values.clear();
        }
        state.log(Command::LinkProgram(program));
        Ok(())
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |program| program.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<Location> {
        let state = self.state.borrow();
        let program = state.programs.get(&program).filter(|p| p.linked)?;
        lookup(&program.attributes, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<Location> {
        let state = self.state.borrow();
        let program = state.programs.get(&program).filter(|p| p.linked)?;
        lookup(&program.uniforms, name)
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let mut state = self.state.borrow_mut();
        state.program = program;
        state.log(Command::UseProgram(program));
    }

    fn active_program(&self) -> Option<ProgramId> {
        self.state.borrow().program
    }

    fn set_uniform(&self, location: Location, value: &Uniform) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let program = state
            .program
            .ok_or(HeadlessError::InvalidOperation("no program in use"))?;
        let object = state
            .programs
            .get_mut(&program)
            .ok_or(HeadlessError::UnknownHandle {
                kind: "program",
                id: program.get(),
            })?;
        if !object.uniforms.iter().any(|(_, loc)| *loc == location) {
            return Err(HeadlessError::InvalidOperation("no uniform at this location"));
        }
        object.values.insert(location, value.clone());
        state.log(Command::SetUniform {
            location,
            value: value.clone(),
        });
        Ok(())
    }

    fn set_clear_color(&self, color: Color) {
        let mut state = self.state.borrow_mut();
        state.clear_color = Some(color);
        state.log(Command::ClearColor(color));
    }

    fn clear(&self, buffers: ClearBuffers) {
        self.record(Command::Clear(buffers));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some([x, y, width, height]);
        state.log(Command::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_arrays(&self, mode: DrawMode, first: usize, count: usize) -> Result<(), Self::Err> {
        let mut state = self.state.borrow_mut();
        let program = state
            .program
            .ok_or(HeadlessError::InvalidOperation("no program in use"))?;
        let vertex_array = state
            .vertex_array
            .ok_or(HeadlessError::InvalidOperation("no vertex array bound"))?;
        state.log_draw(DrawCall {
            mode,
            first,
            count,
            program,
            vertex_array,
        });
        state.log(Command::DrawArrays { mode, first, count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_declarations() {
        let decls = declarations(
            r#"
#version 330 core
// in vec3 vCommented;
layout(location = 2) in vec3 vPosition;
in highp vec4 vColor;
uniform mat4 projectionMatrix;
out vec4 fColor;
void main() {}
"#,
        );
        let names = decls.iter().map(|d| d.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["vPosition", "vColor", "projectionMatrix"]);
        assert_eq!(decls[0].location, Some(2));
        assert!(decls[2].uniform);
    }

    #[test]
    fn explicit_locations_are_kept() {
        let table = assign_locations([("a", None), ("b", Some(0)), ("c", None)]);
        assert_eq!(
            table,
            [
                ("a".to_string(), Location::new(1)),
                ("b".to_string(), Location::new(0)),
                ("c".to_string(), Location::new(2)),
            ]
        );
    }

    #[test]
    fn handles_start_at_one_per_kind() {
        let gc = HeadlessContext::new();
        assert_eq!(gc.create_buffer().unwrap().get(), 1);
        assert_eq!(gc.create_buffer().unwrap().get(), 2);
        assert_eq!(gc.create_vertex_array().unwrap().get(), 1);
        assert_eq!(gc.create_program().unwrap().get(), 1);
    }

    #[test]
    fn buffer_data_requires_binding() {
        let gc = HeadlessContext::new();
        assert!(matches!(
            gc.buffer_data(&[0; 4], BufferUsage::Stream),
            Err(HeadlessError::InvalidOperation(_))
        ));
    }

    #[test]
    fn recording_can_be_paused_and_drained() {
        let gc = HeadlessContext::new();
        gc.create_buffer().unwrap();
        assert_eq!(gc.take_commands().len(), 1);
        assert!(gc.commands().is_empty());

        gc.set_recording(false);
        let buffer = gc.create_buffer().unwrap();
        gc.bind_array_buffer(Some(buffer));
        gc.buffer_data(&[1, 2, 3], BufferUsage::Stream).unwrap();
        assert!(gc.commands().is_empty());
        assert_eq!(gc.buffer_contents(buffer), Some(vec![1, 2, 3]));

        gc.set_recording(true);
        gc.bind_array_buffer(None);
        assert_eq!(gc.commands(), [Command::BindArrayBuffer(None)]);
        assert!(gc.take_draw_calls().is_empty());
    }
}
