use thiserror::Error;

use crate::{
    context::{DrawMode, ProgramId, ShaderStage, Slot},
    frame::FrameState,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Graphics context error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Cannot compile {stage:?} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Cannot link shader program:\n{log}")]
    Link { log: String },
    #[error("Vertex attribute {name:?} spans bytes {offset}..{end} but the stride is {stride}")]
    Layout {
        name: String,
        offset: usize,
        end: usize,
        stride: usize,
    },
    #[error("Vertex attribute {name:?} has {components} components, expected 1 to 4")]
    Components { name: String, components: u8 },
    #[error("{slot} must be bound before {operation}")]
    Unbound {
        slot: Slot,
        operation: &'static str,
    },
    #[error("Cannot draw {count} vertices as {mode:?}: not a multiple of {per_primitive}")]
    IncompletePrimitive {
        mode: DrawMode,
        count: usize,
        per_primitive: usize,
    },
    #[error("Vertex array was laid out for program {built_for:?} but {active:?} is active")]
    ProgramMismatch {
        built_for: ProgramId,
        active: Option<ProgramId>,
    },
    #[error("Frame step {step:?} cannot follow {state:?}")]
    OutOfOrder { state: FrameState, step: FrameState },
}

impl Error {
    pub(crate) fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    pub(crate) fn unbound(slot: Slot, operation: &'static str) -> Self {
        Self::Unbound { slot, operation }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
