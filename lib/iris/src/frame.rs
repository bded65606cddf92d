use bytemuck::Pod;

use crate::{
    array::VertexArray,
    bind::Bind,
    buffer::VertexBuffer,
    context::{ClearBuffers, Color, GraphicsContext},
    error::{Error, Result},
    program::ShaderProgram,
    uniform::{Uniform, UniformBinding},
};

/// Steps of one frame, in the order they must happen.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum FrameState {
    Cleared,
    ProgramActive,
    UniformsPushed,
    BuffersBound,
    DataUploaded,
    Drawn,
    Reset,
}

impl FrameState {
    fn can_follow(self, state: FrameState) -> bool {
        use FrameState::*;
        matches!(
            (state, self),
            (Cleared, ProgramActive)
                | (ProgramActive | UniformsPushed, UniformsPushed)
                | (ProgramActive | UniformsPushed, BuffersBound)
                | (BuffersBound, DataUploaded)
                | (DataUploaded, Drawn)
        )
    }
}

/// Guard over one frame of rendering.
///
/// Steps called out of order fail with [`Error::OutOfOrder`] without touching the context.
/// Whatever happens, dropping the guard empties the vertex array, array buffer and program
/// slots.
#[derive(Debug)]
pub struct Frame<'gc, Gc: GraphicsContext> {
    gc: &'gc Gc,
    state: FrameState,
}

impl<'gc, Gc: GraphicsContext> Frame<'gc, Gc> {
    pub fn begin(gc: &'gc Gc, clear_color: impl Into<Color>) -> Self {
        gc.set_clear_color(clear_color.into());
        gc.clear(ClearBuffers::COLOR | ClearBuffers::DEPTH);
        Self {
            gc,
            state: FrameState::Cleared,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn context(&self) -> &'gc Gc {
        self.gc
    }

    fn step(&mut self, step: FrameState, f: impl FnOnce(&'gc Gc) -> Result<()>) -> Result<()> {
        if !step.can_follow(self.state) {
            return Err(Error::OutOfOrder {
                state: self.state,
                step,
            });
        }
        f(self.gc)?;
        self.state = step;
        Ok(())
    }

    pub fn activate(&mut self, program: &ShaderProgram) -> Result<()> {
        self.step(FrameState::ProgramActive, |gc| {
            program.activate(gc);
            Ok(())
        })
    }

    /// Push one uniform into the active program. May be called several times in a row.
    pub fn push_uniform<T: Clone + Into<Uniform>>(
        &mut self,
        program: &ShaderProgram,
        uniform: &UniformBinding<T>,
    ) -> Result<bool> {
        let mut found = false;
        self.step(FrameState::UniformsPushed, |gc| {
            found = uniform.set(gc, program)?;
            Ok(())
        })?;
        Ok(found)
    }

    pub fn bind<V: Pod>(&mut self, buffer: &VertexBuffer<V>, array: &VertexArray<V>) -> Result<()> {
        self.step(FrameState::BuffersBound, |gc| {
            let active = gc.active_program();
            if active != Some(array.program()) {
                return Err(Error::ProgramMismatch {
                    built_for: array.program(),
                    active,
                });
            }
            buffer.bind(gc);
            array.bind(gc);
            Ok(())
        })
    }

    /// Returns the number of bytes uploaded.
    pub fn upload<V: Pod>(&mut self, buffer: &mut VertexBuffer<V>) -> Result<usize> {
        let mut bytes = 0;
        self.step(FrameState::DataUploaded, |gc| {
            bytes = buffer.upload(gc)?;
            Ok(())
        })?;
        Ok(bytes)
    }

    pub fn draw<V: Pod>(&mut self, buffer: &VertexBuffer<V>) -> Result<()> {
        self.step(FrameState::Drawn, |gc| buffer.draw(gc))
    }

    /// End the frame now. Equivalent to dropping the guard.
    pub fn finish(self) {}

    fn reset(&mut self) {
        if self.state == FrameState::Reset {
            return;
        }
        if self.state != FrameState::Drawn {
            tracing::debug!(message = "Frame ended before drawing", state = ?self.state);
        }
        self.gc.bind_vertex_array(None);
        self.gc.bind_array_buffer(None);
        self.gc.use_program(None);
        self.state = FrameState::Reset;
    }
}

impl<'gc, Gc: GraphicsContext> Drop for Frame<'gc, Gc> {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessContext;

    #[test]
    fn steps_must_be_sequential() {
        let gc = HeadlessContext::new();
        let buffer = VertexBuffer::<[f32; 3]>::new(&gc).unwrap();
        let mut frame = Frame::begin(&gc, Color::BLACK);
        let err = frame.draw(&buffer).unwrap_err();
        assert!(
            matches!(
                err,
                Error::OutOfOrder {
                    state: FrameState::Cleared,
                    step: FrameState::Drawn
                }
            ),
            "got {err:?}"
        );
        assert_eq!(frame.state(), FrameState::Cleared);
    }

    #[test]
    fn uniform_step_is_optional_and_repeatable() {
        use FrameState::*;
        assert!(BuffersBound.can_follow(ProgramActive));
        assert!(BuffersBound.can_follow(UniformsPushed));
        assert!(UniformsPushed.can_follow(UniformsPushed));
        assert!(!UniformsPushed.can_follow(BuffersBound));
        assert!(!ProgramActive.can_follow(Drawn));
        assert!(!Cleared.can_follow(Reset));
    }

    #[test]
    fn drop_resets_bindings() {
        let gc = HeadlessContext::new();
        let buffer = VertexBuffer::<[f32; 3]>::new(&gc).unwrap();
        buffer.bind(&gc);
        {
            let _frame = Frame::begin(&gc, [0.5f32, 0., 0.5]);
        }
        assert_eq!(gc.bound_array_buffer(), None);
        assert_eq!(gc.bound_vertex_array(), None);
        assert_eq!(gc.active_program(), None);
    }
}
