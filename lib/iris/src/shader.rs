use crate::{
    context::{GraphicsContext, ShaderId, ShaderStage},
    error::{Error, Result},
};

/// One compiled shader stage.
///
/// Programs attach stages without taking ownership of them, so a stage can be linked into
/// several programs and must be destroyed separately once no longer needed.
#[derive(Debug)]
pub struct Shader {
    id: ShaderId,
    stage: ShaderStage,
}

impl Shader {
    pub fn new<Gc: GraphicsContext>(gc: &Gc, stage: ShaderStage, source: &str) -> Result<Self> {
        let id = gc.create_shader(stage).map_err(Error::backend)?;
        if let Err(err) = gc.compile_shader(id, source) {
            gc.delete_shader(id);
            return Err(Error::backend(err));
        }
        if !gc.shader_compile_status(id) {
            let log = gc.shader_info_log(id);
            gc.delete_shader(id);
            return Err(Error::Compile { stage, log });
        }
        tracing::debug!(message = "Compiled shader", id = id.get(), ?stage);
        Ok(Self { id, stage })
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn destroy<Gc: GraphicsContext>(self, gc: &Gc) {
        gc.delete_shader(self.id);
    }
}
