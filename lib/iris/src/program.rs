use crate::{
    bind::Bind,
    context::{GraphicsContext, Location, ProgramId, ShaderId, ShaderStage},
    error::{Error, Result},
    shader::Shader,
};

/// A linked shader program. A value of this type always refers to a successfully linked
/// program.
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
}

impl ShaderProgram {
    /// Attach every stage, link, then detach the stages again. The stages stay alive and
    /// owned by the caller.
    #[tracing::instrument(skip_all)]
    pub fn new<'a, Gc: GraphicsContext>(
        gc: &Gc,
        shaders: impl IntoIterator<Item = &'a Shader>,
    ) -> Result<Self> {
        let id = gc.create_program().map_err(Error::backend)?;
        let stages = shaders.into_iter().map(Shader::id).collect::<Vec<_>>();
        let linked = Self::link(gc, id, &stages);
        for &shader in &stages {
            if let Err(err) = gc.detach_shader(id, shader) {
                tracing::warn!(message = "Cannot detach shader", shader = shader.get(), %err);
            }
        }
        match linked {
            Ok(()) => {
                tracing::debug!(message = "Linked program", id = id.get(), stages = stages.len());
                Ok(Self { id })
            }
            Err(err) => {
                gc.delete_program(id);
                Err(err)
            }
        }
    }

    /// Compile a vertex and a fragment stage and link them. The intermediate stages are
    /// destroyed afterwards.
    pub fn from_sources<Gc: GraphicsContext>(
        gc: &Gc,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self> {
        let vertex = Shader::new(gc, ShaderStage::Vertex, vertex)?;
        let fragment = match Shader::new(gc, ShaderStage::Fragment, fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                vertex.destroy(gc);
                return Err(err);
            }
        };
        let program = Self::new(gc, [&vertex, &fragment]);
        vertex.destroy(gc);
        fragment.destroy(gc);
        program
    }

    fn link<Gc: GraphicsContext>(
        gc: &Gc,
        id: ProgramId,
        stages: &[ShaderId],
    ) -> Result<()> {
        for &shader in stages {
            gc.attach_shader(id, shader).map_err(Error::backend)?;
        }
        gc.link_program(id).map_err(Error::backend)?;
        if gc.program_link_status(id) {
            Ok(())
        } else {
            Err(Error::Link {
                log: gc.program_info_log(id),
            })
        }
    }

    pub fn attribute_location<Gc: GraphicsContext>(&self, gc: &Gc, name: &str) -> Option<Location> {
        gc.attribute_location(self.id, name)
    }

    pub fn uniform_location<Gc: GraphicsContext>(&self, gc: &Gc, name: &str) -> Option<Location> {
        gc.uniform_location(self.id, name)
    }

    /// Make this the current program for uniform pushes and draws.
    pub fn activate<Gc: GraphicsContext>(&self, gc: &Gc) {
        self.bind(gc);
    }

    pub fn destroy<Gc: GraphicsContext>(self, gc: &Gc) {
        if self.is_bound(gc) {
            self.unbind(gc);
        }
        gc.delete_program(self.id);
    }
}

impl Bind for ShaderProgram {
    type Id = ProgramId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn bind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Use program", id = self.id.get());
        gc.use_program(Some(self.id));
    }

    fn unbind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Unuse program", id = self.id.get());
        gc.use_program(None);
    }

    fn is_bound<Gc: GraphicsContext>(&self, gc: &Gc) -> bool {
        gc.active_program() == Some(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{Command, HeadlessContext};

    const VERTEX: &str = r#"
#version 330 core
uniform mat4 projectionMatrix;
in vec3 vPosition;
in vec4 vColor;
out vec4 fColor;
void main() {
    gl_Position = projectionMatrix * vec4(vPosition, 1.0);
    fColor = vColor;
}"#;

    const FRAGMENT: &str = r#"
#version 330 core
in vec4 fColor;
out vec4 fragColor;
void main() {
    fragColor = fColor;
}"#;

    #[test]
    fn resolves_declared_inputs_only() {
        let gc = HeadlessContext::new();
        let program = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT).unwrap();
        assert!(program.attribute_location(&gc, "vPosition").is_some());
        assert!(program.attribute_location(&gc, "vColor").is_some());
        assert_eq!(program.attribute_location(&gc, "vNormal"), None);
        assert_eq!(program.attribute_location(&gc, "fColor"), None);
        assert!(program.uniform_location(&gc, "projectionMatrix").is_some());
        assert_eq!(program.uniform_location(&gc, "vColor"), None);
    }

    #[test]
    fn stages_are_detached_but_not_destroyed() {
        let gc = HeadlessContext::new();
        let vertex = Shader::new(&gc, ShaderStage::Vertex, VERTEX).unwrap();
        let fragment = Shader::new(&gc, ShaderStage::Fragment, FRAGMENT).unwrap();
        let program = ShaderProgram::new(&gc, [&vertex, &fragment]).unwrap();
        assert!(gc.attached_shaders(program.id()).is_empty());
        assert!(gc.shader_exists(vertex.id()));
        assert!(gc.shader_exists(fragment.id()));
    }

    #[test]
    fn compile_error_carries_log() {
        let gc = HeadlessContext::new();
        let err = Shader::new(&gc, ShaderStage::Vertex, "in vec3 vPosition;").unwrap_err();
        match err {
            Error::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("main"), "unexpected log: {log}");
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn link_requires_vertex_stage() {
        let gc = HeadlessContext::new();
        let fragment = Shader::new(&gc, ShaderStage::Fragment, FRAGMENT).unwrap();
        let err = ShaderProgram::new(&gc, [&fragment]).unwrap_err();
        assert!(matches!(err, Error::Link { .. }), "got {err:?}");
        assert!(gc.commands().iter().any(|command| matches!(
            command,
            Command::DetachShader { shader, .. } if *shader == fragment.id()
        )));
    }

    #[test]
    fn activation_is_global() {
        let gc = HeadlessContext::new();
        let first = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT).unwrap();
        let second = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT).unwrap();
        first.activate(&gc);
        assert!(first.is_bound(&gc));
        second.activate(&gc);
        assert!(!first.is_bound(&gc));
        assert_eq!(gc.active_program(), Some(second.id()));
    }
}
