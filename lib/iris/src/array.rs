use std::{marker::PhantomData, mem::size_of};

use crate::{
    attribute::{AttributeBinding, VertexAttribute},
    bind::Bind,
    buffer::VertexBuffer,
    context::{GraphicsContext, ProgramId, VertexArrayId},
    error::{Error, Result},
    program::ShaderProgram,
    vertex::Vertex,
};

/// A recorded vertex layout: which buffer feeds which attribute channel, and how.
///
/// The layout is captured once at construction against one program's attribute locations;
/// afterwards binding the array restores all of it at once.
#[derive(Debug)]
pub struct VertexArray<V> {
    id: VertexArrayId,
    program: ProgramId,
    attributes: Vec<(VertexAttribute, AttributeBinding)>,
    __vertex: PhantomData<fn() -> V>,
}

impl<V: bytemuck::Pod> VertexArray<V> {
    #[tracing::instrument(skip_all, fields(buffer = buffer.id().get(), program = program.id().get()))]
    pub fn new<Gc: GraphicsContext>(
        gc: &Gc,
        buffer: &VertexBuffer<V>,
        program: &ShaderProgram,
        attributes: impl IntoIterator<Item = VertexAttribute>,
    ) -> Result<Self> {
        let attributes = attributes.into_iter().collect::<Vec<_>>();
        for attribute in &attributes {
            attribute.validate()?;
            if attribute.stride() != size_of::<V>() {
                tracing::warn!(
                    message = "Attribute stride differs from the record size",
                    name = attribute.name(),
                    stride = attribute.stride(),
                    record = size_of::<V>()
                );
            }
        }

        let id = gc.create_vertex_array().map_err(Error::backend)?;
        gc.bind_vertex_array(Some(id));
        buffer.bind(gc);
        let bindings = attributes
            .iter()
            .map(|attribute| attribute.bind(gc, program))
            .collect::<Result<Vec<_>>>();
        gc.bind_vertex_array(None);
        buffer.unbind(gc);

        match bindings {
            Ok(bindings) => {
                tracing::debug!(
                    message = "Created vertex array",
                    id = id.get(),
                    attributes = bindings.len(),
                    skipped = bindings.iter().filter(|b| **b == AttributeBinding::Skipped).count()
                );
                Ok(Self {
                    id,
                    program: program.id(),
                    attributes: attributes.into_iter().zip(bindings).collect(),
                    __vertex: PhantomData,
                })
            }
            Err(err) => {
                gc.delete_vertex_array(id);
                Err(err)
            }
        }
    }
}

impl<V: Vertex> VertexArray<V> {
    /// Build the layout from the attribute list of the vertex type itself.
    pub fn from_layout<Gc: GraphicsContext>(
        gc: &Gc,
        buffer: &VertexBuffer<V>,
        program: &ShaderProgram,
    ) -> Result<Self> {
        Self::new(gc, buffer, program, V::attributes())
    }
}

impl<V> VertexArray<V> {
    /// The program whose attribute locations this layout was resolved against.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn attributes(&self) -> impl '_ + Iterator<Item = (&VertexAttribute, AttributeBinding)> {
        self.attributes.iter().map(|(a, b)| (a, *b))
    }

    pub fn destroy<Gc: GraphicsContext>(self, gc: &Gc) {
        if self.is_bound(gc) {
            self.unbind(gc);
        }
        gc.delete_vertex_array(self.id);
    }
}

impl<V> Bind for VertexArray<V> {
    type Id = VertexArrayId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn bind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Bind vertex array", id = self.id.get());
        gc.bind_vertex_array(Some(self.id));
    }

    fn unbind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Unbind vertex array", id = self.id.get());
        gc.bind_vertex_array(None);
    }

    fn is_bound<Gc: GraphicsContext>(&self, gc: &Gc) -> bool {
        gc.bound_vertex_array() == Some(self.id)
    }
}
