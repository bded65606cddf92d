use std::mem::size_of;

use bytemuck::Pod;

use crate::{
    bind::Bind,
    context::{BufferId, BufferUsage, DrawMode, GraphicsContext, Slot},
    error::{Error, Result},
};

const INITIAL_CAPACITY: usize = 4;

/// Append-only staging array of vertex records paired with a GPU array buffer.
///
/// Records are kept client-side and copied verbatim to the GPU on [`upload`](Self::upload),
/// so the GPU contents are stale between an [`append`](Self::append) and the next upload.
#[derive(Debug)]
pub struct VertexBuffer<V> {
    id: BufferId,
    storage: Box<[V]>,
    count: usize,
    usage: BufferUsage,
    stale: bool,
}

impl<V: Pod> VertexBuffer<V> {
    pub const RECORD_SIZE: usize = size_of::<V>();

    pub fn new<Gc: GraphicsContext>(gc: &Gc) -> Result<Self> {
        Self::with_usage(gc, BufferUsage::Stream)
    }

    pub fn with_usage<Gc: GraphicsContext>(gc: &Gc, usage: BufferUsage) -> Result<Self> {
        let id = gc.create_buffer().map_err(Error::backend)?;
        tracing::debug!(message = "Created vertex buffer", id = id.get(), record_size = Self::RECORD_SIZE, ?usage);
        Ok(Self {
            id,
            storage: vec![V::zeroed(); INITIAL_CAPACITY].into_boxed_slice(),
            count: 0,
            usage,
            stale: false,
        })
    }

    pub fn append(&mut self, vertex: V) {
        if self.count == self.storage.len() {
            self.grow();
        }
        self.storage[self.count] = vertex;
        self.count += 1;
        self.stale = true;
    }

    fn grow(&mut self) {
        let capacity = self.storage.len() * 2;
        tracing::trace!(message = "Growing vertex buffer", id = self.id.get(), from = self.storage.len(), to = capacity);
        let mut storage = vec![V::zeroed(); capacity].into_boxed_slice();
        storage[..self.count].copy_from_slice(&self.storage[..self.count]);
        self.storage = storage;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn as_slice(&self) -> &[V] {
        &self.storage[..self.count]
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Whether records were appended since the last upload.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Copy the valid records (never the spare capacity) to the GPU, replacing its previous
    /// contents. Returns the number of bytes transferred.
    pub fn upload<Gc: GraphicsContext>(&mut self, gc: &Gc) -> Result<usize> {
        if !self.is_bound(gc) {
            return Err(Error::unbound(Slot::ArrayBuffer, "uploading vertex data"));
        }
        let bytes: &[u8] = bytemuck::cast_slice(self.as_slice());
        let len = bytes.len();
        gc.buffer_data(bytes, self.usage).map_err(Error::backend)?;
        self.stale = false;
        tracing::trace!(message = "Uploaded vertex buffer", id = self.id.get(), count = self.count, bytes = len);
        Ok(len)
    }

    /// Draw every record as a list of independent triangles.
    pub fn draw<Gc: GraphicsContext>(&self, gc: &Gc) -> Result<()> {
        self.draw_as(gc, DrawMode::Triangles)
    }

    #[tracing::instrument(skip_all, fields(id = self.id.get(), count = self.count))]
    pub fn draw_as<Gc: GraphicsContext>(&self, gc: &Gc, mode: DrawMode) -> Result<()> {
        let per_primitive = mode.vertices_per_primitive();
        if self.count % per_primitive != 0 {
            return Err(Error::IncompletePrimitive {
                mode,
                count: self.count,
                per_primitive,
            });
        }
        if !self.is_bound(gc) {
            return Err(Error::unbound(Slot::ArrayBuffer, "drawing"));
        }
        if gc.bound_vertex_array().is_none() {
            return Err(Error::unbound(Slot::VertexArray, "drawing"));
        }
        if gc.active_program().is_none() {
            return Err(Error::unbound(Slot::Program, "drawing"));
        }
        if self.stale {
            tracing::warn!("Drawing a vertex buffer with records that were never uploaded");
        }
        gc.draw_arrays(mode, 0, self.count).map_err(Error::backend)
    }

    pub fn destroy<Gc: GraphicsContext>(self, gc: &Gc) {
        if self.is_bound(gc) {
            self.unbind(gc);
        }
        gc.delete_buffer(self.id);
    }
}

impl<V: Pod> Extend<V> for VertexBuffer<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for vertex in iter {
            self.append(vertex);
        }
    }
}

impl<V> Bind for VertexBuffer<V> {
    type Id = BufferId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn bind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Bind buffer", id = self.id.get());
        gc.bind_array_buffer(Some(self.id));
    }

    fn unbind<Gc: GraphicsContext>(&self, gc: &Gc) {
        tracing::trace!(message = "Unbind buffer", id = self.id.get());
        gc.bind_array_buffer(None);
    }

    fn is_bound<Gc: GraphicsContext>(&self, gc: &Gc) -> bool {
        gc.bound_array_buffer() == Some(self.id)
    }
}
