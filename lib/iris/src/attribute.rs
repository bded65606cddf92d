use std::borrow::Cow;

use crate::{
    context::{AttribPointer, GraphicsContext, Location, Slot},
    error::{Error, Result},
    program::ShaderProgram,
    value::{ScalarType, VertexField},
};

/// Describes how one field of a vertex record feeds a named shader input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    name: Cow<'static, str>,
    components: u8,
    scalar: ScalarType,
    stride: usize,
    offset: usize,
    normalize: bool,
}

/// Outcome of [`VertexAttribute::bind`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeBinding {
    Bound(Location),
    /// The program has no active input by that name.
    Skipped,
}

impl VertexAttribute {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        components: u8,
        scalar: ScalarType,
        stride: usize,
        offset: usize,
    ) -> Self {
        Self {
            name: name.into(),
            components,
            scalar,
            stride,
            offset,
            normalize: false,
        }
    }

    /// Describe a field of type `F` located `offset` bytes into a `stride`-byte record.
    pub fn for_field<F: VertexField>(
        name: impl Into<Cow<'static, str>>,
        stride: usize,
        offset: usize,
    ) -> Self {
        Self::new(name, F::COMPONENTS, F::SCALAR, stride, offset)
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> u8 {
        self.components
    }

    pub fn scalar(&self) -> ScalarType {
        self.scalar
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    /// Size of the attribute inside one record, in bytes.
    pub fn size(&self) -> usize {
        self.components as usize * self.scalar.size()
    }

    pub fn pointer(&self) -> AttribPointer {
        AttribPointer {
            components: self.components,
            scalar: self.scalar,
            normalized: self.normalize,
            stride: self.stride,
            offset: self.offset,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.components) {
            return Err(Error::Components {
                name: self.name.to_string(),
                components: self.components,
            });
        }
        match self.offset.checked_add(self.size()) {
            Some(end) if end <= self.stride => Ok(()),
            end => Err(Error::Layout {
                name: self.name.to_string(),
                offset: self.offset,
                end: end.unwrap_or(usize::MAX),
                stride: self.stride,
            }),
        }
    }

    /// Enable and configure this attribute's channel in the currently bound vertex array,
    /// reading from the currently bound array buffer.
    pub fn bind<Gc: GraphicsContext>(
        &self,
        gc: &Gc,
        program: &ShaderProgram,
    ) -> Result<AttributeBinding> {
        if gc.bound_vertex_array().is_none() {
            return Err(Error::unbound(Slot::VertexArray, "binding a vertex attribute"));
        }
        if gc.bound_array_buffer().is_none() {
            return Err(Error::unbound(Slot::ArrayBuffer, "binding a vertex attribute"));
        }
        let Some(location) = program.attribute_location(gc, &self.name) else {
            tracing::warn!(message = "Attribute not found in program, skipping", name = %self.name);
            return Ok(AttributeBinding::Skipped);
        };
        gc.enable_vertex_attrib(location).map_err(Error::backend)?;
        gc.vertex_attrib_pointer(location, &self.pointer())
            .map_err(Error::backend)?;
        tracing::trace!(
            message = "Bound vertex attribute",
            name = %self.name,
            location = location.get(),
            components = self.components,
            offset = self.offset,
            stride = self.stride
        );
        Ok(AttributeBinding::Bound(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_descriptor_matches_type() {
        let color = VertexAttribute::for_field::<[f32; 4]>("vColor", 28, 12);
        assert_eq!(color.components(), 4);
        assert_eq!(color.scalar(), ScalarType::F32);
        assert_eq!(color.size(), 16);
        assert!(color.validate().is_ok());
    }

    #[test]
    fn rejects_attribute_past_stride() {
        let attribute = VertexAttribute::new("vColor", 4, ScalarType::F32, 28, 16);
        let err = attribute.validate().unwrap_err();
        assert!(
            matches!(err, Error::Layout { end: 32, stride: 28, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn rejects_offset_overflow() {
        let attribute = VertexAttribute::new("vColor", 4, ScalarType::F32, 28, usize::MAX - 4);
        let err = attribute.validate().unwrap_err();
        assert!(
            matches!(err, Error::Layout { end: usize::MAX, stride: 28, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn rejects_component_count() {
        for components in [0, 5] {
            let attribute = VertexAttribute::new("vColor", components, ScalarType::F32, 28, 0);
            let err = attribute.validate().unwrap_err();
            assert!(
                matches!(err, Error::Components { components: c, .. } if c == components),
                "got {err:?}"
            );
        }
    }

    #[test]
    fn normalized_bytes() {
        let color = VertexAttribute::for_field::<[u8; 4]>("vColor", 16, 12).with_normalize(true);
        let pointer = color.pointer();
        assert!(pointer.normalized);
        assert_eq!(pointer.scalar, ScalarType::U8);
        assert_eq!(color.size(), 4);
    }

    #[test]
    fn bind_needs_vertex_array_and_buffer() {
        use crate::{bind::Bind, buffer::VertexBuffer, headless::HeadlessContext};

        const VERTEX: &str = "#version 330 core\nin vec3 vPosition;\nvoid main() {}\n";
        const FRAGMENT: &str = "#version 330 core\nout vec4 color;\nvoid main() {}\n";

        let gc = HeadlessContext::new();
        let program = ShaderProgram::from_sources(&gc, VERTEX, FRAGMENT).unwrap();
        let position = VertexAttribute::for_field::<[f32; 3]>("vPosition", 12, 0);

        let err = position.bind(&gc, &program).unwrap_err();
        assert!(
            matches!(err, Error::Unbound { slot: Slot::VertexArray, .. }),
            "got {err:?}"
        );

        let vao = gc.create_vertex_array().unwrap();
        gc.bind_vertex_array(Some(vao));
        let err = position.bind(&gc, &program).unwrap_err();
        assert!(
            matches!(err, Error::Unbound { slot: Slot::ArrayBuffer, .. }),
            "got {err:?}"
        );

        let buffer = VertexBuffer::<[f32; 3]>::new(&gc).unwrap();
        buffer.bind(&gc);
        assert!(matches!(
            position.bind(&gc, &program).unwrap(),
            AttributeBinding::Bound(_)
        ));
        let normal = VertexAttribute::for_field::<[f32; 3]>("vNormal", 12, 0);
        assert_eq!(normal.bind(&gc, &program).unwrap(), AttributeBinding::Skipped);
    }
}
