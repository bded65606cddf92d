use bytemuck::Pod;

use crate::attribute::VertexAttribute;

#[cfg(feature = "derive")]
pub use iris_derive::Vertex;

/// A vertex record with a fixed, tightly-packed layout.
///
/// Usually derived: every field becomes one attribute named after the field (or after its
/// `#[attribute(name = "...")]`), with the record size as stride and the field offset as
/// offset.
pub trait Vertex: Pod {
    fn attributes() -> Vec<VertexAttribute>;
}
