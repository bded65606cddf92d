use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use iris::{attribute::VertexAttribute, value::ScalarType, vertex::Vertex};

#[test]
fn works() {
    #[derive(Debug, Default, Clone, Copy, Pod, Zeroable, Vertex)]
    #[repr(C)]
    struct TestVertex {
        pos: [f32; 3],
        uv: [f32; 2],
        entity_id: u32,
    }

    let expected = vec![
        VertexAttribute::for_field::<[f32; 3]>("pos", 24, 0),
        VertexAttribute::for_field::<[f32; 2]>("uv", 24, offset_of!(TestVertex, uv)),
        VertexAttribute::for_field::<u32>("entity_id", 24, offset_of!(TestVertex, entity_id)),
    ];
    assert_eq!(TestVertex::attributes(), expected);
}

#[test]
fn coloured_vertex_layout() {
    #[derive(Debug, Clone, Copy, Pod, Zeroable, Vertex)]
    #[repr(C)]
    struct ColouredVertex {
        #[attribute(name = "vPosition")]
        position: [f32; 3],
        #[attribute(name = "vColor")]
        color: [f32; 4],
    }

    let attributes = ColouredVertex::attributes();
    assert_eq!(attributes.len(), 2);

    assert_eq!(attributes[0].name(), "vPosition");
    assert_eq!(attributes[0].components(), 3);
    assert_eq!(attributes[0].offset(), 0);

    assert_eq!(attributes[1].name(), "vColor");
    assert_eq!(attributes[1].components(), 4);
    assert_eq!(attributes[1].offset(), 12);

    for attribute in &attributes {
        assert_eq!(attribute.scalar(), ScalarType::F32);
        assert_eq!(attribute.stride(), 28);
    }
}

#[test]
fn ignored_and_normalized_fields() {
    #[derive(Debug, Clone, Copy, Pod, Zeroable, Vertex)]
    #[repr(C)]
    struct PackedVertex {
        position: glam::Vec2,
        #[attribute(normalize)]
        color: [u8; 4],
        #[attribute(ignore)]
        _padding: u32,
    }

    let attributes = PackedVertex::attributes();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[1].name(), "color");
    assert!(attributes[1].is_normalized());
    assert_eq!(attributes[1].scalar(), ScalarType::U8);
    assert_eq!(attributes[1].offset(), 8);
    assert_eq!(attributes[1].stride(), 16);
}
