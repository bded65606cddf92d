use duplicate::duplicate_item;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
    F32,
    F64,
}

impl ScalarType {
    /// Size of one component, in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

pub trait AsScalarType {
    const SCALAR: ScalarType;
}

#[duplicate_item(
    ty      scalar;
    [i8]    [I8];
    [i16]   [I16];
    [i32]   [I32];
    [u8]    [U8];
    [u16]   [U16];
    [u32]   [U32];
    [f32]   [F32];
    [f64]   [F64];
)]
impl AsScalarType for ty {
    const SCALAR: ScalarType = ScalarType::scalar;
}

/// A type that can be fed to a vertex shader input as one attribute.
pub trait VertexField {
    const COMPONENTS: u8;
    const SCALAR: ScalarType;
}

#[duplicate_item(ty; [i8]; [i16]; [i32]; [u8]; [u16]; [u32]; [f32]; [f64])]
impl VertexField for ty {
    const COMPONENTS: u8 = 1;
    const SCALAR: ScalarType = <ty as AsScalarType>::SCALAR;
}

#[duplicate_item(n; [2]; [3]; [4])]
impl<T: AsScalarType> VertexField for [T; n] {
    const COMPONENTS: u8 = n;
    const SCALAR: ScalarType = T::SCALAR;
}

#[duplicate_item(
    vec             n       scalar;
    [glam::Vec2]    [2]     [F32];
    [glam::Vec3]    [3]     [F32];
    [glam::Vec4]    [4]     [F32];
    [glam::IVec2]   [2]     [I32];
    [glam::IVec3]   [3]     [I32];
    [glam::IVec4]   [4]     [I32];
    [glam::UVec2]   [2]     [U32];
    [glam::UVec3]   [3]     [U32];
    [glam::UVec4]   [4]     [U32];
)]
impl VertexField for vec {
    const COMPONENTS: u8 = n;
    const SCALAR: ScalarType = ScalarType::scalar;
}
