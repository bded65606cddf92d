use duplicate::duplicate_item;

use crate::{
    bind::Bind,
    context::{GraphicsContext, Slot},
    error::{Error, Result},
    program::ShaderProgram,
};

/// A value that can be pushed into a uniform slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Int(i32),
    Uint(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
}

#[duplicate_item(
    ty                  variant;
    [i32]               [Int];
    [u32]               [Uint];
    [f32]               [Float];
    [[f32; 2]]          [Vec2];
    [[f32; 3]]          [Vec3];
    [[f32; 4]]          [Vec4];
    [[[f32; 4]; 4]]     [Mat4];
)]
impl From<ty> for Uniform {
    fn from(value: ty) -> Self {
        Uniform::variant(value)
    }
}

#[duplicate_item(
    ty      convert;
    [Vec2]  [to_array];
    [Vec3]  [to_array];
    [Vec4]  [to_array];
    [Mat2]  [to_cols_array_2d];
    [Mat3]  [to_cols_array_2d];
    [Mat4]  [to_cols_array_2d];
)]
impl From<glam::ty> for Uniform {
    fn from(value: glam::ty) -> Self {
        Uniform::ty(value.convert())
    }
}

/// A named uniform and the value it should hold for the next draw.
///
/// Uniform state lives in the program object, not in the vertex array, so the value has to be
/// pushed with [`UniformBinding::set`] every frame after the program is activated.
#[derive(Debug, Clone)]
pub struct UniformBinding<T> {
    name: String,
    value: T,
}

pub type Matrix4Uniform = UniformBinding<glam::Mat4>;

impl<T: Default> UniformBinding<T> {
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, T::default())
    }
}

impl<T> UniformBinding<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }
}

impl<T: Clone + Into<Uniform>> UniformBinding<T> {
    /// Push the held value into `program`, which must be the active program.
    ///
    /// Returns `false` without touching the context when the program has no uniform by that
    /// name.
    pub fn set<Gc: GraphicsContext>(&self, gc: &Gc, program: &ShaderProgram) -> Result<bool> {
        if !program.is_bound(gc) {
            return Err(Error::unbound(Slot::Program, "pushing a uniform"));
        }
        let Some(location) = program.uniform_location(gc, &self.name) else {
            tracing::warn!(message = "Uniform not found in program", name = %self.name, program = program.id().get());
            return Ok(false);
        };
        tracing::trace!(message = "Set uniform", name = %self.name, location = location.get());
        gc.set_uniform(location, &self.value.clone().into())
            .map_err(Error::backend)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    #[test]
    fn matrices_convert_column_major() {
        let translation = Mat4::from_translation(Vec3::new(1., 2., 3.));
        let Uniform::Mat4(cols) = Uniform::from(translation) else {
            panic!("expected a 4x4 matrix uniform");
        };
        assert_eq!(cols[3], [1., 2., 3., 1.]);
    }

    #[test]
    fn named_binding_starts_from_default() {
        let binding = Matrix4Uniform::named("projectionMatrix");
        assert_eq!(binding.name(), "projectionMatrix");
        assert_eq!(*binding.value(), Mat4::IDENTITY);
    }
}
