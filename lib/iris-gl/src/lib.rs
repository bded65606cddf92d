//! OpenGL 3.3 core implementation of [`iris::GraphicsContext`].

use std::ffi::CStr;

pub mod context;
pub mod debug;
pub mod error;

pub use context::GlContext;
pub use error::{GlError, GlErrorKind};

#[allow(clippy::all, non_camel_case_types, non_snake_case, non_upper_case_globals, unused)]
pub mod gl {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

/// Query one of the driver's identification strings (`gl::VENDOR`, `gl::RENDERER`, ...).
pub fn get_string(gl: &gl::Gl, name: gl::types::GLenum) -> Option<String> {
    let ptr = unsafe { gl.GetString(name) };
    if ptr.is_null() {
        return None;
    }
    let value = unsafe { CStr::from_ptr(ptr.cast()) };
    Some(value.to_string_lossy().into_owned())
}
