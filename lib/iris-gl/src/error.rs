use std::ffi::NulError;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;

use crate::gl;

/// `GL_CONTEXT_LOST` is core only from 4.5, so the 3.3 bindings do not carry it.
const CONTEXT_LOST: u32 = 0x0507;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error, FromPrimitive)]
#[repr(u32)]
pub enum GlErrorKind {
    #[error("Provided enum value is not valid")]
    InvalidEnum = gl::INVALID_ENUM,
    #[error("Provided value is not valid")]
    InvalidValue = gl::INVALID_VALUE,
    #[error("Invalid OpenGL operation")]
    InvalidOperation = gl::INVALID_OPERATION,
    #[error("Stack Overflow")]
    StackOverflow = gl::STACK_OVERFLOW,
    #[error("Stack Underflow")]
    StackUnderflow = gl::STACK_UNDERFLOW,
    #[error("Out of memory")]
    OutOfMemory = gl::OUT_OF_MEMORY,
    #[error("Invalid OpenGL operation on the framebuffer")]
    InvalidFramebufferOperation = gl::INVALID_FRAMEBUFFER_OPERATION,
    #[error("Context lost")]
    ContextLost = CONTEXT_LOST,
    #[error("Unknown OpenGL error")]
    UnknownError = u32::MAX,
}

impl GlErrorKind {
    pub fn current_error(gl: &gl::Gl) -> Option<Self> {
        let error = unsafe { gl.GetError() };
        if error != gl::NO_ERROR {
            Some(Self::from_u32(error).unwrap_or(Self::UnknownError))
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum GlError {
    #[error("OpenGL error: {0}")]
    Driver(#[from] GlErrorKind),
    #[error("Driver returned no name for a new {0} object")]
    Allocation(&'static str),
    #[error("Shader source or identifier contains a NUL byte")]
    Nul(#[from] NulError),
}

impl GlError {
    pub(crate) fn allocation(gl: &gl::Gl, kind: &'static str) -> Self {
        match GlErrorKind::current_error(gl) {
            Some(err) => Self::Driver(err),
            None => Self::Allocation(kind),
        }
    }
}

/// Turn the pending GL error, if any, into an `Err`.
pub fn guard(gl: &gl::Gl) -> Result<(), GlError> {
    match GlErrorKind::current_error(gl) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_driver_codes() {
        assert_eq!(GlErrorKind::from_u32(gl::INVALID_VALUE), Some(GlErrorKind::InvalidValue));
        assert_eq!(GlErrorKind::from_u32(0x0507), Some(GlErrorKind::ContextLost));
        assert_eq!(GlErrorKind::from_u32(0x0508), None);
    }
}
