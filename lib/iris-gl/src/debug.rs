use std::{ffi::c_void, slice};

use crate::{
    context::GlContext,
    gl::{self, types::*},
};

extern "system" fn debug_callback(
    source: GLenum,
    gltype: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    _user_param: *mut c_void,
) {
    if message.is_null() || length < 0 {
        return;
    }
    let bytes = unsafe { slice::from_raw_parts(message.cast::<u8>(), length as usize) };
    let message = String::from_utf8_lossy(bytes);
    let source = match source {
        gl::DEBUG_SOURCE_API => "api",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "third party",
        gl::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    };
    let kind = match gltype {
        gl::DEBUG_TYPE_ERROR => "error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behavior",
        gl::DEBUG_TYPE_PORTABILITY => "portability",
        gl::DEBUG_TYPE_PERFORMANCE => "performance",
        _ => "other",
    };
    match severity {
        gl::DEBUG_SEVERITY_HIGH => {
            tracing::error!(target: "gl", %source, %kind, id, "{message}")
        }
        gl::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!(target: "gl", %source, %kind, id, "{message}")
        }
        gl::DEBUG_SEVERITY_LOW => {
            tracing::info!(target: "gl", %source, %kind, id, "{message}")
        }
        _ => tracing::trace!(target: "gl", %source, %kind, id, "{message}"),
    }
}

/// Forward the driver's debug output to `tracing` under the `gl` target.
///
/// Returns `false` when the driver exposes no debug output, which is the case for release
/// contexts on most platforms.
pub fn hook_gl_to_tracing(context: &GlContext) -> bool {
    let gl = context.gl();
    if !gl.DebugMessageCallback.is_loaded() {
        tracing::debug!(target: "gl", "Debug output is not available");
        return false;
    }
    unsafe {
        gl.Enable(gl::DEBUG_OUTPUT);
        gl.Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.DebugMessageCallback(Some(debug_callback), std::ptr::null());
    }
    tracing::debug!(target: "gl", "Debug output hooked");
    true
}
