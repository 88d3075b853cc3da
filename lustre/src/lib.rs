//! # Typed handles over OpenGL
//!
//! lustre wraps the object-oriented part of the OpenGL 3.x/4.x API (buffers, textures, shaders,
//! programs, queries, vertex arrays and sync objects) and the global context state behind typed
//! values. It does not try to hide OpenGL: every operation maps closely onto a single native call.
//! What it adds is the _shape_ around those calls:
//!
//! - Objects are small `Copy` values over a [`Handle`](handle::Handle). The reserved null name is
//!   a distinct state that is rejected locally, before anything reaches the driver.
//! - Every native call is followed by a read of the error register. Failures come back as a
//!   [`Result`] whose [`Error`](error::Error) keeps caller mistakes
//!   ([`PreconditionError`](error::PreconditionError)) apart from what the driver reported
//!   ([`DriverError`](error::DriverError)).
//! - The global state is accessed through a [`Context`](context::Context) value passed by mutable
//!   reference. There are no statics and no caches: what you read is what the driver answers.
//!
//! # Backends
//!
//! The crate is written against the traits of the [`backend`] module, which mirror the native
//! entry points. The `lustre-gl` crate implements them over a loaded OpenGL context. The
//! [`soft`] module, behind the `soft` feature, provides an in-memory implementation used to test
//! code without a GPU.
//!
//! # Feature flags
//!
//! - `soft` (default): the in-memory [`SoftBackend`](soft::SoftBackend).
//! - `GL_ARB_gpu_shader_fp64`: double-precision uniforms.
//!
//! # Example
//!
//! ```
//! use lustre::binding::ARRAY_BUFFER;
//! use lustre::buffer::{Buffer, BufferUsage};
//! use lustre::context::Context;
//! use lustre::soft::SoftBackend;
//!
//! let mut ctx = Context::new(SoftBackend::new())?;
//! let vbo = Buffer::create(&mut ctx)?;
//!
//! ARRAY_BUFFER.set(&mut ctx, vbo)?;
//! ARRAY_BUFFER.data(&mut ctx, &[0; 64], BufferUsage::StaticDraw)?;
//! assert_eq!(vbo.size(&mut ctx)?, 64);
//! # Ok::<(), lustre::error::Error>(())
//! ```

pub mod backend;
mod batch;
pub mod binding;
pub mod buffer;
pub mod context;
pub mod error;
pub mod handle;
mod label;
pub mod program;
pub mod query;
pub mod shader;
#[cfg(any(test, feature = "soft"))]
pub mod soft;
pub mod state;
pub mod sync;
pub mod texture;
pub mod vertex_array;

pub use crate::context::Context;
pub use crate::error::Error;
pub use crate::handle::Object;
