//! OpenGL backend.
//!
//! This crate implements the [lustre](https://crates.io/crates/lustre) backend traits over a real
//! [OpenGL](https://www.khronos.org/opengl/) context, using the function pointers loaded by the
//! [gl](https://crates.io/crates/gl) crate. The backend type is [`GL33`]; creating a context and
//! making it current is left to the windowing crate of your choice.

#[cfg(feature = "gl33")]
pub mod gl33;

#[cfg(feature = "gl33")]
pub use gl33::GL33;
