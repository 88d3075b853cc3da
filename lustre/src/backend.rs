//! Backend interfaces.
//!
//! This module exposes the native surface the rest of the crate is written against. Each trait
//! maps closely onto a family of OpenGL entry points and takes raw `GLenum` / `GLuint` values:
//! translating typed values into those raw values is the job of the upper layers.
//!
//! # Safety
//!
//! All traits are `unsafe` to implement: an implementor promises that calling any of the methods
//! is sound, which for a real driver means that a context is current on the calling thread for as
//! long as the backend value lives.

pub mod buffer;
pub mod label;
pub mod program;
pub mod query;
pub mod shader;
pub mod state;
pub mod sync;
pub mod texture;
pub mod vertex_array;

/// The whole native surface.
///
/// Automatically implemented for any type implementing every backend trait.
pub trait Backend:
  state::State
  + label::Label
  + buffer::Buffer
  + texture::Texture
  + shader::Shader
  + program::Program
  + query::Query
  + vertex_array::VertexArray
  + sync::Sync
{
}

impl<B> Backend for B where
  B: ?Sized
    + state::State
    + label::Label
    + buffer::Buffer
    + texture::Texture
    + shader::Shader
    + program::Program
    + query::Query
    + vertex_array::VertexArray
    + sync::Sync
{
}
