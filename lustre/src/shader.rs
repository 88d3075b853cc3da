//! Shader stages.

use gl::types::*;
use std::fmt;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{Error, PreconditionError, StateQueryError};
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};
use crate::state::decode_bool;

named_object! {
  /// A shader object, holding the source and compiled code of a single stage.
  Shader, Shader
}

impl Shader {
  /// Create a shader of the given stage type.
  pub fn create<B>(ctx: &mut Context<B>, ty: ShaderType) -> Result<Self, Error>
  where
    B: Backend,
  {
    let name = ctx.backend().create_shader(ty.to_glenum());
    ctx.check()?;
    crate::batch::single(name).map(Self::from_raw)
  }

  /// Stage type this shader was created with.
  pub fn shader_type<B>(&self, ctx: &mut Context<B>) -> Result<ShaderType, Error>
  where
    B: Backend,
  {
    let ty = self.parameter(ctx, gl::SHADER_TYPE)?;
    Ok(ShaderType::from_glenum(ty as GLenum)?)
  }

  /// Current source; empty if none was set.
  pub fn source<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let source = ctx.backend().get_shader_source(name);
    ctx.check()?;
    Ok(label::decode(source))
  }

  /// Replace the source. It is not compiled until [`Shader::compile`] is called.
  pub fn set_source<B>(&self, ctx: &mut Context<B>, source: &str) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;

    if !source.bytes().all(|b| b.is_ascii() && b != 0) {
      return Err(PreconditionError::InvalidSource.into());
    }

    ctx.backend().shader_source(name, source.as_bytes());
    ctx.check()
  }

  /// Compile the current source.
  ///
  /// A source that fails to compile is not an error of this call; see
  /// [`Shader::compile_status`] and [`Shader::info_log`].
  pub fn compile<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().compile_shader(name);
    ctx.check()
  }

  /// Whether the last compilation succeeded.
  pub fn compile_status<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let status = self.parameter(ctx, gl::COMPILE_STATUS)?;
    Ok(decode_bool(gl::COMPILE_STATUS, status)?)
  }

  /// Whether the shader is flagged for deletion, waiting to be detached from its programs.
  pub fn delete_status<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let status = self.parameter(ctx, gl::DELETE_STATUS)?;
    Ok(decode_bool(gl::DELETE_STATUS, status)?)
  }

  /// Compilation log.
  pub fn info_log<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let log = ctx.backend().get_shader_info_log(name);
    ctx.check()?;
    Ok(label::decode(log))
  }

  fn parameter<B>(&self, ctx: &mut Context<B>, pname: GLenum) -> Result<GLint, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let value = ctx.backend().get_shader_iv(name, pname);
    ctx.check()?;
    Ok(value)
  }
}

impl Object for Shader {
  const KIND: ObjectKind = ObjectKind::Shader;

  fn is_null(&self) -> bool {
    !self.handle().is_allocated()
  }

  fn label<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    let target = LabelTarget::Name(Self::KIND.identifier(), self.live()?);
    label::get(ctx, target)
  }

  fn set_label<B>(&self, ctx: &mut Context<B>, label: &str) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = LabelTarget::Name(Self::KIND.identifier(), self.live()?);
    label::set(ctx, target, label)
  }

  fn is_valid<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let valid = ctx.backend().is_shader(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  /// Flag the shader for deletion; it goes away once detached from every program.
  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_shader(name);
    ctx.check()
  }
}

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderType {
  /// Vertex shader.
  Vertex,
  /// Tessellation control shader.
  TessellationControl,
  /// Tessellation evaluation shader.
  TessellationEvaluation,
  /// Geometry shader.
  Geometry,
  /// Fragment shader.
  Fragment,
  /// Compute shader.
  Compute,
}

impl ShaderType {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      ShaderType::Vertex => gl::VERTEX_SHADER,
      ShaderType::TessellationControl => gl::TESS_CONTROL_SHADER,
      ShaderType::TessellationEvaluation => gl::TESS_EVALUATION_SHADER,
      ShaderType::Geometry => gl::GEOMETRY_SHADER,
      ShaderType::Fragment => gl::FRAGMENT_SHADER,
      ShaderType::Compute => gl::COMPUTE_SHADER,
    }
  }

  pub(crate) fn from_glenum(ty: GLenum) -> Result<Self, StateQueryError> {
    match ty {
      gl::VERTEX_SHADER => Ok(ShaderType::Vertex),
      gl::TESS_CONTROL_SHADER => Ok(ShaderType::TessellationControl),
      gl::TESS_EVALUATION_SHADER => Ok(ShaderType::TessellationEvaluation),
      gl::GEOMETRY_SHADER => Ok(ShaderType::Geometry),
      gl::FRAGMENT_SHADER => Ok(ShaderType::Fragment),
      gl::COMPUTE_SHADER => Ok(ShaderType::Compute),
      _ => Err(StateQueryError::UnknownShaderType(ty)),
    }
  }
}

impl fmt::Display for ShaderType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ShaderType::Vertex => f.write_str("vertex shader"),
      ShaderType::TessellationControl => f.write_str("tessellation control shader"),
      ShaderType::TessellationEvaluation => f.write_str("tessellation evaluation shader"),
      ShaderType::Geometry => f.write_str("geometry shader"),
      ShaderType::Fragment => f.write_str("fragment shader"),
      ShaderType::Compute => f.write_str("compute shader"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::soft::SoftBackend;

  const VS: &str = "void main() { gl_Position = vec4(0.); }";

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();

    assert!(shader.is_valid(&mut ctx).unwrap());
    assert_eq!(shader.shader_type(&mut ctx).unwrap(), ShaderType::Vertex);
    assert!(!shader.delete_status(&mut ctx).unwrap());

    shader.delete(&mut ctx).unwrap();
    assert!(!shader.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn source_roundtrip() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Fragment).unwrap();

    assert_eq!(shader.source(&mut ctx).unwrap(), "");
    shader.set_source(&mut ctx, VS).unwrap();
    assert_eq!(shader.source(&mut ctx).unwrap(), VS);
  }

  #[test]
  fn compile_status_follows_compile() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();

    assert!(!shader.compile_status(&mut ctx).unwrap());
    shader.set_source(&mut ctx, VS).unwrap();
    shader.compile(&mut ctx).unwrap();
    assert!(shader.compile_status(&mut ctx).unwrap());
    assert_eq!(shader.info_log(&mut ctx).unwrap(), "");
  }

  #[test]
  fn failed_compilation_is_not_an_error() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();

    shader.compile(&mut ctx).unwrap();
    assert!(!shader.compile_status(&mut ctx).unwrap());
    assert!(!shader.info_log(&mut ctx).unwrap().is_empty());
  }

  #[test]
  fn non_ascii_source_is_rejected() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();
    let calls = ctx.backend().calls();

    assert_eq!(
      shader.set_source(&mut ctx, "// café\nvoid main() {}"),
      Err(Error::Precondition(PreconditionError::InvalidSource))
    );
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn null_shader_is_rejected() {
    let mut ctx = context();
    let calls = ctx.backend().calls();
    let expected = Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Shader,
    )));

    assert_eq!(Shader::NULL.compile(&mut ctx), expected);
    assert_eq!(Shader::NULL.set_source(&mut ctx, VS), expected);
    assert_eq!(Shader::NULL.source(&mut ctx).map(|_| ()), expected);
    assert_eq!(Shader::NULL.shader_type(&mut ctx).map(|_| ()), expected);
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn display() {
    assert_eq!(ShaderType::Geometry.to_string(), "geometry shader");
    assert_eq!(Shader::from_raw(2).to_string(), "shader 2");
  }
}
