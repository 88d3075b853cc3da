//! Create, label, validate and delete an object of every kind.

use lustre::buffer::Buffer;
use lustre::error::{DriverError, PreconditionError};
use lustre::handle::ObjectKind;
use lustre::program::Program;
use lustre::query::{Query, QueryTarget};
use lustre::shader::{Shader, ShaderType};
use lustre::sync::Fence;
use lustre::texture::{Texture, TextureTarget};
use lustre::vertex_array::VertexArray;
use lustre::{Context, Error, Object};
use lustre_gl::GL33;

fn label_roundtrip<R>(ctx: &mut Context<GL33>, object: R) -> Result<(), Error>
where
  R: Object,
{
  assert_eq!(object.label(ctx), Ok(String::new()));

  let label = format!("{:?} under test", object);
  object.set_label(ctx, &label)?;
  assert_eq!(object.label(ctx)?, label);

  Ok(())
}

fn lifecycle<R>(ctx: &mut Context<GL33>, object: R, labels: bool) -> Result<(), Error>
where
  R: Object,
{
  log::debug!("checking {:?}", object);

  assert!(!object.is_null());
  assert!(object.is_valid(ctx)?);

  if labels {
    label_roundtrip(ctx, object)?;
  }

  object.delete(ctx)
}

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  // labels need OpenGL 4.3 or GL_KHR_debug
  let scratch = Buffer::create(ctx)?;
  let labels = match scratch.label(ctx) {
    Ok(_) => true,
    Err(Error::Driver(DriverError::InvalidOperation)) => {
      log::warn!("debug labels unavailable, skipping label checks");
      false
    }
    Err(e) => return Err(e),
  };
  scratch.delete(ctx)?;

  let buffer = Buffer::create(ctx)?;
  lifecycle(ctx, buffer, labels)?;
  assert!(!buffer.is_valid(ctx)?);

  let texture = Texture::create(ctx, TextureTarget::Dim2)?;
  lifecycle(ctx, texture, labels)?;
  assert!(!texture.is_valid(ctx)?);

  let vertex_array = VertexArray::create(ctx)?;
  lifecycle(ctx, vertex_array, labels)?;
  assert!(!vertex_array.is_valid(ctx)?);

  let shader = Shader::create(ctx, ShaderType::Fragment)?;
  lifecycle(ctx, shader, labels)?;
  assert!(!shader.is_valid(ctx)?);

  let program = Program::create(ctx)?;
  lifecycle(ctx, program, labels)?;
  assert!(!program.is_valid(ctx)?);

  // a query only becomes an object once used when created without direct state access
  let query = Query::create(ctx, QueryTarget::SamplesPassed)?;
  query.begin(ctx, QueryTarget::SamplesPassed)?;
  Query::end(ctx, QueryTarget::SamplesPassed)?;
  lifecycle(ctx, query, labels)?;
  assert!(!query.is_valid(ctx)?);

  let fence = Fence::create(ctx)?;
  lifecycle(ctx, fence, labels)?;

  // batches
  let buffers = Buffer::create_many(ctx, 4)?;
  assert!(buffers.iter().all(|b| !b.is_null()));
  Buffer::delete_many(ctx, &buffers)?;

  let mut textures = [Texture::NULL; 4];
  Texture::create_into(ctx, TextureTarget::CubeMap, &mut textures, 1, 2)?;
  assert!(textures[0].is_null() && textures[3].is_null());
  Texture::delete_many(ctx, &textures[1..3])?;

  // null objects never reach the driver
  assert_eq!(
    Buffer::NULL.label(ctx),
    Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Buffer
    )))
  );
  ctx.check()
}
