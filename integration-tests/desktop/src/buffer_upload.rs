//! Create a buffer, bind it, upload bytes and read its size back.

use lustre::binding::{ARRAY_BUFFER, UNIFORM_BUFFER};
use lustre::buffer::{Buffer, BufferUsage};
use lustre::{Context, Error, Object as _};
use lustre_gl::GL33;

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  let data: Vec<u8> = (0..=255).collect();
  let buffer = Buffer::create(ctx)?;

  ARRAY_BUFFER.set(ctx, buffer)?;
  ARRAY_BUFFER.data(ctx, &data, BufferUsage::StaticDraw)?;
  assert_eq!(buffer.size(ctx)?, data.len());
  assert_eq!(buffer.usage(ctx)?, BufferUsage::StaticDraw);

  ARRAY_BUFFER.sub_data(ctx, 16, &[0xFF; 4])?;
  let mut out = [0; 8];
  ARRAY_BUFFER.read(ctx, 14, &mut out)?;
  assert_eq!(out, [14, 15, 0xFF, 0xFF, 0xFF, 0xFF, 20, 21]);

  // the size is read by name, not through the binding
  ARRAY_BUFFER.set(ctx, Buffer::NULL)?;
  assert_eq!(buffer.size(ctx)?, data.len());

  let ubo = Buffer::create(ctx)?;
  UNIFORM_BUFFER.set(ctx, ubo)?;
  UNIFORM_BUFFER.allocate(ctx, 256, BufferUsage::DynamicDraw)?;
  UNIFORM_BUFFER.bind_base(ctx, 2, ubo)?;
  assert_eq!(UNIFORM_BUFFER.get_indexed(ctx, 2)?, ubo);

  Buffer::delete_many(ctx, &[buffer, ubo])
}
