//! Compile and link a program, wire its vertex attributes and upload uniforms.

use lustre::binding::{ARRAY_BUFFER, PROGRAM, VERTEX_ARRAY};
use lustre::buffer::{Buffer, BufferUsage};
use lustre::program::Program;
use lustre::shader::{Shader, ShaderType};
use lustre::vertex_array::{AttribFormat, AttribInterpretation, AttribType, VertexArray};
use lustre::{Context, Error, Object as _};
use lustre_gl::GL33;

const VS: &str = "#version 330 core
in vec2 co;
in vec3 color;
out vec3 v_color;

uniform mat4 transform;

void main() {
  v_color = color;
  gl_Position = transform * vec4(co, 0., 1.);
}";

const FS: &str = "#version 330 core
in vec3 v_color;
out vec4 frag;

uniform float alpha;
uniform bool enabled;

void main() {
  frag = vec4(v_color, enabled ? alpha : 0.);
}";

const BROKEN: &str = "#version 330 core
void main() { this is not glsl }";

fn compile(ctx: &mut Context<GL33>, ty: ShaderType, source: &str) -> Result<Shader, Error> {
  let shader = Shader::create(ctx, ty)?;
  shader.set_source(ctx, source)?;
  shader.compile(ctx)?;

  assert!(
    shader.compile_status(ctx)?,
    "{} failed to compile: {}",
    ty,
    shader.info_log(ctx)?
  );

  Ok(shader)
}

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  // a broken source is reported through the status, not as an error
  let broken = Shader::create(ctx, ShaderType::Fragment)?;
  broken.set_source(ctx, BROKEN)?;
  broken.compile(ctx)?;
  assert!(!broken.compile_status(ctx)?);
  log::info!("expected compilation log: {}", broken.info_log(ctx)?);
  broken.delete(ctx)?;

  let vs = compile(ctx, ShaderType::Vertex, VS)?;
  let fs = compile(ctx, ShaderType::Fragment, FS)?;
  assert_eq!(vs.source(ctx)?, VS);
  assert_eq!(fs.shader_type(ctx)?, ShaderType::Fragment);

  let program = Program::create(ctx)?;
  program.attach(ctx, vs)?;
  program.attach(ctx, fs)?;
  program.bind_attrib_location(ctx, 3, "color")?;
  program.link(ctx)?;
  assert!(program.link_status(ctx)?, "{}", program.info_log(ctx)?);

  assert_eq!(program.attached_shaders(ctx)?, 2);
  assert_eq!(program.active_uniforms(ctx)?, 3);
  assert_eq!(program.active_attributes(ctx)?, 2);
  assert_eq!(program.attrib_location(ctx, "color")?, Some(3));
  assert_eq!(program.uniform_location(ctx, "missing")?, None);

  // shaders can go once linked
  vs.delete(ctx)?;
  assert!(vs.delete_status(ctx)?);
  program.detach(ctx, vs)?;
  program.detach(ctx, fs)?;
  fs.delete(ctx)?;

  PROGRAM.set(ctx, program)?;

  if let Some(transform) = program.uniform_location(ctx, "transform")? {
    let identity = [
      [1., 0., 0., 0.],
      [0., 1., 0., 0.],
      [0., 0., 1., 0.],
      [0., 0., 0., 1.f32],
    ];
    transform.set(ctx, identity)?;
  }

  if let Some(alpha) = program.uniform_location(ctx, "alpha")? {
    alpha.set(ctx, 0.5f32)?;
  }

  if let Some(enabled) = program.uniform_location(ctx, "enabled")? {
    enabled.set(ctx, true)?;
  }

  // vertex attributes
  let vao = VertexArray::create(ctx)?;
  let vbo = Buffer::create(ctx)?;
  let vertices = [0u8; 3 * 5 * 4];

  VERTEX_ARRAY.set(ctx, vao)?;
  ARRAY_BUFFER.set(ctx, vbo)?;
  ARRAY_BUFFER.data(ctx, &vertices, BufferUsage::StaticDraw)?;

  let co = program.attrib_location(ctx, "co")?.unwrap_or(0) as usize;
  for (index, components, offset) in [(co, 2, 0), (3, 3, 8)] {
    let attrib = ctx.vertex_attrib_array(index)?;
    attrib.set_pointer(
      ctx,
      AttribFormat {
        components,
        ty: AttribType::F32,
        interpretation: AttribInterpretation::Floating,
        stride: 5 * 4,
        offset,
      },
    )?;
    attrib.set_enabled(ctx, true)?;
    assert!(attrib.is_enabled(ctx)?);
  }

  let instanced = ctx.vertex_attrib_array(3)?;
  instanced.set_divisor(ctx, 1)?;
  assert_eq!(instanced.divisor(ctx)?, 1);

  VERTEX_ARRAY.set(ctx, VertexArray::NULL)?;
  PROGRAM.set(ctx, Program::NULL)?;

  vao.delete(ctx)?;
  vbo.delete(ctx)?;
  program.validate(ctx)?;
  log::debug!("validation: {}", program.validate_status(ctx)?);
  program.delete(ctx)
}
