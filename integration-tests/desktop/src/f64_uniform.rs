//! Upload double-precision uniforms (`GL_ARB_gpu_shader_fp64`).

use lustre::binding::PROGRAM;
use lustre::program::Program;
use lustre::shader::{Shader, ShaderType};
use lustre::{Context, Error, Object as _};
use lustre_gl::GL33;

const VS: &str = "#version 400 core
const vec2[4] POSITIONS = vec2[](
  vec2(-1., -1.),
  vec2( 1., -1.),
  vec2( 1.,  1.),
  vec2(-1.,  1.)
);

void main() {
  gl_Position = vec4(POSITIONS[gl_VertexID], 0., 1.);
}";

const FS: &str = "#version 400 core
out vec3 frag;

uniform dvec3 color;
uniform double scale;

void main() {
  frag = vec3(color * scale);
}";

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  let program = Program::create(ctx)?;

  for (ty, source) in [(ShaderType::Vertex, VS), (ShaderType::Fragment, FS)] {
    let shader = Shader::create(ctx, ty)?;
    shader.set_source(ctx, source)?;
    shader.compile(ctx)?;
    assert!(shader.compile_status(ctx)?, "{}", shader.info_log(ctx)?);

    program.attach(ctx, shader)?;
    // freed with the program
    shader.delete(ctx)?;
  }

  program.link(ctx)?;
  assert!(program.link_status(ctx)?, "{}", program.info_log(ctx)?);
  PROGRAM.set(ctx, program)?;

  let color = program.uniform_location(ctx, "color")?;
  let scale = program.uniform_location(ctx, "scale")?;
  assert!(color.is_some() && scale.is_some());

  if let (Some(color), Some(scale)) = (color, scale) {
    color.set(ctx, [1., 0.5, 0.25f64])?;
    scale.set(ctx, 0.5f64)?;
  }

  PROGRAM.set(ctx, Program::NULL)?;
  program.delete(ctx)
}
