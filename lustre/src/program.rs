//! Shader programs and uniforms.
//!
//! A [`Program`] links several [`Shader`] stages together. Once linked, it exposes its active
//! uniforms through [`Uniform`] locations. Uniform values are always uploaded to the program bound
//! to [`PROGRAM`](crate::binding::PROGRAM): bind it first.

use gl::types::*;
use std::ffi::CString;

use crate::backend::Backend;
use crate::binding::Bindable;
use crate::context::{non_negative, Context};
use crate::error::{Error, PreconditionError};
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};
use crate::shader::Shader;
use crate::state::decode_bool;

named_object! {
  /// A program object.
  Program, Program
}

/// Turn a uniform or attribute name into a C string.
fn c_name(name: &str) -> Result<CString, PreconditionError> {
  CString::new(name).map_err(|_| PreconditionError::InvalidName(name.to_owned()))
}

impl Program {
  /// Create an empty program.
  pub fn create<B>(ctx: &mut Context<B>) -> Result<Self, Error>
  where
    B: Backend,
  {
    let name = ctx.backend().create_program();
    ctx.check()?;
    crate::batch::single(name).map(Self::from_raw)
  }

  pub fn attach<B>(&self, ctx: &mut Context<B>, shader: Shader) -> Result<(), Error>
  where
    B: Backend,
  {
    let (program, shader) = (self.live()?, shader.live()?);
    ctx.backend().attach_shader(program, shader);
    ctx.check()
  }

  pub fn detach<B>(&self, ctx: &mut Context<B>, shader: Shader) -> Result<(), Error>
  where
    B: Backend,
  {
    let (program, shader) = (self.live()?, shader.live()?);
    ctx.backend().detach_shader(program, shader);
    ctx.check()
  }

  /// Link the attached shaders.
  ///
  /// As with compilation, a failed link is reported through [`Program::link_status`] and
  /// [`Program::info_log`], not as an error of this call.
  pub fn link<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().link_program(name);
    ctx.check()
  }

  /// Check whether the program can run in the current state.
  pub fn validate<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().validate_program(name);
    ctx.check()
  }

  pub fn link_status<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let status = self.parameter(ctx, gl::LINK_STATUS)?;
    Ok(decode_bool(gl::LINK_STATUS, status)?)
  }

  pub fn validate_status<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let status = self.parameter(ctx, gl::VALIDATE_STATUS)?;
    Ok(decode_bool(gl::VALIDATE_STATUS, status)?)
  }

  /// Link and validation log.
  pub fn info_log<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let log = ctx.backend().get_program_info_log(name);
    ctx.check()?;
    Ok(label::decode(log))
  }

  /// Number of shaders attached.
  pub fn attached_shaders<B>(&self, ctx: &mut Context<B>) -> Result<usize, Error>
  where
    B: Backend,
  {
    self.count(ctx, gl::ATTACHED_SHADERS)
  }

  /// Number of active uniforms after the last link.
  pub fn active_uniforms<B>(&self, ctx: &mut Context<B>) -> Result<usize, Error>
  where
    B: Backend,
  {
    self.count(ctx, gl::ACTIVE_UNIFORMS)
  }

  /// Number of active vertex attributes after the last link.
  pub fn active_attributes<B>(&self, ctx: &mut Context<B>) -> Result<usize, Error>
  where
    B: Backend,
  {
    self.count(ctx, gl::ACTIVE_ATTRIBUTES)
  }

  /// Location of an active uniform; `None` if the linked program has no such uniform.
  pub fn uniform_location<B>(
    &self,
    ctx: &mut Context<B>,
    name: &str,
  ) -> Result<Option<Uniform>, Error>
  where
    B: Backend,
  {
    let program = self.live()?;
    let c_name = c_name(name)?;
    let location = ctx.backend().get_uniform_location(program, &c_name);
    ctx.check()?;

    if location < 0 {
      log::trace!("uniform {} is not active", name);
      Ok(None)
    } else {
      Ok(Some(Uniform { location }))
    }
  }

  /// Location of an active vertex attribute; `None` if there is no such attribute.
  pub fn attrib_location<B>(&self, ctx: &mut Context<B>, name: &str) -> Result<Option<u32>, Error>
  where
    B: Backend,
  {
    let program = self.live()?;
    let c_name = c_name(name)?;
    let location = ctx.backend().get_attrib_location(program, &c_name);
    ctx.check()?;

    Ok(u32::try_from(location).ok())
  }

  /// Force the location of a vertex attribute. Takes effect at the next link.
  pub fn bind_attrib_location<B>(
    &self,
    ctx: &mut Context<B>,
    index: u32,
    name: &str,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let program = self.live()?;
    let c_name = c_name(name)?;
    ctx.backend().bind_attrib_location(program, index, &c_name);
    ctx.check()
  }

  fn parameter<B>(&self, ctx: &mut Context<B>, pname: GLenum) -> Result<GLint, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let value = ctx.backend().get_program_iv(name, pname);
    ctx.check()?;
    Ok(value)
  }

  fn count<B>(&self, ctx: &mut Context<B>, pname: GLenum) -> Result<usize, Error>
  where
    B: Backend,
  {
    let count = self.parameter(ctx, pname)?;
    Ok(non_negative(pname, count.into())?)
  }
}

impl Object for Program {
  const KIND: ObjectKind = ObjectKind::Program;

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
    let valid = ctx.backend().is_program(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_program(name);
    ctx.check()
  }
}

impl Bindable for Program {
  type Target = ();

  fn binding_query(_: ()) -> GLenum {
    gl::CURRENT_PROGRAM
  }

  fn bind_raw<B>(backend: &mut B, _: (), name: GLuint)
  where
    B: Backend,
  {
    backend.use_program(name);
  }

  fn from_bound(name: GLuint) -> Self {
    Program::from_raw(name)
  }

  fn bound_name(&self) -> GLuint {
    self.raw()
  }
}

/// Location of an active uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Uniform {
  location: GLint,
}

impl Uniform {
  pub fn location(&self) -> i32 {
    self.location
  }

  /// Upload `value` to the program bound to [`PROGRAM`](crate::binding::PROGRAM).
  pub fn set<B, T>(&self, ctx: &mut Context<B>, value: T) -> Result<(), Error>
  where
    B: Backend,
    T: Uniformable,
  {
    value.upload(ctx.backend(), self.location);
    ctx.check()
  }
}

/// Values that can be uploaded to a uniform.
pub trait Uniformable: Copy {
  /// Issue the native upload for `location`.
  fn upload<B>(self, backend: &mut B, location: GLint)
  where
    B: Backend;
}

macro_rules! impl_Uniformable {
  ($t:ty, $f:ident) => {
    impl Uniformable for $t {
      fn upload<B>(self, backend: &mut B, location: GLint)
      where
        B: Backend,
      {
        backend.$f(location, 1, &[self]);
      }
    }

    impl_Uniformable!(vec $t, $f, 2);
    impl_Uniformable!(vec $t, $f, 3);
    impl_Uniformable!(vec $t, $f, 4);
  };

  (vec $t:ty, $f:ident, $n:literal) => {
    impl Uniformable for [$t; $n] {
      fn upload<B>(self, backend: &mut B, location: GLint)
      where
        B: Backend,
      {
        backend.$f(location, $n, &self);
      }
    }
  };

  (mat $n:literal) => {
    impl Uniformable for [[f32; $n]; $n] {
      fn upload<B>(self, backend: &mut B, location: GLint)
      where
        B: Backend,
      {
        backend.uniform_matrix_fv(location, $n, &self.concat());
      }
    }
  };
}

impl_Uniformable!(i32, uniform_iv);
impl_Uniformable!(u32, uniform_uiv);
impl_Uniformable!(f32, uniform_fv);
#[cfg(feature = "GL_ARB_gpu_shader_fp64")]
impl_Uniformable!(f64, uniform_dv);

impl_Uniformable!(mat 2);
impl_Uniformable!(mat 3);
impl_Uniformable!(mat 4);

// booleans go through the integer setters
impl Uniformable for bool {
  fn upload<B>(self, backend: &mut B, location: GLint)
  where
    B: Backend,
  {
    backend.uniform_iv(location, 1, &[self as GLint]);
  }
}

macro_rules! impl_Uniformable_bvec {
  ($($n:literal),*) => {
    $(
      impl Uniformable for [bool; $n] {
        fn upload<B>(self, backend: &mut B, location: GLint)
        where
          B: Backend,
        {
          backend.uniform_iv(location, $n, &self.map(|b| b as GLint));
        }
      }
    )*
  };
}

impl_Uniformable_bvec!(2, 3, 4);

#[cfg(test)]
mod tests {
  use super::*;
  use crate::binding::PROGRAM;
  use crate::error::DriverError;
  use crate::shader::ShaderType;
  use crate::soft::{SoftBackend, SoftUniform};

  const VS: &str = "in vec3 position;\nin vec3 normal;\nuniform mat4 projection;\nvoid main() {}";
  const FS: &str = "uniform vec3 color;\nuniform bool lit;\nout vec4 frag;\nvoid main() {}";

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  fn stage(ctx: &mut Context<SoftBackend>, ty: ShaderType, src: &str) -> Shader {
    let shader = Shader::create(ctx, ty).unwrap();
    shader.set_source(ctx, src).unwrap();
    shader.compile(ctx).unwrap();
    shader
  }

  fn linked(ctx: &mut Context<SoftBackend>) -> Program {
    let program = Program::create(ctx).unwrap();
    let vs = stage(ctx, ShaderType::Vertex, VS);
    let fs = stage(ctx, ShaderType::Fragment, FS);

    program.attach(ctx, vs).unwrap();
    program.attach(ctx, fs).unwrap();
    program.link(ctx).unwrap();
    program
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();

    assert!(program.is_valid(&mut ctx).unwrap());
    program.delete(&mut ctx).unwrap();
    assert!(!program.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn attach_detach() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();
    let vs = stage(&mut ctx, ShaderType::Vertex, VS);

    program.attach(&mut ctx, vs).unwrap();
    assert_eq!(program.attached_shaders(&mut ctx).unwrap(), 1);
    assert_eq!(
      program.attach(&mut ctx, vs),
      Err(Error::Driver(DriverError::InvalidOperation))
    );

    program.detach(&mut ctx, vs).unwrap();
    assert_eq!(program.attached_shaders(&mut ctx).unwrap(), 0);
  }

  #[test]
  fn shader_deletion_is_deferred_while_attached() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();
    let vs = stage(&mut ctx, ShaderType::Vertex, VS);

    program.attach(&mut ctx, vs).unwrap();
    vs.delete(&mut ctx).unwrap();
    assert!(vs.delete_status(&mut ctx).unwrap());

    program.detach(&mut ctx, vs).unwrap();
    assert!(!vs.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn link_and_introspect() {
    let mut ctx = context();
    let program = linked(&mut ctx);

    assert!(program.link_status(&mut ctx).unwrap());
    assert_eq!(program.active_uniforms(&mut ctx).unwrap(), 3);
    assert_eq!(program.active_attributes(&mut ctx).unwrap(), 2);

    program.validate(&mut ctx).unwrap();
    assert!(program.validate_status(&mut ctx).unwrap());
  }

  #[test]
  fn failed_link_is_not_an_error() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();
    let broken = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();

    broken.compile(&mut ctx).unwrap();
    program.attach(&mut ctx, broken).unwrap();
    program.link(&mut ctx).unwrap();

    assert!(!program.link_status(&mut ctx).unwrap());
    assert!(!program.info_log(&mut ctx).unwrap().is_empty());
  }

  #[test]
  fn uniform_locations() {
    let mut ctx = context();
    let program = linked(&mut ctx);

    assert!(program
      .uniform_location(&mut ctx, "projection")
      .unwrap()
      .is_some());
    assert!(program.uniform_location(&mut ctx, "color").unwrap().is_some());
    assert_eq!(program.uniform_location(&mut ctx, "missing").unwrap(), None);
    assert_eq!(
      program.uniform_location(&mut ctx, "col\0or"),
      Err(Error::Precondition(PreconditionError::InvalidName(
        "col\0or".to_owned()
      )))
    );
  }

  #[test]
  fn attrib_locations() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();
    let vs = stage(&mut ctx, ShaderType::Vertex, VS);

    program.attach(&mut ctx, vs).unwrap();
    program.bind_attrib_location(&mut ctx, 5, "normal").unwrap();
    program.link(&mut ctx).unwrap();

    assert_eq!(program.attrib_location(&mut ctx, "normal").unwrap(), Some(5));
    assert!(program
      .attrib_location(&mut ctx, "position")
      .unwrap()
      .is_some());
    assert_eq!(program.attrib_location(&mut ctx, "uv").unwrap(), None);
  }

  #[test]
  fn uniforms_go_to_the_bound_program() {
    let mut ctx = context();
    let program = linked(&mut ctx);
    let color = program.uniform_location(&mut ctx, "color").unwrap().unwrap();
    let lit = program.uniform_location(&mut ctx, "lit").unwrap().unwrap();
    let projection = program
      .uniform_location(&mut ctx, "projection")
      .unwrap()
      .unwrap();

    assert_eq!(
      color.set(&mut ctx, [1f32, 0.5, 0.]),
      Err(Error::Driver(DriverError::InvalidOperation))
    );

    PROGRAM.set(&mut ctx, program).unwrap();
    color.set(&mut ctx, [1f32, 0.5, 0.]).unwrap();
    lit.set(&mut ctx, true).unwrap();
    projection
      .set(
        &mut ctx,
        [
          [1f32, 0., 0., 0.],
          [0., 1., 0., 0.],
          [0., 0., 1., 0.],
          [0., 0., 0., 1.],
        ],
      )
      .unwrap();

    let backend = ctx.backend();
    assert_eq!(
      backend.uniform(program.raw(), color.location()),
      Some(&SoftUniform::Float(vec![1., 0.5, 0.]))
    );
    assert_eq!(
      backend.uniform(program.raw(), lit.location()),
      Some(&SoftUniform::Int(vec![1]))
    );
    assert!(matches!(
      backend.uniform(program.raw(), projection.location()),
      Some(SoftUniform::Float(v)) if v.len() == 16
    ));
  }

  #[test]
  fn unlinked_program_cannot_be_used() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();

    assert_eq!(
      PROGRAM.set(&mut ctx, program),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn null_program_is_rejected() {
    let mut ctx = context();
    let shader = Shader::create(&mut ctx, ShaderType::Vertex).unwrap();
    let calls = ctx.backend().calls();
    let expected = Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Program,
    )));

    assert_eq!(Program::NULL.attach(&mut ctx, shader), expected);
    assert_eq!(Program::NULL.link(&mut ctx), expected);
    assert_eq!(
      Program::NULL.uniform_location(&mut ctx, "x").map(|_| ()),
      expected
    );
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn null_shader_cannot_be_attached() {
    let mut ctx = context();
    let program = Program::create(&mut ctx).unwrap();

    assert_eq!(
      program.attach(&mut ctx, Shader::NULL),
      Err(Error::Precondition(PreconditionError::NullObject(
        ObjectKind::Shader
      )))
    );
  }
}
