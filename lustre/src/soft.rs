//! In-memory backend.
//!
//! [`SoftBackend`] implements every backend trait without a GPU. It keeps object tables and the
//! global state in plain collections, latches GL-style error codes the way a driver does and
//! counts every native call it receives, which makes it suitable to test code written against a
//! [`Context`](crate::context::Context) without creating a window.
//!
//! It follows the core profile rules where they matter to callers (names must come from a
//! creation call, objects are bound to a single texture target, a program must be linked before
//! use, etc.) and is stricter than a driver in a few places:
//!
//! - there is no default texture object: texture operations need a texture bound;
//! - vertex attribute pointers need a buffer bound to `GL_ARRAY_BUFFER`, whatever the offset.
//!
//! Shader compilation is not modeled. A shader compiles if and only if it has a source. Linking
//! succeeds if every attached shader compiled, and the active uniforms and attributes are the
//! `uniform` and `in` (vertex stage) declarations found in the sources.

use gl::types::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::CStr;

use crate::backend::{buffer, label, program, query, shader, state, sync, texture, vertex_array};
use crate::state::POLYGON_MODE;

const DEFAULT_MAX_VERTEX_ATTRIBS: usize = 16;
const MAX_TEXTURE_UNITS: GLenum = 32;
const MAX_UNIFORM_BUFFER_BINDINGS: GLuint = 36;

/// Simulated time spent by a single native call, in nanoseconds.
const CALL_DURATION: i64 = 1000;

/// First address handed out for sync objects.
const SYNC_BASE: usize = 0x1000;

const BUFFER_TARGETS: [(GLenum, GLenum); 7] = [
  (gl::ARRAY_BUFFER, gl::ARRAY_BUFFER_BINDING),
  (gl::ELEMENT_ARRAY_BUFFER, gl::ELEMENT_ARRAY_BUFFER_BINDING),
  (gl::UNIFORM_BUFFER, gl::UNIFORM_BUFFER_BINDING),
  (gl::COPY_READ_BUFFER, gl::COPY_READ_BUFFER_BINDING),
  (gl::COPY_WRITE_BUFFER, gl::COPY_WRITE_BUFFER_BINDING),
  (gl::PIXEL_PACK_BUFFER, gl::PIXEL_PACK_BUFFER_BINDING),
  (gl::PIXEL_UNPACK_BUFFER, gl::PIXEL_UNPACK_BUFFER_BINDING),
];

const TEXTURE_TARGETS: [(GLenum, GLenum); 7] = [
  (gl::TEXTURE_1D, gl::TEXTURE_BINDING_1D),
  (gl::TEXTURE_2D, gl::TEXTURE_BINDING_2D),
  (gl::TEXTURE_3D, gl::TEXTURE_BINDING_3D),
  (gl::TEXTURE_1D_ARRAY, gl::TEXTURE_BINDING_1D_ARRAY),
  (gl::TEXTURE_2D_ARRAY, gl::TEXTURE_BINDING_2D_ARRAY),
  (gl::TEXTURE_CUBE_MAP, gl::TEXTURE_BINDING_CUBE_MAP),
  (gl::TEXTURE_RECTANGLE, gl::TEXTURE_BINDING_RECTANGLE),
];

const CAPABILITIES: [GLenum; 7] = [
  gl::DEPTH_TEST,
  gl::DEPTH_CLAMP,
  gl::CULL_FACE,
  gl::SCISSOR_TEST,
  gl::BLEND,
  gl::PRIMITIVE_RESTART,
  gl::FRAMEBUFFER_SRGB,
];

const BUFFER_USAGES: [GLenum; 9] = [
  gl::STREAM_DRAW,
  gl::STREAM_READ,
  gl::STREAM_COPY,
  gl::STATIC_DRAW,
  gl::STATIC_READ,
  gl::STATIC_COPY,
  gl::DYNAMIC_DRAW,
  gl::DYNAMIC_READ,
  gl::DYNAMIC_COPY,
];

const SHADER_TYPES: [GLenum; 6] = [
  gl::VERTEX_SHADER,
  gl::TESS_CONTROL_SHADER,
  gl::TESS_EVALUATION_SHADER,
  gl::GEOMETRY_SHADER,
  gl::FRAGMENT_SHADER,
  gl::COMPUTE_SHADER,
];

const QUERY_TARGETS: [GLenum; 7] = [
  gl::SAMPLES_PASSED,
  gl::ANY_SAMPLES_PASSED,
  gl::ANY_SAMPLES_PASSED_CONSERVATIVE,
  gl::PRIMITIVES_GENERATED,
  gl::TRANSFORM_FEEDBACK_PRIMITIVES_WRITTEN,
  gl::TIME_ELAPSED,
  gl::TIMESTAMP,
];

const DEPTH_FUNCS: [GLenum; 8] = [
  gl::NEVER,
  gl::ALWAYS,
  gl::EQUAL,
  gl::NOTEQUAL,
  gl::LESS,
  gl::LEQUAL,
  gl::GREATER,
  gl::GEQUAL,
];

const MIN_FILTERS: [GLenum; 6] = [
  gl::NEAREST,
  gl::LINEAR,
  gl::NEAREST_MIPMAP_NEAREST,
  gl::NEAREST_MIPMAP_LINEAR,
  gl::LINEAR_MIPMAP_NEAREST,
  gl::LINEAR_MIPMAP_LINEAR,
];

const WRAPS: [GLenum; 4] = [
  gl::CLAMP_TO_EDGE,
  gl::CLAMP_TO_BORDER,
  gl::REPEAT,
  gl::MIRRORED_REPEAT,
];

/// Value last uploaded to a uniform.
#[derive(Clone, Debug, PartialEq)]
pub enum SoftUniform {
  Int(Vec<GLint>),
  UInt(Vec<GLuint>),
  Float(Vec<GLfloat>),
  Double(Vec<GLdouble>),
}

#[derive(Debug)]
struct SoftBuffer {
  data: Vec<u8>,
  usage: GLenum,
}

#[derive(Debug)]
struct SoftTexture {
  target: GLenum,
  params: HashMap<GLenum, GLint>,
  levels: BTreeMap<GLint, [GLint; 3]>,
}

#[derive(Debug)]
struct SoftShader {
  ty: GLenum,
  source: Vec<u8>,
  compiled: bool,
  log: Vec<u8>,
  delete_pending: bool,
}

#[derive(Debug, Default)]
struct SoftProgram {
  shaders: Vec<GLuint>,
  linked: bool,
  validated: bool,
  log: Vec<u8>,
  uniforms: Vec<String>,
  attribs: Vec<(String, GLuint)>,
  attrib_bindings: HashMap<String, GLuint>,
  values: HashMap<GLint, SoftUniform>,
}

#[derive(Debug)]
struct SoftQuery {
  target: GLenum,
  active: bool,
  started: i64,
  result: i64,
}

#[derive(Clone, Copy, Debug)]
struct SoftAttrib {
  enabled: bool,
  divisor: GLuint,
  size: GLint,
  ty: GLenum,
  normalized: bool,
  integer: bool,
  stride: GLsizei,
  buffer: GLuint,
}

impl Default for SoftAttrib {
  fn default() -> Self {
    SoftAttrib {
      enabled: false,
      divisor: 0,
      size: 4,
      ty: gl::FLOAT,
      normalized: false,
      integer: false,
      stride: 0,
      buffer: 0,
    }
  }
}

#[derive(Debug)]
struct GlobalState {
  clear_color: [GLfloat; 4],
  clear_depth: GLdouble,
  clear_stencil: GLint,
  viewport: [GLint; 4],
  scissor: [GLint; 4],
  line_width: GLfloat,
  point_size: GLfloat,
  polygon_mode: GLenum,
  depth_range: [GLdouble; 2],
  front_face: GLenum,
  cull_face: GLenum,
  depth_func: GLenum,
  depth_mask: bool,
  active_texture: GLenum,
  enabled: HashSet<GLenum>,
}

impl Default for GlobalState {
  fn default() -> Self {
    GlobalState {
      clear_color: [0.; 4],
      clear_depth: 1.,
      clear_stencil: 0,
      viewport: [0; 4],
      scissor: [0; 4],
      line_width: 1.,
      point_size: 1.,
      polygon_mode: gl::FILL,
      depth_range: [0., 1.],
      front_face: gl::CCW,
      cull_face: gl::BACK,
      depth_func: gl::LESS,
      depth_mask: true,
      active_texture: gl::TEXTURE0,
      enabled: HashSet::new(),
    }
  }
}

/// A backend living entirely in memory.
#[derive(Debug)]
pub struct SoftBackend {
  calls: usize,
  error: GLenum,
  clock: i64,
  next_name: GLuint,
  next_sync: usize,
  max_vertex_attribs: usize,
  state: GlobalState,
  labels: HashMap<(GLenum, GLuint), Vec<u8>>,
  ptr_labels: HashMap<usize, Vec<u8>>,
  buffers: HashMap<GLuint, SoftBuffer>,
  buffer_bindings: HashMap<GLenum, GLuint>,
  indexed_buffer_bindings: HashMap<(GLenum, GLuint), GLuint>,
  textures: HashMap<GLuint, SoftTexture>,
  texture_bindings: HashMap<(GLenum, GLenum), GLuint>,
  shaders: HashMap<GLuint, SoftShader>,
  programs: HashMap<GLuint, SoftProgram>,
  current_program: GLuint,
  queries: HashMap<GLuint, SoftQuery>,
  active_queries: HashMap<GLenum, GLuint>,
  vertex_arrays: HashMap<GLuint, Vec<SoftAttrib>>,
  bound_vertex_array: GLuint,
  syncs: HashMap<usize, bool>,
}

impl Default for SoftBackend {
  fn default() -> Self {
    Self::new()
  }
}

impl SoftBackend {
  /// A fresh backend, in the initial state of a new context.
  pub fn new() -> Self {
    Self::with_max_vertex_attribs(DEFAULT_MAX_VERTEX_ATTRIBS)
  }

  /// A fresh backend reporting `max` vertex attributes.
  pub fn with_max_vertex_attribs(max: usize) -> Self {
    SoftBackend {
      calls: 0,
      error: gl::NO_ERROR,
      clock: 0,
      next_name: 1,
      next_sync: SYNC_BASE,
      max_vertex_attribs: max,
      state: GlobalState::default(),
      labels: HashMap::new(),
      ptr_labels: HashMap::new(),
      buffers: HashMap::new(),
      buffer_bindings: HashMap::new(),
      indexed_buffer_bindings: HashMap::new(),
      textures: HashMap::new(),
      texture_bindings: HashMap::new(),
      shaders: HashMap::new(),
      programs: HashMap::new(),
      current_program: 0,
      queries: HashMap::new(),
      active_queries: HashMap::new(),
      vertex_arrays: HashMap::new(),
      bound_vertex_array: 0,
      syncs: HashMap::new(),
    }
  }

  /// Number of native calls received so far, error reads included.
  pub fn calls(&self) -> usize {
    self.calls
  }

  /// Latch an error code, as if the last call had failed with it.
  ///
  /// As with a driver, only the first error is kept until the error register is read.
  pub fn raise(&mut self, code: GLenum) {
    if self.error == gl::NO_ERROR {
      self.error = code;
    }
  }

  /// Value last uploaded to `location` of `program`.
  pub fn uniform(&self, program: GLuint, location: GLint) -> Option<&SoftUniform> {
    self
      .programs
      .get(&program)
      .and_then(|p| p.values.get(&location))
  }

  fn call(&mut self) {
    self.calls += 1;
    self.clock += CALL_DURATION;
  }

  fn gen_names(&mut self, names: &mut [GLuint]) {
    for name in names {
      *name = self.next_name;
      self.next_name += 1;
    }
  }

  fn bound_buffer(&mut self, target: GLenum) -> Option<GLuint> {
    if !BUFFER_TARGETS.iter().any(|&(t, _)| t == target) {
      self.raise(gl::INVALID_ENUM);
      return None;
    }

    match self.buffer_bindings.get(&target) {
      Some(&name) if name != 0 => Some(name),
      _ => {
        self.raise(gl::INVALID_OPERATION);
        None
      }
    }
  }

  fn active_unit(&self) -> GLenum {
    self.state.active_texture - gl::TEXTURE0
  }

  fn bound_texture(&mut self, target: GLenum) -> Option<GLuint> {
    if !TEXTURE_TARGETS.iter().any(|&(t, _)| t == target) {
      self.raise(gl::INVALID_ENUM);
      return None;
    }

    match self.texture_bindings.get(&(self.active_unit(), target)) {
      Some(&name) if name != 0 => Some(name),
      _ => {
        self.raise(gl::INVALID_OPERATION);
        None
      }
    }
  }

  fn bound_attribs(&mut self, index: GLuint) -> Option<&mut SoftAttrib> {
    if index as usize >= self.max_vertex_attribs {
      self.raise(gl::INVALID_VALUE);
      return None;
    }

    if self.bound_vertex_array == 0 {
      self.raise(gl::INVALID_OPERATION);
      return None;
    }

    self
      .vertex_arrays
      .get_mut(&self.bound_vertex_array)
      .and_then(|attribs| attribs.get_mut(index as usize))
  }

  fn object_exists(&mut self, identifier: GLenum, name: GLuint) -> bool {
    let exists = match identifier {
      gl::BUFFER => self.buffers.contains_key(&name),
      gl::TEXTURE => self.textures.contains_key(&name),
      gl::SHADER => self.shaders.contains_key(&name),
      gl::PROGRAM => self.programs.contains_key(&name),
      gl::QUERY => self.queries.contains_key(&name),
      gl::VERTEX_ARRAY => self.vertex_arrays.contains_key(&name),
      _ => {
        self.raise(gl::INVALID_ENUM);
        return false;
      }
    };

    if !exists {
      self.raise(gl::INVALID_VALUE);
    }

    exists
  }

  /// Values of a state query, widened to `f64`; `None` for unknown keys.
  fn state_values(&self, pname: GLenum) -> Option<Vec<f64>> {
    let s = &self.state;

    if let Some(&(target, _)) = BUFFER_TARGETS.iter().find(|&&(_, q)| q == pname) {
      let name = self.buffer_bindings.get(&target).copied().unwrap_or(0);
      return Some(vec![name.into()]);
    }

    if let Some(&(target, _)) = TEXTURE_TARGETS.iter().find(|&&(_, q)| q == pname) {
      let key = (self.active_unit(), target);
      let name = self.texture_bindings.get(&key).copied().unwrap_or(0);
      return Some(vec![name.into()]);
    }

    let values = match pname {
      gl::MAX_VERTEX_ATTRIBS => vec![self.max_vertex_attribs as f64],
      gl::COLOR_CLEAR_VALUE => s.clear_color.iter().map(|&c| c.into()).collect(),
      gl::DEPTH_CLEAR_VALUE => vec![s.clear_depth],
      gl::STENCIL_CLEAR_VALUE => vec![s.clear_stencil.into()],
      gl::VIEWPORT => s.viewport.iter().map(|&v| v.into()).collect(),
      gl::SCISSOR_BOX => s.scissor.iter().map(|&v| v.into()).collect(),
      gl::LINE_WIDTH => vec![s.line_width.into()],
      gl::POINT_SIZE => vec![s.point_size.into()],
      POLYGON_MODE => vec![s.polygon_mode.into(), s.polygon_mode.into()],
      gl::DEPTH_RANGE => s.depth_range.to_vec(),
      gl::FRONT_FACE => vec![s.front_face.into()],
      gl::CULL_FACE_MODE => vec![s.cull_face.into()],
      gl::DEPTH_FUNC => vec![s.depth_func.into()],
      gl::DEPTH_WRITEMASK => vec![if s.depth_mask { 1. } else { 0. }],
      gl::ACTIVE_TEXTURE => vec![s.active_texture.into()],
      gl::VERTEX_ARRAY_BINDING => vec![self.bound_vertex_array.into()],
      gl::CURRENT_PROGRAM => vec![self.current_program.into()],
      _ => return None,
    };

    Some(values)
  }

  fn get_state<T>(&mut self, pname: GLenum, data: &mut [T], convert: impl Fn(f64) -> T) {
    self.call();

    match self.state_values(pname) {
      Some(values) => {
        for (slot, value) in data.iter_mut().zip(values) {
          *slot = convert(value);
        }
      }
      None => self.raise(gl::INVALID_ENUM),
    }
  }

  /// Remove a shader flagged for deletion once no program holds it anymore.
  fn collect_shader(&mut self, name: GLuint) {
    let pending = self
      .shaders
      .get(&name)
      .map_or(false, |shader| shader.delete_pending);
    let attached = self.programs.values().any(|p| p.shaders.contains(&name));

    if pending && !attached {
      self.shaders.remove(&name);
      self.labels.remove(&(gl::SHADER, name));
    }
  }

  fn program_mut(&mut self, name: GLuint) -> Option<&mut SoftProgram> {
    if !self.programs.contains_key(&name) {
      self.raise(gl::INVALID_VALUE);
    }

    self.programs.get_mut(&name)
  }

  fn link(&mut self, name: GLuint) {
    let sources: Option<Vec<(GLenum, String)>> = self.programs.get(&name).map(|p| {
      p.shaders
        .iter()
        .filter_map(|s| self.shaders.get(s))
        .filter(|s| s.compiled)
        .map(|s| (s.ty, String::from_utf8_lossy(&s.source).into_owned()))
        .collect()
    });
    let compiled = self.programs.get(&name).map_or(false, |p| {
      !p.shaders.is_empty()
        && p
          .shaders
          .iter()
          .all(|s| self.shaders.get(s).map_or(false, |s| s.compiled))
    });

    let (program, sources) = match (self.programs.get_mut(&name), sources) {
      (Some(program), Some(sources)) => (program, sources),
      _ => return,
    };

    program.values.clear();
    program.validated = false;

    if !compiled {
      program.linked = false;
      program.log = b"error: a program needs compiled shaders to link\n".to_vec();
      program.uniforms.clear();
      program.attribs.clear();
      return;
    }

    let mut uniforms = Vec::new();
    let mut inputs = Vec::new();

    for (ty, source) in &sources {
      for (qualifier, name) in declarations(source) {
        if qualifier == "uniform" && !uniforms.contains(&name) {
          uniforms.push(name);
        } else if qualifier == "in" && *ty == gl::VERTEX_SHADER && !inputs.contains(&name) {
          inputs.push(name);
        }
      }
    }

    let mut attribs: Vec<(String, GLuint)> = Vec::new();
    let mut taken: HashSet<GLuint> = inputs
      .iter()
      .filter_map(|input| program.attrib_bindings.get(input).copied())
      .collect();

    for input in inputs {
      let location = match program.attrib_bindings.get(&input) {
        Some(&location) => location,
        None => {
          let free = (0..).find(|l| !taken.contains(l)).unwrap_or(0);
          taken.insert(free);
          free
        }
      };

      attribs.push((input, location));
    }

    program.linked = true;
    program.log.clear();
    program.uniforms = uniforms;
    program.attribs = attribs;
  }

  fn upload_uniform(&mut self, location: GLint, len: usize, components: usize, value: SoftUniform) {
    self.call();

    if location == -1 {
      return;
    }

    if components == 0 || len % components != 0 {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    let current = self.current_program;
    match self.programs.get_mut(&current) {
      Some(program) if location >= 0 && (location as usize) < program.uniforms.len() => {
        program.values.insert(location, value);
      }
      _ => self.raise(gl::INVALID_OPERATION),
    }
  }
}

/// `(qualifier, name)` pairs of the global declarations of a shader source.
fn declarations(source: &str) -> impl Iterator<Item = (String, String)> + '_ {
  source.split(';').filter_map(|statement| {
    let code = statement
      .lines()
      .filter(|line| !line.trim_start().starts_with('#'))
      .collect::<Vec<_>>()
      .join("\n");

    // skip layout qualifiers
    let declaration = code.rsplit(')').next()?;
    let tokens: Vec<&str> = declaration.split_whitespace().collect();

    let qualifier = *tokens.first()?;
    let name = tokens.last()?.split('[').next()?;

    if matches!(qualifier, "uniform" | "in") && tokens.len() >= 3 {
      Some((qualifier.to_owned(), name.to_owned()))
    } else {
      None
    }
  })
}

unsafe impl state::State for SoftBackend {
  fn get_error(&mut self) -> GLenum {
    self.call();
    std::mem::replace(&mut self.error, gl::NO_ERROR)
  }

  fn get_integer_v(&mut self, pname: GLenum, data: &mut [GLint]) {
    self.get_state(pname, data, |v| v as GLint);
  }

  fn get_integer_i_v(&mut self, pname: GLenum, index: GLuint, data: &mut [GLint]) {
    self.call();

    if pname != gl::UNIFORM_BUFFER_BINDING {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    if index >= MAX_UNIFORM_BUFFER_BINDINGS {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    let key = (gl::UNIFORM_BUFFER, index);
    let name = self
      .indexed_buffer_bindings
      .get(&key)
      .copied()
      .unwrap_or(0);

    if let Some(slot) = data.first_mut() {
      *slot = name as GLint;
    }
  }

  fn get_float_v(&mut self, pname: GLenum, data: &mut [GLfloat]) {
    self.get_state(pname, data, |v| v as GLfloat);
  }

  fn get_double_v(&mut self, pname: GLenum, data: &mut [GLdouble]) {
    self.get_state(pname, data, |v| v);
  }

  fn get_boolean_v(&mut self, pname: GLenum, data: &mut [GLboolean]) {
    self.get_state(pname, data, |v| if v != 0. { gl::TRUE } else { gl::FALSE });
  }

  fn get_string(&mut self, name: GLenum) -> Option<Vec<u8>> {
    self.call();

    let s: &[u8] = match name {
      gl::VENDOR => b"lustre",
      gl::RENDERER => b"lustre in-memory renderer",
      gl::VERSION => b"4.6.0 lustre",
      gl::SHADING_LANGUAGE_VERSION => b"4.60",
      _ => {
        self.raise(gl::INVALID_ENUM);
        return None;
      }
    };

    Some(s.to_vec())
  }

  fn is_enabled(&mut self, cap: GLenum) -> GLboolean {
    self.call();

    if !CAPABILITIES.contains(&cap) {
      self.raise(gl::INVALID_ENUM);
      return gl::FALSE;
    }

    if self.state.enabled.contains(&cap) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn enable(&mut self, cap: GLenum) {
    self.call();

    if CAPABILITIES.contains(&cap) {
      self.state.enabled.insert(cap);
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }

  fn disable(&mut self, cap: GLenum) {
    self.call();

    if CAPABILITIES.contains(&cap) {
      self.state.enabled.remove(&cap);
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }

  fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
    self.call();
    self.state.clear_color = [r, g, b, a];
  }

  fn clear_depth(&mut self, depth: GLdouble) {
    self.call();
    self.state.clear_depth = depth.clamp(0., 1.);
  }

  fn clear_stencil(&mut self, s: GLint) {
    self.call();
    self.state.clear_stencil = s;
  }

  fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    self.call();

    if width < 0 || height < 0 {
      self.raise(gl::INVALID_VALUE);
    } else {
      self.state.viewport = [x, y, width, height];
    }
  }

  fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    self.call();

    if width < 0 || height < 0 {
      self.raise(gl::INVALID_VALUE);
    } else {
      self.state.scissor = [x, y, width, height];
    }
  }

  fn line_width(&mut self, width: GLfloat) {
    self.call();

    if width <= 0. {
      self.raise(gl::INVALID_VALUE);
    } else {
      self.state.line_width = width;
    }
  }

  fn point_size(&mut self, size: GLfloat) {
    self.call();

    if size <= 0. {
      self.raise(gl::INVALID_VALUE);
    } else {
      self.state.point_size = size;
    }
  }

  fn polygon_mode(&mut self, face: GLenum, mode: GLenum) {
    self.call();

    if face != gl::FRONT_AND_BACK || ![gl::POINT, gl::LINE, gl::FILL].contains(&mode) {
      self.raise(gl::INVALID_ENUM);
    } else {
      self.state.polygon_mode = mode;
    }
  }

  fn depth_range(&mut self, near: GLdouble, far: GLdouble) {
    self.call();
    self.state.depth_range = [near.clamp(0., 1.), far.clamp(0., 1.)];
  }

  fn front_face(&mut self, mode: GLenum) {
    self.call();

    if mode == gl::CW || mode == gl::CCW {
      self.state.front_face = mode;
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }

  fn cull_face(&mut self, mode: GLenum) {
    self.call();

    if [gl::FRONT, gl::BACK, gl::FRONT_AND_BACK].contains(&mode) {
      self.state.cull_face = mode;
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }

  fn depth_func(&mut self, func: GLenum) {
    self.call();

    if DEPTH_FUNCS.contains(&func) {
      self.state.depth_func = func;
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }

  fn depth_mask(&mut self, flag: GLboolean) {
    self.call();
    self.state.depth_mask = flag != gl::FALSE;
  }

  fn active_texture(&mut self, texture: GLenum) {
    self.call();

    if (gl::TEXTURE0..gl::TEXTURE0 + MAX_TEXTURE_UNITS).contains(&texture) {
      self.state.active_texture = texture;
    } else {
      self.raise(gl::INVALID_ENUM);
    }
  }
}

unsafe impl label::Label for SoftBackend {
  fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &[u8]) {
    self.call();

    if !self.object_exists(identifier, name) {
      return;
    }

    if label.is_empty() {
      self.labels.remove(&(identifier, name));
    } else {
      self.labels.insert((identifier, name), label.to_vec());
    }
  }

  fn get_object_label(&mut self, identifier: GLenum, name: GLuint) -> Vec<u8> {
    self.call();

    if !self.object_exists(identifier, name) {
      return Vec::new();
    }

    self
      .labels
      .get(&(identifier, name))
      .cloned()
      .unwrap_or_default()
  }

  fn object_ptr_label(&mut self, ptr: usize, label: &[u8]) {
    self.call();

    if !self.syncs.contains_key(&ptr) {
      self.raise(gl::INVALID_VALUE);
    } else if label.is_empty() {
      self.ptr_labels.remove(&ptr);
    } else {
      self.ptr_labels.insert(ptr, label.to_vec());
    }
  }

  fn get_object_ptr_label(&mut self, ptr: usize) -> Vec<u8> {
    self.call();

    if !self.syncs.contains_key(&ptr) {
      self.raise(gl::INVALID_VALUE);
      return Vec::new();
    }

    self.ptr_labels.get(&ptr).cloned().unwrap_or_default()
  }
}

unsafe impl buffer::Buffer for SoftBackend {
  fn create_buffers(&mut self, names: &mut [GLuint]) {
    self.call();
    self.gen_names(names);

    for &name in names.iter() {
      self.buffers.insert(
        name,
        SoftBuffer {
          data: Vec::new(),
          usage: gl::STATIC_DRAW,
        },
      );
    }
  }

  fn delete_buffers(&mut self, names: &[GLuint]) {
    self.call();

    for name in names {
      if self.buffers.remove(name).is_some() {
        self.labels.remove(&(gl::BUFFER, *name));
        self.buffer_bindings.retain(|_, bound| bound != name);
        self.indexed_buffer_bindings.retain(|_, bound| bound != name);
      }
    }
  }

  fn is_buffer(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.buffers.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn bind_buffer(&mut self, target: GLenum, name: GLuint) {
    self.call();

    if !BUFFER_TARGETS.iter().any(|&(t, _)| t == target) {
      self.raise(gl::INVALID_ENUM);
    } else if name != 0 && !self.buffers.contains_key(&name) {
      self.raise(gl::INVALID_OPERATION);
    } else {
      self.buffer_bindings.insert(target, name);
    }
  }

  fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, name: GLuint) {
    self.call();

    if target != gl::UNIFORM_BUFFER {
      self.raise(gl::INVALID_ENUM);
    } else if index >= MAX_UNIFORM_BUFFER_BINDINGS {
      self.raise(gl::INVALID_VALUE);
    } else if name != 0 && !self.buffers.contains_key(&name) {
      self.raise(gl::INVALID_OPERATION);
    } else {
      self.indexed_buffer_bindings.insert((target, index), name);
      self.buffer_bindings.insert(target, name);
    }
  }

  fn buffer_data(&mut self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
    self.call();

    let name = match self.bound_buffer(target) {
      Some(name) => name,
      None => return,
    };

    if size < 0 {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    if !BUFFER_USAGES.contains(&usage) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    let len = size as usize;
    let mut bytes = Vec::new();

    if bytes.try_reserve_exact(len).is_err() {
      self.raise(gl::OUT_OF_MEMORY);
      return;
    }

    match data {
      Some(data) => bytes.extend_from_slice(&data[..data.len().min(len)]),
      None => bytes.resize(len, 0),
    }

    if let Some(buffer) = self.buffers.get_mut(&name) {
      buffer.data = bytes;
      buffer.usage = usage;
    }
  }

  fn buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &[u8]) {
    self.call();

    let name = match self.bound_buffer(target) {
      Some(name) => name,
      None => return,
    };

    let storage = match self.buffers.get_mut(&name) {
      Some(buffer) => &mut buffer.data,
      None => return,
    };

    match byte_range(offset, data.len(), storage.len()) {
      Some(range) => storage[range].copy_from_slice(data),
      None => self.raise(gl::INVALID_VALUE),
    }
  }

  fn get_buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &mut [u8]) {
    self.call();

    let name = match self.bound_buffer(target) {
      Some(name) => name,
      None => return,
    };

    let storage = match self.buffers.get(&name) {
      Some(buffer) => &buffer.data,
      None => return,
    };

    match byte_range(offset, data.len(), storage.len()) {
      Some(range) => data.copy_from_slice(&storage[range]),
      None => self.raise(gl::INVALID_VALUE),
    }
  }

  fn get_buffer_parameter(&mut self, name: GLuint, pname: GLenum) -> GLint64 {
    self.call();

    let (size, usage) = match self.buffers.get(&name) {
      Some(buffer) => (buffer.data.len() as GLint64, buffer.usage),
      None => {
        self.raise(gl::INVALID_OPERATION);
        return 0;
      }
    };

    match pname {
      gl::BUFFER_SIZE => size,
      gl::BUFFER_USAGE => usage.into(),
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }
}

/// Range of `len` bytes at `offset` in a storage of `size` bytes, if it fits.
fn byte_range(offset: GLintptr, len: usize, size: usize) -> Option<std::ops::Range<usize>> {
  let start = usize::try_from(offset).ok()?;
  let end = start.checked_add(len)?;

  if end <= size {
    Some(start..end)
  } else {
    None
  }
}

unsafe impl texture::Texture for SoftBackend {
  fn create_textures(&mut self, target: GLenum, names: &mut [GLuint]) {
    self.call();

    if !TEXTURE_TARGETS.iter().any(|&(t, _)| t == target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    self.gen_names(names);

    for &name in names.iter() {
      self.textures.insert(
        name,
        SoftTexture {
          target,
          params: HashMap::new(),
          levels: BTreeMap::new(),
        },
      );
    }
  }

  fn delete_textures(&mut self, names: &[GLuint]) {
    self.call();

    for name in names {
      if self.textures.remove(name).is_some() {
        self.labels.remove(&(gl::TEXTURE, *name));
        self.texture_bindings.retain(|_, bound| bound != name);
      }
    }
  }

  fn is_texture(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.textures.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn bind_texture(&mut self, target: GLenum, name: GLuint) {
    self.call();

    if !TEXTURE_TARGETS.iter().any(|&(t, _)| t == target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    if name != 0 {
      match self.textures.get(&name) {
        Some(texture) if texture.target == target => (),
        _ => {
          self.raise(gl::INVALID_OPERATION);
          return;
        }
      }
    }

    let unit = self.active_unit();
    self.texture_bindings.insert((unit, target), name);
  }

  fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
    self.call();

    let name = match self.bound_texture(target) {
      Some(name) => name,
      None => return,
    };

    let valid = match pname {
      gl::TEXTURE_MIN_FILTER => MIN_FILTERS.contains(&(param as GLenum)),
      gl::TEXTURE_MAG_FILTER => [gl::NEAREST, gl::LINEAR].contains(&(param as GLenum)),
      gl::TEXTURE_WRAP_S | gl::TEXTURE_WRAP_T | gl::TEXTURE_WRAP_R => {
        WRAPS.contains(&(param as GLenum))
      }
      gl::TEXTURE_BASE_LEVEL | gl::TEXTURE_MAX_LEVEL => {
        if param < 0 {
          self.raise(gl::INVALID_VALUE);
          return;
        }

        true
      }
      _ => false,
    };

    if !valid {
      self.raise(gl::INVALID_ENUM);
    } else if let Some(texture) = self.textures.get_mut(&name) {
      texture.params.insert(pname, param);
    }
  }

  fn get_tex_parameter_iv(&mut self, target: GLenum, pname: GLenum) -> GLint {
    self.call();

    let name = match self.bound_texture(target) {
      Some(name) => name,
      None => return 0,
    };

    let default = match pname {
      gl::TEXTURE_MIN_FILTER => gl::NEAREST_MIPMAP_LINEAR as GLint,
      gl::TEXTURE_MAG_FILTER => gl::LINEAR as GLint,
      gl::TEXTURE_WRAP_S | gl::TEXTURE_WRAP_T | gl::TEXTURE_WRAP_R => gl::REPEAT as GLint,
      gl::TEXTURE_BASE_LEVEL => 0,
      gl::TEXTURE_MAX_LEVEL => 1000,
      _ => {
        self.raise(gl::INVALID_ENUM);
        return 0;
      }
    };

    self
      .textures
      .get(&name)
      .and_then(|texture| texture.params.get(&pname).copied())
      .unwrap_or(default)
  }

  fn get_tex_level_parameter_iv(&mut self, target: GLenum, level: GLint, pname: GLenum) -> GLint {
    self.call();

    let name = match self.bound_texture(target) {
      Some(name) => name,
      None => return 0,
    };

    if level < 0 {
      self.raise(gl::INVALID_VALUE);
      return 0;
    }

    let dim = match pname {
      gl::TEXTURE_WIDTH => 0,
      gl::TEXTURE_HEIGHT => 1,
      gl::TEXTURE_DEPTH => 2,
      _ => {
        self.raise(gl::INVALID_ENUM);
        return 0;
      }
    };

    self
      .textures
      .get(&name)
      .and_then(|texture| texture.levels.get(&level))
      .map_or(0, |size| size[dim])
  }

  fn tex_image_2d(
    &mut self,
    target: GLenum,
    level: GLint,
    _internal_format: GLint,
    width: GLsizei,
    height: GLsizei,
    _format: GLenum,
    _ty: GLenum,
    _data: Option<&[u8]>,
  ) {
    self.call();

    if ![gl::TEXTURE_2D, gl::TEXTURE_1D_ARRAY, gl::TEXTURE_RECTANGLE].contains(&target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    let name = match self.bound_texture(target) {
      Some(name) => name,
      None => return,
    };

    if level < 0 || width < 0 || height < 0 || (target == gl::TEXTURE_RECTANGLE && level != 0) {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    if let Some(texture) = self.textures.get_mut(&name) {
      texture.levels.insert(level, [width, height, 1]);
    }
  }

  fn generate_mipmap(&mut self, target: GLenum) {
    self.call();

    if target == gl::TEXTURE_RECTANGLE {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    let name = match self.bound_texture(target) {
      Some(name) => name,
      None => return,
    };

    let (base, size) = match self.textures.get(&name) {
      Some(texture) => {
        let base = texture
          .params
          .get(&gl::TEXTURE_BASE_LEVEL)
          .copied()
          .unwrap_or(0);
        (base, texture.levels.get(&base).copied())
      }
      None => return,
    };

    let mut size = match size {
      Some(size) => size,
      None => {
        self.raise(gl::INVALID_OPERATION);
        return;
      }
    };

    let texture = match self.textures.get_mut(&name) {
      Some(texture) => texture,
      None => return,
    };

    // array layers are not minified
    let dims = match target {
      gl::TEXTURE_1D | gl::TEXTURE_1D_ARRAY => 1,
      gl::TEXTURE_3D => 3,
      _ => 2,
    };

    let mut level = base;
    while size[..dims].iter().any(|&d| d > 1) {
      for d in &mut size[..dims] {
        *d = (*d / 2).max(1);
      }

      level += 1;
      texture.levels.insert(level, size);
    }
  }
}

unsafe impl shader::Shader for SoftBackend {
  fn create_shader(&mut self, ty: GLenum) -> GLuint {
    self.call();

    if !SHADER_TYPES.contains(&ty) {
      self.raise(gl::INVALID_ENUM);
      return 0;
    }

    let mut name = [0];
    self.gen_names(&mut name);
    self.shaders.insert(
      name[0],
      SoftShader {
        ty,
        source: Vec::new(),
        compiled: false,
        log: Vec::new(),
        delete_pending: false,
      },
    );

    name[0]
  }

  fn delete_shader(&mut self, name: GLuint) {
    self.call();

    if name == 0 {
      return;
    }

    match self.shaders.get_mut(&name) {
      Some(shader) => shader.delete_pending = true,
      None => {
        self.raise(gl::INVALID_VALUE);
        return;
      }
    }

    self.collect_shader(name);
  }

  fn is_shader(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.shaders.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn shader_source(&mut self, name: GLuint, source: &[u8]) {
    self.call();

    match self.shaders.get_mut(&name) {
      Some(shader) => shader.source = source.to_vec(),
      None => self.raise(gl::INVALID_VALUE),
    }
  }

  fn get_shader_source(&mut self, name: GLuint) -> Vec<u8> {
    self.call();

    match self.shaders.get(&name) {
      Some(shader) => shader.source.clone(),
      None => {
        self.raise(gl::INVALID_VALUE);
        Vec::new()
      }
    }
  }

  fn compile_shader(&mut self, name: GLuint) {
    self.call();

    match self.shaders.get_mut(&name) {
      Some(shader) => {
        shader.compiled = !shader.source.is_empty();
        shader.log = if shader.compiled {
          Vec::new()
        } else {
          b"error: no source\n".to_vec()
        };
      }
      None => self.raise(gl::INVALID_VALUE),
    }
  }

  fn get_shader_iv(&mut self, name: GLuint, pname: GLenum) -> GLint {
    self.call();

    let shader = match self.shaders.get(&name) {
      Some(shader) => shader,
      None => {
        self.raise(gl::INVALID_VALUE);
        return 0;
      }
    };

    match pname {
      gl::SHADER_TYPE => shader.ty as GLint,
      gl::COMPILE_STATUS => shader.compiled.into(),
      gl::DELETE_STATUS => shader.delete_pending.into(),
      gl::INFO_LOG_LENGTH => nul_terminated_len(&shader.log),
      gl::SHADER_SOURCE_LENGTH => nul_terminated_len(&shader.source),
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }

  fn get_shader_info_log(&mut self, name: GLuint) -> Vec<u8> {
    self.call();

    match self.shaders.get(&name) {
      Some(shader) => shader.log.clone(),
      None => {
        self.raise(gl::INVALID_VALUE);
        Vec::new()
      }
    }
  }
}

/// Length of a driver string including its NUL terminator; `0` when empty.
fn nul_terminated_len(bytes: &[u8]) -> GLint {
  if bytes.is_empty() {
    0
  } else {
    bytes.len() as GLint + 1
  }
}

unsafe impl program::Program for SoftBackend {
  fn create_program(&mut self) -> GLuint {
    self.call();

    let mut name = [0];
    self.gen_names(&mut name);
    self.programs.insert(name[0], SoftProgram::default());

    name[0]
  }

  fn delete_program(&mut self, name: GLuint) {
    self.call();

    if name == 0 {
      return;
    }

    match self.programs.remove(&name) {
      Some(program) => {
        self.labels.remove(&(gl::PROGRAM, name));

        for shader in program.shaders {
          self.collect_shader(shader);
        }
      }
      None => self.raise(gl::INVALID_VALUE),
    }
  }

  fn is_program(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.programs.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
    self.call();

    if !self.shaders.contains_key(&shader) {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    match self.program_mut(program) {
      Some(p) if p.shaders.contains(&shader) => self.raise(gl::INVALID_OPERATION),
      Some(p) => p.shaders.push(shader),
      None => (),
    }
  }

  fn detach_shader(&mut self, program: GLuint, shader: GLuint) {
    self.call();

    if !self.shaders.contains_key(&shader) {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    match self.program_mut(program) {
      Some(p) if p.shaders.contains(&shader) => p.shaders.retain(|&s| s != shader),
      Some(_) => {
        self.raise(gl::INVALID_OPERATION);
        return;
      }
      None => return,
    }

    self.collect_shader(shader);
  }

  fn link_program(&mut self, name: GLuint) {
    self.call();

    if self.program_mut(name).is_some() {
      self.link(name);
    }
  }

  fn validate_program(&mut self, name: GLuint) {
    self.call();

    if let Some(program) = self.program_mut(name) {
      program.validated = program.linked;
    }
  }

  fn use_program(&mut self, name: GLuint) {
    self.call();

    if name == 0 {
      self.current_program = 0;
      return;
    }

    match self.program_mut(name) {
      Some(program) if program.linked => self.current_program = name,
      Some(_) => self.raise(gl::INVALID_OPERATION),
      None => (),
    }
  }

  fn get_program_iv(&mut self, name: GLuint, pname: GLenum) -> GLint {
    self.call();

    let program = match self.programs.get(&name) {
      Some(program) => program,
      None => {
        self.raise(gl::INVALID_VALUE);
        return 0;
      }
    };

    match pname {
      gl::LINK_STATUS => program.linked.into(),
      gl::VALIDATE_STATUS => program.validated.into(),
      gl::DELETE_STATUS => 0,
      gl::ATTACHED_SHADERS => program.shaders.len() as GLint,
      gl::ACTIVE_UNIFORMS => program.uniforms.len() as GLint,
      gl::ACTIVE_ATTRIBUTES => program.attribs.len() as GLint,
      gl::INFO_LOG_LENGTH => nul_terminated_len(&program.log),
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }

  fn get_program_info_log(&mut self, name: GLuint) -> Vec<u8> {
    self.call();

    match self.program_mut(name) {
      Some(program) => program.log.clone(),
      None => Vec::new(),
    }
  }

  fn get_uniform_location(&mut self, program: GLuint, name: &CStr) -> GLint {
    self.call();

    let name = name.to_string_lossy();
    match self.program_mut(program) {
      Some(p) if p.linked => p
        .uniforms
        .iter()
        .position(|u| *u == name)
        .map_or(-1, |i| i as GLint),
      Some(_) => {
        self.raise(gl::INVALID_OPERATION);
        -1
      }
      None => -1,
    }
  }

  fn get_attrib_location(&mut self, program: GLuint, name: &CStr) -> GLint {
    self.call();

    let name = name.to_string_lossy();
    match self.program_mut(program) {
      Some(p) if p.linked => p
        .attribs
        .iter()
        .find(|(a, _)| *a == name)
        .map_or(-1, |&(_, location)| location as GLint),
      Some(_) => {
        self.raise(gl::INVALID_OPERATION);
        -1
      }
      None => -1,
    }
  }

  fn bind_attrib_location(&mut self, program: GLuint, index: GLuint, name: &CStr) {
    self.call();

    let name = name.to_string_lossy().into_owned();

    if index as usize >= self.max_vertex_attribs {
      self.raise(gl::INVALID_VALUE);
    } else if name.starts_with("gl_") {
      self.raise(gl::INVALID_OPERATION);
    } else if let Some(p) = self.program_mut(program) {
      p.attrib_bindings.insert(name, index);
    }
  }

  fn uniform_iv(&mut self, location: GLint, components: usize, values: &[GLint]) {
    let value = SoftUniform::Int(values.to_vec());
    self.upload_uniform(location, values.len(), components, value);
  }

  fn uniform_uiv(&mut self, location: GLint, components: usize, values: &[GLuint]) {
    let value = SoftUniform::UInt(values.to_vec());
    self.upload_uniform(location, values.len(), components, value);
  }

  fn uniform_fv(&mut self, location: GLint, components: usize, values: &[GLfloat]) {
    let value = SoftUniform::Float(values.to_vec());
    self.upload_uniform(location, values.len(), components, value);
  }

  #[cfg(feature = "GL_ARB_gpu_shader_fp64")]
  fn uniform_dv(&mut self, location: GLint, components: usize, values: &[GLdouble]) {
    let value = SoftUniform::Double(values.to_vec());
    self.upload_uniform(location, values.len(), components, value);
  }

  fn uniform_matrix_fv(&mut self, location: GLint, dim: usize, values: &[GLfloat]) {
    let value = SoftUniform::Float(values.to_vec());
    self.upload_uniform(location, values.len(), dim * dim, value);
  }
}

unsafe impl query::Query for SoftBackend {
  fn create_queries(&mut self, target: GLenum, names: &mut [GLuint]) {
    self.call();

    if !QUERY_TARGETS.contains(&target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    self.gen_names(names);

    for &name in names.iter() {
      self.queries.insert(
        name,
        SoftQuery {
          target,
          active: false,
          started: 0,
          result: 0,
        },
      );
    }
  }

  fn delete_queries(&mut self, names: &[GLuint]) {
    self.call();

    for name in names {
      if let Some(query) = self.queries.remove(name) {
        self.labels.remove(&(gl::QUERY, *name));

        if query.active {
          self.active_queries.remove(&query.target);
        }
      }
    }
  }

  fn is_query(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.queries.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn begin_query(&mut self, target: GLenum, name: GLuint) {
    self.call();

    if target == gl::TIMESTAMP || !QUERY_TARGETS.contains(&target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    if self.active_queries.contains_key(&target) {
      self.raise(gl::INVALID_OPERATION);
      return;
    }

    let clock = self.clock;
    match self.queries.get_mut(&name) {
      Some(query) if query.target == target && !query.active => {
        query.active = true;
        query.started = clock;
        self.active_queries.insert(target, name);
      }
      _ => self.raise(gl::INVALID_OPERATION),
    }
  }

  fn end_query(&mut self, target: GLenum) {
    self.call();

    if target == gl::TIMESTAMP || !QUERY_TARGETS.contains(&target) {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    let name = match self.active_queries.remove(&target) {
      Some(name) => name,
      None => {
        self.raise(gl::INVALID_OPERATION);
        return;
      }
    };

    let clock = self.clock;
    if let Some(query) = self.queries.get_mut(&name) {
      query.active = false;
      // nothing is ever drawn: only time passes
      query.result = if target == gl::TIME_ELAPSED {
        clock - query.started
      } else {
        0
      };
    }
  }

  fn query_counter(&mut self, name: GLuint) {
    self.call();

    let clock = self.clock;
    match self.queries.get_mut(&name) {
      Some(query) if query.target == gl::TIMESTAMP => query.result = clock,
      _ => self.raise(gl::INVALID_OPERATION),
    }
  }

  fn get_query_object_i64(&mut self, name: GLuint, pname: GLenum) -> GLint64 {
    self.call();

    let result = match self.queries.get(&name) {
      Some(query) if !query.active => query.result,
      _ => {
        self.raise(gl::INVALID_OPERATION);
        return 0;
      }
    };

    match pname {
      gl::QUERY_RESULT | gl::QUERY_RESULT_NO_WAIT => result,
      gl::QUERY_RESULT_AVAILABLE => 1,
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }
}

unsafe impl vertex_array::VertexArray for SoftBackend {
  fn create_vertex_arrays(&mut self, names: &mut [GLuint]) {
    self.call();
    self.gen_names(names);

    for &name in names.iter() {
      let attribs = vec![SoftAttrib::default(); self.max_vertex_attribs];
      self.vertex_arrays.insert(name, attribs);
    }
  }

  fn delete_vertex_arrays(&mut self, names: &[GLuint]) {
    self.call();

    for name in names {
      if self.vertex_arrays.remove(name).is_some() {
        self.labels.remove(&(gl::VERTEX_ARRAY, *name));

        if self.bound_vertex_array == *name {
          self.bound_vertex_array = 0;
        }
      }
    }
  }

  fn is_vertex_array(&mut self, name: GLuint) -> GLboolean {
    self.call();

    if self.vertex_arrays.contains_key(&name) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn bind_vertex_array(&mut self, name: GLuint) {
    self.call();

    if name != 0 && !self.vertex_arrays.contains_key(&name) {
      self.raise(gl::INVALID_OPERATION);
    } else {
      self.bound_vertex_array = name;
    }
  }

  fn enable_vertex_attrib_array(&mut self, index: GLuint) {
    self.call();

    if let Some(attrib) = self.bound_attribs(index) {
      attrib.enabled = true;
    }
  }

  fn disable_vertex_attrib_array(&mut self, index: GLuint) {
    self.call();

    if let Some(attrib) = self.bound_attribs(index) {
      attrib.enabled = false;
    }
  }

  fn vertex_attrib_pointer(
    &mut self,
    index: GLuint,
    size: GLint,
    ty: GLenum,
    normalized: GLboolean,
    integer: bool,
    stride: GLsizei,
    _offset: usize,
  ) {
    self.call();

    if !(1..=4).contains(&size) || stride < 0 {
      self.raise(gl::INVALID_VALUE);
      return;
    }

    if integer && ty == gl::FLOAT {
      self.raise(gl::INVALID_ENUM);
      return;
    }

    let buffer = match self.buffer_bindings.get(&gl::ARRAY_BUFFER) {
      Some(&name) if name != 0 => name,
      _ => {
        self.raise(gl::INVALID_OPERATION);
        return;
      }
    };

    if let Some(attrib) = self.bound_attribs(index) {
      attrib.size = size;
      attrib.ty = ty;
      attrib.normalized = normalized != gl::FALSE;
      attrib.integer = integer;
      attrib.stride = stride;
      attrib.buffer = buffer;
    }
  }

  fn vertex_attrib_divisor(&mut self, index: GLuint, divisor: GLuint) {
    self.call();

    if let Some(attrib) = self.bound_attribs(index) {
      attrib.divisor = divisor;
    }
  }

  fn get_vertex_attrib_iv(&mut self, index: GLuint, pname: GLenum) -> GLint {
    self.call();

    let attrib = match self.bound_attribs(index) {
      Some(attrib) => *attrib,
      None => return 0,
    };

    match pname {
      gl::VERTEX_ATTRIB_ARRAY_ENABLED => attrib.enabled.into(),
      gl::VERTEX_ATTRIB_ARRAY_DIVISOR => attrib.divisor as GLint,
      gl::VERTEX_ATTRIB_ARRAY_SIZE => attrib.size,
      gl::VERTEX_ATTRIB_ARRAY_TYPE => attrib.ty as GLint,
      gl::VERTEX_ATTRIB_ARRAY_NORMALIZED => attrib.normalized.into(),
      gl::VERTEX_ATTRIB_ARRAY_INTEGER => attrib.integer.into(),
      gl::VERTEX_ATTRIB_ARRAY_STRIDE => attrib.stride,
      gl::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => attrib.buffer as GLint,
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }
}

unsafe impl sync::Sync for SoftBackend {
  fn fence_sync(&mut self, condition: GLenum, flags: GLbitfield) -> usize {
    self.call();

    if condition != gl::SYNC_GPU_COMMANDS_COMPLETE {
      self.raise(gl::INVALID_ENUM);
      return 0;
    }

    if flags != 0 {
      self.raise(gl::INVALID_VALUE);
      return 0;
    }

    let ptr = self.next_sync;
    self.next_sync += 0x10;
    self.syncs.insert(ptr, false);

    ptr
  }

  fn delete_sync(&mut self, sync: usize) {
    self.call();

    if sync == 0 {
      return;
    }

    if self.syncs.remove(&sync).is_some() {
      self.ptr_labels.remove(&sync);
    } else {
      self.raise(gl::INVALID_VALUE);
    }
  }

  fn is_sync(&mut self, sync: usize) -> GLboolean {
    self.call();

    if self.syncs.contains_key(&sync) {
      gl::TRUE
    } else {
      gl::FALSE
    }
  }

  fn client_wait_sync(&mut self, sync: usize, flags: GLbitfield, _timeout: GLuint64) -> GLenum {
    self.call();

    if flags & !gl::SYNC_FLUSH_COMMANDS_BIT != 0 {
      self.raise(gl::INVALID_VALUE);
      return gl::WAIT_FAILED;
    }

    let signaled = match self.syncs.get(&sync) {
      Some(&signaled) => signaled,
      None => {
        self.raise(gl::INVALID_VALUE);
        return gl::WAIT_FAILED;
      }
    };

    if signaled {
      gl::ALREADY_SIGNALED
    } else if flags & gl::SYNC_FLUSH_COMMANDS_BIT != 0 {
      // flushing lets the simulated GPU catch up with every pending fence
      self.syncs.values_mut().for_each(|s| *s = true);
      gl::CONDITION_SATISFIED
    } else {
      gl::TIMEOUT_EXPIRED
    }
  }

  fn wait_sync(&mut self, sync: usize) {
    self.call();

    if !self.syncs.contains_key(&sync) {
      self.raise(gl::INVALID_VALUE);
    }
  }

  fn get_sync_iv(&mut self, sync: usize, pname: GLenum) -> GLint {
    self.call();

    let signaled = match self.syncs.get(&sync) {
      Some(&signaled) => signaled,
      None => {
        self.raise(gl::INVALID_VALUE);
        return 0;
      }
    };

    match pname {
      gl::OBJECT_TYPE => gl::SYNC_FENCE as GLint,
      gl::SYNC_STATUS if signaled => gl::SIGNALED as GLint,
      gl::SYNC_STATUS => gl::UNSIGNALED as GLint,
      gl::SYNC_CONDITION => gl::SYNC_GPU_COMMANDS_COMPLETE as GLint,
      gl::SYNC_FLAGS => 0,
      _ => {
        self.raise(gl::INVALID_ENUM);
        0
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::buffer::Buffer as _;
  use crate::backend::state::State as _;

  #[test]
  fn first_error_wins() {
    let mut backend = SoftBackend::new();

    backend.raise(gl::INVALID_VALUE);
    backend.raise(gl::OUT_OF_MEMORY);

    assert_eq!(backend.get_error(), gl::INVALID_VALUE);
    assert_eq!(backend.get_error(), gl::NO_ERROR);
  }

  #[test]
  fn every_call_is_counted() {
    let mut backend = SoftBackend::new();
    let mut names = [0; 3];

    backend.create_buffers(&mut names);
    backend.bind_buffer(gl::ARRAY_BUFFER, names[0]);
    backend.get_error();

    assert_eq!(backend.calls(), 3);
  }

  #[test]
  fn names_are_never_reused() {
    let mut backend = SoftBackend::new();
    let mut a = [0; 2];
    let mut b = [0; 2];

    backend.create_buffers(&mut a);
    backend.delete_buffers(&a);
    backend.create_buffers(&mut b);

    assert!(a.iter().all(|n| !b.contains(n)));
  }

  #[test]
  fn deleting_a_bound_buffer_unbinds_it() {
    let mut backend = SoftBackend::new();
    let mut names = [0];
    let mut bound = [-1];

    backend.create_buffers(&mut names);
    backend.bind_buffer(gl::ARRAY_BUFFER, names[0]);
    backend.delete_buffers(&names);
    backend.get_integer_v(gl::ARRAY_BUFFER_BINDING, &mut bound);

    assert_eq!(bound, [0]);
    assert_eq!(backend.get_error(), gl::NO_ERROR);
  }

  #[test]
  fn unknown_state_key() {
    let mut backend = SoftBackend::new();
    let mut data = [0];

    backend.get_integer_v(0xFFFF, &mut data);
    assert_eq!(backend.get_error(), gl::INVALID_ENUM);
  }

  #[test]
  fn declarations_are_found() {
    let source = "#version 330 core\nlayout (location = 0) in vec2 co;\nuniform float t[4];\nout vec4 c;\nvoid main() {}";
    let found: Vec<_> = declarations(source).collect();

    assert_eq!(
      found,
      vec![
        ("in".to_owned(), "co".to_owned()),
        ("uniform".to_owned(), "t".to_owned()),
      ]
    );
  }
}
