//! Typed global state values.
//!
//! These are the values read from and written to the global state through
//! [`Context`](crate::context::Context). Each type knows how to turn itself into the raw value
//! the driver expects and, when it’s read back, how to decode it.

use gl::types::*;

use crate::error::StateQueryError;

/// `GL_POLYGON_MODE`.
pub(crate) const POLYGON_MODE: GLenum = 0x0B40;

/// A screen-space rectangle (viewport, scissor box).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
}

impl Rect {
  /// Create a new [`Rect`].
  pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
    Rect {
      x,
      y,
      width,
      height,
    }
  }

  pub(crate) fn from_raw(raw: [GLint; 4]) -> Self {
    Rect::new(raw[0], raw[1], raw[2], raw[3])
  }
}

/// Depth range mapping, from normalized device coordinates to window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthRange {
  pub near: f64,
  pub far: f64,
}

impl Default for DepthRange {
  fn default() -> Self {
    DepthRange { near: 0., far: 1. }
  }
}

/// Rasterization mode of polygons.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  /// Only vertices are rasterized.
  Point,
  /// Only edges are rasterized.
  Line,
  /// The interior is filled.
  Fill,
}

impl PolygonMode {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      PolygonMode::Point => gl::POINT,
      PolygonMode::Line => gl::LINE,
      PolygonMode::Fill => gl::FILL,
    }
  }

  pub(crate) fn from_glenum(mode: GLenum) -> Result<Self, StateQueryError> {
    match mode {
      gl::POINT => Ok(PolygonMode::Point),
      gl::LINE => Ok(PolygonMode::Line),
      gl::FILL => Ok(PolygonMode::Fill),
      _ => Err(StateQueryError::UnknownPolygonMode(mode)),
    }
  }
}

/// Polygon modes of front and back faces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PolygonModes {
  pub front: PolygonMode,
  pub back: PolygonMode,
}

impl PolygonModes {
  /// The same mode for both faces.
  pub fn both(mode: PolygonMode) -> Self {
    PolygonModes {
      front: mode,
      back: mode,
    }
  }
}

/// Face culling order.
///
/// The order determines how a triangle is determined to be discarded. If the triangle’s vertices
/// wind up in the same direction as the `FaceCullingOrder`, it’s assigned the front side,
/// otherwise, it’s the back side.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FaceCullingOrder {
  /// Clockwise order.
  CW,
  /// Counter-clockwise order.
  CCW,
}

impl FaceCullingOrder {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      FaceCullingOrder::CW => gl::CW,
      FaceCullingOrder::CCW => gl::CCW,
    }
  }

  pub(crate) fn from_glenum(order: GLenum) -> Result<Self, StateQueryError> {
    match order {
      gl::CW => Ok(FaceCullingOrder::CW),
      gl::CCW => Ok(FaceCullingOrder::CCW),
      _ => Err(StateQueryError::UnknownFaceCullingOrder(order)),
    }
  }
}

/// Side to cull.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FaceCullingMode {
  /// Cull the front side only.
  Front,
  /// Cull the back side only.
  Back,
  /// Always cull any triangle.
  Both,
}

impl FaceCullingMode {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      FaceCullingMode::Front => gl::FRONT,
      FaceCullingMode::Back => gl::BACK,
      FaceCullingMode::Both => gl::FRONT_AND_BACK,
    }
  }

  pub(crate) fn from_glenum(mode: GLenum) -> Result<Self, StateQueryError> {
    match mode {
      gl::FRONT => Ok(FaceCullingMode::Front),
      gl::BACK => Ok(FaceCullingMode::Back),
      gl::FRONT_AND_BACK => Ok(FaceCullingMode::Both),
      _ => Err(StateQueryError::UnknownFaceCullingMode(mode)),
    }
  }
}

/// Depth comparison to perform while depth test. `a` is the incoming fragment’s depth and b is the
/// fragment’s depth that is already stored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DepthComparison {
  /// Depth test never succeeds.
  Never,
  /// Depth test always succeeds.
  Always,
  /// Depth test succeeds if `a == b`.
  Equal,
  /// Depth test succeeds if `a != b`.
  NotEqual,
  /// Depth test succeeds if `a < b`.
  Less,
  /// Depth test succeeds if `a <= b`.
  LessOrEqual,
  /// Depth test succeeds if `a > b`.
  Greater,
  /// Depth test succeeds if `a >= b`.
  GreaterOrEqual,
}

impl DepthComparison {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      DepthComparison::Never => gl::NEVER,
      DepthComparison::Always => gl::ALWAYS,
      DepthComparison::Equal => gl::EQUAL,
      DepthComparison::NotEqual => gl::NOTEQUAL,
      DepthComparison::Less => gl::LESS,
      DepthComparison::LessOrEqual => gl::LEQUAL,
      DepthComparison::Greater => gl::GREATER,
      DepthComparison::GreaterOrEqual => gl::GEQUAL,
    }
  }

  pub(crate) fn from_glenum(func: GLenum) -> Result<Self, StateQueryError> {
    match func {
      gl::NEVER => Ok(DepthComparison::Never),
      gl::ALWAYS => Ok(DepthComparison::Always),
      gl::EQUAL => Ok(DepthComparison::Equal),
      gl::NOTEQUAL => Ok(DepthComparison::NotEqual),
      gl::LESS => Ok(DepthComparison::Less),
      gl::LEQUAL => Ok(DepthComparison::LessOrEqual),
      gl::GREATER => Ok(DepthComparison::Greater),
      gl::GEQUAL => Ok(DepthComparison::GreaterOrEqual),
      _ => Err(StateQueryError::UnknownDepthComparison(func)),
    }
  }
}

/// Server-side capabilities toggled with enable / disable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
  DepthTest,
  DepthClamp,
  FaceCulling,
  ScissorTest,
  Blending,
  PrimitiveRestart,
  FramebufferSrgb,
}

impl Capability {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      Capability::DepthTest => gl::DEPTH_TEST,
      Capability::DepthClamp => gl::DEPTH_CLAMP,
      Capability::FaceCulling => gl::CULL_FACE,
      Capability::ScissorTest => gl::SCISSOR_TEST,
      Capability::Blending => gl::BLEND,
      Capability::PrimitiveRestart => gl::PRIMITIVE_RESTART,
      Capability::FramebufferSrgb => gl::FRAMEBUFFER_SRGB,
    }
  }
}

/// Decode a boolean returned as an integer or a `GLboolean`.
pub(crate) fn decode_bool(pname: GLenum, value: GLint) -> Result<bool, StateQueryError> {
  match value {
    0 => Ok(false),
    1 => Ok(true),
    _ => Err(StateQueryError::UnknownBoolean { pname, value }),
  }
}

pub(crate) fn encode_bool(b: bool) -> GLboolean {
  if b {
    gl::TRUE
  } else {
    gl::FALSE
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn depth_comparison_roundtrip() {
    let all = [
      DepthComparison::Never,
      DepthComparison::Always,
      DepthComparison::Equal,
      DepthComparison::NotEqual,
      DepthComparison::Less,
      DepthComparison::LessOrEqual,
      DepthComparison::Greater,
      DepthComparison::GreaterOrEqual,
    ];

    for cmp in all {
      assert_eq!(DepthComparison::from_glenum(cmp.to_glenum()), Ok(cmp));
    }
  }

  #[test]
  fn unknown_codes_are_decode_errors() {
    assert_eq!(
      FaceCullingOrder::from_glenum(0x1234),
      Err(StateQueryError::UnknownFaceCullingOrder(0x1234))
    );
    assert_eq!(
      decode_bool(gl::DEPTH_WRITEMASK, 2),
      Err(StateQueryError::UnknownBoolean {
        pname: gl::DEPTH_WRITEMASK,
        value: 2
      })
    );
  }
}
