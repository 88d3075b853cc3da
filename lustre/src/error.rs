//! Errors.
//!
//! Two families of failures are kept apart:
//!
//! - [`PreconditionError`]: the caller misused the API. These are detected locally, before any
//!   native call is issued.
//! - [`DriverError`]: the driver raised its error flag after a native call. These are read back
//!   from the error register by [`Context::check`](crate::context::Context::check).
//!
//! A third, much rarer family, [`StateQueryError`], is raised when the driver answers a state
//! query with a value this crate has no representation for.

use gl::types::*;
use std::error;
use std::fmt;

use crate::handle::ObjectKind;
use crate::state::PolygonModes;

/// Any error that can occur while using this crate.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
  /// The caller broke a precondition; nothing was sent to the driver.
  Precondition(PreconditionError),
  /// The driver reported an error.
  Driver(DriverError),
  /// The driver answered a state query with an unknown value.
  Decode(StateQueryError),
}

impl Error {
  /// Whether this error was raised locally, without reaching the driver.
  pub fn is_precondition(&self) -> bool {
    matches!(self, Error::Precondition(_))
  }

  /// Whether this error was reported by the driver.
  pub fn is_driver(&self) -> bool {
    matches!(self, Error::Driver(_))
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Error::Precondition(ref e) => write!(f, "precondition failed: {}", e),
      Error::Driver(ref e) => write!(f, "driver error: {}", e),
      Error::Decode(ref e) => write!(f, "cannot decode state: {}", e),
    }
  }
}

impl error::Error for Error {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      Error::Precondition(e) => Some(e),
      Error::Driver(e) => Some(e),
      Error::Decode(e) => Some(e),
    }
  }
}

impl From<PreconditionError> for Error {
  fn from(e: PreconditionError) -> Self {
    Error::Precondition(e)
  }
}

impl From<DriverError> for Error {
  fn from(e: DriverError) -> Self {
    Error::Driver(e)
  }
}

impl From<StateQueryError> for Error {
  fn from(e: StateQueryError) -> Self {
    Error::Decode(e)
  }
}

/// Caller misuse, detected before any native call.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PreconditionError {
  /// A null (unallocated) object was used for something other than comparison.
  NullObject(ObjectKind),
  /// A batch operation was asked for a negative number of objects.
  NegativeCount(GLsizei),
  /// A batch operation was given a negative destination index.
  NegativeIndex(GLsizei),
  /// A batch operation would write past the end of its destination.
  OutOfRange {
    index: usize,
    count: usize,
    len: usize,
  },
  /// A debug label is not made of single-byte (ASCII, non-NUL) characters.
  InvalidLabel,
  /// A name passed to the driver (uniform, attribute) contains a NUL byte.
  InvalidName(String),
  /// A shader source is not made of ASCII characters, or contains a NUL byte.
  InvalidSource,
  /// A vertex attribute index exceeds the limit reported by the driver.
  AttribIndexOutOfRange { index: usize, max: usize },
  /// The data handed to an upload doesn’t match the size implied by its description.
  DataSizeMismatch { expected: usize, provided: usize },
  /// A texture unit index that doesn’t map to a `GL_TEXTUREi` enum.
  TextureUnitOutOfRange(u32),
  /// Image dimensions that don’t fit the native size types.
  ImageTooLarge { width: u32, height: u32 },
  /// Different front and back polygon modes, which core profiles cannot express.
  MismatchedPolygonModes(PolygonModes),
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      PreconditionError::NullObject(kind) => write!(f, "used a null {}", kind),
      PreconditionError::NegativeCount(count) => write!(f, "negative object count: {}", count),
      PreconditionError::NegativeIndex(index) => write!(f, "negative destination index: {}", index),
      PreconditionError::OutOfRange { index, count, len } => write!(
        f,
        "destination out of range (index = {}, count = {}, len = {})",
        index, count, len
      ),
      PreconditionError::InvalidLabel => f.write_str("label must be ASCII without NUL bytes"),
      PreconditionError::InvalidName(ref name) => write!(f, "invalid name: {:?}", name),
      PreconditionError::InvalidSource => {
        f.write_str("shader source must be ASCII without NUL bytes")
      }
      PreconditionError::AttribIndexOutOfRange { index, max } => write!(
        f,
        "vertex attribute index out of range (index = {}, max = {})",
        index, max
      ),
      PreconditionError::DataSizeMismatch { expected, provided } => write!(
        f,
        "data size mismatch (expected = {}, provided = {})",
        expected, provided
      ),
      PreconditionError::TextureUnitOutOfRange(unit) => {
        write!(f, "texture unit out of range: {}", unit)
      }
      PreconditionError::ImageTooLarge { width, height } => {
        write!(f, "image too large ({}×{})", width, height)
      }
      PreconditionError::MismatchedPolygonModes(modes) => write!(
        f,
        "front ({:?}) and back ({:?}) polygon modes differ",
        modes.front, modes.back
      ),
    }
  }
}

impl error::Error for PreconditionError {}

/// Error reported by the driver’s error register.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DriverError {
  /// `GL_INVALID_ENUM`.
  InvalidEnum,
  /// `GL_INVALID_VALUE`.
  InvalidValue,
  /// `GL_INVALID_OPERATION`.
  InvalidOperation,
  /// `GL_INVALID_FRAMEBUFFER_OPERATION`.
  InvalidFramebufferOperation,
  /// `GL_OUT_OF_MEMORY`.
  OutOfMemory,
  /// `GL_STACK_OVERFLOW`.
  StackOverflow,
  /// `GL_STACK_UNDERFLOW`.
  StackUnderflow,
  /// Any other code.
  Unknown(GLenum),
}

impl DriverError {
  /// Map a raw error code. `GL_NO_ERROR` maps to `None`.
  pub fn from_code(code: GLenum) -> Option<Self> {
    match code {
      gl::NO_ERROR => None,
      gl::INVALID_ENUM => Some(DriverError::InvalidEnum),
      gl::INVALID_VALUE => Some(DriverError::InvalidValue),
      gl::INVALID_OPERATION => Some(DriverError::InvalidOperation),
      gl::INVALID_FRAMEBUFFER_OPERATION => Some(DriverError::InvalidFramebufferOperation),
      gl::OUT_OF_MEMORY => Some(DriverError::OutOfMemory),
      gl::STACK_OVERFLOW => Some(DriverError::StackOverflow),
      gl::STACK_UNDERFLOW => Some(DriverError::StackUnderflow),
      _ => Some(DriverError::Unknown(code)),
    }
  }

  /// The raw code this error stands for.
  pub fn code(self) -> GLenum {
    match self {
      DriverError::InvalidEnum => gl::INVALID_ENUM,
      DriverError::InvalidValue => gl::INVALID_VALUE,
      DriverError::InvalidOperation => gl::INVALID_OPERATION,
      DriverError::InvalidFramebufferOperation => gl::INVALID_FRAMEBUFFER_OPERATION,
      DriverError::OutOfMemory => gl::OUT_OF_MEMORY,
      DriverError::StackOverflow => gl::STACK_OVERFLOW,
      DriverError::StackUnderflow => gl::STACK_UNDERFLOW,
      DriverError::Unknown(code) => code,
    }
  }
}

impl fmt::Display for DriverError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DriverError::InvalidEnum => f.write_str("invalid enum"),
      DriverError::InvalidValue => f.write_str("invalid value"),
      DriverError::InvalidOperation => f.write_str("invalid operation"),
      DriverError::InvalidFramebufferOperation => f.write_str("invalid framebuffer operation"),
      DriverError::OutOfMemory => f.write_str("out of memory"),
      DriverError::StackOverflow => f.write_str("stack overflow"),
      DriverError::StackUnderflow => f.write_str("stack underflow"),
      DriverError::Unknown(code) => write!(f, "unknown error code 0x{:04X}", code),
    }
  }
}

impl error::Error for DriverError {}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateQueryError {
  /// Corrupted boolean value.
  UnknownBoolean { pname: GLenum, value: GLint },
  /// Corrupted face culling order.
  UnknownFaceCullingOrder(GLenum),
  /// Corrupted face culling mode.
  UnknownFaceCullingMode(GLenum),
  /// Corrupted depth comparison.
  UnknownDepthComparison(GLenum),
  /// Corrupted polygon mode.
  UnknownPolygonMode(GLenum),
  /// Corrupted buffer usage.
  UnknownBufferUsage(GLenum),
  /// Corrupted shader type.
  UnknownShaderType(GLenum),
  /// Corrupted sync status.
  UnknownSyncStatus(GLenum),
  /// Corrupted wait result.
  UnknownWaitResult(GLenum),
  /// Negative value where a count or a name was expected.
  Negative { pname: GLenum, value: i64 },
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnknownBoolean { pname, value } => {
        write!(f, "unknown boolean for 0x{:04X}: {}", pname, value)
      }
      StateQueryError::UnknownFaceCullingOrder(ref o) => {
        write!(f, "unknown face culling order: {}", o)
      }
      StateQueryError::UnknownFaceCullingMode(ref m) => {
        write!(f, "unknown face culling mode: {}", m)
      }
      StateQueryError::UnknownDepthComparison(ref c) => {
        write!(f, "unknown depth comparison: {}", c)
      }
      StateQueryError::UnknownPolygonMode(ref m) => write!(f, "unknown polygon mode: {}", m),
      StateQueryError::UnknownBufferUsage(ref u) => write!(f, "unknown buffer usage: {}", u),
      StateQueryError::UnknownShaderType(ref t) => write!(f, "unknown shader type: {}", t),
      StateQueryError::UnknownSyncStatus(ref s) => write!(f, "unknown sync status: {}", s),
      StateQueryError::UnknownWaitResult(ref r) => write!(f, "unknown wait result: {}", r),
      StateQueryError::Negative { pname, value } => {
        write!(f, "negative value for 0x{:04X}: {}", pname, value)
      }
    }
  }
}

impl error::Error for StateQueryError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_error_is_not_an_error() {
    assert_eq!(DriverError::from_code(gl::NO_ERROR), None);
  }

  #[test]
  fn known_codes() {
    let codes = [
      (gl::INVALID_ENUM, DriverError::InvalidEnum),
      (gl::INVALID_VALUE, DriverError::InvalidValue),
      (gl::INVALID_OPERATION, DriverError::InvalidOperation),
      (
        gl::INVALID_FRAMEBUFFER_OPERATION,
        DriverError::InvalidFramebufferOperation,
      ),
      (gl::OUT_OF_MEMORY, DriverError::OutOfMemory),
      (gl::STACK_OVERFLOW, DriverError::StackOverflow),
      (gl::STACK_UNDERFLOW, DriverError::StackUnderflow),
    ];

    for (code, err) in codes {
      assert_eq!(DriverError::from_code(code), Some(err));
      assert_eq!(err.code(), code);
    }
  }

  #[test]
  fn unknown_code_keeps_its_value() {
    assert_eq!(
      DriverError::from_code(0xDEAD),
      Some(DriverError::Unknown(0xDEAD))
    );
    assert_eq!(
      DriverError::Unknown(0xDEAD).to_string(),
      "unknown error code 0xDEAD"
    );
  }

  #[test]
  fn tiers_stay_apart() {
    let pre: Error = PreconditionError::NullObject(ObjectKind::Buffer).into();
    let drv: Error = DriverError::InvalidValue.into();

    assert!(pre.is_precondition() && !pre.is_driver());
    assert!(drv.is_driver() && !drv.is_precondition());
    assert_eq!(pre.to_string(), "precondition failed: used a null buffer");
  }
}
