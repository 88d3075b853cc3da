//! Debug labels.
//!
//! Labels are the human-readable names attached to objects through the driver’s debug facility.
//! Only single-byte text is supported: anything outside of ASCII (and the NUL byte, which would
//! truncate the label on the driver side) is rejected before reaching the driver.

use gl::types::*;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{Error, PreconditionError};

/// What a label is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LabelTarget {
  /// An integer-named object in the given namespace.
  Name(GLenum, GLuint),
  /// A pointer-named object (sync objects).
  Ptr(usize),
}

/// Check that a label is representable.
pub(crate) fn validate(label: &str) -> Result<&[u8], PreconditionError> {
  if label.bytes().all(|b| b.is_ascii() && b != 0) {
    Ok(label.as_bytes())
  } else {
    Err(PreconditionError::InvalidLabel)
  }
}

/// Decode the bytes returned by the driver.
///
/// Bytes outside of ASCII cannot have been set through this crate; they are replaced rather than
/// failing the read.
pub(crate) fn decode(bytes: Vec<u8>) -> String {
  match String::from_utf8(bytes) {
    Ok(s) => s,
    Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
  }
}

pub(crate) fn get<B>(ctx: &mut Context<B>, target: LabelTarget) -> Result<String, Error>
where
  B: Backend,
{
  let bytes = match target {
    LabelTarget::Name(identifier, name) => ctx.backend().get_object_label(identifier, name),
    LabelTarget::Ptr(ptr) => ctx.backend().get_object_ptr_label(ptr),
  };
  ctx.check()?;

  Ok(decode(bytes))
}

pub(crate) fn set<B>(ctx: &mut Context<B>, target: LabelTarget, label: &str) -> Result<(), Error>
where
  B: Backend,
{
  let bytes = validate(label)?;

  match target {
    LabelTarget::Name(identifier, name) => ctx.backend().object_label(identifier, name, bytes),
    LabelTarget::Ptr(ptr) => ctx.backend().object_ptr_label(ptr, bytes),
  }

  ctx.check()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ascii_labels_pass() {
    assert_eq!(validate("vertices #1"), Ok(&b"vertices #1"[..]));
    assert_eq!(validate(""), Ok(&b""[..]));
  }

  #[test]
  fn multibyte_labels_are_rejected() {
    assert_eq!(validate("sommets…"), Err(PreconditionError::InvalidLabel));
    assert_eq!(validate("a\0b"), Err(PreconditionError::InvalidLabel));
  }
}
