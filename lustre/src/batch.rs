//! Batch creation and deletion helpers shared by the integer-named objects.

use gl::types::*;
use std::ops::Range;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{DriverError, Error, PreconditionError};

/// Objects named by integers.
pub(crate) trait Named: Copy {
  fn from_name(name: GLuint) -> Self;

  fn live_name(&self) -> Result<GLuint, PreconditionError>;
}

/// Validate a `(index, count)` pair against a destination of length `len`.
pub(crate) fn range(
  len: usize,
  index: GLsizei,
  count: GLsizei,
) -> Result<Range<usize>, PreconditionError> {
  if count < 0 {
    return Err(PreconditionError::NegativeCount(count));
  }

  if index < 0 {
    return Err(PreconditionError::NegativeIndex(index));
  }

  let (index, count) = (index as usize, count as usize);

  match index.checked_add(count) {
    Some(end) if end <= len => Ok(index..end),
    _ => Err(PreconditionError::OutOfRange { index, count, len }),
  }
}

/// Turn the name returned by a singular creation into a live one.
///
/// A zero name without an error flag is reported with the (non-)error code it came with.
pub(crate) fn single(name: GLuint) -> Result<GLuint, Error> {
  if name == 0 {
    Err(DriverError::Unknown(gl::NO_ERROR).into())
  } else {
    Ok(name)
  }
}

/// Allocate `dst.len()` objects with `create` and store them in `dst`.
///
/// Nothing reaches the driver for an empty destination.
pub(crate) fn fill<B, R>(
  ctx: &mut Context<B>,
  dst: &mut [R],
  create: impl FnOnce(&mut Context<B>, &mut [GLuint]),
) -> Result<(), Error>
where
  B: Backend,
  R: Named,
{
  if dst.is_empty() {
    return Ok(());
  }

  let mut names = vec![0; dst.len()];
  create(ctx, &mut names);
  ctx.check()?;

  for (slot, &name) in dst.iter_mut().zip(&names) {
    *slot = R::from_name(single(name)?);
  }

  Ok(())
}

/// Collect the names of live objects, failing on the first null one.
pub(crate) fn names<R>(objects: &[R]) -> Result<Vec<GLuint>, PreconditionError>
where
  R: Named,
{
  objects.iter().map(Named::live_name).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_arguments() {
    assert_eq!(range(4, 0, -1), Err(PreconditionError::NegativeCount(-1)));
    assert_eq!(range(4, -1, 1), Err(PreconditionError::NegativeIndex(-1)));
  }

  #[test]
  fn past_the_end() {
    assert_eq!(
      range(4, 3, 2),
      Err(PreconditionError::OutOfRange {
        index: 3,
        count: 2,
        len: 4
      })
    );
    assert_eq!(range(4, 2, 2), Ok(2..4));
    assert_eq!(range(4, 4, 0), Ok(4..4));
  }
}
