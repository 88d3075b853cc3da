//! GPU queries.
//!
//! A [`Query`] records a counter between a [`Query::begin`] and the matching [`Query::end`], or a
//! GPU timestamp with [`Query::timestamp`]. Results are produced asynchronously: poll
//! [`Query::result_available`] before reading [`Query::result`] to avoid stalling.

use gl::types::*;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};
use crate::state::decode_bool;

named_object! {
  /// A query object.
  Query, Query
}

/// What a query measures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueryTarget {
  /// Number of samples passing the depth test.
  SamplesPassed,
  /// Whether any sample passed the depth test.
  AnySamplesPassed,
  /// Number of primitives emitted by the vertex processing stages.
  PrimitivesGenerated,
  /// Number of primitives written to transform feedback buffers.
  TransformFeedbackPrimitivesWritten,
  /// GPU time elapsed, in nanoseconds.
  TimeElapsed,
  /// GPU time at a given point, in nanoseconds. Recorded with [`Query::timestamp`] only.
  Timestamp,
}

impl QueryTarget {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      QueryTarget::SamplesPassed => gl::SAMPLES_PASSED,
      QueryTarget::AnySamplesPassed => gl::ANY_SAMPLES_PASSED,
      QueryTarget::PrimitivesGenerated => gl::PRIMITIVES_GENERATED,
      QueryTarget::TransformFeedbackPrimitivesWritten => {
        gl::TRANSFORM_FEEDBACK_PRIMITIVES_WRITTEN
      }
      QueryTarget::TimeElapsed => gl::TIME_ELAPSED,
      QueryTarget::Timestamp => gl::TIMESTAMP,
    }
  }
}

impl Query {
  /// Create a single query for `target`.
  pub fn create<B>(ctx: &mut Context<B>, target: QueryTarget) -> Result<Self, Error>
  where
    B: Backend,
  {
    let mut names = [0];
    ctx.backend().create_queries(target.to_glenum(), &mut names);
    ctx.check()?;
    crate::batch::single(names[0]).map(Self::from_raw)
  }

  /// Create `count` queries for `target` in a single native call.
  pub fn create_many<B>(
    ctx: &mut Context<B>,
    target: QueryTarget,
    count: usize,
  ) -> Result<Vec<Self>, Error>
  where
    B: Backend,
  {
    let mut dst = vec![Query::NULL; count];
    crate::batch::fill(ctx, &mut dst, |ctx, names| {
      ctx.backend().create_queries(target.to_glenum(), names)
    })?;
    Ok(dst)
  }

  /// Create `count` queries for `target` into `dst[index..index + count]`.
  pub fn create_into<B>(
    ctx: &mut Context<B>,
    target: QueryTarget,
    dst: &mut [Self],
    index: GLsizei,
    count: GLsizei,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let range = crate::batch::range(dst.len(), index, count)?;
    crate::batch::fill(ctx, &mut dst[range], |ctx, names| {
      ctx.backend().create_queries(target.to_glenum(), names)
    })
  }

  /// Delete several queries in a single native call.
  pub fn delete_many<B>(ctx: &mut Context<B>, queries: &[Self]) -> Result<(), Error>
  where
    B: Backend,
  {
    let names = crate::batch::names(queries)?;
    ctx.backend().delete_queries(&names);
    ctx.check()
  }

  /// Start recording `target` into this query.
  pub fn begin<B>(&self, ctx: &mut Context<B>, target: QueryTarget) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().begin_query(target.to_glenum(), name);
    ctx.check()
  }

  /// Stop recording whatever query is active on `target`.
  pub fn end<B>(ctx: &mut Context<B>, target: QueryTarget) -> Result<(), Error>
  where
    B: Backend,
  {
    ctx.backend().end_query(target.to_glenum());
    ctx.check()
  }

  /// Record the GPU time once all previous commands have completed.
  pub fn timestamp<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().query_counter(name);
    ctx.check()
  }

  /// Result of the query, blocking until it is available.
  pub fn result<B>(&self, ctx: &mut Context<B>) -> Result<i64, Error>
  where
    B: Backend,
  {
    self.parameter(ctx, gl::QUERY_RESULT)
  }

  /// Whether the result can be read without blocking.
  pub fn result_available<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let available = self.parameter(ctx, gl::QUERY_RESULT_AVAILABLE)?;
    Ok(decode_bool(gl::QUERY_RESULT_AVAILABLE, available as GLint)?)
  }

  fn parameter<B>(&self, ctx: &mut Context<B>, pname: GLenum) -> Result<i64, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let value = ctx.backend().get_query_object_i64(name, pname);
    ctx.check()?;
    Ok(value)
  }
}

impl Object for Query {
  const KIND: ObjectKind = ObjectKind::Query;

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
    let valid = ctx.backend().is_query(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_queries(&[name]);
    ctx.check()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::{DriverError, PreconditionError};
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let query = Query::create(&mut ctx, QueryTarget::SamplesPassed).unwrap();

    assert!(query.is_valid(&mut ctx).unwrap());
    query.delete(&mut ctx).unwrap();
    assert!(!query.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn begin_end_result() {
    let mut ctx = context();
    let query = Query::create(&mut ctx, QueryTarget::TimeElapsed).unwrap();

    query.begin(&mut ctx, QueryTarget::TimeElapsed).unwrap();
    Query::end(&mut ctx, QueryTarget::TimeElapsed).unwrap();

    assert!(query.result_available(&mut ctx).unwrap());
    assert!(query.result(&mut ctx).unwrap() >= 0);
  }

  #[test]
  fn only_one_active_query_per_target() {
    let mut ctx = context();
    let queries = Query::create_many(&mut ctx, QueryTarget::SamplesPassed, 2).unwrap();

    queries[0].begin(&mut ctx, QueryTarget::SamplesPassed).unwrap();
    assert_eq!(
      queries[1].begin(&mut ctx, QueryTarget::SamplesPassed),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
    Query::end(&mut ctx, QueryTarget::SamplesPassed).unwrap();
    assert_eq!(
      Query::end(&mut ctx, QueryTarget::SamplesPassed),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn target_is_fixed_at_creation() {
    let mut ctx = context();
    let query = Query::create(&mut ctx, QueryTarget::SamplesPassed).unwrap();

    assert_eq!(
      query.begin(&mut ctx, QueryTarget::PrimitivesGenerated),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn timestamps_increase() {
    let mut ctx = context();
    let queries = Query::create_many(&mut ctx, QueryTarget::Timestamp, 2).unwrap();

    queries[0].timestamp(&mut ctx).unwrap();
    queries[1].timestamp(&mut ctx).unwrap();

    let a = queries[0].result(&mut ctx).unwrap();
    let b = queries[1].result(&mut ctx).unwrap();
    assert!(b > a);
  }

  #[test]
  fn timestamp_is_not_a_range() {
    let mut ctx = context();
    let query = Query::create(&mut ctx, QueryTarget::Timestamp).unwrap();

    assert_eq!(
      query.begin(&mut ctx, QueryTarget::Timestamp),
      Err(Error::Driver(DriverError::InvalidEnum))
    );
  }

  #[test]
  fn active_query_has_no_result() {
    let mut ctx = context();
    let query = Query::create(&mut ctx, QueryTarget::PrimitivesGenerated).unwrap();

    query.begin(&mut ctx, QueryTarget::PrimitivesGenerated).unwrap();
    assert_eq!(
      query.result(&mut ctx),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn create_into_zero_is_a_noop() {
    let mut ctx = context();
    let mut dst = [Query::NULL; 3];
    let calls = ctx.backend().calls();

    Query::create_into(&mut ctx, QueryTarget::SamplesPassed, &mut dst, 3, 0).unwrap();
    assert_eq!(dst, [Query::NULL; 3]);
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn null_query_is_rejected() {
    let mut ctx = context();
    let calls = ctx.backend().calls();
    let expected = Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Query,
    )));

    assert_eq!(
      Query::NULL.begin(&mut ctx, QueryTarget::SamplesPassed),
      expected
    );
    assert_eq!(Query::NULL.timestamp(&mut ctx), expected);
    assert_eq!(Query::NULL.result(&mut ctx).map(|_| ()), expected);
    assert_eq!(ctx.backend().calls(), calls);
  }
}
