//! Fences.
//!
//! A [`Fence`] is a sync object inserted in the command stream. It becomes signaled once the GPU
//! has executed every command issued before it. Unlike the other objects, fences are named by
//! pointers.

use gl::types::*;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{DriverError, Error, PreconditionError, StateQueryError};
use crate::handle::{Handle, Object, ObjectKind};
use crate::label::{self, LabelTarget};

/// A fence sync object.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Fence {
  handle: Handle<NonZeroUsize>,
}

impl Fence {
  /// The null fence.
  pub const NULL: Self = Fence {
    handle: Handle::Unallocated,
  };

  /// Wrap a raw sync pointer; null gives the null fence.
  pub fn from_raw(ptr: usize) -> Self {
    Fence {
      handle: Handle::from_ptr(ptr),
    }
  }

  /// The raw sync pointer; `0` for the null fence.
  pub fn raw(&self) -> usize {
    self.handle.ptr()
  }

  pub fn handle(&self) -> Handle<NonZeroUsize> {
    self.handle
  }

  fn live(&self) -> Result<usize, PreconditionError> {
    self
      .handle
      .live(ObjectKind::Sync)
      .map(NonZeroUsize::get)
  }

  /// Insert a fence in the command stream.
  pub fn create<B>(ctx: &mut Context<B>) -> Result<Self, Error>
  where
    B: Backend,
  {
    let ptr = ctx
      .backend()
      .fence_sync(gl::SYNC_GPU_COMMANDS_COMPLETE, 0);
    ctx.check()?;

    if ptr == 0 {
      Err(DriverError::Unknown(gl::NO_ERROR).into())
    } else {
      Ok(Fence::from_raw(ptr))
    }
  }

  /// Current status, without waiting.
  pub fn status<B>(&self, ctx: &mut Context<B>) -> Result<FenceStatus, Error>
  where
    B: Backend,
  {
    let ptr = self.live()?;
    let status = ctx.backend().get_sync_iv(ptr, gl::SYNC_STATUS);
    ctx.check()?;
    Ok(FenceStatus::from_glenum(status as GLenum)?)
  }

  /// Block the calling thread until the fence is signaled or `timeout` expires.
  ///
  /// With `flush`, pending commands are flushed first so that the fence can actually be reached.
  pub fn client_wait<B>(
    &self,
    ctx: &mut Context<B>,
    flush: bool,
    timeout: Duration,
  ) -> Result<WaitOutcome, Error>
  where
    B: Backend,
  {
    let ptr = self.live()?;
    let flags = if flush { gl::SYNC_FLUSH_COMMANDS_BIT } else { 0 };
    let timeout = u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX);

    let outcome = ctx.backend().client_wait_sync(ptr, flags, timeout);
    ctx.check()?;
    Ok(WaitOutcome::from_glenum(outcome)?)
  }

  /// Make the GPU wait for the fence before executing further commands. Returns immediately.
  pub fn wait<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let ptr = self.live()?;
    ctx.backend().wait_sync(ptr);
    ctx.check()
  }
}

impl Object for Fence {
  const KIND: ObjectKind = ObjectKind::Sync;

  fn is_null(&self) -> bool {
    !self.handle.is_allocated()
  }

  fn label<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    label::get(ctx, LabelTarget::Ptr(self.live()?))
  }

  fn set_label<B>(&self, ctx: &mut Context<B>, label: &str) -> Result<(), Error>
  where
    B: Backend,
  {
    label::set(ctx, LabelTarget::Ptr(self.live()?), label)
  }

  fn is_valid<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let ptr = self.live()?;
    let valid = ctx.backend().is_sync(ptr);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let ptr = self.live()?;
    ctx.backend().delete_sync(ptr);
    ctx.check()
  }
}

impl fmt::Debug for Fence {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.handle.get() {
      Some(ptr) => write!(f, "Fence({:#x})", ptr),
      None => f.write_str("Fence(null)"),
    }
  }
}

impl fmt::Display for Fence {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let ptr = self.live().map_err(|_| fmt::Error)?;
    write!(f, "{} {:#x}", ObjectKind::Sync, ptr)
  }
}

/// Whether a fence was reached.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FenceStatus {
  Signaled,
  Unsignaled,
}

impl FenceStatus {
  fn from_glenum(status: GLenum) -> Result<Self, StateQueryError> {
    match status {
      gl::SIGNALED => Ok(FenceStatus::Signaled),
      gl::UNSIGNALED => Ok(FenceStatus::Unsignaled),
      _ => Err(StateQueryError::UnknownSyncStatus(status)),
    }
  }
}

/// How a client-side wait ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WaitOutcome {
  /// The fence was already signaled when the wait started.
  AlreadySignaled,
  /// The fence got signaled before the timeout.
  ConditionSatisfied,
  /// The timeout expired first.
  TimeoutExpired,
}

impl WaitOutcome {
  fn from_glenum(outcome: GLenum) -> Result<Self, StateQueryError> {
    match outcome {
      gl::ALREADY_SIGNALED => Ok(WaitOutcome::AlreadySignaled),
      gl::CONDITION_SATISFIED => Ok(WaitOutcome::ConditionSatisfied),
      gl::TIMEOUT_EXPIRED => Ok(WaitOutcome::TimeoutExpired),
      _ => Err(StateQueryError::UnknownWaitResult(outcome)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let fence = Fence::create(&mut ctx).unwrap();

    assert!(!fence.is_null());
    assert!(fence.is_valid(&mut ctx).unwrap());
    fence.delete(&mut ctx).unwrap();
    assert!(!fence.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn signaled_after_flushing_wait() {
    let mut ctx = context();
    let fence = Fence::create(&mut ctx).unwrap();

    assert_eq!(fence.status(&mut ctx).unwrap(), FenceStatus::Unsignaled);
    assert_eq!(
      fence.client_wait(&mut ctx, false, Duration::ZERO).unwrap(),
      WaitOutcome::TimeoutExpired
    );
    assert_eq!(
      fence
        .client_wait(&mut ctx, true, Duration::from_millis(1))
        .unwrap(),
      WaitOutcome::ConditionSatisfied
    );
    assert_eq!(fence.status(&mut ctx).unwrap(), FenceStatus::Signaled);
    assert_eq!(
      fence.client_wait(&mut ctx, false, Duration::ZERO).unwrap(),
      WaitOutcome::AlreadySignaled
    );
  }

  #[test]
  fn server_wait() {
    let mut ctx = context();
    let fence = Fence::create(&mut ctx).unwrap();

    fence.wait(&mut ctx).unwrap();
  }

  #[test]
  fn label_roundtrip() {
    let mut ctx = context();
    let fence = Fence::create(&mut ctx).unwrap();

    assert_eq!(fence.label(&mut ctx).unwrap(), "");
    fence.set_label(&mut ctx, "end of frame").unwrap();
    assert_eq!(fence.label(&mut ctx).unwrap(), "end of frame");
  }

  #[test]
  fn deleted_fence_cannot_be_waited_on() {
    let mut ctx = context();
    let fence = Fence::create(&mut ctx).unwrap();
    fence.delete(&mut ctx).unwrap();

    assert_eq!(
      fence.wait(&mut ctx),
      Err(Error::Driver(DriverError::InvalidValue))
    );
  }

  #[test]
  fn null_fence_is_rejected() {
    let mut ctx = context();
    let calls = ctx.backend().calls();
    let expected = Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Sync,
    )));

    assert_eq!(Fence::NULL.status(&mut ctx).map(|_| ()), expected);
    assert_eq!(Fence::NULL.wait(&mut ctx), expected);
    assert_eq!(Fence::NULL.set_label(&mut ctx, "x"), expected);
    assert_eq!(Fence::NULL.delete(&mut ctx), expected);
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn formatting() {
    use std::fmt::Write as _;

    let mut s = String::new();
    assert!(write!(s, "{}", Fence::NULL).is_err());
    assert_eq!(format!("{:?}", Fence::NULL), "Fence(null)");
    assert_eq!(Fence::from_raw(0x10).to_string(), "sync object 0x10");
  }
}
