//! Wait on a fence and read GPU timestamps.

use lustre::query::{Query, QueryTarget};
use lustre::sync::{Fence, FenceStatus, WaitOutcome};
use lustre::{Context, Error, Object as _};
use lustre_gl::GL33;
use std::time::Duration;

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  let queries = Query::create_many(ctx, QueryTarget::Timestamp, 2)?;
  let elapsed = Query::create(ctx, QueryTarget::TimeElapsed)?;

  queries[0].timestamp(ctx)?;
  elapsed.begin(ctx, QueryTarget::TimeElapsed)?;
  ctx.set_clear_color([1., 0., 0., 1.])?;
  Query::end(ctx, QueryTarget::TimeElapsed)?;
  queries[1].timestamp(ctx)?;

  let fence = Fence::create(ctx)?;
  let outcome = fence.client_wait(ctx, true, Duration::from_secs(1))?;
  assert_ne!(outcome, WaitOutcome::TimeoutExpired);
  assert_eq!(fence.status(ctx)?, FenceStatus::Signaled);
  assert_eq!(
    fence.client_wait(ctx, false, Duration::ZERO)?,
    WaitOutcome::AlreadySignaled
  );
  fence.wait(ctx)?;
  fence.delete(ctx)?;

  for query in queries.iter().chain(Some(&elapsed)) {
    while !query.result_available(ctx)? {
      std::thread::yield_now();
    }
  }

  let start = queries[0].result(ctx)?;
  let end = queries[1].result(ctx)?;
  log::info!(
    "{} ns between timestamps, {} ns elapsed",
    end - start,
    elapsed.result(ctx)?
  );
  assert!(end >= start);

  Query::delete_many(ctx, &queries)?;
  elapsed.delete(ctx)
}
