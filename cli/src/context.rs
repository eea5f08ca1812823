//! State context task management utilities.

use estately_business::{Notifications, schedule_progress_reset};
use estately_states::StateCtx;
use tracing::instrument;

use crate::output::Output;

/// Await all pending tasks in the `JoinSet`, applying updates as each finishes.
#[instrument(skip_all, name = "await_tasks")]
pub async fn await_pending_tasks(ctx: &mut StateCtx) {
    while ctx.task_count() > 0 {
        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_updates();
        }
    }
}

/// Flush commands and await all spawned tasks.
///
/// A finished upload gets its progress reset scheduled on the way out; that task
/// is left running and lands on a later sync.
#[instrument(skip_all, name = "flush")]
pub async fn flush_and_await(ctx: &mut StateCtx) {
    ctx.sync_updates();
    ctx.flush_commands();
    await_pending_tasks(ctx).await;
    ctx.sync_updates();
    if schedule_progress_reset(ctx) {
        ctx.flush_commands();
    }
}

/// Print and clear every queued notification.
pub fn show_notifications(ctx: &mut StateCtx, out: &Output) {
    for notification in ctx.state_mut::<Notifications>().drain() {
        out.notification(&notification);
    }
}
