//! Race-with-cleanup primitive shared by token waits and cancellable waits.

use futures::future::{self, BoxFuture};

/// Runs every branch concurrently and returns the first output together with
/// the index of the branch that produced it.
///
/// The losing branches are dropped before this returns. Branches are plain
/// futures owned by the race, never detached tasks, so dropping a loser both
/// cancels it and settles it; nothing related to the race stays scheduled
/// afterwards. Dropping the race future itself unwinds every branch the same
/// way.
///
/// Callers must supply at least one branch.
pub(crate) async fn race_and_cleanup<T>(branches: Vec<BoxFuture<'_, T>>) -> (T, usize) {
    debug_assert!(!branches.is_empty());
    let (output, index, losers) = future::select_all(branches).await;
    drop(losers);
    (output, index)
}
