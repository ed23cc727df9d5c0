use futures::executor::block_on;
use futures::future::BoxFuture;

/// Schedules background tasks for continuation-style validation.
pub trait TaskRunner {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

impl<F> TaskRunner for F
where
    F: Fn(BoxFuture<'static, ()>),
{
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self(task)
    }
}

/// Runs each task to completion on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineRunner;

impl TaskRunner for InlineRunner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        block_on(task)
    }
}
