use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventLoopError {
    /// `run_until_idle` was called from inside a callback the loop is running.
    #[error("event loop is already running; queue work with next_tick instead of nesting")]
    AlreadyRunning,
}
