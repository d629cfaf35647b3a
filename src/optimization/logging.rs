//! Structured terminal logging for verbose solver runs (feature `obs_slog`).
use slog::{Drain, Logger, o};

/// Asynchronous stderr logger shared by the Newton solver and the L-BFGS
/// runner. Records are flushed when the returned logger is dropped.
pub fn terminal_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!("crate" => "rust_irt"))
}
