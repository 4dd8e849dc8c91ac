use std::path::Path;

/// Receives progress notifications from the long-running operations.
///
/// Every method has a no-op default so implementors only override what they
/// render. `total` counts the units the operation iterates over: class
/// directories for the splitters and the standardizer, source files for the
/// chunker.
pub trait ProgressReporter {
    fn start(&mut self, _total: usize) {}

    fn advance(&mut self, _item: &Path) {}

    fn finish(&mut self) {}
}

/// Reporter that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
