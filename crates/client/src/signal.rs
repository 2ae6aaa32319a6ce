//! External stop condition.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Boolean shutdown predicate, sampled at exactly two checkpoints: after
/// each delivered chunk and at the top of every reconnect iteration.
/// Any polling mechanism satisfies the contract.
pub trait StopSignal: Send + Sync {
    fn is_stopped(&self) -> bool;
}

/// Stop when a sentinel file exists. Removing the file is the only
/// supported way to permit a later run.
pub struct FileStopSignal {
    path: PathBuf,
}

impl FileStopSignal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StopSignal for FileStopSignal {
    fn is_stopped(&self) -> bool {
        self.path.exists()
    }
}

/// In-process flag variant, used by tests and embedders that drive
/// shutdown from a channel or signal handler instead of a file.
#[derive(Clone, Default)]
pub struct FlagStopSignal {
    flag: Arc<AtomicBool>,
}

impl FlagStopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl StopSignal for FlagStopSignal {
    fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_signal_follows_sentinel_presence() {
        let path = std::env::temp_dir().join("filterfeed-test-stop");
        std::fs::remove_file(&path).ok();

        let signal = FileStopSignal::new(&path);
        assert!(!signal.is_stopped());

        std::fs::write(&path, b"").unwrap();
        assert!(signal.is_stopped());

        std::fs::remove_file(&path).unwrap();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn flag_signal_latches() {
        let signal = FlagStopSignal::new();
        assert!(!signal.is_stopped());
        signal.set();
        assert!(signal.is_stopped());
    }
}
