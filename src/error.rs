use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Failure of a whole capture. Per-array and per-device sysfs failures never
/// end up here; they are recorded on the array as `EnrichmentIssue`s.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("err read {}: {source}", path.display())]
    ReadMdstat {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("capture did not finish within {after:?}")]
    Timeout { after: Duration },

    #[error("capture worker exited without a result")]
    Worker,
}
