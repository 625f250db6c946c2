//! Source adapters: one capability (`fetch(keywords) -> records`) with
//! per-origin implementations selected by configuration. Adapters absorb
//! per-keyword transport failures (retry, then tolerate) so that one origin's
//! outage never blocks the others.

pub mod forum;
pub mod microblog;
pub mod news;

pub use forum::ForumSource;
pub use microblog::MicroblogSource;
pub use news::NewsSource;

use anyhow::Result;
use async_trait::async_trait;

use hoaxwatch_common::{Platform, Record};

/// Delay range between successive keyword fetches, in seconds.
pub(crate) const KEYWORD_PAUSE_SECS: (f64, f64) = (1.0, 3.0);

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch records for all keywords. Implementations retry and then
    /// tolerate per-keyword failures, returning whatever accumulated; the
    /// `Result` seam lets the orchestrator survive a total failure without
    /// aborting the run.
    async fn fetch(&self, keywords: &[String]) -> Result<Vec<Record>>;
}
