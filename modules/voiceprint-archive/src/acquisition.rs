// Timeline acquisition: cursor pagination over a PostSource with repost
// filtering and a hard page cap.

use std::sync::Arc;

use tracing::{debug, info, warn};

use voiceprint_common::{clean_handle, NormalizedPost, MAX_TWEET_COUNT};

use crate::error::{ArchiveError, Result};
use crate::normalize::{is_repost, normalize};
use crate::source::PostSource;

/// Maximum upstream requests per collection.
pub const MAX_PAGES: usize = 5;

pub struct TimelineCollector {
    source: Arc<dyn PostSource>,
}

impl TimelineCollector {
    pub fn new(source: Arc<dyn PostSource>) -> Self {
        Self { source }
    }

    /// Collect up to `target_count` (capped at 100) original posts for a handle.
    ///
    /// Pages are requested strictly in sequence, each with the previous
    /// page's cursor. Stops on reaching the target, on a missing or empty
    /// cursor, on an empty page, or after [`MAX_PAGES`] requests. A failure on
    /// a later page returns what was accumulated; only a first-page failure
    /// is an error.
    pub async fn fetch_posts(&self, handle: &str, target_count: usize) -> Result<Vec<NormalizedPost>> {
        let handle = clean_handle(handle);
        if handle.is_empty() {
            return Err(ArchiveError::EmptyCorpus(String::new()));
        }
        let target = target_count.clamp(1, MAX_TWEET_COUNT);

        info!(handle, target, "timeline: collecting posts");

        let mut posts: Vec<NormalizedPost> = Vec::with_capacity(target);
        let mut cursor = String::new();
        let mut reposts_skipped = 0usize;

        for page_number in 1..=MAX_PAGES {
            let page = match self.source.fetch_page(handle, &cursor).await {
                Ok(page) => page,
                Err(e) if page_number == 1 => {
                    warn!(handle, error = %e, "timeline: first page failed");
                    return Err(ArchiveError::Upstream {
                        handle: handle.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(
                        handle,
                        page = page_number,
                        kept = posts.len(),
                        error = %e,
                        "timeline: page failed, keeping partial results"
                    );
                    break;
                }
            };

            if page.tweets.is_empty() {
                debug!(handle, page = page_number, "timeline: empty page");
                break;
            }

            for raw in &page.tweets {
                let post = normalize(Some(raw));
                if is_repost(raw, &post) {
                    reposts_skipped += 1;
                    continue;
                }
                posts.push(post);
            }

            debug!(
                handle,
                page = page_number,
                received = page.tweets.len(),
                total = posts.len(),
                "timeline: page processed"
            );

            if posts.len() >= target {
                break;
            }

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = next,
                _ => break,
            }
        }

        posts.truncate(target);
        info!(
            handle,
            count = posts.len(),
            reposts_skipped,
            "timeline: collection finished"
        );

        Ok(posts)
    }
}
