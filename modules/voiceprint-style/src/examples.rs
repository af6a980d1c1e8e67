// Representative example selection.

use std::collections::HashSet;

use voiceprint_common::NormalizedPost;

use crate::analyzer::contains_emoji;

pub const DEFAULT_EXAMPLE_COUNT: usize = 10;

const SHORT_MAX_CHARS: usize = 40;
const LONG_MIN_CHARS: usize = 120;

/// Pick up to `count` distinct, non-empty texts that cover the author's range.
///
/// Buckets are drained in priority order (short, long, emoji, question or
/// exclamation), each in original order, until `count` is reached; any
/// remaining slots are filled from all texts in original order.
pub fn select_examples(posts: &[NormalizedPost], count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    let texts: Vec<&str> = posts
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect();

    let buckets: [Box<dyn Fn(&str) -> bool>; 4] = [
        Box::new(|t: &str| t.chars().count() < SHORT_MAX_CHARS),
        Box::new(|t: &str| t.chars().count() > LONG_MIN_CHARS),
        Box::new(contains_emoji),
        Box::new(|t: &str| t.contains('?') || t.contains('!')),
    ];

    let mut selected: Vec<String> = Vec::with_capacity(count);
    let mut seen: HashSet<&str> = HashSet::new();

    for in_bucket in &buckets {
        for text in texts.iter().copied().filter(|t: &&str| in_bucket(*t)) {
            if selected.len() >= count {
                return selected;
            }
            if seen.insert(text) {
                selected.push(text.to_string());
            }
        }
    }

    for text in texts.iter().copied() {
        if selected.len() >= count {
            break;
        }
        if seen.insert(text) {
            selected.push(text.to_string());
        }
    }

    selected
}
