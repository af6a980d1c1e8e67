// Record normalization: any upstream post shape -> NormalizedPost.
//
// Each field has a fixed list of alternate key names, tried in order on the
// record itself and then on a nested `legacy` object (GraphQL-era payloads).
// The first usable value wins. Nothing here fails: unknown shapes fall back
// to field defaults.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use voiceprint_common::NormalizedPost;

static RE_HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());
static RE_MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)").unwrap());

const ID_KEYS: &[&str] = &["id", "id_str", "tweet_id", "rest_id"];
const TEXT_KEYS: &[&str] = &["text", "full_text", "tweet_text", "content"];
const LIKE_KEYS: &[&str] = &["likeCount", "like_count", "favorite_count", "favorites", "likes"];
const RETWEET_KEYS: &[&str] = &["retweetCount", "retweet_count", "retweets"];
const REPLY_KEYS: &[&str] = &["replyCount", "reply_count", "replies"];
const QUOTE_KEYS: &[&str] = &["quoteCount", "quote_count", "quotes"];
const CREATED_KEYS: &[&str] = &["createdAt", "created_at", "timestamp", "date"];
const IS_REPLY_KEYS: &[&str] = &["isReply", "is_reply"];
const REPLY_TARGET_KEYS: &[&str] = &[
    "inReplyToId",
    "inReplyToStatusId",
    "in_reply_to_status_id",
    "in_reply_to_status_id_str",
];
const LANGUAGE_KEYS: &[&str] = &["lang", "language"];

const REPOST_FLAG_KEYS: &[&str] = &["isRetweet", "is_retweet"];
const REPOST_OBJECT_KEYS: &[&str] = &["retweeted_tweet", "retweetedTweet", "retweeted_status"];

const HASHTAG_ENTITY_KEYS: &[&str] = &["hashtags"];
const MENTION_ENTITY_KEYS: &[&str] = &["user_mentions", "mentions"];
const URL_ENTITY_KEYS: &[&str] = &["urls"];

const HASHTAG_FIELDS: &[&str] = &["text", "tag"];
const MENTION_FIELDS: &[&str] = &["screen_name", "userName", "username"];
const URL_FIELDS: &[&str] = &["expanded_url", "expandedUrl", "url", "display_url"];

/// Map a raw upstream record to the canonical shape. `None`, non-objects and
/// objects with no known keys all yield the all-defaults record.
pub fn normalize(raw: Option<&Value>) -> NormalizedPost {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return NormalizedPost::default();
    };
    let layers = layers(obj);

    let text = first_of(&layers, TEXT_KEYS, as_text).unwrap_or_default();

    let is_reply = first_of(&layers, IS_REPLY_KEYS, as_bool).unwrap_or_else(|| {
        first_of(&layers, REPLY_TARGET_KEYS, |v| (!v.is_null()).then_some(true)).unwrap_or(false)
    });

    let entities: Vec<&Map<String, Value>> = layers
        .iter()
        .filter_map(|layer| layer.get("entities").and_then(Value::as_object))
        .collect();

    let hashtags = entity_list(&entities, HASHTAG_ENTITY_KEYS, HASHTAG_FIELDS)
        .or_else(|| first_of(&layers, &["hashtags"], as_string_list))
        .unwrap_or_else(|| extract_tokens(&RE_HASHTAG, &text));

    let mentions = entity_list(&entities, MENTION_ENTITY_KEYS, MENTION_FIELDS)
        .or_else(|| first_of(&layers, &["mentions"], as_string_list))
        .unwrap_or_else(|| extract_tokens(&RE_MENTION, &text));

    // No plain-text URL extraction.
    let urls = entity_list(&entities, URL_ENTITY_KEYS, URL_FIELDS)
        .or_else(|| first_of(&layers, &["urls"], as_string_list))
        .unwrap_or_default();

    NormalizedPost {
        id: first_of(&layers, ID_KEYS, as_id).unwrap_or_default(),
        like_count: first_of(&layers, LIKE_KEYS, as_count).unwrap_or_default(),
        retweet_count: first_of(&layers, RETWEET_KEYS, as_count).unwrap_or_default(),
        reply_count: first_of(&layers, REPLY_KEYS, as_count).unwrap_or_default(),
        quote_count: first_of(&layers, QUOTE_KEYS, as_count).unwrap_or_default(),
        created_at: first_of(&layers, CREATED_KEYS, as_id).unwrap_or_default(),
        is_reply,
        hashtags,
        mentions,
        urls,
        language: first_of(&layers, LANGUAGE_KEYS, as_text).unwrap_or_default(),
        text,
    }
}

/// A record is a repost if its text starts with `RT @` or it carries an
/// explicit repost flag or embedded reposted object.
pub fn is_repost(raw: &Value, post: &NormalizedPost) -> bool {
    if post.text.starts_with("RT @") {
        return true;
    }
    let Some(obj) = raw.as_object() else {
        return false;
    };
    let layers = layers(obj);
    first_of(&layers, REPOST_FLAG_KEYS, as_bool).unwrap_or(false)
        || first_of(&layers, REPOST_OBJECT_KEYS, |v| v.is_object().then_some(true)).unwrap_or(false)
}

fn layers(obj: &Map<String, Value>) -> Vec<&Map<String, Value>> {
    let mut layers = vec![obj];
    if let Some(legacy) = obj.get("legacy").and_then(Value::as_object) {
        layers.push(legacy);
    }
    layers
}

/// First key (in priority order, across layers) whose value `convert` accepts.
fn first_of<T>(
    layers: &[&Map<String, Value>],
    keys: &[&str],
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    layers
        .iter()
        .flat_map(|layer| keys.iter().filter_map(move |key| layer.get(*key)))
        .find_map(convert)
}

fn entity_list(
    entities: &[&Map<String, Value>],
    list_keys: &[&str],
    item_fields: &[&str],
) -> Option<Vec<String>> {
    let items = entities
        .iter()
        .flat_map(|e| list_keys.iter().filter_map(move |key| e.get(*key)))
        .find_map(Value::as_array)?;

    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(fields) => item_fields
                    .iter()
                    .filter_map(|f| fields.get(*f))
                    .find_map(as_text),
                _ => None,
            })
            .map(|s| s.trim_start_matches(['#', '@']).to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn extract_tokens(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Strings or numbers (ids and timestamps arrive as either).
fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_yields_defaults() {
        assert_eq!(normalize(None), NormalizedPost::default());
        assert_eq!(normalize(Some(&Value::Null)), NormalizedPost::default());
    }

    #[test]
    fn non_object_yields_defaults() {
        assert_eq!(normalize(Some(&json!("just text"))), NormalizedPost::default());
        assert_eq!(normalize(Some(&json!([1, 2]))), NormalizedPost::default());
    }

    #[test]
    fn empty_and_unknown_objects_yield_defaults() {
        assert_eq!(normalize(Some(&json!({}))), NormalizedPost::default());
        assert_eq!(
            normalize(Some(&json!({"foo": 1, "bar": {"baz": true}}))),
            NormalizedPost::default()
        );
    }

    #[test]
    fn camel_case_shape() {
        let post = normalize(Some(&json!({
            "id": "123",
            "text": "Shipping today #rust @ferris",
            "likeCount": 10,
            "retweetCount": 2,
            "replyCount": 1,
            "quoteCount": 0,
            "createdAt": "Tue Dec 10 07:00:30 +0000 2024",
            "isReply": false,
            "lang": "en"
        })));
        assert_eq!(post.id, "123");
        assert_eq!(post.like_count, 10);
        assert_eq!(post.retweet_count, 2);
        assert_eq!(post.reply_count, 1);
        assert_eq!(post.created_at, "Tue Dec 10 07:00:30 +0000 2024");
        assert_eq!(post.language, "en");
        assert_eq!(post.hashtags, vec!["rust"]);
        assert_eq!(post.mentions, vec!["ferris"]);
        assert!(post.urls.is_empty());
    }

    #[test]
    fn snake_case_and_alternate_names() {
        let post = normalize(Some(&json!({
            "tweet_id": 99,
            "tweet_text": "hello",
            "favorites": "1,204",
            "retweets": -3,
            "in_reply_to_status_id": "42"
        })));
        assert_eq!(post.id, "99");
        assert_eq!(post.text, "hello");
        assert_eq!(post.like_count, 1204);
        assert_eq!(post.retweet_count, 0);
        assert!(post.is_reply);
    }

    #[test]
    fn first_match_wins() {
        let post = normalize(Some(&json!({
            "like_count": 5,
            "likeCount": 7,
            "content": "ignored",
            "text": "primary"
        })));
        assert_eq!(post.like_count, 7);
        assert_eq!(post.text, "primary");
    }

    #[test]
    fn empty_text_falls_through_to_next_key() {
        let post = normalize(Some(&json!({"text": "", "full_text": "the real text"})));
        assert_eq!(post.text, "the real text");
    }

    #[test]
    fn legacy_layer_is_read() {
        let post = normalize(Some(&json!({
            "rest_id": "7",
            "legacy": {"full_text": "from legacy", "favorite_count": 3}
        })));
        assert_eq!(post.id, "7");
        assert_eq!(post.text, "from legacy");
        assert_eq!(post.like_count, 3);
    }

    #[test]
    fn entities_take_precedence_over_regex() {
        let post = normalize(Some(&json!({
            "text": "#ignored @ignored",
            "entities": {
                "hashtags": [{"text": "Official"}],
                "user_mentions": [{"screen_name": "someone"}],
                "urls": [{"expanded_url": "https://example.com/a", "url": "https://t.co/x"}]
            }
        })));
        assert_eq!(post.hashtags, vec!["Official"]);
        assert_eq!(post.mentions, vec!["someone"]);
        assert_eq!(post.urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn urls_are_not_scraped_from_text() {
        let post = normalize(Some(&json!({"text": "read https://example.com now"})));
        assert!(post.urls.is_empty());
    }

    #[test]
    fn canonical_shape_is_a_fixed_point() {
        let first = normalize(Some(&json!({
            "id": "1",
            "full_text": "plain text",
            "favorite_count": 4,
            "entities": {"hashtags": [{"text": "a"}], "urls": [{"url": "https://t.co/z"}]},
            "isReply": true
        })));
        let as_value = serde_json::to_value(&first).unwrap();
        let second = normalize(Some(&as_value));
        assert_eq!(first, second);
        let third = normalize(Some(&serde_json::to_value(&second).unwrap()));
        assert_eq!(second, third);
    }

    #[test]
    fn repost_by_text_prefix() {
        let raw = json!({"text": "RT @x cool"});
        let post = normalize(Some(&raw));
        assert!(is_repost(&raw, &post));
    }

    #[test]
    fn repost_by_flag() {
        let raw = json!({"text": "looks original", "isRetweet": true});
        let post = normalize(Some(&raw));
        assert!(is_repost(&raw, &post));
    }

    #[test]
    fn repost_by_embedded_object() {
        let raw = json!({"text": "looks original", "retweeted_tweet": {"id": "5"}});
        let post = normalize(Some(&raw));
        assert!(is_repost(&raw, &post));
    }

    #[test]
    fn quoted_rt_mid_text_is_not_repost() {
        let raw = json!({"text": "love this RT @x", "isRetweet": false, "retweeted_tweet": null});
        let post = normalize(Some(&raw));
        assert!(!is_repost(&raw, &post));
    }
}
