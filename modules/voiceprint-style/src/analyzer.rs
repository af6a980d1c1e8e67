// Style analysis: normalized posts -> StyleProfile.
//
// Pure and deterministic for a given input order; the only non-derived field
// is `analyzed_at`, which callers can pin with `analyze_at`.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use voiceprint_common::{
    Capitalization, Formality, Level, Metrics, NormalizedPost, PersonalityType,
    PunctuationPatterns, SignatureTrait, StyleAssessment, StyleProfile, StyleSignature, Tone,
    WritingStyle,
};

use crate::error::AnalysisError;
use crate::examples::{select_examples, DEFAULT_EXAMPLE_COUNT};
use crate::themes::detect_themes;

static RE_CAPS_2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").unwrap());
static RE_CAPS_3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{3,}\b").unwrap());
static RE_SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());
static RE_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{1F300}-\x{1FAFF}\x{1F600}-\x{1F64F}\x{1F1E6}-\x{1F1FF}\x{2600}-\x{27BF}]")
        .unwrap()
});

const FORMAL_MIN_AVG_LENGTH: f64 = 120.0;
/// Share of post count a corpus-wide feature count must exceed.
const DOMINANCE_RATIO: f64 = 0.3;
const CAPS_RATIO: f64 = 0.2;

pub(crate) fn contains_emoji(text: &str) -> bool {
    RE_EMOJI.is_match(text)
}

pub fn analyze(posts: &[NormalizedPost]) -> Result<StyleProfile, AnalysisError> {
    analyze_at(posts, Utc::now())
}

pub fn analyze_at(
    posts: &[NormalizedPost],
    analyzed_at: DateTime<Utc>,
) -> Result<StyleProfile, AnalysisError> {
    if posts.is_empty() {
        return Err(AnalysisError::EmptyCorpus);
    }

    let n = posts.len() as f64;
    let corpus = posts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mean_length = mean_text_length(posts);
    let metrics = compute_metrics(posts, mean_length);

    let exclamations = corpus.matches('!').count();
    let questions = corpus.matches('?').count();
    let caps_2 = RE_CAPS_2.find_iter(&corpus).count();
    let caps_3 = RE_CAPS_3.find_iter(&corpus).count();

    let style_assessment = StyleAssessment {
        formality: if mean_length > FORMAL_MIN_AVG_LENGTH {
            Formality::Formal
        } else {
            Formality::Casual
        },
        tone: tone(exclamations, questions, n),
        hashtag_frequency: if metrics.hashtag_usage > 1.0 {
            Level::High
        } else {
            Level::Low
        },
        engagement: if metrics.mention_usage > 0.5 {
            Level::High
        } else {
            Level::Low
        },
        capitalization: capitalization(caps_2, n),
    };

    let words: Vec<&str> = corpus.split_whitespace().collect();
    let sentences = RE_SENTENCE_END
        .split(&corpus)
        .filter(|s| !s.trim().is_empty())
        .count();
    let unique_words: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

    let writing_style = WritingStyle {
        avg_sentence_length: if sentences == 0 {
            0.0
        } else {
            round1(words.len() as f64 / sentences as f64)
        },
        emoji_usage: round2(RE_EMOJI.find_iter(&corpus).count() as f64 / n),
        punctuation_patterns: PunctuationPatterns {
            exclamations,
            questions,
            ellipses: corpus.matches("...").count(),
            caps_words: caps_3,
        },
        capitalization_style: capitalization(caps_3, n),
        word_richness: if words.is_empty() {
            0.0
        } else {
            round2(unique_words.len() as f64 / words.len() as f64)
        },
    };

    let content_focus = detect_themes(&corpus);
    let signature_traits =
        signature_traits(mean_length, &metrics, &writing_style, &content_focus);
    let personality_type = personality(&signature_traits);

    debug!(
        posts = posts.len(),
        personality = %personality_type,
        themes = content_focus.len(),
        "Analyzed corpus"
    );

    Ok(StyleProfile {
        metrics,
        style_assessment,
        style_signature: StyleSignature {
            writing_style,
            content_focus,
            signature_traits,
            personality_type,
        },
        example_tweets: select_examples(posts, DEFAULT_EXAMPLE_COUNT),
        analyzed_at,
    })
}

/// Unrounded mean character length over non-empty texts. Thresholds compare
/// against this; only the stored metric is rounded.
fn mean_text_length(posts: &[NormalizedPost]) -> f64 {
    let lengths: Vec<usize> = posts
        .iter()
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text.chars().count())
        .collect();
    if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    }
}

fn compute_metrics(posts: &[NormalizedPost], mean_length: f64) -> Metrics {
    let n = posts.len() as f64;
    let per_post = |count: usize| round2(count as f64 / n);

    Metrics {
        tweet_count: posts.len(),
        avg_length: round1(mean_length),
        hashtag_usage: per_post(posts.iter().map(|p| p.hashtags.len()).sum()),
        mention_usage: per_post(posts.iter().map(|p| p.mentions.len()).sum()),
        exclamation_frequency: per_post(posts.iter().map(|p| p.text.matches('!').count()).sum()),
        question_frequency: per_post(posts.iter().map(|p| p.text.matches('?').count()).sum()),
    }
}

fn tone(exclamations: usize, questions: usize, n: f64) -> Tone {
    if exclamations > questions {
        if exclamations as f64 > DOMINANCE_RATIO * n {
            Tone::Emphatic
        } else {
            Tone::Assertive
        }
    } else if questions > exclamations && questions as f64 > DOMINANCE_RATIO * n {
        Tone::Inquisitive
    } else {
        Tone::Neutral
    }
}

fn capitalization(caps_words: usize, n: f64) -> Capitalization {
    if caps_words as f64 > CAPS_RATIO * n {
        Capitalization::Emphatic
    } else {
        Capitalization::Normal
    }
}

fn signature_traits(
    mean_length: f64,
    metrics: &Metrics,
    writing: &WritingStyle,
    content_focus: &[String],
) -> Vec<SignatureTrait> {
    let mut traits = Vec::new();
    if mean_length < 50.0 {
        traits.push(SignatureTrait::Minimalist);
    }
    if metrics.exclamation_frequency > 0.2 {
        traits.push(SignatureTrait::Emphatic);
    }
    if writing.emoji_usage > 0.1 {
        traits.push(SignatureTrait::Expressive);
    }
    if content_focus.iter().any(|t| t == "humor" || t == "memes") {
        traits.push(SignatureTrait::Humorous);
    }
    if metrics.mention_usage > 0.6 {
        traits.push(SignatureTrait::Connector);
    }
    traits
}

/// First matching rule wins.
fn personality(traits: &[SignatureTrait]) -> PersonalityType {
    let has = |t: SignatureTrait| traits.contains(&t);
    use SignatureTrait::*;

    if has(Minimalist) && has(Emphatic) {
        PersonalityType::Provocateur
    } else if has(Connector) && has(Expressive) {
        PersonalityType::Influencer
    } else if has(Humorous) {
        PersonalityType::Memer
    } else if has(Expressive) && !has(Minimalist) {
        PersonalityType::Poet
    } else {
        PersonalityType::Poster
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain-text fixture with hashtags and mentions pulled out of the text.
    fn post(text: &str) -> NormalizedPost {
        let tags = Regex::new(r"#(\w+)").unwrap();
        let mentions = Regex::new(r"@(\w+)").unwrap();
        NormalizedPost {
            text: text.to_string(),
            hashtags: tags.captures_iter(text).map(|c| c[1].to_string()).collect(),
            mentions: mentions.captures_iter(text).map(|c| c[1].to_string()).collect(),
            ..Default::default()
        }
    }

    fn posts(texts: &[&str]) -> Vec<NormalizedPost> {
        texts.iter().map(|t| post(t)).collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(analyze(&[]).unwrap_err(), AnalysisError::EmptyCorpus);
    }

    #[test]
    fn two_post_scenario() {
        let profile = analyze(&posts(&["Hello world", "AMAZING news!!!"])).unwrap();

        assert_eq!(profile.metrics.tweet_count, 2);
        assert_eq!(profile.metrics.avg_length, 13.0);
        assert_eq!(profile.metrics.exclamation_frequency, 1.5);
        assert_eq!(profile.style_assessment.tone, Tone::Emphatic);
        assert_eq!(profile.style_assessment.capitalization, Capitalization::Emphatic);
        assert_eq!(profile.style_assessment.formality, Formality::Casual);
        assert_eq!(
            profile.style_signature.signature_traits,
            vec![SignatureTrait::Minimalist, SignatureTrait::Emphatic]
        );
        assert_eq!(
            profile.style_signature.personality_type,
            PersonalityType::Provocateur
        );
        assert_eq!(profile.style_signature.writing_style.avg_sentence_length, 4.0);
        assert_eq!(profile.style_signature.writing_style.punctuation_patterns.exclamations, 3);
        assert_eq!(profile.style_signature.writing_style.punctuation_patterns.caps_words, 1);
    }

    #[test]
    fn rates_are_per_post_and_rounded() {
        let profile = analyze(&posts(&["#a #b @x", "#c", "plain"])).unwrap();
        assert_eq!(profile.metrics.hashtag_usage, 1.0);
        assert_eq!(profile.metrics.mention_usage, 0.33);
        assert_eq!(profile.style_assessment.hashtag_frequency, Level::Low);
        assert_eq!(profile.style_assessment.engagement, Level::Low);
    }

    #[test]
    fn long_posts_are_formal() {
        let long = "word ".repeat(30);
        let profile = analyze(&posts(&[long.trim()])).unwrap();
        assert!(profile.metrics.avg_length > 120.0);
        assert_eq!(profile.style_assessment.formality, Formality::Formal);
    }

    fn padded_to(len: usize) -> String {
        let mut text = "x".repeat(len - 1);
        text.push('.');
        text
    }

    #[test]
    fn formality_uses_unrounded_mean() {
        // 24 x 120 chars + 1 x 121 chars: mean 120.04, stored as 120.0.
        let mut texts: Vec<String> = (0..24).map(|_| padded_to(120)).collect();
        texts.push(padded_to(121));
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let profile = analyze(&posts(&refs)).unwrap();

        assert_eq!(profile.metrics.avg_length, 120.0);
        assert_eq!(profile.style_assessment.formality, Formality::Formal);
    }

    #[test]
    fn minimalist_uses_unrounded_mean() {
        // 24 x 50 chars + 1 x 49 chars: mean 49.96, stored as 50.0.
        let mut texts: Vec<String> = (0..24).map(|_| padded_to(50)).collect();
        texts.push(padded_to(49));
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let profile = analyze(&posts(&refs)).unwrap();

        assert_eq!(profile.metrics.avg_length, 50.0);
        assert!(profile
            .style_signature
            .signature_traits
            .contains(&SignatureTrait::Minimalist));
    }

    #[test]
    fn avg_length_ignores_empty_texts() {
        let profile = analyze(&posts(&["abcd", ""])).unwrap();
        assert_eq!(profile.metrics.avg_length, 4.0);
        assert_eq!(profile.metrics.tweet_count, 2);
    }

    #[test]
    fn question_dominant_tone() {
        let profile = analyze(&posts(&["why?", "how?", "ok"])).unwrap();
        assert_eq!(profile.style_assessment.tone, Tone::Inquisitive);
    }

    #[test]
    fn sparse_exclamations_are_assertive() {
        let texts: Vec<String> = (0..10).map(|i| format!("note {i}")).collect();
        let mut refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        refs.push("done!");
        let profile = analyze(&posts(&refs)).unwrap();
        assert_eq!(profile.style_assessment.tone, Tone::Assertive);
    }

    #[test]
    fn balanced_punctuation_is_neutral() {
        let profile = analyze(&posts(&["what?", "yes!"])).unwrap();
        assert_eq!(profile.style_assessment.tone, Tone::Neutral);
    }

    #[test]
    fn emoji_heavy_author_is_expressive_poet() {
        let text = "a long enough reflective line about the sea and the sky \u{1F30A}\u{2728}";
        let profile = analyze(&posts(&[text, text])).unwrap();
        let sig = &profile.style_signature;
        assert!(sig.writing_style.emoji_usage > 0.1);
        assert!(sig.signature_traits.contains(&SignatureTrait::Expressive));
        assert_eq!(sig.personality_type, PersonalityType::Poet);
    }

    #[test]
    fn humor_theme_makes_memer() {
        let profile = analyze(&posts(&[
            "this standup set was so funny, I still think about the closing bit",
        ]))
        .unwrap();
        assert!(profile.style_signature.content_focus.contains(&"humor".to_string()));
        assert_eq!(profile.style_signature.personality_type, PersonalityType::Memer);
    }

    #[test]
    fn connector_and_expressive_is_influencer() {
        let profile = analyze(&posts(&[
            "huge thanks to @ana and @ben for hosting tonight, what a crowd \u{1F389}",
            "catch @ana on the panel next week with the whole team there \u{1F389}",
        ]))
        .unwrap();
        assert_eq!(
            profile.style_signature.personality_type,
            PersonalityType::Influencer
        );
    }

    #[test]
    fn word_richness_is_case_folded() {
        let profile = analyze(&posts(&["Go go GO"])).unwrap();
        assert_eq!(profile.style_signature.writing_style.word_richness, 0.33);
    }

    #[test]
    fn ellipses_counted() {
        let profile = analyze(&posts(&["well... maybe... idk"])).unwrap();
        assert_eq!(profile.style_signature.writing_style.punctuation_patterns.ellipses, 2);
    }

    #[test]
    fn deterministic_for_same_input_order() {
        let input = posts(&[
            "Big launch today! \u{1F680}",
            "Why does nobody talk about this?",
            "ok",
            "Rates, inflation and the stock market in one long thread about why the economy feels the way it does right now",
        ]);
        let at = Utc::now();
        assert_eq!(analyze_at(&input, at).unwrap(), analyze_at(&input, at).unwrap());
    }
}
