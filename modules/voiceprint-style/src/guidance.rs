// Guidance rendering: profiles -> text a writer (human or model) can follow.

use serde::Serialize;

use voiceprint_common::{SignatureTrait, StyleProfile};

pub const MAX_GUIDANCE_EXAMPLES: usize = 10;

/// Blended numeric and qualitative targets across one or more profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendTargets {
    pub avg_length: i64,
    /// Never below 1.
    pub avg_hashtags: i64,
    pub avg_mentions: i64,
    pub mixed_tone: String,
    pub mixed_formality: String,
    /// Union of all trait sets, first-seen order.
    pub mixed_traits: Vec<SignatureTrait>,
}

impl BlendTargets {
    /// Arithmetic means over all profiles. `None` for an empty slice.
    pub fn from_profiles(profiles: &[&StyleProfile]) -> Option<Self> {
        if profiles.is_empty() {
            return None;
        }
        let n = profiles.len() as f64;
        let mean = |f: fn(&StyleProfile) -> f64| profiles.iter().map(|p| f(p)).sum::<f64>() / n;

        let mut mixed_traits = Vec::new();
        for profile in profiles {
            for t in &profile.style_signature.signature_traits {
                if !mixed_traits.contains(t) {
                    mixed_traits.push(*t);
                }
            }
        }

        Some(Self {
            avg_length: mean(|p| p.metrics.avg_length).round() as i64,
            avg_hashtags: (mean(|p| p.metrics.hashtag_usage).round() as i64).max(1),
            avg_mentions: mean(|p| p.metrics.mention_usage).round() as i64,
            mixed_tone: profiles
                .iter()
                .map(|p| p.style_assessment.tone.to_string())
                .collect::<Vec<_>>()
                .join(" + "),
            mixed_formality: profiles
                .iter()
                .map(|p| p.style_assessment.formality.to_string())
                .collect::<Vec<_>>()
                .join(" / "),
            mixed_traits,
        })
    }
}

fn join_or<T: ToString>(items: &[T], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn render_single(handle: &str, profile: &StyleProfile) -> String {
    let m = &profile.metrics;
    let a = &profile.style_assessment;
    let sig = &profile.style_signature;
    let w = &sig.writing_style;
    let p = &w.punctuation_patterns;

    let examples = profile
        .example_tweets
        .iter()
        .take(MAX_GUIDANCE_EXAMPLES)
        .enumerate()
        .map(|(i, text)| format!("{}. \"{}\"", i + 1, text))
        .collect::<Vec<_>>();
    let examples = if examples.is_empty() {
        "(none)".to_string()
    } else {
        examples.join("\n")
    };

    format!(
        r#"## Voice: @{handle}
Personality: {personality}
Signature traits: {traits}
Content focus: {focus}

### Metrics
- Posts analyzed: {tweet_count}
- Average length: {avg_length} characters
- Hashtags per post: {hashtags}
- Mentions per post: {mentions}
- Exclamations per post: {exclamations}
- Questions per post: {questions}

### Style
- Formality: {formality}
- Tone: {tone}
- Capitalization: {capitalization} (all-caps habit: {caps_style})
- Hashtag frequency: {hashtag_frequency}
- Engagement: {engagement}
- Average sentence length: {sentence_length} words
- Emoji per post: {emoji}
- Word richness: {richness}
- Punctuation: {p_excl} exclamations, {p_q} questions, {p_ell} ellipses, {p_caps} all-caps words

### Example posts
{examples}"#,
        personality = sig.personality_type,
        traits = join_or(&sig.signature_traits, "none"),
        focus = join_or(&sig.content_focus, "general"),
        tweet_count = m.tweet_count,
        avg_length = m.avg_length,
        hashtags = m.hashtag_usage,
        mentions = m.mention_usage,
        exclamations = m.exclamation_frequency,
        questions = m.question_frequency,
        formality = a.formality,
        tone = a.tone,
        capitalization = a.capitalization,
        caps_style = w.capitalization_style,
        hashtag_frequency = a.hashtag_frequency,
        engagement = a.engagement,
        sentence_length = w.avg_sentence_length,
        emoji = w.emoji_usage,
        richness = w.word_richness,
        p_excl = p.exclamations,
        p_q = p.questions,
        p_ell = p.ellipses,
        p_caps = p.caps_words,
    )
}

pub fn render_blend(
    handle_a: &str,
    profile_a: &StyleProfile,
    handle_b: &str,
    profile_b: &StyleProfile,
) -> String {
    render_multi(&[(handle_a, profile_a), (handle_b, profile_b)])
}

/// Blended targets for all voices followed by one snapshot per voice, in
/// input order.
pub fn render_multi(voices: &[(&str, &StyleProfile)]) -> String {
    let profiles: Vec<&StyleProfile> = voices.iter().map(|(_, p)| *p).collect();
    let Some(targets) = BlendTargets::from_profiles(&profiles) else {
        return String::new();
    };

    let names = voices
        .iter()
        .map(|(h, _)| format!("@{h}"))
        .collect::<Vec<_>>()
        .join(" + ");
    let snapshots = voices
        .iter()
        .map(|(h, p)| render_single(h, p))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"## Blended voice: {names}

### Targets
- Length: ~{length} characters
- Hashtags: {hashtags}
- Mentions: {mentions}
- Tone: {tone}
- Formality: {formality}
- Traits: {traits}

### Voice snapshots

{snapshots}"#,
        length = targets.avg_length,
        hashtags = targets.avg_hashtags,
        mentions = targets.avg_mentions,
        tone = targets.mixed_tone,
        formality = targets.mixed_formality,
        traits = join_or(&targets.mixed_traits, "none"),
    )
}

/// Ready-to-send instruction for writing one post about `topic`.
/// A single voice gets its own profile; several get the blend.
pub fn generation_prompt(voices: &[(&str, &StyleProfile)], topic: &str) -> String {
    let (subject, guidance) = match voices {
        [(handle, profile)] => (
            format!("in the voice of @{handle}"),
            render_single(handle, profile),
        ),
        _ => {
            let names = voices
                .iter()
                .map(|(h, _)| format!("@{h}"))
                .collect::<Vec<_>>()
                .join(", ");
            (format!("blending the voices of {names}"), render_multi(voices))
        }
    };

    format!(
        r#"Write one original post about "{topic}" {subject}.

{guidance}

## Instructions
- Stay within 280 characters.
- Match the length, tone, formality and traits described above.
- Use hashtags, mentions and emoji only at the rates shown.
- Do not copy the example posts; use them only to calibrate the voice.
- Reply with the post text only."#
    )
}
