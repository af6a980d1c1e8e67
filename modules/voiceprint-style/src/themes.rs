// Theme keyword table for content focus detection.
//
// The corpus is lower-cased, ASCII punctuation becomes whitespace, and the
// result is space-padded. Keywords are substrings of that haystack; short
// ones carry surrounding spaces so they only match whole words.

pub const THEMES: &[(&str, &[&str])] = &[
    (
        "ai",
        &[
            " ai ",
            "artificial intelligence",
            "machine learning",
            "gpt",
            " llm",
            "openai",
            "neural net",
            "chatbot",
        ],
    ),
    (
        "crypto",
        &[
            "bitcoin",
            "crypto",
            "ethereum",
            "blockchain",
            " btc ",
            " eth ",
            " defi ",
            " nft",
            "dogecoin",
        ],
    ),
    (
        "politics",
        &[
            "election",
            "president",
            "congress",
            "senate",
            "democrat",
            "republican",
            "government",
            "politic",
            " vote ",
            " votes ",
            " voting ",
        ],
    ),
    (
        "tech",
        &[
            " tech ",
            "technology",
            "software",
            "startup",
            "programming",
            "developer",
            "engineering",
            "open source",
            "silicon valley",
        ],
    ),
    (
        "space",
        &[
            "spacex", "rocket", " mars ", "nasa", " orbit", "satellite", "starship", "astronaut",
        ],
    ),
    (
        "humor",
        &[
            " lol ", "lmao", "haha", "funny", " joke", "\u{1F602}", "\u{1F923}",
        ],
    ),
    (
        "finance",
        &[
            " stock ",
            " stocks ",
            " markets ",
            " invest",
            "economy",
            "inflation",
            " trading ",
            "earnings",
            "interest rate",
            "recession",
        ],
    ),
    (
        "climate",
        &[
            "climate",
            "carbon",
            "emissions",
            "renewable",
            " solar ",
            "global warming",
            "sustainab",
        ],
    ),
    (
        "motivation",
        &[
            "motivat",
            " inspir",
            " success",
            "mindset",
            "hustle",
            " grind",
            "never give up",
            "believe in yourself",
        ],
    ),
    (
        "war",
        &[
            " war ", " wars ", "warfare", "military", "missile", "troops", "ceasefire",
            "invasion",
        ],
    ),
    (
        "freedom",
        &["freedom", "free speech", "liberty", "censorship"],
    ),
    (
        "philosophy",
        &[
            "philosoph",
            "meaning of life",
            "consciousness",
            "existence",
            " stoic",
            "wisdom",
        ],
    ),
    (
        "memes",
        &[
            " meme ", " memes ", " based ", " ratio ", " ratioed ", " no cap ", "\u{1F921}",
            "\u{1F480}",
        ],
    ),
];

/// Themes whose keywords occur anywhere in the corpus, in table order.
pub fn detect_themes(corpus: &str) -> Vec<String> {
    let haystack: String = format!(" {} ", corpus.to_lowercase())
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    THEMES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(theme, _)| theme.to_string())
        .collect()
}
