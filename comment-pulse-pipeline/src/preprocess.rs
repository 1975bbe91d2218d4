use {
    std::collections::HashSet,
    regex::Regex,
    once_cell::sync::Lazy,
    rust_stemmers::{Algorithm, Stemmer},
    stopwords::{Language, Stopwords, NLTK},
    tracing::debug,
    comment_pulse_core::{
        config::PipelineConfig,
        entity::{RawComment, Comment},
    },
};

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:[a-zA-Z0-9]|[\x24-\x5f]|[!*(),]|%[0-9a-fA-F]{2})+").unwrap());
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static EMOJI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // emoticons, symbols and pictographs, transport, flags, dingbats, enclosed chars
    Regex::new(concat!(
        "[",
        "\u{1F600}-\u{1F64F}",
        "\u{1F300}-\u{1F5FF}",
        "\u{1F680}-\u{1F6FF}",
        "\u{1F1E0}-\u{1F1FF}",
        "\u{2702}-\u{27B0}",
        "\u{24C2}-\u{1F251}",
        "]+",
    )).unwrap()
});
static SPECIAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").unwrap());
static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Records whose cleaned text ends up at or below this length carry no
/// signal for classification and are dropped.
const MIN_PROCESSED_LENGTH: usize = 3;

/// Normalize raw records into comments with `processed_text` populated,
/// dropping degenerate results and truncating long texts for display.
pub fn normalize_step(raw_comments: Vec<RawComment>, config: &PipelineConfig) -> Vec<Comment> {
    let stopword_set = stopword_set(&config.stopword_languages());
    let stemmer = config.apply_lemmatization().then(|| Stemmer::create(Algorithm::English));

    let mut comments = Vec::new();
    for raw in raw_comments {
        let processed = preprocess_text(&raw.text, &stopword_set, stemmer.as_ref());
        if processed.chars().count() > MIN_PROCESSED_LENGTH {
            comments.push(raw.processed(processed));
        }
    }

    truncate_long_comments(comments, config.comment_length_limit())
}

/// Fixed cleanup sub-pipeline. Every step is pure and idempotent on text it
/// has already cleaned.
pub fn preprocess_text(text: &str, stopword_set: &HashSet<&'static str>, stemmer: Option<&Stemmer>) -> String {
    let text = strip_urls(text);
    let text = strip_html_tags(&text);
    let text = strip_emojis(&text);
    let text = strip_special_characters(&text);
    let text = text.to_lowercase();
    let text = remove_stopwords(&text, stopword_set);

    let text = match stemmer {
        Some(stemmer) => stem_tokens(&text, stemmer),
        None => text,
    };

    text.trim().to_owned()
}

pub fn strip_urls(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").into_owned()
}

pub fn strip_html_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

pub fn strip_emojis(text: &str) -> String {
    EMOJI_PATTERN.replace_all(text, "").into_owned()
}

pub fn strip_special_characters(text: &str) -> String {
    let text = SPECIAL_PATTERN.replace_all(text, "");
    WHITESPACE_PATTERN.replace_all(&text, " ").trim().to_owned()
}

fn remove_stopwords(text: &str, stopword_set: &HashSet<&'static str>) -> String {
    text.split_whitespace()
        .filter(|word| !stopword_set.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn stem_tokens(text: &str, stemmer: &Stemmer) -> String {
    text.split_whitespace()
        .map(|token| stemmer.stem(token).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Union of the word lists for every configured language. Languages without
/// a list are skipped.
pub fn stopword_set(languages: &[String]) -> HashSet<&'static str> {
    let mut set = HashSet::new();
    for name in languages {
        match language_from_name(name).and_then(NLTK::stopwords) {
            Some(words) => set.extend(words.iter().copied()),
            None => debug!("no stopword list for language {:?}, skipping", name),
        }
    }
    set
}

fn language_from_name(name: &str) -> Option<Language> {
    match name.to_lowercase().as_str() {
        "english" => Some(Language::English),
        "french" => Some(Language::French),
        "german" => Some(Language::German),
        "spanish" => Some(Language::Spanish),
        "italian" => Some(Language::Italian),
        "portuguese" => Some(Language::Portuguese),
        "dutch" => Some(Language::Dutch),
        "russian" => Some(Language::Russian),
        _ => None,
    }
}

/// Cap both text fields for downstream display, marking the cut with an
/// ellipsis. The classifier applies its own independent length limit.
pub fn truncate_long_comments(comments: Vec<Comment>, max_length: usize) -> Vec<Comment> {
    comments.into_iter()
        .map(|mut comment| {
            comment.original_text = truncate_with_ellipsis(&comment.original_text, max_length);
            comment.processed_text = truncate_with_ellipsis(&comment.processed_text, max_length);
            comment
        })
        .collect()
}

fn truncate_with_ellipsis(text: &str, max_length: usize) -> String {
    if text.chars().count() > max_length {
        let truncated: String = text.chars().take(max_length).collect();
        format!("{}...", truncated)
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawComment {
        RawComment {
            id: "c1".to_owned(),
            author: "viewer".to_owned(),
            text: text.to_owned(),
            likes: 0,
            published: String::new(),
        }
    }

    fn english() -> HashSet<&'static str> {
        stopword_set(&["english".to_owned()])
    }

    #[test]
    fn strips_urls() {
        assert_eq!(
            strip_urls("check this https://youtu.be/abc?t=5 out"),
            "check this  out",
        );
        assert_eq!(strip_urls("no links here"), "no links here");
    }

    #[test]
    fn strips_html_tags() {
        assert_eq!(strip_html_tags("so <b>good</b><br>"), "so good");
    }

    #[test]
    fn strips_emojis() {
        assert_eq!(strip_emojis("nice video \u{1F600}\u{1F44D}"), "nice video ");
    }

    #[test]
    fn strips_special_characters_and_collapses_whitespace() {
        assert_eq!(
            strip_special_characters("wow!! #great   video... right?"),
            "wow!! great video... right?",
        );
    }

    #[test]
    fn character_stripping_is_idempotent_on_clean_text() {
        let clean = "already clean text, with punctuation!";
        let once = strip_special_characters(clean);
        assert_eq!(strip_special_characters(&once), once);

        let full = |t: &str| strip_special_characters(&strip_emojis(&strip_html_tags(&strip_urls(t))));
        let first = full(clean);
        assert_eq!(full(&first), first);
    }

    #[test]
    fn removes_english_stopwords() {
        let processed = preprocess_text("this is the best tutorial", &english(), None);
        assert!(!processed.contains("this"));
        assert!(!processed.contains("the"));
        assert!(processed.contains("best"));
        assert!(processed.contains("tutorial"));
    }

    #[test]
    fn stemming_reduces_tokens_to_base_form() {
        let stemmer = Stemmer::create(Algorithm::English);
        let processed = preprocess_text("amazing videos explained", &HashSet::new(), Some(&stemmer));
        assert_eq!(processed, "amaz video explain");
    }

    #[test]
    fn unknown_language_is_skipped() {
        let set = stopword_set(&["english".to_owned(), "klingon".to_owned()]);
        assert!(set.contains("the"));
    }

    #[test]
    fn drops_records_with_degenerate_processed_text() {
        let config = PipelineConfig::default();
        let comments = normalize_step(
            vec![
                raw("This tutorial really helped me understand the topic"),
                raw("ok"),
                raw("\u{1F600}\u{1F600}\u{1F600}"),
            ],
            &config,
        );

        assert_eq!(comments.len(), 1);
        assert!(comments[0].processed_text.chars().count() > 3);
    }

    #[test]
    fn output_never_exceeds_input_length() {
        let config = PipelineConfig::default();
        let input: Vec<_> = (0..10).map(|i| raw(&format!("comment number {} with content", i))).collect();
        let output = normalize_step(input.clone(), &config);
        assert!(output.len() <= input.len());
    }

    #[test]
    fn truncates_long_texts_with_ellipsis() {
        let long_text = "a".repeat(300);
        let comment = raw(&long_text).processed(long_text.clone());
        let truncated = truncate_long_comments(vec![comment], 200);

        assert_eq!(truncated[0].original_text.chars().count(), 203);
        assert!(truncated[0].original_text.ends_with("..."));
        assert!(truncated[0].processed_text.ends_with("..."));
    }

    #[test]
    fn short_texts_are_left_untouched() {
        let comment = raw("short one").processed("short one".to_owned());
        let truncated = truncate_long_comments(vec![comment], 200);
        assert_eq!(truncated[0].original_text, "short one");
    }
}
