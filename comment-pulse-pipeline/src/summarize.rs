use {
    std::collections::HashMap,
    tracing::{info, warn},
    comment_pulse_core::{
        config::Config,
        entity::{CommentScored, Sentiment},
        llm::LlmClient,
    },
};

const NO_COMMENTS_MESSAGE: &str = "No comments available for summarization.";
const NO_MEANINGFUL_COMMENTS_MESSAGE: &str = "No meaningful comments found to summarize.";
const PROMPT_COMMENT_POOL: usize = 50;
const PROMPT_COMMENT_LIMIT: usize = 30;
const PROMPT_TEXT_LIMIT: usize = 200;
const MIN_MEANINGFUL_LENGTH: usize = 10;
const SUMMARY_MAX_TOKENS: u32 = 300;
const SUMMARY_TEMPERATURE: f32 = 0.3;
const TOPIC_TOKEN_MIN_LENGTH: usize = 3;
const TOPIC_MIN_FREQUENCY: usize = 2;
const TOPIC_LIMIT: usize = 5;

/// Produce the narrative summary: one LLM call when a credential exists,
/// otherwise (or on any provider failure) the deterministic local fallback.
pub async fn summarize_step(comments: &[CommentScored], config: &Config) -> String {
    if comments.is_empty() {
        return NO_COMMENTS_MESSAGE.to_owned();
    }

    if let Some(api_key) = config.groq_api_key() {
        info!("generating summary via llm provider");
        match summary_prompt(comments) {
            Some(prompt) => {
                match LlmClient::new(api_key).complete(&prompt, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE).await {
                    Ok(summary) => return summary,
                    Err(err) => warn!("llm summary failed: {}, falling back to local summary", err),
                }
            },
            None => return NO_MEANINGFUL_COMMENTS_MESSAGE.to_owned(),
        }
    }

    info!("generating summary locally");
    summarize_locally(comments)
}

/// Bounded prompt over the first comments; `None` when nothing is long
/// enough to be worth summarizing.
fn summary_prompt(comments: &[CommentScored]) -> Option<String> {
    let comment_lines: Vec<String> = comments.iter()
        .take(PROMPT_COMMENT_POOL)
        .filter(|comment| comment.original_text.trim().chars().count() > MIN_MEANINGFUL_LENGTH)
        .take(PROMPT_COMMENT_LIMIT)
        .map(|comment| format!("- {}", head_chars(&comment.original_text, PROMPT_TEXT_LIMIT)))
        .collect();

    if comment_lines.is_empty() {
        return None;
    }

    Some(format!(
        "Please analyze the following YouTube comments and provide a concise summary of the \
         main points, themes, and opinions expressed by viewers. Focus on the most common \
         topics and sentiments.\n\n\
         Comments:\n{}\n\n\
         Please provide a summary in 3-4 sentences covering:\n\
         1. Main topics discussed\n\
         2. Overall sentiment/tone\n\
         3. Key concerns or praise mentioned\n\
         4. Any notable patterns or trends\n\n\
         Summary:",
        comment_lines.join("\n"),
    ))
}

/// Deterministic frequency-based summary: dominant sentiment plus the most
/// repeated meaningful tokens across the first comments.
pub fn summarize_locally(comments: &[CommentScored]) -> String {
    if comments.is_empty() {
        return NO_COMMENTS_MESSAGE.to_owned();
    }

    let total_comments = comments.len();
    let positive_count = comments.iter().filter(|c| c.sentiment == Sentiment::Positive).count();
    let negative_count = total_comments - positive_count;

    let dominant_sentiment = if negative_count > positive_count {
        Sentiment::Negative
    } else {
        Sentiment::Positive
    };
    let dominant_count = positive_count.max(negative_count);
    let sentiment_percentage = (dominant_count as f64 / total_comments as f64) * 100.0;

    let common_topics = common_topics(comments);

    let mut summary = format!(
        "Analysis of {} comments shows a predominantly {} sentiment ({:.1}%). ",
        total_comments, dominant_sentiment, sentiment_percentage,
    );

    if !common_topics.is_empty() {
        summary.push_str(&format!("Common topics discussed include: {}. ", common_topics.join(", ")));
    }

    // the classifier is binary, so the neutral bucket stays at zero
    summary.push_str(&format!(
        "The comments contain {} positive, {} negative, and 0 neutral responses.",
        positive_count, negative_count,
    ));

    summary
}

fn common_topics(comments: &[CommentScored]) -> Vec<String> {
    let mut word_frequency: HashMap<&str, usize> = HashMap::new();
    for comment in comments.iter().take(PROMPT_COMMENT_LIMIT) {
        for word in comment.processed_text.split_whitespace() {
            if word.chars().count() > TOPIC_TOKEN_MIN_LENGTH {
                *word_frequency.entry(word).or_insert(0) += 1;
            }
        }
    }

    let mut frequent: Vec<(&str, usize)> = word_frequency.into_iter()
        .filter(|(_, count)| *count > TOPIC_MIN_FREQUENCY)
        .collect();
    // count descending, then alphabetical, so the output is stable
    frequent.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    frequent.into_iter()
        .take(TOPIC_LIMIT)
        .map(|(word, _)| word.to_owned())
        .collect()
}

fn head_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use comment_pulse_core::entity::SentimentScores;

    fn scored(original: &str, processed: &str, sentiment: Sentiment) -> CommentScored {
        CommentScored {
            id: "c".to_owned(),
            author: "viewer".to_owned(),
            original_text: original.to_owned(),
            processed_text: processed.to_owned(),
            likes: 0,
            published: String::new(),
            sentiment,
            confidence: 0.9,
            scores: SentimentScores { positive: 0.9, negative: 0.1 },
        }
    }

    #[test]
    fn empty_input_yields_fixed_message() {
        assert_eq!(summarize_locally(&[]), NO_COMMENTS_MESSAGE);
    }

    #[test]
    fn local_summary_reports_dominant_sentiment_and_counts() {
        let comments = vec![
            scored("Great tutorial", "great tutorial", Sentiment::Positive),
            scored("Loved it", "loved", Sentiment::Positive),
            scored("Too confusing", "confusing", Sentiment::Negative),
        ];

        let summary = summarize_locally(&comments);
        assert!(summary.contains("3 comments"));
        assert!(summary.contains("predominantly positive"));
        assert!(summary.contains("66.7%"));
        assert!(summary.contains("2 positive, 1 negative, and 0 neutral"));
    }

    #[test]
    fn topics_require_more_than_two_occurrences() {
        let comments: Vec<_> = (0..4)
            .map(|_| scored("x", "editing pacing", Sentiment::Positive))
            .chain(std::iter::once(scored("x", "music", Sentiment::Positive)))
            .collect();

        let summary = summarize_locally(&comments);
        assert!(summary.contains("editing"));
        assert!(summary.contains("pacing"));
        assert!(!summary.contains("music"));
    }

    #[test]
    fn topic_ordering_is_deterministic() {
        let comments: Vec<_> = (0..3)
            .map(|_| scored("x", "zebra alpha", Sentiment::Positive))
            .collect();

        let summary = summarize_locally(&comments);
        // equal counts fall back to alphabetical order
        assert!(summary.contains("alpha, zebra"));
    }

    #[test]
    fn prompt_is_bounded() {
        let long_text = "a very long comment body ".repeat(30);
        let comments: Vec<_> = (0..80)
            .map(|_| scored(&long_text, "processed", Sentiment::Positive))
            .collect();

        let prompt = summary_prompt(&comments).unwrap();
        let comment_lines = prompt.lines().filter(|line| line.starts_with("- ")).count();
        assert_eq!(comment_lines, PROMPT_COMMENT_LIMIT);
        for line in prompt.lines().filter(|line| line.starts_with("- ")) {
            assert!(line.chars().count() <= PROMPT_TEXT_LIMIT + 2);
        }
    }

    #[test]
    fn short_bodies_are_excluded_from_the_prompt() {
        let comments = vec![
            scored("ok", "ok", Sentiment::Positive),
            scored("This one is long enough to summarize", "long enough", Sentiment::Positive),
        ];

        let prompt = summary_prompt(&comments).unwrap();
        assert_eq!(prompt.lines().filter(|line| line.starts_with("- ")).count(), 1);
    }

    #[test]
    fn no_meaningful_bodies_yields_no_prompt() {
        let comments = vec![scored("ok", "ok", Sentiment::Positive)];
        assert!(summary_prompt(&comments).is_none());
    }
}
