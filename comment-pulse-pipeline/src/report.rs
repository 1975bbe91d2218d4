use {
    std::path::Path,
    serde::Serialize,
    anyhow::Result,
    comment_pulse_core::entity::{CommentAnswered, ResponseSource, Sentiment},
};

const EXPORT_TEXT_LIMIT: usize = 150;

/// Aggregate sentiment counts over the final comment sequence.
#[derive(Serialize, Debug, PartialEq)]
pub struct SentimentSummary {
    pub total_comments: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

/// How many replies came from the LLM provider versus the template fallback.
#[derive(Serialize, Debug, PartialEq)]
pub struct ResponseSummary {
    pub total_responses: usize,
    pub ai_responses: usize,
    pub template_responses: usize,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    author: &'a str,
    comment: String,
    sentiment: &'a str,
    confidence: String,
    response: &'a str,
    likes: u64,
}

pub fn sentiment_summary(comments: &[CommentAnswered]) -> SentimentSummary {
    let total_comments = comments.len();
    let positive_count = comments.iter().filter(|c| c.sentiment == Sentiment::Positive).count();
    let negative_count = comments.iter().filter(|c| c.sentiment == Sentiment::Negative).count();

    let percentage = |count: usize| {
        if total_comments > 0 {
            (count as f64 / total_comments as f64) * 100.0
        } else {
            0.0
        }
    };

    SentimentSummary {
        total_comments,
        positive_count,
        negative_count,
        positive_percentage: percentage(positive_count),
        negative_percentage: percentage(negative_count),
    }
}

pub fn response_summary(comments: &[CommentAnswered]) -> ResponseSummary {
    let total_responses = comments.iter().filter(|c| !c.response.is_empty()).count();
    let ai_responses = comments.iter().filter(|c| c.response_source == ResponseSource::Llm).count();

    ResponseSummary {
        total_responses,
        ai_responses,
        template_responses: total_responses - ai_responses,
    }
}

/// Top comments for one sentiment, ranked by a blend of classifier
/// confidence and like count.
pub fn top_comments_by_sentiment<'a>(
    comments: &'a [CommentAnswered],
    sentiment: Sentiment,
    limit: usize,
) -> Vec<&'a CommentAnswered> {
    let mut filtered: Vec<&CommentAnswered> = comments.iter()
        .filter(|c| c.sentiment == sentiment)
        .collect();

    let rank = |c: &CommentAnswered| c.confidence * 0.7 + (c.likes as f64 / 100.0) * 0.3;
    filtered.sort_by(|a, b| rank(b).partial_cmp(&rank(a)).unwrap_or(std::cmp::Ordering::Equal));
    filtered.truncate(limit);
    filtered
}

/// Write the tabular artifact consumed by the presentation layer.
pub fn export_csv(comments: &[CommentAnswered], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for comment in comments {
        writer.serialize(ExportRow {
            author: &comment.author,
            comment: display_text(&comment.original_text),
            sentiment: comment.sentiment.as_str(),
            confidence: format!("{:.2}", comment.confidence),
            response: &comment.response,
            likes: comment.likes,
        })?;
    }

    writer.flush()?;
    Ok(())
}

fn display_text(text: &str) -> String {
    if text.chars().count() > EXPORT_TEXT_LIMIT {
        let truncated: String = text.chars().take(EXPORT_TEXT_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        text.to_owned()
    }
}
