use {
    rand::{Rng, seq::SliceRandom},
    indicatif::ProgressBar,
    tracing::{info, warn},
    comment_pulse_core::{
        config::Config,
        entity::{CommentScored, CommentAnswered, ResponseSource, Sentiment},
        llm::LlmClient,
    },
};

const RESPONSE_MAX_TOKENS: u32 = 50;
const RESPONSE_TEMPERATURE: f32 = 0.7;

const GRATITUDE_CUES: &[&str] = &["thank", "thanks", "great", "awesome", "love", "amazing"];
const MILD_PRAISE_CUES: &[&str] = &["good", "nice", "well done", "excellent"];
const CRITICISM_CUES: &[&str] = &["bad", "terrible", "hate", "worst"];
const CLARITY_CUES: &[&str] = &["confusing", "unclear", "hard"];

/// Generate a reply for every comment, preserving order. With a credential
/// each comment gets one LLM attempt; any failure falls back to the template
/// policy for that comment alone.
pub async fn respond_step(comments: Vec<CommentScored>, config: &Config) -> Vec<CommentAnswered> {
    let llm = config.groq_api_key().map(LlmClient::new);
    if llm.is_some() {
        info!("generating responses via llm provider");
    } else {
        info!("generating responses from templates");
    }

    let progress = ProgressBar::new(comments.len() as u64);
    let mut rng = rand::thread_rng();
    let mut answered = Vec::with_capacity(comments.len());

    for comment in comments {
        let response = match &llm {
            Some(client) => {
                match client.complete(&response_prompt(&comment), RESPONSE_MAX_TOKENS, RESPONSE_TEMPERATURE).await {
                    Ok(text) => Some(text),
                    Err(err) => {
                        warn!("llm response failed for comment by {}: {}", comment.author, err);
                        None
                    },
                }
            },
            None => None,
        };

        let answered_comment = match response {
            Some(text) => comment.answered(text, ResponseSource::Llm),
            None => {
                let text = template_response(&comment, &mut rng);
                comment.answered(text, ResponseSource::Template)
            },
        };

        answered.push(answered_comment);
        progress.inc(1);
    }

    progress.finish();
    answered
}

fn response_prompt(comment: &CommentScored) -> String {
    format!(
        "You are a friendly content creator responding to YouTube comments. \
         Generate a brief, personalized response (max 20 words) to this comment:\n\n\
         Author: {}\n\
         Comment: \"{}\"\n\
         Sentiment: {}\n\n\
         Guidelines:\n\
         - Be warm and engaging\n\
         - Address the commenter by name when appropriate\n\
         - Match the tone of the comment\n\
         - Keep it conversational and authentic\n\
         - For positive comments: show appreciation\n\
         - For negative comments: be understanding and constructive\n\n\
         Response:",
        comment.author, comment.original_text, comment.sentiment,
    )
}

/// Pick a reply from the bucket matching the comment's sentiment and lexical
/// cues. The RNG is injected so tests can assert bucket membership with a
/// seeded source.
pub fn template_response<R: Rng>(comment: &CommentScored, rng: &mut R) -> String {
    let bucket = template_bucket(comment.sentiment, &comment.original_text.to_lowercase());

    let template = bucket.choose(rng).copied().unwrap_or("Thanks {author}!");
    template.replace("{author}", &comment.author)
}

fn template_bucket(sentiment: Sentiment, text: &str) -> &'static [&'static str] {
    match sentiment {
        Sentiment::Positive => {
            if contains_any(text, GRATITUDE_CUES) {
                &[
                    "Thank you so much {author}! 😊",
                    "Really appreciate it {author}! ❤️",
                    "Thanks {author}, that means a lot!",
                    "So glad you enjoyed it {author}! 🙏",
                ]
            } else if contains_any(text, MILD_PRAISE_CUES) {
                &[
                    "Thank you {author}! 🙌",
                    "Appreciate the kind words {author}!",
                    "Thanks for watching {author}! 😊",
                ]
            } else {
                &[
                    "Thanks {author}! 😊",
                    "Appreciate you {author}! ❤️",
                    "Thank you for the support {author}!",
                ]
            }
        },
        Sentiment::Negative => {
            if contains_any(text, CRITICISM_CUES) {
                &[
                    "Sorry to hear that {author}. I'll work on improving! 🙏",
                    "Thanks for the feedback {author}, I appreciate your honesty.",
                    "I understand {author}, I'll keep working to do better!",
                ]
            } else if contains_any(text, CLARITY_CUES) {
                &[
                    "Thanks for pointing that out {author}! I'll try to explain better next time.",
                    "Good feedback {author}, I'll work on making it clearer!",
                    "Appreciate the input {author}, clarity is important!",
                ]
            } else {
                &[
                    "Thanks for the feedback {author}! 🙏",
                    "I appreciate your perspective {author}.",
                    "Thank you for sharing your thoughts {author}!",
                ]
            }
        },
    }
}

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}
