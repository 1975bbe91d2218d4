use {
    std::{sync::{Arc, Mutex}, time::Duration},
    tokio::sync::OnceCell,
    tracing::{info, warn},
    rust_bert::pipelines::sentiment::{SentimentModel, SentimentPolarity},
    comment_pulse_core::{
        entity::{Comment, CommentScored, Sentiment, SentimentScores},
        error::PipelineError,
    },
};

static SENTIMENT_MODEL: OnceCell<Arc<Mutex<SentimentModel>>> = OnceCell::const_new();

const MODEL_LOAD_ATTEMPTS: u32 = 3;
const CLASSIFICATION_BATCH_SIZE: usize = 32;
const MODEL_INPUT_LIMIT: usize = 512;
const CLASSIFIER_PLACEHOLDER: &str = "okay comment";

/// Classify every comment, preserving order and length. The model is loaded
/// once per process; a failed batch degrades to default scores instead of
/// aborting the run.
pub async fn classify_step(comments: Vec<Comment>) -> Result<Vec<CommentScored>, PipelineError> {
    if comments.is_empty() {
        return Ok(Vec::new());
    }

    let model = sentiment_model().await?;
    let texts: Vec<String> = comments.iter().map(classifier_input).collect();

    let mut results: Vec<(Sentiment, f64, SentimentScores)> = Vec::with_capacity(texts.len());
    for batch in texts.chunks(CLASSIFICATION_BATCH_SIZE) {
        let model = model.clone();
        let batch_texts = batch.to_vec();

        let predictions = tokio::task::spawn_blocking(move || {
            let model = model.lock().unwrap();
            let text_refs: Vec<&str> = batch_texts.iter().map(|text| text.as_str()).collect();
            model.predict(&text_refs)
        }).await;

        match predictions {
            Ok(predictions) => {
                for prediction in &predictions {
                    let scores = map_sentiment_label(polarity_label(&prediction.polarity), prediction.score);
                    results.push((discrete_tag(&scores), prediction.score, scores));
                }
                // a short batch is padded so the output stays same-length
                for _ in predictions.len()..batch.len() {
                    results.push(default_result());
                }
            },
            Err(err) => {
                warn!("classification batch failed: {}, using default scores", err);
                for _ in 0..batch.len() {
                    results.push(default_result());
                }
            },
        }
    }

    Ok(comments.into_iter()
        .zip(results)
        .map(|(comment, (sentiment, confidence, scores))| comment.scored(sentiment, confidence, scores))
        .collect())
}

/// Process-wide model cache. Load failures are retried with exponential
/// backoff; after the last attempt the run reports `ModelUnavailable` and
/// the cell stays empty so a later run can retry.
async fn sentiment_model() -> Result<Arc<Mutex<SentimentModel>>, PipelineError> {
    SENTIMENT_MODEL.get_or_try_init(|| async {
        let mut last_error = String::new();

        for attempt in 1..=MODEL_LOAD_ATTEMPTS {
            info!("loading sentiment model (attempt {}/{})", attempt, MODEL_LOAD_ATTEMPTS);

            match tokio::task::spawn_blocking(|| SentimentModel::new(Default::default())).await {
                Ok(Ok(model)) => {
                    info!("sentiment model loaded");
                    return Ok(Arc::new(Mutex::new(model)));
                },
                Ok(Err(err)) => last_error = err.to_string(),
                Err(err) => last_error = err.to_string(),
            }

            if attempt < MODEL_LOAD_ATTEMPTS {
                let delay = Duration::from_secs(1u64 << (attempt - 1));
                warn!("sentiment model load failed: {}, retrying in {:?}", last_error, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(PipelineError::ModelUnavailable {
            attempts: MODEL_LOAD_ATTEMPTS,
            message: last_error,
        })
    }).await.map(|model| model.clone())
}

/// The classifier must never see an empty string; degraded records fall back
/// to the original text and finally to a neutral-leaning placeholder.
fn classifier_input(comment: &Comment) -> String {
    let text = if !comment.processed_text.trim().is_empty() {
        &comment.processed_text
    } else if !comment.original_text.trim().is_empty() {
        &comment.original_text
    } else {
        CLASSIFIER_PLACEHOLDER
    };

    text.chars().take(MODEL_INPUT_LIMIT).collect()
}

fn polarity_label(polarity: &SentimentPolarity) -> &'static str {
    match polarity {
        SentimentPolarity::Positive => "POSITIVE",
        SentimentPolarity::Negative => "NEGATIVE",
    }
}

/// Map a raw model label and confidence into the two-way distribution.
/// Unrecognized labels get a fixed positive-leaning default.
fn map_sentiment_label(label: &str, score: f64) -> SentimentScores {
    match label {
        "POSITIVE" => SentimentScores { positive: score, negative: 1.0 - score },
        "NEGATIVE" => SentimentScores { positive: 1.0 - score, negative: score },
        _ => SentimentScores { positive: 0.6, negative: 0.4 },
    }
}

/// Strict comparison: the (theoretical) 0.5/0.5 split resolves to negative.
fn discrete_tag(scores: &SentimentScores) -> Sentiment {
    if scores.positive > scores.negative {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    }
}

fn default_result() -> (Sentiment, f64, SentimentScores) {
    (Sentiment::Positive, 0.5, SentimentScores { positive: 0.5, negative: 0.5 })
}
