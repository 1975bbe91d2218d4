mod extract;
mod fetch;
mod preprocess;
mod report;
mod respond;
mod sentiment;
mod summarize;
mod utils;

use {
    std::process::ExitCode,
    tracing::{info, error, warn},
    comment_pulse_core::{
        config::Config,
        entity::Sentiment,
        error::PipelineError,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    utils::init_logging();

    let config = Config::load();

    let reference = match std::env::args().nth(1) {
        Some(reference) => reference,
        None => {
            error!("usage: comment-pulse-pipeline <video-url>");
            return ExitCode::FAILURE;
        },
    };

    match run(&config, &reference).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        },
    }
}

/// One pipeline run: fetch → preprocess → classify → summarize → respond →
/// report. Stages run strictly in sequence; only terminal conditions
/// propagate out of here.
async fn run(config: &Config, reference: &str) -> Result<(), PipelineError> {
    let video_id = extract::extract_video_id(reference)?;
    info!("analyzing comments for video {}", video_id);

    let raw_comments = fetch::fetch_comments_step(config, &video_id).await;
    if raw_comments.is_empty() {
        return Err(PipelineError::NoCommentsFound(video_id));
    }
    info!("fetched {} comments", raw_comments.len());

    let comments = preprocess::normalize_step(raw_comments, &config.pipeline);
    if comments.is_empty() {
        return Err(PipelineError::NoCommentsFound(video_id));
    }
    info!("{} comments retained after preprocessing", comments.len());

    let scored = sentiment::classify_step(comments).await?;

    let summary = summarize::summarize_step(&scored, config).await;
    let answered = respond::respond_step(scored, config).await;

    let stats = report::sentiment_summary(&answered);
    let responses = report::response_summary(&answered);

    info!("summary: {}", summary);
    info!(
        "sentiment: {} comments, {} positive ({:.1}%), {} negative ({:.1}%)",
        stats.total_comments,
        stats.positive_count,
        stats.positive_percentage,
        stats.negative_count,
        stats.negative_percentage,
    );
    info!(
        "responses: {} total, {} from llm, {} from templates",
        responses.total_responses,
        responses.ai_responses,
        responses.template_responses,
    );

    let dominant = if stats.negative_count > stats.positive_count {
        Sentiment::Negative
    } else {
        Sentiment::Positive
    };
    for comment in report::top_comments_by_sentiment(&answered, dominant, 5) {
        info!("top {} comment by {}: {}", dominant, comment.author, comment.original_text);
    }

    let export_path = config.pipeline.export_path();
    match report::export_csv(&answered, &export_path) {
        Ok(()) => info!("results exported to {}", export_path),
        Err(err) => warn!("failed to export results: {}", err),
    }

    Ok(())
}
