use {
    tracing::{info, warn},
    comment_pulse_core::{
        config::Config,
        entity::RawComment,
        scraper::CommentScraper,
        youtube::YoutubeApi,
    },
};

/// Fetch raw comments: the structured API when a credential is available,
/// the scraper otherwise or on any API failure. Provider errors never leave
/// this stage; an empty result is the caller's "no comments" signal.
pub async fn fetch_comments_step(config: &Config, video_id: &str) -> Vec<RawComment> {
    let max_comments = config.pipeline.max_comments();

    if let Some(api_key) = config.youtube_api_key() {
        info!("fetching comments via structured api");
        match YoutubeApi::new(api_key).fetch_comments(video_id, max_comments).await {
            Ok(comments) if !comments.is_empty() => return capped(comments, max_comments),
            Ok(_) => warn!("structured api returned no comments, falling back to scraper"),
            Err(err) => warn!("structured api failed: {}, falling back to scraper", err),
        }
    }

    info!("fetching comments via scraper");
    match CommentScraper::new().fetch_comments(video_id, max_comments).await {
        Ok(comments) => capped(comments, max_comments),
        Err(err) => {
            warn!("scraper failed: {}", err);
            Vec::new()
        },
    }
}

fn capped(mut comments: Vec<RawComment>, max_comments: usize) -> Vec<RawComment> {
    comments.truncate(max_comments);
    comments
}
