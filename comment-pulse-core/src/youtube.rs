use {
    std::time::Duration,
    serde::Deserialize,
    reqwest::StatusCode,
    anyhow::{anyhow, Result},
    crate::entity::RawComment,
};

const COMMENT_THREADS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/commentThreads";
const PAGE_SIZE_LIMIT: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Structured comment API provider. Requires a credential; quota and auth
/// failures surface as errors for the fetch stage to absorb.
pub struct YoutubeApi {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize, Debug)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CommentThread {
    id: String,
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize, Debug)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize, Debug)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize, Debug)]
struct CommentSnippet {
    #[serde(rename = "textDisplay")]
    text_display: String,
    #[serde(rename = "authorDisplayName")]
    author_display_name: String,
    #[serde(rename = "likeCount", default)]
    like_count: u64,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
}

impl YoutubeApi {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
        }
    }

    /// Fetch up to `max_results` top-level comments in relevance order,
    /// paginating until the cap is reached or no further page exists.
    pub async fn fetch_comments(&self, video_id: &str, max_results: usize) -> Result<Vec<RawComment>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_results {
            let page_size = (max_results - comments.len()).min(PAGE_SIZE_LIMIT);
            let response = self.comment_threads_page(video_id, page_size, page_token.as_deref()).await?;

            for thread in response.items {
                let snippet = thread.snippet.top_level_comment.snippet;
                comments.push(RawComment {
                    id: thread.id,
                    author: snippet.author_display_name,
                    text: snippet.text_display,
                    likes: snippet.like_count,
                    published: snippet.published_at,
                });
            }

            match response.next_page_token {
                Some(token) if comments.len() < max_results => page_token = Some(token),
                _ => break,
            }
        }

        comments.truncate(max_results);
        Ok(comments)
    }

    async fn comment_threads_page(
        &self,
        video_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<CommentThreadsResponse> {
        let page_size = page_size.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("order", "relevance"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let res = self.client.get(COMMENT_THREADS_ENDPOINT)
            .query(&query)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(anyhow!("comment api returned status: {}", res.status().as_u16()));
        }

        Ok(res.json().await?)
    }
}
