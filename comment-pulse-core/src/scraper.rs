use {
    std::time::Duration,
    serde_json::{json, Value},
    regex::Regex,
    once_cell::sync::Lazy,
    reqwest::StatusCode,
    anyhow::{anyhow, Result},
    crate::entity::RawComment,
};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const INNERTUBE_NEXT_URL: &str = "https://www.youtube.com/youtubei/v1/next";
const FALLBACK_CLIENT_VERSION: &str = "2.20240101.00.00";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CONSENT_COOKIE: &str = "CONSENT=YES+cb.20210328-17-p0.en+FX+678";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: usize = 100;

static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":"([^"]+)""#).unwrap());
static CLIENT_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_CONTEXT_CLIENT_VERSION":"([^"]+)""#).unwrap());
static CONTINUATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""continuationCommand":\{"token":"([^"]+)""#).unwrap());

/// Unauthenticated fallback provider. Mines the public watch page for the
/// InnerTube key and the comment-section continuation, then pages the
/// `youtubei/v1/next` endpoint the way a browser session would.
pub struct CommentScraper {
    client: reqwest::Client,
}

impl CommentScraper {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Fetch up to `max_results` comments in provider-native order.
    pub async fn fetch_comments(&self, video_id: &str, max_results: usize) -> Result<Vec<RawComment>> {
        let page = self.watch_page(video_id).await?;

        let api_key = capture(&API_KEY_PATTERN, &page)
            .ok_or_else(|| anyhow!("no innertube api key on watch page"))?;
        let client_version = capture(&CLIENT_VERSION_PATTERN, &page)
            .unwrap_or_else(|| FALLBACK_CLIENT_VERSION.to_owned());
        let mut continuation = capture(&CONTINUATION_PATTERN, &page)
            .ok_or_else(|| anyhow!("no comment continuation on watch page, comments may be disabled"))?;

        let mut comments = Vec::new();
        let mut pages_remaining = PAGE_LIMIT;

        while comments.len() < max_results && pages_remaining > 0 {
            pages_remaining -= 1;
            let response = self.continuation_page(&api_key, &client_version, &continuation).await?;

            for payload in find_objects(&response, "commentEntityPayload") {
                if comments.len() >= max_results {
                    break;
                }
                if let Some(comment) = raw_comment_from_payload(payload) {
                    comments.push(comment);
                }
            }

            match next_continuation(&response) {
                Some(token) if token != continuation => continuation = token,
                _ => break,
            }
        }

        comments.truncate(max_results);
        Ok(comments)
    }

    async fn watch_page(&self, video_id: &str) -> Result<String> {
        let res = self.client.get(format!("{}{}", WATCH_URL, video_id))
            .header("Cookie", CONSENT_COOKIE)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(anyhow!("watch page returned status: {}", res.status().as_u16()));
        }

        Ok(res.text().await?)
    }

    async fn continuation_page(&self, api_key: &str, client_version: &str, continuation: &str) -> Result<Value> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": client_version,
                    "hl": "en",
                    "gl": "US",
                }
            },
            "continuation": continuation,
        });

        let res = self.client.post(format!("{}?key={}", INNERTUBE_NEXT_URL, api_key))
            .header("Cookie", CONSENT_COOKIE)
            .json(&body)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(anyhow!("continuation endpoint returned status: {}", res.status().as_u16()));
        }

        Ok(res.json().await?)
    }
}

impl Default for CommentScraper {
    fn default() -> Self {
        Self::new()
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|captures| captures[1].to_owned())
}

/// Depth-first collection of every value stored under `key` anywhere in the
/// response tree. InnerTube nests renderers unpredictably across client
/// versions, so structural pointers are not reliable past the payload level.
fn find_objects<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect_objects(value, key, &mut found);
    found
}

fn collect_objects<'a>(value: &'a Value, key: &str, found: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    found.push(v);
                }
                collect_objects(v, key, found);
            }
        },
        Value::Array(items) => {
            for item in items {
                collect_objects(item, key, found);
            }
        },
        _ => {},
    }
}

fn raw_comment_from_payload(payload: &Value) -> Option<RawComment> {
    let properties = payload.get("properties")?;
    let text = properties.pointer("/content/content")?.as_str()?;

    let id = properties.get("commentId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let author = payload.pointer("/author/displayName")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let likes = payload.pointer("/toolbar/likeCountNotliked")
        .and_then(Value::as_str)
        .map(parse_vote_count)
        .unwrap_or(0);
    let published = properties.get("publishedTime")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(RawComment {
        id: id.to_owned(),
        author: author.to_owned(),
        text: text.to_owned(),
        likes,
        published: published.to_owned(),
    })
}

/// The paging token is the trailing `continuationItemRenderer` of the page,
/// which is the last `continuationCommand` in document order.
fn next_continuation(response: &Value) -> Option<String> {
    find_objects(response, "continuationCommand")
        .into_iter()
        .filter_map(|command| command.get("token").and_then(Value::as_str))
        .last()
        .map(|token| token.to_owned())
}

/// Vote counts arrive display-formatted ("137", "1.2K", "3M").
fn parse_vote_count(value: &str) -> u64 {
    let value = value.trim();
    if value.is_empty() {
        return 0;
    }

    let (number, multiplier) = match value.chars().last() {
        Some('K') | Some('k') => (&value[..value.len() - 1], 1_000.0),
        Some('M') | Some('m') => (&value[..value.len() - 1], 1_000_000.0),
        _ => (value, 1.0),
    };

    number.replace(',', "")
        .parse::<f64>()
        .map(|v| (v * multiplier) as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_formatted_vote_counts() {
        assert_eq!(parse_vote_count("137"), 137);
        assert_eq!(parse_vote_count("1.2K"), 1200);
        assert_eq!(parse_vote_count("3M"), 3_000_000);
        assert_eq!(parse_vote_count("2,541"), 2541);
        assert_eq!(parse_vote_count(""), 0);
        assert_eq!(parse_vote_count("n/a"), 0);
    }

    #[test]
    fn mines_watch_page_tokens() {
        let page = r#"
            <script>ytcfg.set({"INNERTUBE_API_KEY":"AIzaSyTest123","INNERTUBE_CONTEXT_CLIENT_VERSION":"2.20230615.01.00"});</script>
            {"continuationCommand":{"token":"Eg0SC2FiYzEyMw%3D%3D","request":"CONTINUATION_REQUEST_TYPE_NEXT"}}
        "#;

        assert_eq!(capture(&API_KEY_PATTERN, page).as_deref(), Some("AIzaSyTest123"));
        assert_eq!(capture(&CLIENT_VERSION_PATTERN, page).as_deref(), Some("2.20230615.01.00"));
        assert_eq!(capture(&CONTINUATION_PATTERN, page).as_deref(), Some("Eg0SC2FiYzEyMw%3D%3D"));
    }

    #[test]
    fn extracts_comments_from_entity_payloads() {
        let response = serde_json::json!({
            "frameworkUpdates": {
                "entityBatchUpdate": {
                    "mutations": [
                        {
                            "payload": {
                                "commentEntityPayload": {
                                    "properties": {
                                        "commentId": "UgxAbc",
                                        "content": {"content": "This helped a lot, thanks!"},
                                        "publishedTime": "2 days ago"
                                    },
                                    "author": {"displayName": "@viewer"},
                                    "toolbar": {"likeCountNotliked": "1.2K"}
                                }
                            }
                        },
                        {
                            "payload": {
                                "commentEntityPayload": {
                                    "properties": {
                                        "commentId": "UgxDef",
                                        "content": {"content": "Audio was too quiet"}
                                    }
                                }
                            }
                        }
                    ]
                }
            }
        });

        let payloads = find_objects(&response, "commentEntityPayload");
        assert_eq!(payloads.len(), 2);

        let first = raw_comment_from_payload(payloads[0]).unwrap();
        assert_eq!(first.id, "UgxAbc");
        assert_eq!(first.author, "@viewer");
        assert_eq!(first.text, "This helped a lot, thanks!");
        assert_eq!(first.likes, 1200);
        assert_eq!(first.published, "2 days ago");

        let second = raw_comment_from_payload(payloads[1]).unwrap();
        assert_eq!(second.author, "Unknown");
        assert_eq!(second.likes, 0);
    }

    #[test]
    fn takes_trailing_continuation_token() {
        let response = serde_json::json!({
            "onResponseReceivedEndpoints": [{
                "appendContinuationItemsAction": {
                    "continuationItems": [
                        {"commentThreadRenderer": {
                            "replies": {"continuationCommand": {"token": "reply-token"}}
                        }},
                        {"continuationItemRenderer": {
                            "continuationEndpoint": {"continuationCommand": {"token": "page-token"}}
                        }}
                    ]
                }
            }]
        });

        assert_eq!(next_continuation(&response).as_deref(), Some("page-token"));
    }

    #[test]
    fn missing_text_yields_no_comment() {
        let payload = serde_json::json!({
            "properties": {"commentId": "UgxGhi"}
        });
        assert!(raw_comment_from_payload(&payload).is_none());
    }
}
