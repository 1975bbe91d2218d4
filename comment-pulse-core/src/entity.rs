use {
    std::fmt,
    serde::{Serialize, Deserialize},
};

/// A comment as returned by one of the fetch providers, before any cleanup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawComment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub published: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub original_text: String,
    pub processed_text: String,
    pub likes: u64,
    pub published: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommentScored {
    pub id: String,
    pub author: String,
    pub original_text: String,
    pub processed_text: String,
    pub likes: u64,
    pub published: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub scores: SentimentScores,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommentAnswered {
    pub id: String,
    pub author: String,
    pub original_text: String,
    pub processed_text: String,
    pub likes: u64,
    pub published: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub scores: SentimentScores,
    pub response: String,
    pub response_source: ResponseSource,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

/// Two-way probability distribution over sentiment classes. The two fields
/// always sum to 1.0 within float tolerance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
}

/// Which provider produced the reply for a comment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Llm,
    Template,
}

impl RawComment {
    pub fn processed(self, processed_text: String) -> Comment {
        Comment {
            id: self.id,
            author: self.author,
            original_text: self.text,
            processed_text,
            likes: self.likes,
            published: self.published,
        }
    }
}

impl Comment {
    pub fn scored(self, sentiment: Sentiment, confidence: f64, scores: SentimentScores) -> CommentScored {
        CommentScored {
            id: self.id,
            author: self.author,
            original_text: self.original_text,
            processed_text: self.processed_text,
            likes: self.likes,
            published: self.published,
            sentiment,
            confidence,
            scores,
        }
    }
}

impl CommentScored {
    pub fn answered(self, response: String, response_source: ResponseSource) -> CommentAnswered {
        CommentAnswered {
            id: self.id,
            author: self.author,
            original_text: self.original_text,
            processed_text: self.processed_text,
            likes: self.likes,
            published: self.published,
            sentiment: self.sentiment,
            confidence: self.confidence,
            scores: self.scores,
            response,
            response_source,
        }
    }
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
