use {
    std::{env, fs::read_to_string},
    tracing::warn,
    serde::Deserialize,
};

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    credentials: Option<CredentialsConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    max_comments: Option<usize>,
    apply_lemmatization: Option<bool>,
    stopword_languages: Option<Vec<String>>,
    comment_length_limit: Option<usize>,
    export_path: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CredentialsConfig {
    youtube_api_key: Option<String>,
    groq_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            credentials: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_comments: None,
            apply_lemmatization: None,
            stopword_languages: None,
            comment_length_limit: None,
            export_path: None,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            groq_api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| toml::from_str(&v).map_err(|err| err.to_string()))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn credentials(&self) -> CredentialsConfig {
        self.credentials.as_ref().cloned().unwrap_or_default()
    }

    pub fn youtube_api_key(&self) -> Option<String> {
        self.credentials().youtube_api_key()
    }

    pub fn groq_api_key(&self) -> Option<String> {
        self.credentials().groq_api_key()
    }
}

impl PipelineConfig {
    pub fn max_comments(&self) -> usize {
        self.max_comments.unwrap_or(100)
    }

    pub fn apply_lemmatization(&self) -> bool {
        self.apply_lemmatization.unwrap_or(true)
    }

    pub fn stopword_languages(&self) -> Vec<String> {
        self.stopword_languages
            .as_ref()
            .cloned()
            .unwrap_or_else(|| vec!["english".to_owned(), "french".to_owned()])
    }

    pub fn comment_length_limit(&self) -> usize {
        self.comment_length_limit.unwrap_or(200)
    }

    pub fn export_path(&self) -> String {
        self.export_path.as_ref().cloned().unwrap_or("comment-analysis.csv".to_owned())
    }
}

impl CredentialsConfig {
    pub fn youtube_api_key(&self) -> Option<String> {
        non_empty(self.youtube_api_key.clone().or_else(|| env::var("YOUTUBE_API_KEY").ok()))
    }

    pub fn groq_api_key(&self) -> Option<String> {
        non_empty(self.groq_api_key.clone().or_else(|| env::var("GROQ_API_KEY").ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
