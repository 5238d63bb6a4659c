use std::time::Duration;

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Service configuration, sourced from flags or the environment.
///
/// Built once in `main` and handed to every component that needs it.
#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    /// API key for the language model provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Override for the OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    /// Model used for both the generation and the reflection pass
    #[arg(long, env = "ANYTOOL_MODEL", default_value = "gpt-4o-mini", global = true)]
    pub model: String,

    /// Supabase project URL for request records
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase service key for request records
    #[arg(long, env = "SUPABASE_SERVICE_KEY", hide_env_values = true, global = true)]
    pub supabase_service_key: Option<String>,

    /// Table receiving request records
    #[arg(long, env = "SUPABASE_TABLE", default_value = "anytool_records", global = true)]
    pub supabase_table: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL, global = true)]
    pub github_api_url: String,

    /// Timeout in seconds for GitHub and storage requests
    #[arg(long, env = "ANYTOOL_HTTP_TIMEOUT", default_value = "30", global = true)]
    pub http_timeout: u64,

    /// Timeout in seconds for a single model call
    #[arg(long, env = "ANYTOOL_MODEL_TIMEOUT", default_value = "120", global = true)]
    pub model_timeout: u64,

    /// Number of blob downloads kept in flight
    #[arg(long, env = "ANYTOOL_BLOB_CONCURRENCY", default_value = "8", global = true)]
    pub blob_concurrency: usize,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    /// Model credential, if one is configured.
    pub fn model_credential(&self) -> Option<&str> {
        non_empty(&self.openai_api_key)
    }

    /// Supabase URL and key, only when both are configured.
    pub fn storage_credentials(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(&self.supabase_url)?,
            non_empty(&self.supabase_service_key)?,
        ))
    }

    pub fn github_api_url(&self) -> &str {
        self.github_api_url.trim_end_matches('/')
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout)
    }

    pub fn blob_concurrency(&self) -> usize {
        self.blob_concurrency.max(1)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            model: "gpt-4o-mini".to_string(),
            supabase_url: None,
            supabase_service_key: None,
            supabase_table: "anytool_records".to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            http_timeout: 30,
            model_timeout: 120,
            blob_concurrency: 8,
        }
    }
}
