//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

use crate::controller::DEFAULT_SEARCH_DEBOUNCE;
use crate::repository::{DEFAULT_PAGE_SIZE, ListQuery};

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// Settings for talking to the student records backend.
pub struct ClientConfig {
    /// Base URL of the REST API, including the version prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Filters applied to the list view on start.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            email: String::new(),
            password: String::new(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            search: None,
            course: None,
            city: None,
        }
    }
}

impl ClientConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Query the list view starts from.
    pub fn initial_query(&self) -> ListQuery {
        let mut query = ListQuery::new(self.page_size);
        if let Some(search) = &self.search {
            query = query.search(search);
        }
        if let Some(course) = &self.course {
            query = query.course(course);
        }
        if let Some(city) = &self.city {
            query = query.city(city);
        }
        query
    }
}

#[cfg(feature = "client")]
mod loader {
    use std::path::Path;

    use ::config::{Config, ConfigError, Environment, File};

    use super::ClientConfig;

    impl ClientConfig {
        /// Loads `config/default.yaml`, the optional `config/{app_env}.yaml`
        /// override and `APP_*` environment variables.
        pub fn load(app_env: &str) -> Result<Self, ConfigError> {
            Self::load_from(Path::new("config"), app_env)
        }

        pub fn load_from(dir: &Path, app_env: &str) -> Result<Self, ConfigError> {
            let default = dir.join("default");
            let profile = dir.join(app_env);

            Config::builder()
                .add_source(File::with_name(&default.to_string_lossy()).required(false))
                .add_source(File::with_name(&profile.to_string_lossy()).required(false))
                .add_source(Environment::with_prefix("APP"))
                .build()?
                .try_deserialize()
        }
    }
}
