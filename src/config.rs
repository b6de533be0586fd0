use once_cell::sync::Lazy;
use secrecy::SecretString;
use url::Url;

use test_console::MemorySession;

static DEFAULT_API_URL: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost:4000/api/v1/").expect("invalid default api url"));

pub struct Config {
    pub api_url: Url,
    token: Option<SecretString>,
}

impl Config {
    pub fn new(api_url: Option<Url>, api_token: Option<String>) -> Self {
        let mut api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.clone());

        // Relative endpoint paths only join cleanly under a trailing slash.
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Self {
            api_url,
            token: api_token.map(SecretString::new),
        }
    }

    pub fn session(&self) -> MemorySession {
        match &self.token {
            Some(token) => MemorySession::new(token.clone()),
            None => MemorySession::anonymous(),
        }
    }
}
