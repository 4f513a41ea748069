use super::error::{SpotifyError, SpotifyResult};

const DEFAULT_API_URL: &str = "https://api.spotify.com";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_MARKET: &str = "US";

/// Runtime configuration describing how to reach the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub api_url: String,
    pub accounts_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub market: String,
}

impl SpotifyConfig {
    /// Construct a configuration against the public Spotify endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            accounts_url: DEFAULT_ACCOUNTS_URL.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            market: DEFAULT_MARKET.into(),
        }
    }

    /// Point the client at other API and accounts hosts (proxies, mocks).
    pub fn with_endpoints(
        mut self,
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.accounts_url = accounts_url.into();
        self
    }

    /// Restrict releases to a market (ISO 3166-1 alpha-2 code).
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> SpotifyResult<Self> {
        let client_id = std::env::var("SPOTIFY_CLIENT_ID").map_err(|_| {
            SpotifyError::MissingEnvVar {
                var: "SPOTIFY_CLIENT_ID",
            }
        })?;
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").map_err(|_| {
            SpotifyError::MissingEnvVar {
                var: "SPOTIFY_CLIENT_SECRET",
            }
        })?;

        let mut config = Self::new(client_id, client_secret);

        if let Ok(market) = std::env::var("SPOTIFY_MARKET") {
            config = config.with_market(market);
        }

        if let (Ok(api_url), Ok(accounts_url)) = (
            std::env::var("SPOTIFY_API_URL"),
            std::env::var("SPOTIFY_ACCOUNTS_URL"),
        ) {
            config = config.with_endpoints(api_url, accounts_url);
        }

        Ok(config)
    }
}
