use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use rand::{Rng, seq::IndexedRandom};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    dao::catalog::{
        CatalogGateway,
        error::CatalogResult,
        models::{CatalogArtist, CatalogItem},
        pick_unplayed,
        pool::CandidatePool,
    },
    state::game::Difficulty,
};

use super::{
    config::SpotifyConfig,
    error::{SpotifyError, SpotifyResult},
    models::{AlbumObject, Page, SearchResponse, TokenResponse, TopTracksResponse},
};

const SEARCH_LIMIT: u32 = 10;
const RANDOM_SEARCH_LIMIT: u32 = 20;
const RANDOM_SEARCH_MAX_OFFSET: u32 = 200;
/// Tokens are renewed this long before Spotify actually expires them.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Catalog gateway backed by the Spotify Web API, authenticated with the client-credentials flow.
#[derive(Clone)]
pub struct SpotifyCatalog {
    client: Client,
    api_url: Arc<str>,
    accounts_url: Arc<str>,
    credentials: (Arc<str>, Arc<str>),
    market: Arc<str>,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl SpotifyCatalog {
    /// Build the HTTP client. No request is sent until the first lookup.
    pub fn new(config: SpotifyConfig) -> SpotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| SpotifyError::ClientBuilder { source })?;

        Ok(Self {
            client,
            api_url: Arc::from(config.api_url.trim_end_matches('/')),
            accounts_url: Arc::from(config.accounts_url.trim_end_matches('/')),
            credentials: (
                Arc::from(config.client_id),
                Arc::from(config.client_secret),
            ),
            market: Arc::from(config.market),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Return a valid bearer token, requesting a new one when missing, stale or `force`d.
    async fn access_token(&self, force: bool) -> SpotifyResult<String> {
        if !force {
            if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another request may have refreshed it while we waited for the lock.
        if !force {
            if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/token", self.accounts_url);
        let (client_id, client_secret) = &self.credentials;
        let response = self
            .client
            .post(&url)
            .basic_auth(client_id.as_ref(), Some(client_secret.as_ref()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| SpotifyError::TokenRequest { source })?;

        if !response.status().is_success() {
            return Err(SpotifyError::TokenStatus {
                status: response.status(),
            });
        }

        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| SpotifyError::TokenRequest { source })?;
        debug!(expires_in = payload.expires_in, "Spotify access token renewed");

        let token = AccessToken {
            value: payload.access_token,
            expires_at: Instant::now() + Duration::from_secs(payload.expires_in),
        };
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    /// GET `path` under `/v1`, retrying once with a fresh token on `401`.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> SpotifyResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/v1/{}", self.api_url, path);
        let mut refreshed = false;

        loop {
            let token = self.access_token(refreshed).await?;
            let response = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(query)
                .send()
                .await
                .map_err(|source| SpotifyError::RequestSend {
                    path: path.to_string(),
                    source,
                })?;

            match response.status() {
                StatusCode::UNAUTHORIZED if !refreshed => {
                    debug!(path, "Spotify rejected the access token, renewing");
                    refreshed = true;
                }
                status if status.is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|source| SpotifyError::DecodeResponse {
                            path: path.to_string(),
                            source,
                        });
                }
                other => {
                    return Err(SpotifyError::RequestStatus {
                        path: path.to_string(),
                        status: other,
                    });
                }
            }
        }
    }

    async fn search(&self, query: String, limit: u32, offset: u32) -> SpotifyResult<Vec<CatalogArtist>> {
        let params = [
            ("q", query),
            ("type", "artist".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let payload = self.get_json::<SearchResponse>("search", &params).await?;
        Ok(payload
            .artists
            .items
            .into_iter()
            .map(CatalogArtist::from)
            .collect())
    }

    async fn candidates(&self, artist_id: &str, difficulty: Difficulty) -> SpotifyResult<Vec<CatalogItem>> {
        match CandidatePool::for_difficulty(difficulty) {
            CandidatePool::TopTracks => {
                let path = format!("artists/{artist_id}/top-tracks");
                let payload = self
                    .get_json::<TopTracksResponse>(&path, &[("market", self.market.to_string())])
                    .await?;
                Ok(payload.tracks.into_iter().map(CatalogItem::from).collect())
            }
            CandidatePool::Discography { limit } => {
                let path = format!("artists/{artist_id}/albums");
                let params = [
                    ("include_groups", "album,single".to_string()),
                    ("limit", limit.to_string()),
                    ("market", self.market.to_string()),
                ];
                let payload = self.get_json::<Page<AlbumObject>>(&path, &params).await?;
                Ok(payload.items.into_iter().map(CatalogItem::from).collect())
            }
        }
    }
}

/// Wildcard-ish query used to sample an arbitrary artist: one random letter at a random offset.
fn random_search_query() -> (String, u32) {
    let mut rng = rand::rng();
    let letter = char::from(rng.random_range(b'a'..=b'z'));
    let offset = rng.random_range(0..RANDOM_SEARCH_MAX_OFFSET);
    (letter.to_string(), offset)
}

impl CatalogGateway for SpotifyCatalog {
    fn search_artists(&self, query: String) -> BoxFuture<'static, CatalogResult<Vec<CatalogArtist>>> {
        let catalog = self.clone();
        Box::pin(async move {
            catalog
                .search(query, SEARCH_LIMIT, 0)
                .await
                .map_err(Into::into)
        })
    }

    fn random_artist_name(&self) -> BoxFuture<'static, CatalogResult<Option<String>>> {
        let catalog = self.clone();
        Box::pin(async move {
            let (query, offset) = random_search_query();
            let artists = catalog.search(query, RANDOM_SEARCH_LIMIT, offset).await?;
            Ok(artists
                .choose(&mut rand::rng())
                .map(|artist| artist.name.clone()))
        })
    }

    fn random_item_for_artist(
        &self,
        artist_id: String,
        difficulty: Difficulty,
        exclude: HashSet<String>,
    ) -> BoxFuture<'static, CatalogResult<Option<CatalogItem>>> {
        let catalog = self.clone();
        Box::pin(async move {
            let candidates = catalog.candidates(&artist_id, difficulty).await?;
            debug!(
                %artist_id,
                ?difficulty,
                candidates = candidates.len(),
                excluded = exclude.len(),
                "Spotify candidate pool fetched"
            );
            Ok(pick_unplayed(candidates, &exclude))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, header::AUTHORIZATION},
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use serde_json::json;

    use super::*;
    use crate::dao::catalog::spotify::config::SpotifyConfig;

    /// Local stand-in for the accounts and API hosts.
    #[derive(Clone)]
    struct Upstream {
        expires_in: u64,
        token_calls: Arc<AtomicUsize>,
        unauthorized_left: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Upstream {
        fn new(expires_in: u64, unauthorized: usize) -> Self {
            Self {
                expires_in,
                token_calls: Arc::new(AtomicUsize::new(0)),
                unauthorized_left: Arc::new(AtomicUsize::new(unauthorized)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn token_calls(&self) -> usize {
            self.token_calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn authorization(headers: &HeaderMap) -> String {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn issue_token(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
        if !authorization(&headers).starts_with("Basic ") {
            return StatusCode::BAD_REQUEST.into_response();
        }
        let issued = upstream.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Json(json!({
            "access_token": format!("token-{issued}"),
            "token_type": "Bearer",
            "expires_in": upstream.expires_in,
        }))
        .into_response()
    }

    async fn search_artists(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
        upstream.seen.lock().unwrap().push(authorization(&headers));
        let rejected = upstream
            .unauthorized_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if rejected {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({
            "artists": { "items": [{ "id": "daft", "name": "Daft Punk" }] }
        }))
        .into_response()
    }

    async fn catalog_for(upstream: &Upstream) -> SpotifyCatalog {
        let app = Router::new()
            .route("/api/token", post(issue_token))
            .route("/v1/search", get(search_artists))
            .with_state(upstream.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        SpotifyCatalog::new(SpotifyConfig::new("client", "secret").with_endpoints(&base, &base))
            .unwrap()
    }

    #[tokio::test]
    async fn token_is_reused_across_lookups() {
        let upstream = Upstream::new(3600, 0);
        let catalog = catalog_for(&upstream).await;

        let first = catalog.search("daft".into(), 10, 0).await.unwrap();
        catalog.search("punk".into(), 10, 0).await.unwrap();

        assert_eq!(first[0].name, "Daft Punk");
        assert_eq!(upstream.token_calls(), 1);
        assert_eq!(upstream.seen(), vec!["Bearer token-1", "Bearer token-1"]);
    }

    #[tokio::test]
    async fn token_inside_the_expiry_margin_is_renewed() {
        let upstream = Upstream::new(10, 0);
        let catalog = catalog_for(&upstream).await;

        catalog.search("daft".into(), 10, 0).await.unwrap();
        catalog.search("daft".into(), 10, 0).await.unwrap();

        assert_eq!(upstream.token_calls(), 2);
        assert_eq!(upstream.seen(), vec!["Bearer token-1", "Bearer token-2"]);
    }

    #[tokio::test]
    async fn rejected_token_is_renewed_once_and_retried() {
        let upstream = Upstream::new(3600, 1);
        let catalog = catalog_for(&upstream).await;

        let artists = catalog.search("daft".into(), 10, 0).await.unwrap();

        assert_eq!(artists.len(), 1);
        assert_eq!(upstream.token_calls(), 2);
        assert_eq!(upstream.seen(), vec!["Bearer token-1", "Bearer token-2"]);
    }

    #[tokio::test]
    async fn second_rejection_is_reported() {
        let upstream = Upstream::new(3600, 2);
        let catalog = catalog_for(&upstream).await;

        let err = catalog.search("daft".into(), 10, 0).await.unwrap_err();

        assert!(matches!(
            err,
            SpotifyError::RequestStatus {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        ));
        assert_eq!(upstream.token_calls(), 2);
        assert_eq!(upstream.seen().len(), 2);
    }
}
