pub mod countdown;
pub mod game;
pub mod hint;
pub mod normalize;
pub mod round;
pub mod rules;
pub mod score;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{catalog::CatalogGateway, score_store::ScoreStore},
    state::{countdown::Countdown, game::Game},
};

pub use self::sse::SseHub;

/// Handle on the application state shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Capacity of the public SSE broadcast channel.
const SSE_CAPACITY: usize = 64;

/// Central application state: the single game, its collaborators and the realtime fan-out.
pub struct AppState {
    config: AppConfig,
    game: RwLock<Game>,
    catalog: Arc<dyn CatalogGateway>,
    score_store: Arc<dyn ScoreStore>,
    sse: SseHub,
    countdown: Countdown,
    degraded: watch::Sender<bool>,
    score_writes: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// `score` is the balance previously loaded from `score_store`.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn CatalogGateway>,
        score_store: Arc<dyn ScoreStore>,
        score: u64,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        let game = Game::new(config.rules().clone(), score);
        Arc::new(Self {
            config,
            game: RwLock::new(game),
            catalog,
            score_store,
            sse: SseHub::new(SSE_CAPACITY),
            countdown: Countdown::new(),
            degraded: degraded_tx,
            score_writes: Mutex::new(()),
        })
    }

    /// Settings loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The game; every mutation happens within a single write-lock scope.
    pub fn game(&self) -> &RwLock<Game> {
        &self.game
    }

    /// Music catalog the rounds are drawn from.
    pub fn catalog(&self) -> Arc<dyn CatalogGateway> {
        self.catalog.clone()
    }

    /// Durable home of the XP balance.
    pub fn score_store(&self) -> Arc<dyn ScoreStore> {
        self.score_store.clone()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Held while the balance is read and saved so saves reach the store in order.
    pub fn score_writes(&self) -> &Mutex<()> {
        &self.score_writes
    }

    /// Round timer task.
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Whether the last score save failed.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn set_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}
