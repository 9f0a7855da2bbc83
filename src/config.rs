//! Match configuration: who sits in each seat and how providers are timed.

use crate::coordinator::Seat;
use crate::llm_client::{LlmClient, LlmConfig, LlmProvider};
use crate::orchestrator::ProviderTiming;
use crate::providers::{ChannelProvider, FirstLegalProvider, LlmMoveProvider, RandomProvider, RemotePeer};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_reversi::Player;
use tracing::{debug, info, instrument};

/// What controls one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SeatKind {
    /// Moves typed by a person.
    #[display("human")]
    Human,
    /// Uniformly random legal moves.
    #[display("random")]
    Random,
    /// The first legal move in row-major order.
    #[display("first-legal")]
    FirstLegal,
    /// A language model.
    #[display("agent")]
    Agent,
    /// A peer whose moves arrive over a channel.
    #[display("remote")]
    Remote,
}

/// Preset seat pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Two people at one board.
    #[default]
    #[display("local")]
    Local,
    /// A person as Black against an agent as White.
    #[display("ai")]
    Ai,
    /// A person as Black against a remote peer as White.
    #[display("online")]
    Online,
}

impl GameMode {
    /// Seat kinds for (Black, White).
    pub fn seats(self) -> (SeatKind, SeatKind) {
        match self {
            GameMode::Local => (SeatKind::Human, SeatKind::Human),
            GameMode::Ai => (SeatKind::Human, SeatKind::Agent),
            GameMode::Online => (SeatKind::Human, SeatKind::Remote),
        }
    }
}

/// LLM settings for `agent` seats.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    name: String,

    /// LLM provider (openai, anthropic or gemini).
    #[serde(default)]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,
}

fn default_agent_name() -> String {
    "Agent".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            llm_provider: LlmProvider::default(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
        }
    }
}

impl AgentSettings {
    /// Creates LLM configuration from these settings.
    ///
    /// Reads the provider's API key (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`
    /// or `GEMINI_API_KEY`) from the environment.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");
        let var = self.llm_provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }
}

/// Configuration for one match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Preset seat pair; `black`/`white` override it.
    #[serde(default)]
    mode: GameMode,

    /// Seat kind for Black.
    #[serde(default)]
    black: Option<SeatKind>,

    /// Seat kind for White.
    #[serde(default)]
    white: Option<SeatKind>,

    /// Limit on one provider call in milliseconds; 0 disables it.
    #[serde(default = "default_timeout_ms")]
    provider_timeout_ms: u64,

    /// Pause before each provider call in milliseconds.
    #[serde(default)]
    think_delay_ms: u64,

    /// Settings for `agent` seats.
    #[serde(default)]
    agent: AgentSettings,

    /// Seed for fallback and random moves.
    #[serde(default)]
    seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            black: None,
            white: None,
            provider_timeout_ms: default_timeout_ms(),
            think_delay_ms: 0,
            agent: AgentSettings::default(),
            seed: None,
        }
    }
}

/// Seats built from a [`MatchConfig`].
#[derive(Debug)]
pub struct SeatPlan {
    /// Black's seat.
    pub black: Seat,
    /// White's seat.
    pub white: Seat,
    /// Senders for `remote` seats.
    pub remotes: Vec<(Player, RemotePeer)>,
}

impl MatchConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        let (black, white) = config.seats();
        info!(%black, %white, "Config loaded successfully");
        Ok(config)
    }

    /// Overrides the mode.
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides Black's seat kind.
    pub fn with_black(mut self, kind: SeatKind) -> Self {
        self.black = Some(kind);
        self
    }

    /// Overrides White's seat kind.
    pub fn with_white(mut self, kind: SeatKind) -> Self {
        self.white = Some(kind);
        self
    }

    /// Overrides the provider timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.provider_timeout_ms = ms;
        self
    }

    /// Overrides the think delay.
    pub fn with_think_delay_ms(mut self, ms: u64) -> Self {
        self.think_delay_ms = ms;
        self
    }

    /// Overrides the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective seat kinds for (Black, White).
    pub fn seats(&self) -> (SeatKind, SeatKind) {
        let (black, white) = self.mode.seats();
        (self.black.unwrap_or(black), self.white.unwrap_or(white))
    }

    /// Provider timeout, `None` when disabled.
    pub fn provider_timeout(&self) -> Option<Duration> {
        (self.provider_timeout_ms > 0).then(|| Duration::from_millis(self.provider_timeout_ms))
    }

    /// Think delay before provider calls.
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    /// Timing knobs for the orchestrator.
    pub fn timing(&self) -> ProviderTiming {
        ProviderTiming::new(self.provider_timeout(), self.think_delay())
    }

    /// Builds both seats.
    ///
    /// # Errors
    ///
    /// Fails when an `agent` seat is requested and its API key is missing.
    #[instrument(skip(self))]
    pub fn build_seats(&self) -> Result<SeatPlan, ConfigError> {
        let (black_kind, white_kind) = self.seats();
        let mut remotes = Vec::new();

        let (black, peer) = self.build_seat(black_kind, Player::Black)?;
        remotes.extend(peer.map(|p| (Player::Black, p)));
        let (white, peer) = self.build_seat(white_kind, Player::White)?;
        remotes.extend(peer.map(|p| (Player::White, p)));

        Ok(SeatPlan { black, white, remotes })
    }

    /// Builds one seat; `remote` seats also return the sending half.
    pub fn build_seat(&self, kind: SeatKind, player: Player) -> Result<(Seat, Option<RemotePeer>), ConfigError> {
        debug!(%kind, %player, "Building seat");
        let label = format!("{} ({})", kind, player);
        let seat = match kind {
            SeatKind::Human => Seat::Human,
            SeatKind::Random => match self.seed {
                Some(seed) => Seat::provider(RandomProvider::seeded(label, seed ^ player as u64)),
                None => Seat::provider(RandomProvider::new(label)),
            },
            SeatKind::FirstLegal => Seat::provider(FirstLegalProvider::new(label)),
            SeatKind::Agent => {
                let client = LlmClient::new(self.agent.create_llm_config()?);
                Seat::provider(LlmMoveProvider::new(self.agent.name().clone(), client))
            }
            SeatKind::Remote => {
                let (provider, peer) = ChannelProvider::new(label);
                return Ok((Seat::provider(provider), Some(peer)));
            }
        };
        Ok((seat, None))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
