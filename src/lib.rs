//! Reversi Match - turn coordination for Reversi games
//!
//! The rules live in [`strictly_reversi`]; this crate seats players around
//! them and runs the game.
//!
//! # Architecture
//!
//! - **Coordinator**: synchronous owner of the authoritative game, with
//!   turn tickets that make stale submissions harmless
//! - **Providers**: asynchronous move sources (random, first-legal, LLM,
//!   remote channel)
//! - **Orchestrator**: async loop that asks providers, applies timeouts and
//!   fallbacks, and serves a [`GameHandle`]
//! - **Config**: TOML match configuration and seat construction
//!
//! # Example
//!
//! ```no_run
//! use reversi_match::{
//!     Orchestrator, ProviderTiming, RandomProvider, Seat, TurnCoordinator,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let coordinator = TurnCoordinator::new(Seat::Human, Seat::provider(RandomProvider::new("bot")));
//! let (event_tx, _events) = tokio::sync::mpsc::unbounded_channel();
//! let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
//! tokio::spawn(orchestrator.run());
//!
//! let opening = handle.snapshot();
//! handle.submit_move(opening.legal_moves()[0]).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod coordinator;
mod llm_client;
mod orchestrator;
mod providers;

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{AgentSettings, ConfigError, GameMode, MatchConfig, SeatKind, SeatPlan};

// Crate-level exports - Coordination
pub use coordinator::{
    FallbackReason, MoveRejected, MoveRequest, RejectReason, Seat, Snapshot, Transition,
    TurnCoordinator, TurnTicket,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Orchestration
pub use orchestrator::{GameEvent, GameHandle, Orchestrator, ProviderTiming};

// Crate-level exports - Providers
pub use providers::{
    ChannelProvider, FirstLegalProvider, LlmMoveProvider, MoveProvider, ProviderError,
    RandomProvider, RemotePeer,
};

// Crate-level exports - llm move prompt helpers
pub use providers::{move_prompt, parse_move};
