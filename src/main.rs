//! Reversi Match - Terminal CLI
//!
//! Plays a game on stdin/stdout. Logs go to stderr.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use reversi_match::{
    Cli, Command, GameEvent, GameHandle, MatchConfig, Orchestrator, RemotePeer, SeatKind, SeatPlan,
    TurnCoordinator,
};
use strictly_reversi::{Board, Player, Position, rules};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            mode,
            black,
            white,
            timeout_ms,
            think_delay_ms,
            seed,
        } => {
            let mut match_config = match config {
                Some(path) => MatchConfig::from_file(&path)
                    .with_context(|| format!("Loading {}", path.display()))?,
                None => MatchConfig::default(),
            };
            if let Some(mode) = mode {
                match_config = match_config.with_mode(mode);
            }
            if let Some(kind) = black {
                match_config = match_config.with_black(kind);
            }
            if let Some(kind) = white {
                match_config = match_config.with_white(kind);
            }
            if let Some(ms) = timeout_ms {
                match_config = match_config.with_timeout_ms(ms);
            }
            if let Some(ms) = think_delay_ms {
                match_config = match_config.with_think_delay_ms(ms);
            }
            if let Some(seed) = seed {
                match_config = match_config.with_seed(seed);
            }
            play(match_config).await
        }
        Command::Show => {
            show();
            Ok(())
        }
    }
}

/// Print the opening position
fn show() {
    let board = Board::new();
    println!("{}", board);
    let moves: Vec<String> = rules::legal_moves(&board, Player::Black)
        .iter()
        .map(Position::to_string)
        .collect();
    println!("Black to move: {}", moves.join(" "));
}

/// Run one interactive match
#[instrument(skip(config))]
async fn play(config: MatchConfig) -> Result<()> {
    let (black_kind, white_kind) = config.seats();
    info!(%black_kind, %white_kind, "Starting match");

    let SeatPlan { black, white, remotes } = config.build_seats()?;
    let coordinator = match config.seed() {
        Some(seed) => TurnCoordinator::with_seed(black, white, *seed),
        None => TurnCoordinator::new(black, white),
    };

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, config.timing(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    let needs_input = black_kind == SeatKind::Human
        || white_kind == SeatKind::Human
        || !remotes.is_empty();
    if needs_input {
        println!("Enter moves as d3 or row,col. Commands: moves, board, reset, quit");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = needs_input;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let over = matches!(event, GameEvent::GameOver { .. });
                render_event(&event, &handle);
                if over && !needs_input {
                    handle.quit();
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Reading stdin")? {
                    Some(line) => {
                        if !handle_input(line.trim(), &handle, &remotes).await {
                            handle.quit();
                        }
                    }
                    None => {
                        stdin_open = false;
                        handle.quit();
                    }
                }
            }
        }
    }

    let outcome = game.await.context("Game task panicked")??;
    match outcome {
        Some(outcome) => info!(%outcome, "Match finished"),
        None => info!("Match abandoned"),
    }
    Ok(())
}

/// Prints one event to stdout
fn render_event(event: &GameEvent, handle: &GameHandle) {
    match event {
        GameEvent::TurnStarted { ticket, seat } => {
            let snapshot = handle.snapshot();
            println!();
            println!("{}", snapshot.board());
            println!("Score: {}", snapshot.scores());
            let moves: Vec<String> = snapshot.legal_moves().iter().map(Position::to_string).collect();
            println!("{} to move ({}): {}", ticket.player(), seat, moves.join(" "));
        }
        GameEvent::ProviderThinking { provider, .. } => println!("{} is thinking...", provider),
        GameEvent::ProviderFallback { player, reason } => {
            println!("{}: {}; playing a random legal move", player, reason)
        }
        GameEvent::MoveMade {
            player,
            position,
            flipped,
        } => println!("{} plays {} (flips {})", player, position, flipped),
        GameEvent::Passed { player } => println!("{} has no legal move and passes", player),
        GameEvent::GameOver { outcome, scores } => {
            println!();
            println!("{}", handle.snapshot().board());
            println!("Game over: {} ({})", outcome, scores);
        }
        GameEvent::Reset => println!("Game reset"),
    }
}

/// Routes one line of input; returns false to quit.
async fn handle_input(input: &str, handle: &GameHandle, remotes: &[(Player, RemotePeer)]) -> bool {
    match input {
        "" => {}
        "quit" | "q" => return false,
        "board" => println!("{}", handle.snapshot().board()),
        "moves" => {
            let moves: Vec<String> = handle
                .snapshot()
                .legal_moves()
                .iter()
                .map(Position::to_string)
                .collect();
            println!("{}", moves.join(" "));
        }
        "reset" => {
            if let Err(e) = handle.reset().await {
                warn!(error = %e, "Reset failed");
            }
        }
        text => match text.parse::<Position>() {
            Err(e) => println!("{}", e),
            Ok(position) => submit(position, handle, remotes).await,
        },
    }
    true
}

/// Sends a move to the remote seat on turn, or submits it as a human move.
async fn submit(position: Position, handle: &GameHandle, remotes: &[(Player, RemotePeer)]) {
    let snapshot = handle.snapshot();
    let remote = snapshot.ticket().and_then(|ticket| {
        remotes
            .iter()
            .find(|(seat, _)| *seat == ticket.player())
            .map(|(_, peer)| (ticket, peer))
    });

    if let Some((ticket, peer)) = remote {
        if let Err(e) = peer.send_move(ticket, position) {
            println!("{}", e);
        }
        return;
    }

    let result = match snapshot.ticket() {
        Some(ticket) => handle.submit_move_for(*ticket, position).await,
        None => handle.submit_move(position).await,
    };
    if let Err(rejected) = result {
        println!("{}", rejected);
    }
}
