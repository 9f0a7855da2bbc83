//! Tests for the async game loop: liveness, timeouts and resets.

use reversi_match::{
    ChannelProvider, FallbackReason, FirstLegalProvider, GameEvent, GameMode, MatchConfig,
    MoveProvider, Orchestrator, ProviderError, ProviderTiming, RejectReason, Seat, SeatPlan,
    TurnCoordinator, TurnTicket,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use strictly_reversi::{Board, Player, Position};
use tokio::sync::mpsc;

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col).unwrap()
}

/// Never answers.
struct SilentProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl MoveProvider for SilentProvider {
    async fn request_move(&self, _board: &Board, _player: Player) -> Result<Position, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Always errors.
struct BrokenProvider;

#[async_trait::async_trait]
impl MoveProvider for BrokenProvider {
    async fn request_move(&self, _board: &Board, _player: Player) -> Result<Position, ProviderError> {
        Err(ProviderError::Rejected("backend down".to_string()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn drain(events: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut all = Vec::new();
    while let Ok(event) = events.try_recv() {
        all.push(event);
    }
    all
}

/// Waits for `player`'s next turn.
async fn next_turn(events: &mut mpsc::UnboundedReceiver<GameEvent>, player: Player) -> TurnTicket {
    loop {
        match events.recv().await.expect("game ended early") {
            GameEvent::TurnStarted { ticket, .. } if ticket.player() == player => return ticket,
            _ => {}
        }
    }
}

/// Waits for `player`'s next placement; the flag is set if it was a fallback.
async fn next_move(events: &mut mpsc::UnboundedReceiver<GameEvent>, player: Player) -> (Position, bool) {
    let mut fell_back = false;
    loop {
        match events.recv().await.expect("game ended early") {
            GameEvent::ProviderFallback { player: p, .. } if p == player => fell_back = true,
            GameEvent::MoveMade { player: p, position, .. } if p == player => return (position, fell_back),
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_bots_play_to_completion() {
    let coordinator = TurnCoordinator::with_seed(
        Seat::provider(FirstLegalProvider::new("black")),
        Seat::provider(FirstLegalProvider::new("white")),
        1,
    );
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    let watch = handle.watch();
    drop(handle);

    let outcome = orchestrator.run().await.unwrap();
    assert!(outcome.is_some());

    let events = drain(&mut events);
    let moves = events
        .iter()
        .filter(|e| matches!(e, GameEvent::MoveMade { .. }))
        .count();
    assert!(moves > 0 && moves <= 60);
    assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::ProviderFallback { .. })));

    let last = watch.borrow().clone();
    assert_eq!(last.outcome(), &outcome);
}

#[tokio::test]
async fn test_broken_providers_still_reach_terminal() {
    let coordinator = TurnCoordinator::with_seed(
        Seat::provider(BrokenProvider),
        Seat::provider(BrokenProvider),
        2,
    );
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    drop(handle);

    let outcome = orchestrator.run().await.unwrap();
    assert!(outcome.is_some());

    let events = drain(&mut events);
    let fallbacks = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ProviderFallback { reason: FallbackReason::ProviderFailed(_), .. }))
        .count();
    let moves = events
        .iter()
        .filter(|e| matches!(e, GameEvent::MoveMade { .. }))
        .count();
    assert_eq!(fallbacks, moves);
}

#[tokio::test]
async fn test_silent_provider_times_out() {
    let calls = Arc::new(AtomicUsize::new(0));
    let coordinator = TurnCoordinator::with_seed(
        Seat::provider(SilentProvider { calls: Arc::clone(&calls) }),
        Seat::provider(FirstLegalProvider::new("white")),
        3,
    );
    let timing = ProviderTiming::new(Some(Duration::from_millis(5)), Duration::ZERO);
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, timing, event_tx);
    drop(handle);

    let outcome = tokio::time::timeout(Duration::from_secs(10), orchestrator.run())
        .await
        .expect("game should finish")
        .unwrap();
    assert!(outcome.is_some());
    assert!(calls.load(Ordering::SeqCst) > 0);

    let timeouts = drain(&mut events)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::ProviderFallback {
                    player: Player::Black,
                    reason: FallbackReason::ProviderFailed(ProviderError::Timeout(_)),
                }
            )
        })
        .count();
    assert_eq!(timeouts, calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_reset_abandons_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let coordinator = TurnCoordinator::new(
        Seat::provider(SilentProvider { calls: Arc::clone(&calls) }),
        Seat::Human,
    );
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    // Wait until the first request is in flight.
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    let before = handle.snapshot().ticket().unwrap();

    let snapshot = handle.reset().await.unwrap();
    assert_eq!(snapshot.board(), &Board::new());
    assert_ne!(snapshot.ticket(), &Some(before));

    // A new request goes out for the new game.
    while calls.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }

    handle.quit();
    assert_eq!(game.await.unwrap().unwrap(), None);

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, GameEvent::Reset)));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::MoveMade { .. })));
}

#[tokio::test]
async fn test_submission_during_provider_turn_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let coordinator = TurnCoordinator::new(
        Seat::provider(SilentProvider { calls: Arc::clone(&calls) }),
        Seat::Human,
    );
    let (event_tx, _events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    let rejected = handle.submit_move(pos(2, 3)).await.unwrap_err();
    assert_eq!(rejected.reason, RejectReason::NotHumanSeat(Player::Black));
    assert_eq!(handle.snapshot().board(), &Board::new());

    handle.quit();
    game.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_human_against_bot() {
    let coordinator = TurnCoordinator::new(Seat::Human, Seat::provider(FirstLegalProvider::new("white")));
    let (event_tx, _events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    let opening = handle.snapshot().ticket().unwrap();
    let after = handle.submit_move_for(opening, pos(2, 3)).await.unwrap();
    assert_eq!(after.active_player(), &Some(Player::White));

    // Wait for the bot's reply.
    let mut watch = handle.watch();
    while watch.borrow_and_update().active_player() != &Some(Player::Black) {
        watch.changed().await.unwrap();
    }
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.last_move().as_ref().unwrap().player, Player::White);
    assert_eq!(snapshot.scores().total(), 6);

    // The opening ticket is long gone.
    let rejected = handle.submit_move_for(opening, pos(2, 2)).await.unwrap_err();
    assert_eq!(rejected.reason, RejectReason::StaleTurn);

    handle.quit();
    game.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_stopped_game_rejects_moves() {
    let coordinator = TurnCoordinator::new(Seat::Human, Seat::Human);
    let (event_tx, _events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, ProviderTiming::default(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    handle.quit();
    assert_eq!(game.await.unwrap().unwrap(), None);

    let rejected = handle.submit_move(pos(2, 3)).await.unwrap_err();
    assert_eq!(rejected.reason, RejectReason::Stopped);
    assert!(handle.reset().await.is_err());
}

#[tokio::test]
async fn test_remote_move_sent_when_turn_announced() {
    let (provider, peer) = ChannelProvider::new("remote");
    let coordinator = TurnCoordinator::new(
        Seat::provider(provider),
        Seat::provider(FirstLegalProvider::new("white")),
    );
    // The think delay means the peer answers before the provider is asked.
    let timing = ProviderTiming::new(Some(Duration::from_secs(5)), Duration::from_millis(50));
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, timing, event_tx);
    let game = tokio::spawn(orchestrator.run());

    let first = next_turn(&mut events, Player::Black).await;
    peer.send_move(first, pos(2, 3)).unwrap();
    assert_eq!(next_move(&mut events, Player::Black).await, (pos(2, 3), false));

    // A late answer for the first turn is ignored; the current one is played.
    let second = next_turn(&mut events, Player::Black).await;
    let choice = *handle.snapshot().legal_moves().last().unwrap();
    peer.send_move(first, pos(2, 3)).unwrap();
    peer.send_move(second, choice).unwrap();
    assert_eq!(next_move(&mut events, Player::Black).await, (choice, false));

    handle.quit();
    game.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_online_mode_plays_remote_moves() {
    let config = MatchConfig::default()
        .with_mode(GameMode::Online)
        .with_think_delay_ms(20)
        .with_timeout_ms(5_000);
    let SeatPlan { black, white, remotes } = config.build_seats().unwrap();
    let (_, peer) = remotes.into_iter().next().unwrap();

    let coordinator = TurnCoordinator::with_seed(black, white, 4);
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (orchestrator, handle) = Orchestrator::new(coordinator, config.timing(), event_tx);
    let game = tokio::spawn(orchestrator.run());

    handle.submit_move(pos(2, 3)).await.unwrap();
    let ticket = next_turn(&mut events, Player::White).await;
    let reply = handle.snapshot().legal_moves()[0];
    peer.send_move(ticket, reply).unwrap();
    assert_eq!(next_move(&mut events, Player::White).await, (reply, false));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.active_player(), &Some(Player::Black));
    assert_eq!(snapshot.last_move().map(|m| m.position), Some(reply));

    handle.quit();
    game.await.unwrap().unwrap();
}
