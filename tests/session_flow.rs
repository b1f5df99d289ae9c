use pairs_game::{
    dispatch, publish, CardPosition, CardStatus, GameConfig, GameEvent, GameSession,
    GameSummary, InputTarget, SessionPhase, Symbol, TextDisplay,
};
use std::collections::HashMap;

fn forced(dimension: usize, deal: &[&str]) -> GameSession {
    let deal = deal.iter().map(|symbol| symbol.to_string()).collect();
    GameSession::from_deal(GameConfig::new(dimension), deal).expect("deal should be valid")
}

/// 按符号把位置两两分组，模拟记忆完美的玩家。
fn pairs_of(session: &GameSession) -> Vec<(CardPosition, CardPosition)> {
    let mut groups: HashMap<Symbol, Vec<CardPosition>> = HashMap::new();
    for card in session.board().cards() {
        groups
            .entry(card.symbol.clone())
            .or_default()
            .push(card.position);
    }
    let mut pairs: Vec<(CardPosition, CardPosition)> = groups
        .into_values()
        .map(|positions| (positions[0], positions[1]))
        .collect();
    pairs.sort_unstable();
    pairs
}

#[test]
fn two_by_two_walkthrough() {
    let mut session = forced(2, &["A", "A", "B", "B"]);

    session.flip(0);
    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(session.face_up_count(), 1);
    assert_eq!(session.total_flips(), 1);

    session.flip(1);
    assert_eq!(session.face_up_count(), 0);
    assert_eq!(session.total_flips(), 2);
    assert_eq!(session.board().positions_with(CardStatus::Matched), vec![0, 1]);

    session.flip(2);
    assert_eq!(session.face_up_count(), 1);
    assert_eq!(session.total_flips(), 3);

    session.flip(3);
    assert_eq!(session.total_flips(), 4);
    assert!(session.board().all_matched());
    assert_eq!(session.phase(), SessionPhase::Running);

    session.advance(1_000);
    assert_eq!(session.phase(), SessionPhase::Won);
    assert_eq!(session.summary().map(|summary| summary.moves), Some(4));
}

#[test]
fn perfect_memory_game_on_a_seeded_board() {
    let config = GameConfig::new(4).with_seed(2024);
    let mut session = GameSession::new(config).expect("default pool covers 4x4");
    let mut display = TextDisplay::new();

    for (first, second) in pairs_of(&session) {
        publish(&session.flip(first), &mut display);
        publish(&session.flip(second), &mut display);
        publish(&session.advance(500), &mut display);
    }
    assert!(session.board().all_matched());
    assert_eq!(session.total_flips(), 16);

    publish(&session.advance(1_000), &mut display);
    assert!(session.is_won());

    let summary = session.summary().expect("won");
    assert_eq!(summary.moves, 16);
    // 最后一对在 3500ms 配对，胜利在 4500ms 宣布，此前计时触发了 4 次。
    assert_eq!(summary.seconds, 4);
    assert_eq!(
        display.banner.as_deref(),
        Some("You won!\nwith 16 moves\nunder 4 seconds")
    );
}

#[test]
fn mismatches_cost_moves_but_not_progress() {
    let mut session = forced(2, &["A", "B", "A", "B"]);

    session.flip(0);
    session.flip(1);
    session.advance(1_000);
    assert_eq!(session.board().positions_with(CardStatus::FaceDown).len(), 4);

    session.flip(0);
    session.flip(2);
    session.flip(1);
    session.flip(3);
    assert!(session.board().all_matched());
    session.advance(1_000);

    assert_eq!(
        session.summary(),
        Some(GameSummary {
            moves: 6,
            seconds: 2
        })
    );
}

#[test]
fn impatient_clicks_during_reveal_are_counted() {
    let mut session = forced(2, &["A", "B", "A", "B"]);

    session.flip(0);
    session.flip(1);
    session.flip(2);
    session.flip(3);
    assert_eq!(session.total_flips(), 4);
    assert_eq!(session.face_up_count(), 4);
    assert_eq!(session.board().positions_with(CardStatus::FaceUp), vec![0, 1]);

    let events = session.advance(1_000);
    assert!(events.contains(&GameEvent::CardsHidden {
        positions: vec![0, 1]
    }));
    assert_eq!(session.face_up_count(), 0);

    // 计数归零后可以正常继续。
    session.flip(0);
    session.flip(2);
    assert_eq!(session.board().positions_with(CardStatus::Matched), vec![0, 2]);
}

#[test]
fn clicks_route_through_the_dispatcher() {
    let mut session = forced(2, &["A", "A", "B", "B"]);

    dispatch(&mut session, InputTarget::StartButton);
    session.advance(3_000);
    for position in [0, 1, 1, 2, 3] {
        dispatch(&mut session, InputTarget::Card { position });
    }
    session.advance(1_000);

    assert!(session.is_won());
    assert_eq!(
        session.summary(),
        Some(GameSummary {
            moves: 4,
            seconds: 4
        })
    );
    assert!(dispatch(&mut session, InputTarget::Card { position: 2 }).is_empty());
}

#[test]
fn larger_boards_accept_custom_pools() {
    let pool: Vec<String> = (0..18).map(|index| format!("s{index}")).collect();
    let config = GameConfig::new(6).with_symbols(pool).with_seed(7);
    let session = GameSession::new(config).expect("18 symbols cover a 6x6 board");

    assert_eq!(session.board().dimension(), 6);
    assert_eq!(session.board().len(), 36);
    assert_eq!(pairs_of(&session).len(), 18);
}

#[test]
fn timer_keeps_running_until_victory() {
    let mut session = forced(2, &["A", "A", "B", "B"]);
    session.start();

    let mut seconds = Vec::new();
    for _ in 0..5 {
        for event in session.advance(1_000) {
            if let GameEvent::Tick { seconds: value, .. } = event {
                seconds.push(value);
            }
        }
    }
    assert_eq!(seconds, vec![1, 2, 3, 4, 5]);

    for position in 0..4 {
        session.flip(position);
    }
    session.advance(1_000);
    assert_eq!(session.elapsed_seconds(), 6);

    session.advance(60_000);
    assert_eq!(session.elapsed_seconds(), 6);
    assert!(!session.timer_active());
}
