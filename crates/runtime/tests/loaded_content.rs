//! Runs a session over a board and catalog authored as RON files.

use std::io::Write;
use std::time::Duration;

use board_content::{BoardLoader, TemplateLoader};
use board_core::{Actor, ActorId, Slot, TileId};
use board_runtime::providers::{FirstPartnerChooser, ScriptedDice};
use board_runtime::{MatchSession, SessionConfig};

const BOARD_RON: &str = r#"(
    tiles: [
        (id: 0, kind: Start, position: (0, 0), next: [1], partner_pool: [0, 1]),
        (id: 1, position: (1, 0), next: [2], effects: [Damage(amount: 1)]),
        (id: 2, kind: Positive, position: (2, 0), next: [3]),
        (id: 3, position: (3, 0), next: [0]),
    ],
)"#;

const CATALOG_RON: &str = r#"[
    (id: 0, name: "Moss", max_hp: 5, attack: 2, salary: 1,
     first_warning: "Um, my pay?", final_warning: "I'm done."),
    (id: 1, name: "Brick", max_hp: 3, attack: 4, salary: 3, personality: Mean),
]"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("board_runtime=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn authored_content_drives_a_full_turn() {
    init_tracing();

    let mut board_file = tempfile::NamedTempFile::new().unwrap();
    board_file.write_all(BOARD_RON.as_bytes()).unwrap();
    let mut catalog_file = tempfile::NamedTempFile::new().unwrap();
    catalog_file.write_all(CATALOG_RON.as_bytes()).unwrap();

    let board = BoardLoader::load(board_file.path()).unwrap();
    let templates = TemplateLoader::load(catalog_file.path()).unwrap();

    let mut session = MatchSession::builder()
        .config(SessionConfig {
            combat_settle: Duration::ZERO,
            rng_seed: Some(11),
            ..SessionConfig::default()
        })
        .board(board)
        .actor(Actor::new(ActorId(0), "A", TileId(3)))
        .templates(templates)
        .dice(ScriptedDice::new([5, 2, 2]))
        .partner_choice(FirstPartnerChooser::default())
        .build()
        .unwrap();

    session.roll_turn_order().await.unwrap();
    session.play_turn().await.unwrap();

    // 3 -> 0 (Start: recruitment fires) -> 1 (Damage effect on landing).
    let actor = session.state().actor(ActorId(0)).unwrap();
    assert_eq!(actor.current_tile(), TileId(1));
    assert_eq!(actor.health(), 9);
    assert!(actor.partner(Slot::Front).is_some());

    // The recruit pays its salary at the start of the next turn.
    session.play_turn().await.unwrap();
    let actor = session.state().actor(ActorId(0)).unwrap();
    assert!(actor.energy() < 10);
}
