use jarvis::memory::MemoryStore;
use jarvis::router::SideEffect;
use jarvis::session::{SessionState, Theme, Utterance};
use tokio::time::Instant;

mod common;
use common::{Fixture, MockAi};

#[tokio::test]
async fn test_garbage_flood_fuzz() {
    let fx = Fixture::new(MockAi::answering("I'm afraid that's not a command, Sir."));
    let mut router = fx.router(MemoryStore::in_memory());
    let state = SessionState::new("Sir", Theme::Dark, false);

    // Simulate a flood of random garbage text
    let garbage = [
        "asdfghjkl",
        "!!! @@@ ###",
        "1234567890",
        "extremely long string that doesn't mean anything to the system at all but might cause buffer issues if we were in C but we are in Rust so it's just a long string",
        "",
        " ",
        "İİİ ßß ΣΣΣ",
        "add  to  list",
        "remember that is",
        "show me the  dictionary",
    ];

    for text in garbage {
        let res = router.dispatch(&Utterance::typed(text), &state).await;
        assert!(!res.text.is_empty(), "no reply for {:?}", text);
        assert!(
            !matches!(
                res.effect,
                Some(SideEffect::Terminate | SideEffect::LaunchApp { .. })
            ),
            "{:?} triggered {:?}",
            text,
            res.effect
        );
    }

    // High-frequency commands should not degrade the router
    let commands = ["what time is it", "hello", "status", "thanks"];
    let start = Instant::now();
    for i in 0..100 {
        let cmd = commands[i % commands.len()];
        let _ = router.dispatch(&Utterance::typed(cmd), &state).await;
    }
    println!("Processed 100 commands in {:?}", start.elapsed());

    let res = router.dispatch(&Utterance::typed("quit"), &state).await;
    assert_eq!(res.effect, Some(SideEffect::Terminate));
}

#[tokio::test]
async fn test_malformed_memory_commands_fuzz() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());
    let state = SessionState::new("Sir", Theme::Dark, false);

    for text in [
        "remember that",
        "remember that the sky is blue is true",
        "add to shopping list",
        "add france paris to capitals dictionary",
        "create a list called",
        "what is my",
    ] {
        let res = router.dispatch(&Utterance::typed(text), &state).await;
        assert_ne!(res.effect, Some(SideEffect::Remembered), "{:?}", text);
    }
    assert_eq!(router.memory().data(), &Default::default());
}
