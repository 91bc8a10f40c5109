use jarvis::core::ai::{ERROR_MESSAGE, OFFLINE_MESSAGE};
use jarvis::error::AiError;
use jarvis::memory::MemoryStore;
use jarvis::router::{Action, Response, Router, SideEffect};
use jarvis::session::{SessionState, Theme, Utterance};

mod common;
use common::{Fixture, MockAi};

fn state() -> SessionState {
    SessionState::new("Sir", Theme::Dark, false)
}

async fn say(router: &mut Router, text: &str) -> Response {
    router.dispatch(&Utterance::typed(text), &state()).await
}

#[tokio::test]
async fn test_termination_takes_precedence() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "remember that goodbye is a word").await;
    assert_eq!(response.effect, Some(SideEffect::Terminate));
    assert!(router.memory().data().personal_info.is_empty());
    assert!(fx.ai.prompts().is_empty());
}

#[tokio::test]
async fn test_name_is_remembered_and_used() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "My name is Alex").await;
    assert_eq!(response.text, "Understood, I'll call you Alex from now on.");
    assert_eq!(
        response.effect,
        Some(SideEffect::RenameUser("Alex".to_string()))
    );
    assert_eq!(router.memory().get_fact("name"), Some("alex"));
}

#[tokio::test]
async fn test_fact_recall() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "what is my birthday").await;
    assert_eq!(response.text, "I don't have information about your birthday");

    let response = say(&mut router, "remember that my birthday is June 5th").await;
    assert_eq!(response.effect, Some(SideEffect::Remembered));

    let response = say(&mut router, "what's my birthday?").await;
    assert_eq!(response.text, "Your birthday is june 5th");
}

#[tokio::test]
async fn test_lists_and_dictionaries() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "add milk to shopping list").await;
    assert_eq!(response.text, "I couldn't find a list named shopping");

    say(&mut router, "create a list called shopping").await;
    say(&mut router, "add milk to shopping list").await;
    say(&mut router, "add eggs to my shopping list").await;
    let response = say(&mut router, "show me the shopping list").await;
    let detail = response.detail.expect("list contents");
    assert!(detail.contains("- milk"));
    assert!(detail.contains("- eggs"));

    say(&mut router, "create a dictionary called capitals").await;
    let response = say(&mut router, "add france is paris to capitals dictionary").await;
    assert_eq!(response.text, "Added france as paris to capitals dictionary");
    let response = say(&mut router, "show my capitals dictionary").await;
    assert!(response.detail.unwrap().contains("- france: paris"));
}

#[tokio::test]
async fn test_memory_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.json");
    let fx = Fixture::new(MockAi::answering("unused"));

    {
        let mut router = fx.router(MemoryStore::load(&path));
        say(&mut router, "create a list called todo").await;
        say(&mut router, "add call mom to todo list").await;
        say(&mut router, "my name is Pepper").await;
    }

    let router = fx.router(MemoryStore::load(&path));
    let data = router.memory().data();
    assert_eq!(data.custom_lists["todo"], vec!["call mom".to_string()]);
    assert_eq!(data.personal_info["name"], "pepper");
}

#[tokio::test]
async fn test_unmatched_goes_to_ai_with_persona() {
    let fx = Fixture::new(MockAi::answering("Forty-two, Sir."));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "what is the meaning of life").await;
    assert_eq!(response.text, "Forty-two, Sir.");

    let prompts = fx.ai.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Respond as JARVIS from Iron Man to Sir."));
    assert!(prompts[0].ends_with("Question: what is the meaning of life"));
}

#[tokio::test]
async fn test_ai_failure_keeps_session_alive() {
    let fx = Fixture::new(MockAi::new(vec![
        Err(AiError::ServiceError("500".to_string())),
        Err(AiError::Timeout),
        Err(AiError::ServiceError("500".to_string())),
    ]));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "why is the sky blue").await;
    assert_eq!(response.text, ERROR_MESSAGE);
    assert!(router.ai_enabled());

    say(&mut router, "why is grass green").await;
    say(&mut router, "why is water wet").await;
    assert!(!router.ai_enabled());

    let response = say(&mut router, "why is fire hot").await;
    assert_eq!(response.text, OFFLINE_MESSAGE);
    assert_eq!(fx.ai.prompts().len(), 3);

    let response = say(&mut router, "reconnect ai").await;
    assert_eq!(response.text, "AI systems back online.");
    assert!(router.ai_enabled());
}

#[tokio::test]
async fn test_launch_resolution() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "open calculator").await;
    assert_eq!(
        response.text,
        "Application calculator not in my protocol database"
    );
    assert!(response.effect.is_none());

    let response = say(&mut router, "launch notepad").await;
    match response.effect {
        Some(SideEffect::LaunchApp { command, .. }) => {
            assert_eq!(command.app, "notepad");
            assert_eq!(command.invocation, "gedit");
        }
        other => panic!("expected a launch, got {:?}", other),
    }
    // Routing alone never spawns
    assert!(fx.launcher.spawned().is_empty());
}

#[tokio::test]
async fn test_translation_falls_back_to_phrasebook() {
    let fx = Fixture::new(MockAi::answering("unused"));
    fx.ai
        .healthy
        .store(false, std::sync::atomic::Ordering::SeqCst);
    let mut router = fx.router(MemoryStore::in_memory());
    say(&mut router, "reconnect").await;
    assert!(!router.ai_enabled());

    let response = say(&mut router, "translate hello to French").await;
    assert!(response.text.contains("bonjour"), "{}", response.text);

    let response = say(&mut router, "translate spaceship to klingon").await;
    assert_eq!(
        response.text,
        "I don't have a translation for 'spaceship' to klingon in my database."
    );
}

#[tokio::test]
async fn test_features_without_network() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "weather").await;
    assert!(response.text.starts_with("Weather in London: clear sky."));

    let response = say(&mut router, "weather in Atlantis").await;
    assert_eq!(response.text, "Weather data not found for Atlantis");

    let response = say(&mut router, "search for rust lifetimes").await;
    assert_eq!(
        response.effect,
        Some(SideEffect::OpenUrl(
            "https://www.google.com/search?q=rust%20lifetimes".to_string()
        ))
    );

    let response = say(&mut router, "help").await;
    assert!(response.detail.is_some());

    let response = say(&mut router, "   ").await;
    assert_eq!(response.text, "I didn't catch that.");
}

#[tokio::test]
async fn test_classify() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let router = fx.router(MemoryStore::in_memory());

    assert_eq!(router.classify("Jarvis, what time is it?"), Some(Action::Time));
    assert_eq!(router.classify("toggle theme"), Some(Action::ToggleTheme));
    assert_eq!(router.classify("compose a sonnet"), None);
}

#[tokio::test]
async fn test_bare_search_opens_browser() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    assert_eq!(router.classify("search rust tutorials"), Some(Action::WebSearch));
    let response = say(&mut router, "Search rust tutorials").await;
    assert_eq!(
        response.effect,
        Some(SideEffect::OpenUrl(
            "https://www.google.com/search?q=rust%20tutorials".to_string()
        ))
    );

    let response = say(&mut router, "search youtube for cats").await;
    assert_eq!(
        response.effect,
        Some(SideEffect::OpenUrl(
            "https://www.youtube.com/results?search_query=cats".to_string()
        ))
    );
    assert!(fx.ai.prompts().is_empty());
}

#[tokio::test]
async fn test_quick_system_queries() {
    let fx = Fixture::new(MockAi::answering("unused"));
    let mut router = fx.router(MemoryStore::in_memory());

    let response = say(&mut router, "cpu usage").await;
    assert!(response.text.starts_with("Current CPU usage: "), "{}", response.text);

    let response = say(&mut router, "check memory usage").await;
    assert!(response.text.starts_with("Memory usage: "), "{}", response.text);
    assert!(response.text.contains("Available: "));

    // Route to the loopback probe address
    let response = say(&mut router, "what is the ip address").await;
    assert_eq!(response.text, "Your IP address is 127.0.0.1");

    let response = say(&mut router, "network stats").await;
    assert!(response.text.starts_with("Network statistics: Bytes Sent: "));

    let response = say(&mut router, "what time was it 3 hours ago").await;
    assert!(response.text.starts_with("3 hours ago it was "), "{}", response.text);
    assert!(response.text.ends_with(", Sir"));

    let response = say(&mut router, "what time will it be in two hours").await;
    assert!(response.text.starts_with("In 2 hours it will be "), "{}", response.text);

    let response = say(&mut router, "what was the date yesterday").await;
    assert!(response.text.starts_with("Yesterday was "), "{}", response.text);

    assert!(fx.ai.prompts().is_empty());
    assert!(router.memory().data().personal_info.is_empty());
}
