//! End-to-end conversation scenarios.
//!
//! Each test builds its own catalog and dispatcher; session tests run on a
//! paused clock so the typing delay elapses instantly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use uniguide_chat::{
    ChatError, ChatSession, KnowledgeBase, QueryDispatcher, SessionMode, Tier, TurnOutcome,
};
use uniguide_core::config::ChatConfig;
use uniguide_core::error::{Result as CoreResult, UniGuideError};
use uniguide_core::provider::{EntityProvider, InMemoryCatalog};
use uniguide_core::types::{AdmissionStatus, Role, University};

// =============================================================================
// Helpers
// =============================================================================

fn chat_config() -> ChatConfig {
    ChatConfig {
        greeting: "Hello! I'm UniGuide.".to_string(),
        response_delay_ms: 1000,
        provider_timeout_ms: 500,
        max_message_length: 500,
    }
}

fn dispatcher_with(provider: Arc<dyn EntityProvider>) -> Arc<QueryDispatcher> {
    Arc::new(QueryDispatcher::with_defaults(provider, &chat_config()).unwrap())
}

fn sample_dispatcher() -> Arc<QueryDispatcher> {
    dispatcher_with(Arc::new(InMemoryCatalog::sample()))
}

fn numbered_catalog(count: u64) -> InMemoryCatalog {
    let entities = (1..=count)
        .map(|id| University {
            id,
            name: format!("Test University {}", id),
            acronym: format!("TU{}", id),
            location: "Quezon City".to_string(),
            admission_status: AdmissionStatus::Unknown,
            programs: Vec::new(),
            description: None,
        })
        .collect();
    InMemoryCatalog::new(entities)
}

struct UnreachableProvider;

#[async_trait]
impl EntityProvider for UnreachableProvider {
    async fn list_entities(&self) -> CoreResult<Vec<University>> {
        Err(UniGuideError::Provider("connection refused".into()))
    }
    async fn find_entity_by_name(&self, _name: &str) -> CoreResult<Option<University>> {
        Err(UniGuideError::Provider("connection refused".into()))
    }
}

// =============================================================================
// Dispatcher scenarios
// =============================================================================

#[tokio::test]
async fn greeting_keyword_carries_entry_suggestions() {
    let reply = sample_dispatcher().resolve("hi").await;
    let kb = KnowledgeBase::builtin().unwrap();
    let entry = kb.get("hi").unwrap();

    assert_eq!(reply.tier, Tier::Keyword);
    assert_eq!(reply.text, entry.response);
    assert_eq!(reply.suggestions, entry.suggestions);
}

#[tokio::test]
async fn tell_me_about_returns_long_description() {
    let catalog = InMemoryCatalog::sample();
    let pup = catalog.find_entity_by_name("PUP").await.unwrap().unwrap();

    let reply = sample_dispatcher().resolve("tell me about PUP").await;
    assert_eq!(reply.tier, Tier::Pattern);
    assert_eq!(reply.text, pup.long_description());
}

#[tokio::test]
async fn unknown_university_is_reported_not_found() {
    let reply = sample_dispatcher()
        .resolve("tell me about fakeuniversity123")
        .await;
    assert_eq!(reply.tier, Tier::Pattern);
    assert!(reply.text.contains("couldn't find"));
    assert!(reply.text.contains("fakeuniversity123"));
}

#[tokio::test]
async fn university_count_reflects_catalog_size() {
    let reply = dispatcher_with(Arc::new(numbered_catalog(42)))
        .resolve("How many universities are there?")
        .await;
    assert_eq!(reply.tier, Tier::Dynamic);
    assert!(reply.text.contains("42"));
}

#[tokio::test]
async fn university_count_degrades_when_catalog_unreachable() {
    let reply = dispatcher_with(Arc::new(UnreachableProvider))
        .resolve("How many universities are there?")
        .await;
    assert_eq!(reply.tier, Tier::Dynamic);
    assert!(!reply.text.is_empty());
    assert!(reply.text.contains("university list"));
    assert!(!reply.text.contains("connection refused"));
}

#[tokio::test]
async fn catalog_change_is_visible_to_next_query() {
    let catalog = Arc::new(numbered_catalog(3));
    let dispatcher = dispatcher_with(catalog.clone());
    assert!(dispatcher.resolve_text("how many universities").await.contains('3'));

    catalog
        .upsert(University {
            id: 99,
            name: "Mapua University".to_string(),
            acronym: "MAPUA".to_string(),
            location: "Intramuros, Manila".to_string(),
            admission_status: AdmissionStatus::Open,
            programs: Vec::new(),
            description: None,
        })
        .unwrap();
    assert!(dispatcher.resolve_text("how many universities").await.contains('4'));
    assert_eq!(
        dispatcher.resolve_text("where is mapua").await,
        "Mapua University (MAPUA) is located in Intramuros, Manila."
    );
}

// =============================================================================
// Session scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn busy_session_rejects_second_submission() {
    let session = ChatSession::new(sample_dispatcher(), &chat_config());

    let first = session.submit("hi").unwrap();
    assert_eq!(session.mode(), SessionMode::AwaitingResponse);
    assert!(matches!(
        session.submit("tell me about pup"),
        Err(ChatError::AwaitingResponse)
    ));

    assert!(matches!(first.wait().await, TurnOutcome::Delivered(_)));
    let log = session.messages();
    assert_eq!(log.len(), 3);
    assert_eq!(log[1].content, "hi");
    assert_eq!(log[2].role, Role::Assistant);
}

#[tokio::test(start_paused = true)]
async fn reset_during_typing_drops_stale_reply() {
    let session = ChatSession::new(sample_dispatcher(), &chat_config());

    let pending = session.submit("tell me about pup").unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    session.reset();

    assert_eq!(pending.wait().await, TurnOutcome::Discarded);
    tokio::time::sleep(Duration::from_secs(5)).await;

    let log = session.messages();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].role, Role::Assistant);
    assert_eq!(log[0].content, "Hello! I'm UniGuide.");
    assert_eq!(session.mode(), SessionMode::Idle);
}

#[tokio::test(start_paused = true)]
async fn full_conversation_alternates_roles() {
    let session = ChatSession::new(sample_dispatcher(), &chat_config());
    for text in ["hi", "where is ust", "how many universities", "compare pup and up"] {
        session.submit(text).unwrap().wait().await;
    }

    let log = session.messages();
    assert_eq!(log.len(), 9);
    for (i, message) in log.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::Assistant } else { Role::User };
        assert_eq!(message.role, expected, "message {}", i);
    }
    assert!(log.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}
