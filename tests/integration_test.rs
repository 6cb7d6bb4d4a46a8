// Integration tests for Yojana
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use yojana_core::conversation::merge;
use yojana_core::text::{jaccard, keyword_similarity, token_set};
use yojana_core::{
    CatalogCache, Clarification, Confidence, CorpusSnapshot, EligibilityConstraints,
    EligibilityStatus, PartialProfile, Range, RankingPath, RetrievalEngine, SchemeRecord, Scope,
    TargetGroup, UserProfile,
};
use yojana_engine::{EngineConfig, Error, SchemeEngine};
use yojana_interpret::{LanguageUnderstandingService, ServiceError};
use yojana_storage::{SessionId, SharedCorpus};

fn goa_corpus() -> Vec<SchemeRecord> {
    vec![
        SchemeRecord::new("goa-dairy", "Goa Dairy Development Scheme")
            .with_state("Goa")
            .with_description("Assistance for milch animals and cattle sheds")
            .with_subcategories(["Animal husbandry"]),
        SchemeRecord::new("goa-soil", "Goa Soil Health Mission")
            .with_state("Goa")
            .with_subcategories(["Soil health", "animal husbandry"]),
        SchemeRecord::new("kerala-fish", "Kerala Fisheries Support")
            .with_state("Kerala")
            .with_subcategories(["Fishing and hunting"]),
        SchemeRecord::new("pmfby", "Crop Insurance Scheme")
            .with_category("Agriculture,Rural & Environment")
            .with_subcategories(["Crop insurance"]),
        SchemeRecord::new("nlm", "Animal Husbandry Grant")
            .with_category("Agriculture,Rural & Environment")
            .with_description("Support for livestock and dairy farmers")
            .with_constraints(EligibilityConstraints {
                age: Some(Range::between(18, 60)),
                ..Default::default()
            })
            .with_subcategories(["Animal husbandry"]),
    ]
}

#[tokio::test]
async fn test_age_turn_never_becomes_selection() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("farmer");
    engine.interpret_turn(&id, "I am from Goa").await.unwrap();

    let profile = engine.interpret_turn(&id, "45 years old").await.unwrap();
    assert_eq!(profile.age, Some(45));
    assert_eq!(profile.subcategory, None);
    assert_eq!(profile.clarification, None);
}

#[tokio::test]
async fn test_out_of_range_selection_leaves_profile_alone() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("farmer");
    engine.interpret_turn(&id, "Goa, state schemes only").await.unwrap();
    engine.interpret_turn(&id, "1").await.unwrap();

    let catalog = engine.catalog(&id).await.unwrap();
    let k = catalog.len();
    assert_eq!(catalog.names(), vec!["Animal husbandry", "Soil health"]);

    let before = engine.profile(&id).await.unwrap();
    let err = engine.resolve_selection(&id, k as i64 + 1).await.unwrap_err();
    assert_eq!(
        err.as_core(),
        Some(&yojana_core::Error::OutOfRangeSelection { requested: k as i64 + 1, available: k })
    );

    let after = engine.profile(&id).await.unwrap();
    assert_eq!(after.state, before.state);
    assert_eq!(after.subcategory.as_deref(), Some("Animal husbandry"));
    assert_eq!(after.scope, Scope::StateOnly);
}

#[test]
fn test_merge_is_idempotent_on_fields() {
    let partial = PartialProfile {
        state: Some("Goa".into()),
        age: Some(38),
        crops: vec!["Rice".into()],
        target_group: Some(TargetGroup::Woman),
        ..Default::default()
    };
    let once = merge(&UserProfile::new(), &partial, "turn");
    let twice = merge(&once, &partial, "turn");

    assert!(once.same_fields(&twice));
    assert_eq!(twice.crops, vec!["Rice".to_string()]);
    assert_eq!(twice.turn_history.len(), 2);
}

#[test]
fn test_goa_catalog_is_state_pool_then_central_pool() {
    let snapshot = CorpusSnapshot::new(1, goa_corpus());
    let cache = CatalogCache::new();

    let first = cache.load(&snapshot, Scope::All, Some("Goa"));
    let second = cache.load(&snapshot, Scope::All, Some("goa"));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);

    let state_pool = cache.load(&snapshot, Scope::StateOnly, Some("Goa"));
    let central_pool = cache.load(&snapshot, Scope::CentralOnly, None);
    let expected: Vec<&str> = state_pool
        .names()
        .into_iter()
        .chain(central_pool.names())
        .collect();
    assert_eq!(first.names(), expected);
    assert_eq!(
        first.names(),
        vec!["Animal husbandry", "Soil health", "Crop insurance", "Animal husbandry"]
    );
    let indices: Vec<usize> = first.entries().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
}

#[test]
fn test_jaccard_properties() {
    let a = token_set("crop insurance for farmers");
    let b = token_set("Farmers crop insurance");
    let c = token_set("fishing boats");

    assert_eq!(jaccard(&a, &b), 1.0);
    assert_eq!(jaccard(&a, &c), 0.0);
    assert_eq!(
        keyword_similarity("dairy cattle grant", "cattle shed"),
        keyword_similarity("cattle shed", "dairy cattle grant")
    );
}

#[tokio::test]
async fn test_himachal_turn() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("hp");
    let profile = engine
        .interpret_turn(&id, "I'm 45 years old from Himachal Pradesh, need animal husbandry schemes")
        .await
        .unwrap();

    assert_eq!(profile.state.as_deref(), Some("Himachal Pradesh"));
    assert_eq!(profile.subcategory.as_deref(), Some("Animal husbandry"));
    assert_eq!(profile.age, Some(45));
    assert_eq!(profile.clarification, None);

    // Himachal has no schemes of its own here; the central grant still shows up
    let results = engine.find_schemes(&id, None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scheme_id, "nlm");
    assert_eq!(results[0].eligibility_status, EligibilityStatus::LikelyEligible);
}

#[tokio::test]
async fn test_bare_three_against_menu_of_two() {
    let corpus = vec![
        SchemeRecord::new("goa-1", "Goa Irrigation Aid")
            .with_state("Goa")
            .with_subcategories(["Irrigation"]),
        SchemeRecord::new("central-1", "National Seed Mission").with_subcategories(["Seeds"]),
    ];
    let engine = SchemeEngine::with_records(corpus).unwrap();
    let id = SessionId::from("goa");
    engine.interpret_turn(&id, "Goa").await.unwrap();
    assert_eq!(engine.catalog(&id).await.unwrap().len(), 2);

    let profile = engine.interpret_turn(&id, "3").await.unwrap();
    assert_eq!(
        profile.clarification,
        Some(Clarification::OutOfRangeSelection { requested: 3, available: 2 })
    );
    assert_eq!(profile.state.as_deref(), Some("Goa"));
    assert_eq!(profile.subcategory, None);
}

#[test]
fn test_keyword_ranking_without_embeddings() {
    let snapshot = CorpusSnapshot::new(
        1,
        vec![
            SchemeRecord::new("nlm", "Animal Husbandry Grant"),
            SchemeRecord::new("pmfby", "Crop Insurance Scheme"),
        ],
    );
    let results = RetrievalEngine::new()
        .search(&snapshot, &UserProfile::new(), "crop insurance", 10)
        .unwrap();

    assert_eq!(results[0].scheme_name, "Crop Insurance Scheme");
    assert!(results[0].relevance_score > 0.0);
    assert_eq!(results[1].scheme_name, "Animal Husbandry Grant");
    assert_eq!(results[1].relevance_score, 0.0);
    assert!(results.iter().all(|r| r.ranking == RankingPath::Keyword));
}

#[tokio::test]
async fn test_hashing_embedder_ranks_on_vector_path() {
    let engine = SchemeEngine::with_records(goa_corpus())
        .unwrap()
        .with_hashing_embedder()
        .unwrap();
    let id = SessionId::from("vec");
    engine.interpret_turn(&id, "I am from Goa").await.unwrap();

    let results = engine
        .find_schemes_with_query(&id, "crop insurance scheme", Some(3))
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].scheme_id, "pmfby");
    assert!(results.iter().all(|r| r.ranking == RankingPath::Vector));
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.relevance_score)));
}

#[tokio::test]
async fn test_eligibility_follows_profile() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("old");
    engine.interpret_turn(&id, "I need livestock support in Goa").await.unwrap();

    let results = engine.find_schemes(&id, None).await.unwrap();
    let grant = results.iter().find(|r| r.scheme_id == "nlm").unwrap();
    assert_eq!(grant.eligibility_status, EligibilityStatus::PossiblyEligible);

    engine.interpret_turn(&id, "I am 72 years old").await.unwrap();
    let results = engine.find_schemes(&id, None).await.unwrap();
    let grant = results.iter().find(|r| r.scheme_id == "nlm").unwrap();
    assert_eq!(grant.eligibility_status, EligibilityStatus::Unlikely);
    assert!(grant.reasons.iter().any(|r| r.contains("above the maximum 60")));

    let dairy = results.iter().find(|r| r.scheme_id == "goa-dairy").unwrap();
    assert_eq!(dairy.eligibility_status, EligibilityStatus::Unknown);
}

struct StalledService;

#[async_trait]
impl LanguageUnderstandingService for StalledService {
    async fn extract(&self, _text: &str, _prior: &UserProfile) -> Result<PartialProfile, ServiceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(ServiceError::Unavailable("never answers".into()))
    }
}

#[tokio::test]
async fn test_stalled_language_service_degrades() {
    let config = EngineConfig {
        extraction_timeout_ms: 25,
        ..Default::default()
    };
    let engine = SchemeEngine::new(config, Arc::new(SharedCorpus::new(goa_corpus())))
        .unwrap()
        .with_language_service(Arc::new(StalledService));
    let id = SessionId::from("slow");

    let profile = engine.interpret_turn(&id, "dairy farmer in Goa").await.unwrap();
    assert_eq!(profile.confidence, Confidence::Degraded);
    assert_eq!(profile.state.as_deref(), Some("Goa"));
    assert_eq!(profile.subcategory.as_deref(), Some("Animal husbandry"));

    // a menu pick never waits on the service
    let profile = engine.interpret_turn(&id, "1").await.unwrap();
    assert_eq!(profile.confidence, Confidence::Normal);
}

#[tokio::test]
async fn test_cancelled_turn_leaves_profile_untouched() {
    let config = EngineConfig {
        extraction_timeout_ms: 60_000,
        ..Default::default()
    };
    let engine = Arc::new(
        SchemeEngine::new(config, Arc::new(SharedCorpus::new(goa_corpus())))
            .unwrap()
            .with_language_service(Arc::new(StalledService)),
    );
    let id = SessionId::from("cancel");
    // menu picks skip the service
    engine.interpret_turn(&id, "1").await.unwrap();
    let before = engine.profile(&id).await.unwrap();
    assert_eq!(before.subcategory.as_deref(), Some("Crop insurance"));

    let turn = {
        let engine = engine.clone();
        let id = id.clone();
        tokio::spawn(async move {
            engine
                .interpret_turn(&id, "dairy farmer in Goa, 45 years old")
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    turn.abort();
    assert!(turn.await.unwrap_err().is_cancelled());

    let after = engine.profile(&id).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.turn_history, vec!["1".to_string()]);
    assert_eq!(after.state, None);
    assert_eq!(after.age, None);
}

#[tokio::test]
async fn test_menu_and_results_agree_without_state() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("nowhere");
    engine.interpret_turn(&id, "hello").await.unwrap();

    let menu = engine.catalog(&id).await.unwrap();
    assert_eq!(menu.names(), vec!["Crop insurance", "Animal husbandry"]);

    let results = engine
        .find_schemes_with_query(&id, "support", None)
        .await
        .unwrap();
    let mut ids: Vec<&str> = results.iter().map(|r| r.scheme_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["nlm", "pmfby"]);
}

#[tokio::test]
async fn test_number_from_previous_menu_is_rejected() {
    let engine = SchemeEngine::with_records(goa_corpus()).unwrap();
    let id = SessionId::from("menu");
    engine.interpret_turn(&id, "Goa").await.unwrap();
    let menu = engine.catalog(&id).await.unwrap();
    assert_eq!(menu.names()[0], "Animal husbandry");

    engine.interpret_turn(&id, "only central schemes").await.unwrap();
    let profile = engine.interpret_turn(&id, "1").await.unwrap();
    assert!(matches!(
        profile.clarification,
        Some(Clarification::SelectionKeyMismatch { .. })
    ));
    assert_eq!(profile.subcategory, None);
    assert_eq!(profile.scope, Scope::CentralOnly);
    assert_eq!(profile.state.as_deref(), Some("Goa"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_are_isolated() {
    let engine = Arc::new(SchemeEngine::with_records(goa_corpus()).unwrap());
    let states = ["Goa", "Kerala", "Punjab", "Bihar", "Assam", "Sikkim", "Tripura", "Odisha"];

    let mut handles = Vec::new();
    for (i, state) in states.iter().enumerate() {
        let engine = engine.clone();
        let state = state.to_string();
        handles.push(tokio::spawn(async move {
            let id = SessionId::new(format!("session-{i}"));
            engine.interpret_turn(&id, &format!("I farm in {state}")).await.unwrap();
            engine.interpret_turn(&id, &format!("I am {} years old", 30 + i)).await.unwrap();
            (state, engine.profile(&id).await.unwrap())
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (state, profile) = handle.await.unwrap();
        assert_eq!(profile.state.as_deref(), Some(state.as_str()));
        assert_eq!(profile.age, Some(30 + i as u32));
        assert_eq!(profile.turn_history.len(), 2);
    }
    assert_eq!(engine.sessions().len(), states.len());
}

#[tokio::test]
async fn test_same_session_turns_are_serialized() {
    let engine = Arc::new(SchemeEngine::with_records(goa_corpus()).unwrap());
    let id = SessionId::from("busy");

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            engine.interpret_turn(&id, &format!("I grow rice, turn {i}")).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let profile = engine.profile(&id).await.unwrap();
    assert_eq!(profile.turn_history.len(), 20);
    assert_eq!(profile.crops, vec!["Rice".to_string()]);
}

#[tokio::test]
async fn test_corpus_from_file_and_refresh() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let records = serde_json::to_string(&goa_corpus()).unwrap();
    file.write_all(records.as_bytes()).unwrap();

    let corpus = SharedCorpus::from_json_file(file.path()).unwrap();
    let engine = SchemeEngine::new(EngineConfig::default(), Arc::new(corpus)).unwrap();
    let id = SessionId::from("file");
    engine.interpret_turn(&id, "Kerala").await.unwrap();
    assert_eq!(
        engine.catalog(&id).await.unwrap().names(),
        vec!["Fishing and hunting", "Crop insurance", "Animal husbandry"]
    );

    let held = engine.snapshot();
    engine.refresh_corpus(vec![SchemeRecord::new("new", "New Kerala Scheme")
        .with_state("Kerala")
        .with_subcategories(["Organic farming"])]);

    assert_eq!(held.len(), 5);
    assert_eq!(engine.snapshot().version(), 2);
    assert_eq!(engine.catalog(&id).await.unwrap().names(), vec!["Organic farming"]);
}

#[tokio::test]
async fn test_idle_sessions_are_evicted() {
    let config = EngineConfig {
        session_idle_timeout_secs: 1,
        ..Default::default()
    };
    let engine = SchemeEngine::new(config, Arc::new(SharedCorpus::new(goa_corpus()))).unwrap();
    let id = SessionId::from("idle");
    engine.interpret_turn(&id, "Goa").await.unwrap();
    assert_eq!(engine.evict_idle(), 0);

    let later = std::time::Instant::now() + Duration::from_secs(5);
    assert_eq!(engine.sessions().evict_idle_at(later), 1);
    assert!(matches!(engine.profile(&id).await, Err(Error::SessionNotFound(_))));
}
