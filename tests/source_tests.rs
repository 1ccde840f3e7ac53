// tests/source_tests.rs

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Router, extract::State, http::StatusCode, routing::get};
use quiz_backend::sources::{
    LoadError, LocalFileSource, QuestionCache, QuestionLoader, QuestionSource, RemoteSheetSource,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture exists")
}

/// Serves `router` on a random port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    address
}

/// A sheet endpoint that counts how often it is fetched.
async fn counting_sheet(body: String) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/sheet.csv",
            get(|State((hits, body)): State<(Arc<AtomicUsize>, String)>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                body
            }),
        )
        .with_state((hits.clone(), body));

    let address = serve(router).await;
    (format!("{}/sheet.csv", address), hits)
}

fn remote(url: &str, timeout: Duration) -> Box<dyn QuestionSource> {
    Box::new(RemoteSheetSource::new(url, timeout).unwrap())
}

fn local(name: &str) -> Box<dyn QuestionSource> {
    Box::new(LocalFileSource::new(fixture(name)))
}

#[tokio::test]
async fn local_fixture_loads_with_scenario_groups() {
    let loader = QuestionLoader::new(vec![local("questions.csv")]);
    let store = loader.load().await.expect("fixture loads");

    assert_eq!(store.len(), 5);
    assert!(store.source().starts_with("local file"));

    let groups = store.scenario_groups();
    assert_eq!(groups.len(), 2);
    let (_, shared) = store.scenario_of(1).unwrap();
    assert_eq!(shared, &[1, 2]);
    assert!(store.scenario_of(0).is_none());
    assert!(store.scenario_of(3).is_none());

    assert_eq!(store.get(3).unwrap().available_options().len(), 3);
    for question in store.questions() {
        assert!(question.correct_answer_listed());
    }
}

#[tokio::test]
async fn remote_sheet_is_preferred() {
    let (url, hits) = counting_sheet(fixture_text("questions.csv")).await;
    let loader = QuestionLoader::new(vec![
        remote(&url, Duration::from_secs(5)),
        local("does_not_exist.csv"),
    ]);

    let store = loader.load().await.unwrap();
    assert_eq!(store.len(), 5);
    assert!(store.source().starts_with("remote sheet"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local() {
    let loader = QuestionLoader::new(vec![
        remote("http://127.0.0.1:1/sheet.csv", Duration::from_secs(2)),
        local("questions.csv"),
    ]);

    let store = loader.load().await.unwrap();
    assert_eq!(store.len(), 5);
    assert!(store.source().starts_with("local file"));
}

#[tokio::test]
async fn error_status_falls_back_to_local() {
    let address = serve(Router::new().route(
        "/sheet.csv",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;
    let url = format!("{}/sheet.csv", address);

    let source = RemoteSheetSource::new(&url, Duration::from_secs(2)).unwrap();
    assert!(matches!(source.fetch().await, Err(LoadError::Network(_))));

    let loader = QuestionLoader::new(vec![remote(&url, Duration::from_secs(2)), local("questions.csv")]);
    assert_eq!(loader.load().await.unwrap().len(), 5);
}

#[tokio::test]
async fn slow_remote_times_out_and_falls_back() {
    let address = serve(Router::new().route(
        "/sheet.csv",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "too late"
        }),
    ))
    .await;
    let url = format!("{}/sheet.csv", address);

    let source = RemoteSheetSource::new(&url, Duration::from_millis(200)).unwrap();
    assert!(matches!(source.fetch().await, Err(LoadError::Timeout(_))));

    let loader = QuestionLoader::new(vec![
        remote(&url, Duration::from_millis(200)),
        local("questions.csv"),
    ]);
    assert_eq!(loader.load().await.unwrap().len(), 5);
}

#[tokio::test]
async fn schema_mismatch_is_fatal_even_with_fallback() {
    let (url, _) = counting_sheet(fixture_text("missing_columns.csv")).await;
    let loader = QuestionLoader::new(vec![
        remote(&url, Duration::from_secs(5)),
        local("questions.csv"),
    ]);

    match loader.load().await {
        Err(LoadError::Schema(missing)) => {
            assert_eq!(missing, vec!["OptionC", "OptionD", "CorrectAnswer"]);
        }
        other => panic!("expected schema error, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn no_usable_source_fails_closed() {
    let loader = QuestionLoader::new(vec![
        remote("http://127.0.0.1:1/sheet.csv", Duration::from_secs(2)),
        local("does_not_exist.csv"),
    ]);

    match loader.load().await {
        Err(LoadError::Exhausted(reasons)) => assert_eq!(reasons.len(), 2),
        other => panic!("expected exhausted sources, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn cache_reuses_table_until_refresh() {
    let (url, hits) = counting_sheet(fixture_text("questions.csv")).await;
    let cache = QuestionCache::new(
        QuestionLoader::new(vec![remote(&url, Duration::from_secs(5))]),
        Duration::from_secs(300),
    );

    let first = cache.get().await.unwrap();
    let second = cache.get().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let refreshed = cache.refresh().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &refreshed));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_cache_fetches_again() {
    let (url, hits) = counting_sheet(fixture_text("questions.csv")).await;
    let cache = QuestionCache::new(
        QuestionLoader::new(vec![remote(&url, Duration::from_secs(5))]),
        Duration::ZERO,
    );

    cache.get().await.unwrap();
    cache.get().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
