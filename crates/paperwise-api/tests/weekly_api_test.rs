//! Weekly recommendations endpoint over a real listener with in-memory
//! collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use paperwise_api::{router, AppState};
use paperwise_core::{
    CandidateQuery, CandidateSource, CollectionSummary, Error, ProfileSignalStore,
    RecommendationCategory, RecommendationSet, Result, SavedItem, SourcePaper,
};
use paperwise_recommend::RecommendationOrchestrator;
use uuid::Uuid;

struct Signals {
    unreachable: bool,
}

#[async_trait]
impl ProfileSignalStore for Signals {
    async fn saved_items(&self, _user: Uuid, _project: Option<Uuid>) -> Result<Vec<SavedItem>> {
        if self.unreachable {
            return Err(Error::SignalStore("connection refused".to_string()));
        }
        Ok(vec![SavedItem {
            id: Uuid::new_v4(),
            title: "Renal dialysis in chronic kidney disease".to_string(),
            description: None,
        }])
    }

    async fn collections(
        &self,
        _user: Uuid,
        _project: Option<Uuid>,
    ) -> Result<Vec<CollectionSummary>> {
        Ok(vec![])
    }

    async fn subject_area(&self, _user: Uuid) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Returns the same kidney papers for every query.
struct Catalog;

#[async_trait]
impl CandidateSource for Catalog {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        Ok((0..query.max_results.min(20))
            .map(|i| SourcePaper {
                id: format!("PMID{}", 1000 + i),
                title: format!("Kidney function study {}", i),
                authors: vec!["Ng P".to_string()],
                year: 2025,
                citation_count: i as u32,
                journal: None,
                abstract_text: None,
            })
            .collect())
    }
}

async fn spawn_test_server(unreachable: bool) -> String {
    let orchestrator =
        RecommendationOrchestrator::builder(Arc::new(Signals { unreachable }), Arc::new(Catalog))
            .build()
            .expect("Failed to build orchestrator");
    let app = router(AppState::new(Arc::new(orchestrator)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://{}", addr)
}

async fn get_set(client: &reqwest::Client, url: &str, user: &str) -> RecommendationSet {
    client
        .get(url)
        .header("X-User-Id", user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let base = spawn_test_server(false).await;
    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_weekly_recommendations_returns_set() {
    let base = spawn_test_server(false).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/recommendations/weekly", base))
        .header("X-User-Id", Uuid::new_v4().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let set: RecommendationSet = response.json().await.unwrap();
    assert!(!set.papers(RecommendationCategory::PapersForYou).is_empty());
    assert_eq!(set.profile_snapshot.primary_domains[0], "nephrology");
}

#[tokio::test]
async fn test_cached_set_is_served_until_forced() {
    let base = spawn_test_server(false).await;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4().to_string();
    let url = format!("{}/api/v1/recommendations/weekly", base);

    let first = get_set(&client, &url, &user).await;
    let second = get_set(&client, &url, &user).await;
    assert_eq!(first, second);

    let forced = get_set(&client, &format!("{}?force_refresh=true", url), &user).await;
    assert!(forced.generated_at > first.generated_at);
}

#[tokio::test]
async fn test_missing_user_header_is_bad_request() {
    let base = spawn_test_server(false).await;
    let response = reqwest::get(format!("{}/api/v1/recommendations/weekly", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("X-User-Id"));
}

#[tokio::test]
async fn test_invalid_project_id_is_bad_request() {
    let base = spawn_test_server(false).await;
    let response = reqwest::Client::new()
        .get(format!(
            "{}/api/v1/recommendations/weekly?project_id=nope",
            base
        ))
        .header("X-User-Id", Uuid::new_v4().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_unreachable_signal_store_is_service_unavailable() {
    let base = spawn_test_server(true).await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/v1/recommendations/weekly", base))
        .header("X-User-Id", Uuid::new_v4().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
