//! PubMed source against a mocked E-utilities server.

use paperwise_core::{CandidateQuery, CandidateSource, Error, SortBy};
use paperwise_sources::{PubMedConfig, PubMedSource};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> PubMedSource {
    PubMedSource::new(PubMedConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        email: Some("dev@example.org".to_string()),
        tool: "paperwise".to_string(),
        timeout_secs: 5,
    })
    .expect("Failed to create source")
}

#[tokio::test]
async fn test_search_returns_validated_papers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("sort", "pub_date"))
        .and(query_param("retmax", "20"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("email", "dev@example.org"))
        .and(query_param(
            "term",
            "(kidney[tiab] OR renal[tiab]) AND 2023:3000[dp]",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "3", "idlist": ["111", "222", "333"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("id", "111,222,333"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "uids": ["111", "222", "333"],
                "111": {
                    "uid": "111",
                    "title": "Kidney injury biomarkers.",
                    "pubdate": "2024 Feb 2",
                    "authors": [{"name": "Ng P"}],
                    "fulljournalname": "Journal of Nephrology",
                    "pmcrefcount": 4
                },
                "222": {
                    "uid": "222",
                    "title": "",
                    "pubdate": "2024"
                },
                "333": {
                    "uid": "333",
                    "title": "Renal denervation",
                    "pubdate": "2023 Nov",
                    "pmcrefcount": ""
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = CandidateQuery::any_of(["kidney", "renal"])
        .published_since(2023)
        .sorted_by(SortBy::Date)
        .limit(20);
    let papers = source(&server).search(&query).await.unwrap();

    // The untitled record is dropped, the rest keep esearch order.
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].id, "PMID111");
    assert_eq!(papers[0].title, "Kidney injury biomarkers");
    assert_eq!(papers[0].citation_count, 4);
    assert_eq!(papers[0].journal.as_deref(), Some("Journal of Nephrology"));
    assert_eq!(papers[1].id, "PMID333");
    assert_eq!(papers[1].year, 2023);
    assert_eq!(papers[1].citation_count, 0);
}

#[tokio::test]
async fn test_no_ids_skips_summary_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "0", "idlist": []}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let papers = source(&server)
        .search(&CandidateQuery::any_of(["glomerulonephritis"]))
        .await
        .unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_http_error_is_source_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429).set_body_string("API rate limit exceeded"))
        .mount(&server)
        .await;

    let err = source(&server)
        .search(&CandidateQuery::any_of(["kidney"]))
        .await
        .unwrap_err();
    match err {
        Error::Source(msg) => assert!(msg.contains("429"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let papers = source(&server)
        .search(&CandidateQuery::any_of(Vec::<String>::new()))
        .await
        .unwrap();
    assert!(papers.is_empty());
}
