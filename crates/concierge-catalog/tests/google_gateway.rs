//! Mock HTTP server tests for `GoogleCatalogGateway` and the cache built on it.
//!
//! Uses [`wiremock`] to emulate the Sheets `values` endpoint and the Docs
//! `documents` endpoint.

use std::sync::Arc;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concierge_catalog::{CatalogGateway, FetchError, GoogleCatalogGateway, RefreshableCache};
use concierge_core::config::CatalogConfig;
use concierge_core::types::{columns, Locale};

fn mock_config(server_url: &str) -> CatalogConfig {
    CatalogConfig {
        spreadsheet_id: "sheet-1".into(),
        sheet_range: "Sheet1".into(),
        knowledge_doc_ru: "doc-ru".into(),
        knowledge_doc_ky: "doc-ky".into(),
        sheets_base_url: server_url.into(),
        docs_base_url: server_url.into(),
        timeout_secs: 5,
    }
}

fn sheet_body() -> serde_json::Value {
    serde_json::json!({
        "range": "Sheet1!A1:J3",
        "majorDimension": "ROWS",
        "values": [
            [columns::NAME, columns::DESCRIPTION, columns::PRICE, columns::NAME_KY],
            ["Python", "Основы программирования", "5000", "Python (кырг.)"],
            ["Графология", "", "3000"]
        ]
    })
}

fn doc_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "documentId": "doc",
        "body": { "content": [
            { "paragraph": { "elements": [ { "textRun": { "content": text } } ] } }
        ]}
    })
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet-1/values/Sheet1"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sheet_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents/doc-ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_body("Адрес: Бишкек\n")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents/doc-ky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_body("Дарек: Бишкек\n")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_courses_maps_header_row() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();
    let rows = gateway.fetch_courses().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][columns::NAME], "Python");
    assert_eq!(rows[0][columns::NAME_KY], "Python (кырг.)");
    assert_eq!(rows[1][columns::PRICE], "3000");
    assert_eq!(rows[1][columns::NAME_KY], "");
}

#[tokio::test]
async fn fetch_knowledge_uses_locale_document() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();

    assert_eq!(
        gateway.fetch_knowledge(Locale::Russian).await.unwrap(),
        "Адрес: Бишкек\n"
    );
    assert_eq!(
        gateway.fetch_knowledge(Locale::Kyrgyz).await.unwrap(),
        "Дарек: Бишкек\n"
    );
}

#[tokio::test]
async fn http_error_is_reported_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet-1/values/Sheet1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "bad-key").unwrap();
    let err = gateway.fetch_courses().await.unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("not valid"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_sheet_body_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet-1/values/Sheet1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();
    assert!(matches!(
        gateway.fetch_courses().await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn knowledge_failure_names_the_locale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents/doc-ky"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();
    let err = gateway.fetch_knowledge(Locale::Kyrgyz).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Knowledge {
            locale: Locale::Kyrgyz,
            ..
        }
    ));
}

#[tokio::test]
async fn cache_initializes_from_google() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();
    let cache = RefreshableCache::new(Arc::new(gateway), chrono::Duration::minutes(30));

    let snapshot = cache.initialize().await.unwrap();
    assert_eq!(snapshot.generation, 1);

    let ru = snapshot.courses_for(Locale::Russian);
    assert_eq!(ru.len(), 2);
    assert_eq!(ru[0].name, "Python");
    assert_eq!(ru[1].name, "Графология");
    assert_eq!(ru[1].description, "Описание отсутствует.");

    let ky = snapshot.courses_for(Locale::Kyrgyz);
    assert_eq!(ky[0].name, "Python (кырг.)");
    // Secondary column blank: primary column is used.
    assert_eq!(ky[1].name, "Графология");
    assert_eq!(snapshot.knowledge_for(Locale::Kyrgyz), "Дарек: Бишкек\n");
}

#[tokio::test]
async fn cache_initialize_fails_when_store_is_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = GoogleCatalogGateway::new(mock_config(&server.uri()), "test-key").unwrap();
    let cache = RefreshableCache::new(Arc::new(gateway), chrono::Duration::minutes(30));

    assert!(cache.initialize().await.is_err());
    assert_eq!(cache.get().generation, 0);
}

#[tokio::test]
async fn unreachable_store_error_hides_api_key() {
    let gateway =
        GoogleCatalogGateway::new(mock_config("http://127.0.0.1:9"), "secret-key").unwrap();
    let err = gateway.fetch_courses().await.unwrap_err();
    assert!(matches!(err, FetchError::Request(_)));
    assert!(!err.to_string().contains("secret-key"));
}
