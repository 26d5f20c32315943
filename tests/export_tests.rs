use chrono::{Duration, Utc};
use gsheet_csv::api::SheetsApi;
use gsheet_csv::service::csv_writer::{CsvOptions, UTF8_BOM};
use gsheet_csv::service::{ExportOptions, ExportOutcome, Exporter};
use gsheet_csv::types::RaggedPolicy;
use gsheet_csv::{AuthError, GoogleCredential, GsheetError};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET_ID: &str = "sheet-123";
const RANGE: &str = "Sheet1!A1:Z1000";
const VALUES_PATH: &str = "/v4/spreadsheets/sheet-123/values/Sheet1!A1:Z1000";

fn credential() -> GoogleCredential {
    GoogleCredential {
        access_token: Some("test-token".to_string()),
        refresh_token: None,
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        scopes: Vec::new(),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

fn exporter(server: &MockServer, options: ExportOptions) -> Exporter {
    Exporter::new(
        reqwest::Client::new(),
        SheetsApi::new(Url::parse(&server.uri()).unwrap()),
        options,
    )
}

async fn serve_values(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn read_back(path: &Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[UTF8_BOM.len()..]);
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn writes_header_then_rows_with_bom() {
    let server = MockServer::start().await;
    serve_values(
        &server,
        json!({
            "range": RANGE,
            "majorDimension": "ROWS",
            "values": [["a", "b"], ["1", "2"], ["3", "4"]]
        }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let outcome = exporter(&server, ExportOptions::default())
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: output.clone(),
            rows: 2,
            columns: 2,
        }
    );
    assert_eq!(
        std::fs::read(&output).unwrap(),
        "\u{feff}a,b\n1,2\n3,4\n".as_bytes()
    );
}

#[tokio::test]
async fn empty_range_writes_nothing() {
    let server = MockServer::start().await;
    serve_values(&server, json!({ "range": RANGE, "majorDimension": "ROWS" })).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let outcome = exporter(&server, ExportOptions::default())
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap();

    assert_eq!(outcome, ExportOutcome::EmptyRange);
    assert!(!output.exists());
}

#[tokio::test]
async fn permission_error_is_a_fetch_error_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let err = exporter(&server, ExportOptions::default())
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap_err();

    match err {
        GsheetError::Fetch(fetch) => {
            assert!(fetch.is_permission_denied());
            assert!(fetch.to_string().contains("PERMISSION_DENIED"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn credential_without_access_token_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cred = credential();
    cred.access_token = None;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let err = exporter(&server, ExportOptions::default())
        .export(&cred, SHEET_ID, RANGE, &output)
        .await
        .unwrap_err();

    assert!(matches!(err, GsheetError::Auth(AuthError::MissingAccessToken)));
    assert!(!output.exists());
}

#[tokio::test]
async fn exported_file_parses_back_to_the_same_table() {
    let rows = vec![
        vec!["이름", "메모", "점수"],
        vec!["홍길동", "comma, inside", "90"],
        vec!["Kim \"MJ\"", "two\nlines", "85"],
        vec!["", "", ""],
    ];
    let server = MockServer::start().await;
    serve_values(&server, json!({ "range": RANGE, "values": rows })).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("roundtrip.csv");
    exporter(&server, ExportOptions::default())
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap();

    let expected: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(read_back(&output), expected);
}

#[tokio::test]
async fn short_rows_are_padded_in_the_output() {
    let server = MockServer::start().await;
    serve_values(
        &server,
        json!({ "range": RANGE, "values": [["a", "b", "c"], ["1"], ["2", "3"]] }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let options = ExportOptions {
        csv: CsvOptions {
            delimiter: b',',
            bom: false,
        },
        ragged: RaggedPolicy::Pad,
    };
    exporter(&server, options)
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "a,b,c\n1,,\n2,3,\n"
    );
}

#[tokio::test]
async fn strict_policy_rejects_wide_rows_without_writing() {
    let server = MockServer::start().await;
    serve_values(
        &server,
        json!({ "range": RANGE, "values": [["a"], ["1", "2"]] }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.csv");
    let options = ExportOptions {
        ragged: RaggedPolicy::Strict,
        ..ExportOptions::default()
    };
    let err = exporter(&server, options)
        .export(&credential(), SHEET_ID, RANGE, &output)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GsheetError::RaggedRow {
            row: 2,
            cells: 2,
            width: 1
        }
    ));
    assert!(!output.exists());
}
