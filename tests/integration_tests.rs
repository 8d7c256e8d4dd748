use httpmock::prelude::*;
use megaoptim::{ClientConfig, ImageStream, MegaOptim, OptimizationOptions, ServiceResponse};
use serde_json::json;
use std::io::Write;
use tempfile::TempDir;
use tokio_test::assert_ok;

const API_KEY: &str = "integration-key";

fn client_for(server: &MockServer) -> MegaOptim {
    let config = ClientConfig::new(API_KEY).with_base_url(server.url("/v1"));
    assert_ok!(MegaOptim::new(config))
}

fn ok_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "result": {"1": {"saved_percent": 40, "url": "https://cdn/a.jpg"}}
    })
}

#[tokio::test]
async fn test_end_to_end_processing_then_result() {
    let server = MockServer::start_async().await;

    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize")
                .header("X-API-KEY", API_KEY)
                .body_contains("name=\"type\"")
                .body_contains("https://x.com/a.jpg")
                .body_contains("intelligent");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"status": "processing", "process_id": "p1"}));
        })
        .await;

    let result_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize/p1/result")
                .query_param("timeout", "5")
                .header("X-API-KEY", API_KEY);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ok_body());
        })
        .await;

    let response = client_for(&server)
        .optimize("https://x.com/a.jpg", &OptimizationOptions::new(), 5)
        .await;
    let response = assert_ok!(response);

    submit_mock.assert_async().await;
    result_mock.assert_async().await;

    match response {
        ServiceResponse::Ok { result } => {
            assert_eq!(result.len(), 1);
            assert_eq!(result["1"].saved_percent, 40.0);
            assert_eq!(result["1"].url, "https://cdn/a.jpg");
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_end_to_end_callback_url_skips_polling() {
    let server = MockServer::start_async().await;

    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize")
                .body_contains("https://me/hook");
            then.status(200)
                .json_body(json!({"status": "processing", "process_id": "p1"}));
        })
        .await;

    let result_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/optimize/p1/result");
            then.status(200).json_body(ok_body());
        })
        .await;

    let options = OptimizationOptions::new().callback_url("https://me/hook");
    let response = client_for(&server)
        .optimize("https://x.com/a.jpg", &options, 5)
        .await
        .unwrap();

    submit_mock.assert_async().await;
    assert_eq!(result_mock.hits_async().await, 0);
    assert_eq!(
        response,
        ServiceResponse::Processing {
            process_id: "p1".to_string()
        }
    );
}

#[tokio::test]
async fn test_end_to_end_unparsable_body() {
    let server = MockServer::start_async().await;

    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/optimize");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;

    let response = client_for(&server)
        .optimize("https://x.com/a.jpg", &OptimizationOptions::new(), 5)
        .await
        .unwrap();

    submit_mock.assert_async().await;
    assert_eq!(
        response,
        ServiceResponse::Error {
            errors: vec!["Failed to parse JSON response.".to_string()]
        }
    );
}

#[tokio::test]
async fn test_service_error_is_passed_through() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/optimize");
            then.status(401)
                .json_body(json!({"status": "error", "errors": ["Invalid API key."]}));
        })
        .await;

    let response = client_for(&server)
        .optimize("https://x.com/a.jpg", &OptimizationOptions::new(), 5)
        .await
        .unwrap();

    assert_eq!(
        response,
        ServiceResponse::Error {
            errors: vec!["Invalid API key.".to_string()]
        }
    );
}

#[tokio::test]
async fn test_local_file_upload() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("photo.jpg");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(b"FAKE-JPEG-PAYLOAD")?;

    let server = MockServer::start_async().await;
    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize")
                .body_contains("name=\"file\"")
                .body_contains("filename=\"photo.jpg\"")
                .body_contains("FAKE-JPEG-PAYLOAD")
                .body_contains("lossy");
            then.status(200).json_body(ok_body());
        })
        .await;

    let options = OptimizationOptions::new().compression("lossy");
    let response = client_for(&server)
        .optimize(path.as_path(), &options, 5)
        .await?;

    submit_mock.assert_async().await;
    assert!(response.is_ok());
    Ok(())
}

#[tokio::test]
async fn test_stream_batch_upload() {
    let server = MockServer::start_async().await;
    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize")
                .body_contains("name=\"file1\"")
                .body_contains("name=\"file2\"")
                .body_contains("filename=\"image\"")
                .body_contains("SECOND-STREAM");
            then.status(200).json_body(ok_body());
        })
        .await;

    let streams = vec![
        ImageStream::new(std::io::Cursor::new(b"FIRST-STREAM".to_vec())).with_file_name("a.png"),
        ImageStream::new(std::io::Cursor::new(b"SECOND-STREAM".to_vec())),
    ];
    let response = client_for(&server)
        .optimize(streams, &OptimizationOptions::new(), 5)
        .await
        .unwrap();

    submit_mock.assert_async().await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_url_batch_fields() {
    let server = MockServer::start_async().await;
    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/optimize")
                .body_contains("name=\"url1\"")
                .body_contains("name=\"url2\"")
                .body_contains("urls");
            then.status(200).json_body(ok_body());
        })
        .await;

    let response = client_for(&server)
        .optimize(
            vec!["https://x.com/a.jpg", "https://x.com/b.jpg"],
            &OptimizationOptions::new(),
            5,
        )
        .await
        .unwrap();

    submit_mock.assert_async().await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_unreachable_service_yields_error_response() {
    let config = ClientConfig::new(API_KEY)
        .with_base_url("http://127.0.0.1:1/v1/")
        .with_http_timeout(5);
    let client = MegaOptim::new(config).unwrap();

    let response = client
        .optimize("https://x.com/a.jpg", &OptimizationOptions::new(), 5)
        .await
        .unwrap();

    match response {
        ServiceResponse::Error { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Request failed:"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_resource_never_reaches_server() {
    let server = MockServer::start_async().await;
    let submit_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/optimize");
            then.status(200).json_body(ok_body());
        })
        .await;

    let urls: Vec<String> = (1..=6).map(|i| format!("https://x.com/{}.jpg", i)).collect();
    let client = client_for(&server);

    assert!(client
        .optimize(urls, &OptimizationOptions::new(), 5)
        .await
        .is_err());
    assert!(client
        .optimize("not an image", &OptimizationOptions::new(), 5)
        .await
        .is_err());
    assert_eq!(submit_mock.hits_async().await, 0);
}
