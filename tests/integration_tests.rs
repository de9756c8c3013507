use color_eyre::eyre::Result;
use reqinspect::common::{FailingSerializer, fetch, read_response, spawn_test_server};
use reqinspect::encode::{INTERNAL_ERROR_BODY, ResponseEncoder};
use reqinspect::handler::Api;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

fn get(path: &str, user_agent: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent: {user_agent}\r\nConnection: close\r\n\r\n"
    )
}

#[tokio::test]
async fn test_ip_endpoint() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let response = fetch(addr, &get("/api/ip", "TestAgent")).await?;

    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(
        response.body,
        r#"{"ip":"127.0.0.1","userAgent":"TestAgent","method":"GET","url":"http://localhost:8080/api/ip"}"#
    );

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_details_endpoint_lists_headers_in_order() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let request = "GET /api/details HTTP/1.1\r\nHost: localhost\r\nUser-Agent: Mozilla/5.0\r\nContent-Type: text/plain\r\nAccept: */*\r\nConnection: close\r\n\r\n";
    let response = fetch(addr, request).await?;

    assert_eq!(response.status, 200);
    let body: serde_json::Value = serde_json::from_str(&response.body)?;
    assert_eq!(
        body,
        serde_json::json!({
            "ip": "127.0.0.1",
            "userAgent": "Mozilla/5.0",
            "headers": ["Host", "User-Agent", "Content-Type", "Accept", "Connection"],
        })
    );

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_missing_user_agent_is_null() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let response = fetch(addr, "GET /api/ip HTTP/1.1\r\nHost: h\r\nConnection: close\r\n\r\n").await?;

    let body: serde_json::Value = serde_json::from_str(&response.body)?;
    assert!(body["userAgent"].is_null());
    assert_eq!(body["url"], "http://h/api/ip");

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_error_endpoint_returns_fixed_500() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    for _ in 0..3 {
        let response = fetch(addr, &get("/api/error", "TestAgent")).await?;
        assert_eq!(response.status, 500);
        assert_eq!(response.body, INTERNAL_ERROR_BODY);
    }

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_failing_serializer_over_the_wire() -> Result<()> {
    let api = Api::new("/api", ResponseEncoder::new(Arc::new(FailingSerializer)));
    let (server_handle, addr, _) = spawn_test_server(api).await?;

    let details = fetch(addr, &get("/api/details", "TestAgent")).await?;
    let ip = fetch(addr, &get("/api/ip", "TestAgent")).await?;

    assert_eq!(details.status, 500);
    assert_eq!(details.body, INTERNAL_ERROR_BODY);
    assert_eq!(ip.status, 500);
    assert_eq!(ip.body, INTERNAL_ERROR_BODY);

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_keep_alive_serves_multiple_requests() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;
    let mut stream = TcpStream::connect(addr).await?;

    for path in ["/api/ip", "/api/details", "/api/error", "/api/ip"] {
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nUser-Agent: Keep\r\n\r\n");
        stream.write_all(request.as_bytes()).await?;

        let response = read_response(&mut stream).await?;
        let expected = if path == "/api/error" { 500 } else { 200 };
        assert_eq!(response.status, expected);
        assert_eq!(response.header("connection"), Some("keep-alive"));
    }

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let missing = fetch(addr, &get("/api/nope", "TestAgent")).await?;
    let post = fetch(
        addr,
        "POST /api/ip HTTP/1.1\r\nHost: localhost\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc",
    )
    .await?;

    assert_eq!(missing.status, 404);
    assert_eq!(post.status, 405);
    assert_eq!(post.header("allow"), Some("GET"));

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_malformed_request_gets_400() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let response = fetch(addr, "BAD\0METHOD / HTTP/1.1\r\n\r\n").await?;

    assert_eq!(response.status, 400);
    assert_eq!(response.header("connection"), Some("close"));

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_invalid_content_length_closes_connection() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let response = fetch(
        addr,
        "GET /api/ip HTTP/1.1\r\nHost: localhost\r\nContent-Length: abc\r\n\r\nGET /api/error HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await?;

    assert_eq!(response.status, 400);
    assert_eq!(response.header("connection"), Some("close"));

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_custom_prefix() -> Result<()> {
    let api = Api::new("/diag", ResponseEncoder::default());
    let (server_handle, addr, _) = spawn_test_server(api).await?;

    let mounted = fetch(addr, &get("/diag/ip", "TestAgent")).await?;
    let default_prefix = fetch(addr, &get("/api/ip", "TestAgent")).await?;

    assert_eq!(mounted.status, 200);
    assert_eq!(default_prefix.status, 404);

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_concurrent_clients() -> Result<()> {
    let (server_handle, addr, _) = spawn_test_server(Api::default()).await?;

    let mut handles = Vec::new();
    for i in 0..8 {
        handles.push(tokio::spawn(async move {
            let response = fetch(addr, &get("/api/ip", &format!("client-{i}"))).await?;
            let body: serde_json::Value = serde_json::from_str(&response.body)?;
            assert_eq!(body["userAgent"], format!("client-{i}"));
            Ok::<(), color_eyre::eyre::Error>(())
        }));
    }

    for handle in handles {
        handle.await??;
    }

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_shutdown_signal_stops_server() -> Result<()> {
    let (server_handle, addr, shutdown) = spawn_test_server(Api::default()).await?;

    // Make sure the accept loop is running before signalling
    let response = fetch(addr, &get("/api/ip", "TestAgent")).await?;
    assert_eq!(response.status, 200);

    shutdown.send(())?;
    let result = tokio::time::timeout(Duration::from_secs(2), server_handle).await?;
    assert!(result?.is_ok());

    Ok(())
}
