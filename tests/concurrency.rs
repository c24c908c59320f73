//! Concurrent requests over real sockets.

use std::collections::HashSet;

use tracewire::{ServiceConfig, TraceId};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_trace_id_generation_has_no_duplicates() {
    let tasks: Vec<_> = (0..1000)
        .map(|_| tokio::spawn(async { TraceId::generate() }))
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap()), "duplicate trace id");
    }
    assert_eq!(ids.len(), 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_distinct_matching_ids() {
    let server = common::spawn_server(ServiceConfig::default()).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let requests: Vec<_> = (0..200)
        .map(|i| {
            let client = client.clone();
            let url = server.url(if i % 2 == 0 { "/" } else { "/health" });
            tokio::spawn(async move {
                let res = client.get(url).send().await.unwrap();
                assert_eq!(res.status(), 200);
                let header = res.headers()["x-trace-id"].to_str().unwrap().to_owned();
                let body: serde_json::Value = res.json().await.unwrap();
                assert_eq!(body["trace_id"], header.as_str());
                header
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for request in requests {
        let id = request.await.unwrap();
        assert!(id.parse::<TraceId>().is_ok());
        assert!(ids.insert(id), "duplicate trace id");
    }
    assert_eq!(ids.len(), 200);

    let body = client.get(server.url("/metrics")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains(r#"http_requests_total{handler="/",method="GET",status="2xx"} 100"#));
    assert!(body.contains(r#"http_requests_total{handler="/health",method="GET",status="2xx"} 100"#));
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = common::spawn_server(ServiceConfig::default()).await;
    let url = server.url("/health");
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    assert_eq!(client.get(&url).send().await.unwrap().status(), 200);

    drop(server);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let fresh = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    assert!(fresh.get(&url).send().await.is_err());
}
