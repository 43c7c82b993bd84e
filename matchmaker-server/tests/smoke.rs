use std::time::Duration;

use matchmaker_core::shutdown;
use matchmaker_server::{telemetry, BoxError, RunOptions, ServerConfig};
use reqwest::StatusCode;
use tokio::sync::oneshot;

#[tokio::test]
async fn server_enqueues_and_answers_health_and_metrics() -> Result<(), BoxError> {
    telemetry::init("matchmaker-server-test");

    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().map_err(|err| Box::new(err) as BoxError)?,
        engine: matchmaker_core::EngineConfig::default(),
    };

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = shutdown::channel();

    let server = tokio::spawn(matchmaker_server::run_with_shutdown(
        config,
        shutdown_rx,
        RunOptions { ready_tx: Some(ready_tx) },
    ));

    let addr = ready_rx.await.map_err(|err| Box::new(err) as BoxError)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|err| Box::new(err) as BoxError)?;

    let resp = client
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    assert_eq!(StatusCode::OK, resp.status());

    let body = serde_json::json!({
        "id": "smoke-player",
        "mmr": 1200,
        "region": "NA",
        "ping_na": 30,
        "ping_eu": 150,
        "ping_asia": 220,
        "ping_fallback_ms": 0,
    });
    let resp = client
        .post(format!("http://{addr}/players"))
        .json(&body)
        .send()
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    assert_eq!(StatusCode::OK, resp.status());

    let queue: serde_json::Value = client
        .get(format!("http://{addr}/queue"))
        .send()
        .await
        .map_err(|err| Box::new(err) as BoxError)?
        .json()
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    assert_eq!(queue.as_array().unwrap().len(), 1);

    let resp = client
        .delete(format!("http://{addr}/players/smoke-player"))
        .send()
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    assert_eq!(StatusCode::OK, resp.status());

    let resp = client
        .get(format!("http://{addr}/metrics"))
        .send()
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    assert_eq!(StatusCode::OK, resp.status());
    let text = resp.text().await.map_err(|err| Box::new(err) as BoxError)?;
    assert!(text.contains("matchmaker_queue_size"));

    shutdown::trigger(&shutdown_tx);
    server.await.map_err(|err| Box::new(err) as BoxError)??;

    Ok(())
}
