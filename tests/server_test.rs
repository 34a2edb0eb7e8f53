//! Integration tests for the timeline HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use physio_timeline::config::Config;
    use physio_timeline::server::{router, run, ServerConfig, ServerState};
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    const CSV: &str = "\
timestamp,value_hr,value_eda,temp
0,60,0.5,36.0
1000,62,0.6,36.1
2000,58,0.7,36.2
3000,70,0.8,36.1
4000,65,0.9,36.0
";

    fn write_data(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("physio-timeline-server-test");
        std::fs::create_dir_all(&dir).expect("Failed to create test dir");
        let path = dir.join(format!("{name}.csv"));
        std::fs::write(&path, CSV).expect("Failed to write test data");
        path
    }

    async fn start(data_path: PathBuf) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        let config = Config {
            data_path,
            ..Config::default()
        };
        let (addr, shutdown_tx) = run(ServerConfig::new(0, config))
            .await
            .expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;
        (addr, shutdown_tx)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = start(write_data("health")).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_timeline_state() {
        let (addr, shutdown_tx) = start(write_data("state")).await;

        let body: serde_json::Value = reqwest::get(format!("http://{}/timeline", addr))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["state"]["display"]["mode"], "full");
        assert_eq!(body["state"]["total"], 5);
        assert_eq!(body["state"]["displayed"], 5);
        assert_eq!(body["state"]["value_domain"][0], 0.5);
        assert_eq!(body["state"]["value_domain"][1], 70.0);
        assert_eq!(body["scene"]["mount"], "timeline");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_brush_filters_readings() {
        let (addr, shutdown_tx) = start(write_data("brush")).await;
        let client = reqwest::Client::new();

        // t = 1s and t = 3s on a 770px axis spanning 4s
        let body: serde_json::Value = client
            .post(format!("http://{}/timeline/brush", addr))
            .json(&serde_json::json!({ "selection": [192.5, 577.5] }))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["applied"], true);
        assert_eq!(body["state"]["display"]["mode"], "brushed");
        assert_eq!(body["state"]["displayed"], 3);

        // Cleared brush is a no-op
        let body: serde_json::Value = client
            .post(format!("http://{}/timeline/brush", addr))
            .json(&serde_json::json!({}))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["applied"], false);
        assert_eq!(body["state"]["displayed"], 3);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_zoom_and_reset() {
        let (addr, shutdown_tx) = start(write_data("zoom")).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .post(format!("http://{}/timeline/zoom", addr))
            .json(&serde_json::json!({ "gesture": "transform", "k": 20.0, "x": 0.0, "y": 0.0 }))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["applied"]["k"], 10.0);
        assert_eq!(body["state"]["display"]["mode"], "zoomed");
        assert_eq!(body["state"]["displayed"], 5);

        let body: serde_json::Value = client
            .post(format!("http://{}/timeline/reset", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["state"]["display"]["mode"], "full");
        assert_eq!(body["state"]["zoom"]["k"], 1.0);
        assert_eq!(body["state"]["time_domain"], body["state"]["base_time_domain"]);
        let frames = body["animation"]["frames"].as_array().expect("frames");
        assert_eq!(frames.last().expect("last frame")["k"], 1.0);
        let domains = body["frame_domains"].as_array().expect("frame domains");
        assert_eq!(domains.len(), frames.len());
        assert_ne!(domains[0], body["state"]["base_time_domain"]);
        assert_eq!(
            domains.last().expect("last domain"),
            &body["state"]["base_time_domain"]
        );

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_invalid_zoom_rejected() {
        let (addr, shutdown_tx) = start(write_data("bad-zoom")).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/timeline/zoom", addr))
            .json(&serde_json::json!({ "gesture": "scale", "factor": -2.0 }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "INVALID_ZOOM");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_hover_marker() {
        let (addr, shutdown_tx) = start(write_data("hover")).await;

        let body: serde_json::Value = reqwest::get(format!("http://{}/timeline", addr))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        let marker = body["scene"]["commands"]
            .as_array()
            .expect("commands")
            .iter()
            .find(|c| c["kind"] == "marker" && c["channel"] == "heart_rate" && c["index"] == 3)
            .expect("marker")
            .clone();

        let body: serde_json::Value = reqwest::get(format!(
            "http://{}/timeline/hover?x={}&y={}",
            addr, marker["cx"], marker["cy"]
        ))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

        assert_eq!(body["tooltip"]["value_hr"], 70.0);
        assert_eq!(body["lines"][0], "Time: 00:00:03");
        assert_eq!(body["lines"][1], "HR: 70.00 BPM");

        let body: serde_json::Value =
            reqwest::get(format!("http://{}/timeline/hover?x=-500&y=-500", addr))
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse JSON");
        assert!(body["marker"].is_null());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_simulator_endpoints() {
        let (addr, shutdown_tx) = start(write_data("simulator")).await;

        let body: serde_json::Value =
            reqwest::get(format!("http://{}/simulator?stress=3&exercise=7", addr))
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse JSON");

        assert_eq!(body["stress"], "3");
        assert_eq!(body["exercise"], "7");
        let points = body["points"].as_array().expect("points");
        assert_eq!(points.len(), 11);
        assert_eq!(points[0]["value_hr"], 76.5);

        let response = reqwest::get(format!("http://{}/simulator.svg", addr))
            .await
            .expect("Failed to send request");
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        let svg = response.text().await.expect("Failed to read body");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("stress 3, exercise 7"));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_timeline_svg() {
        let (addr, shutdown_tx) = start(write_data("svg")).await;

        let response = reqwest::get(format!("http://{}/timeline.svg", addr))
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        let svg = response.text().await.expect("Failed to read body");
        assert_eq!(svg.matches("<circle ").count(), 15);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_missing_data_fails_startup() {
        let missing = std::env::temp_dir().join("physio-timeline-server-test-missing.csv");
        let config = Config {
            data_path: missing,
            ..Config::default()
        };

        let err = run(ServerConfig::new(0, config))
            .await
            .expect_err("server started without data");
        assert!(err.to_string().contains("physio-timeline-server-test-missing.csv"));
    }

    #[tokio::test]
    async fn test_failed_state_reports_load_failure() {
        let missing = std::env::temp_dir().join("physio-timeline-server-test-missing.csv");
        let state = Arc::new(ServerState::new(Config {
            data_path: missing,
            ..Config::default()
        }));
        state.load_data().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let health = reqwest::get(format!("http://{}/health", addr))
            .await
            .expect("Failed to send request");
        assert!(health.status().is_success());

        let response = reqwest::get(format!("http://{}/timeline", addr))
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "LOAD_FAILED");

        server.abort();
    }
}
