//! Hot-reload behavior: atomic swaps, rejected updates, watcher pipeline.

mod common;

use std::time::Duration;

use api_gateway::config::watcher::ConfigWatcher;
use common::{
    gateway_config, route, service, start_echo_backend, start_gateway, start_slow_backend,
    test_client,
};

/// Poll until the gateway stops answering 404 for the path, or give up.
async fn wait_until_routed(client: &reqwest::Client, url: &str) {
    for _ in 0..50 {
        if let Ok(response) = client.get(url).send().await {
            if response.status() != 404 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{url} was never routed");
}

#[tokio::test]
async fn reload_swaps_in_the_new_service_set() {
    let users_backend = start_echo_backend().await;
    let orders_backend = start_echo_backend().await;
    let gw = start_gateway(gateway_config(vec![service(
        "users",
        "/api/users",
        users_backend,
        vec![route("/{id}", &["GET"])],
    )]))
    .await;
    let client = test_client();

    assert_eq!(
        client.get(gw.url("/api/users/1")).send().await.unwrap().status(),
        200
    );
    assert_eq!(
        client.get(gw.url("/api/orders/1")).send().await.unwrap().status(),
        404
    );

    // Replace the whole service set: users out, orders in.
    gw.update_tx
        .send(gateway_config(vec![service(
            "orders",
            "/api/orders",
            orders_backend,
            vec![route("/{id}", &["GET"])],
        )]))
        .unwrap();

    wait_until_routed(&client, &gw.url("/api/orders/1")).await;
    assert_eq!(
        client.get(gw.url("/api/orders/1")).send().await.unwrap().status(),
        200
    );
    assert_eq!(
        client.get(gw.url("/api/users/1")).send().await.unwrap().status(),
        404,
        "removed service must stop matching"
    );

    gw.shutdown.trigger();
}

#[tokio::test]
async fn rejected_update_keeps_the_active_generation() {
    let backend = start_echo_backend().await;
    let gw = start_gateway(gateway_config(vec![service(
        "users",
        "/api/users",
        backend,
        vec![route("/{id}", &["GET"])],
    )]))
    .await;
    let client = test_client();

    // Two services on one base path can never activate.
    gw.update_tx
        .send(gateway_config(vec![
            service("users", "/api", backend, vec![route("/u/{id}", &["GET"])]),
            service("orders", "/api", backend, vec![route("/o/{id}", &["GET"])]),
        ]))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(
        client.get(gw.url("/api/users/1")).send().await.unwrap().status(),
        200,
        "a rejected reload must leave the old routes serving"
    );
    assert_eq!(
        client.get(gw.url("/api/u/1")).send().await.unwrap().status(),
        404,
        "no part of the rejected config may activate"
    );

    gw.shutdown.trigger();
}

#[tokio::test]
async fn in_flight_requests_finish_against_the_old_generation() {
    let old_backend = start_slow_backend(Duration::from_millis(600), "from-old-backend").await;
    let new_backend = start_echo_backend().await;
    let gw = start_gateway(gateway_config(vec![service(
        "users",
        "/api/users",
        old_backend,
        vec![route("/{id}", &["GET"])],
    )]))
    .await;
    let client = test_client();

    // Launch a request that will still be waiting on the old backend when
    // the swap happens.
    let in_flight = tokio::spawn({
        let client = client.clone();
        let url = gw.url("/api/users/7");
        async move {
            let response = client.get(url).send().await.unwrap();
            (response.status().as_u16(), response.text().await.unwrap())
        }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    gw.update_tx
        .send(gateway_config(vec![service(
            "users",
            "/api/users",
            new_backend,
            vec![route("/{id}", &["GET"])],
        )]))
        .unwrap();

    // New requests hit the new backend as soon as the swap lands...
    for _ in 0..50 {
        let body = client
            .get(gw.url("/api/users/8"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        if body.starts_with("GET /api/users/8") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // ...while the in-flight one still completes against the old target.
    let (status, body) = in_flight.await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body, "from-old-backend");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn rapid_updates_settle_on_the_last_config() {
    let backend = start_echo_backend().await;
    let gw = start_gateway(gateway_config(vec![service(
        "v0",
        "/api/v0",
        backend,
        vec![route("/{id}", &["GET"])],
    )]))
    .await;
    let client = test_client();

    for name in ["v1", "v2", "v3"] {
        gw.update_tx
            .send(gateway_config(vec![service(
                name,
                &format!("/api/{name}"),
                backend,
                vec![route("/{id}", &["GET"])],
            )]))
            .unwrap();
    }

    wait_until_routed(&client, &gw.url("/api/v3/1")).await;
    assert_eq!(
        client.get(gw.url("/api/v2/1")).send().await.unwrap().status(),
        404,
        "intermediate configs must be fully superseded"
    );

    gw.shutdown.trigger();
}

#[tokio::test]
async fn file_changes_flow_through_the_watcher() {
    let backend = start_echo_backend().await;
    let config_toml = |name: &str| {
        format!(
            r#"
[[services]]
name = "{name}"
base_path = "/api/{name}"
target_url = "http://{backend}"

[[services.routes]]
path = "/{{id}}"
methods = ["GET"]
"#
        )
    };

    let path = std::env::temp_dir().join("gateway_watcher_reload.toml");
    std::fs::write(&path, config_toml("users")).unwrap();

    let (watcher, mut update_rx) = ConfigWatcher::new(&path);
    let _guard = watcher.run().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // An unparsable edit is swallowed; the next good edit comes through.
    std::fs::write(&path, "[[services]\nbroken").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&path, config_toml("orders")).unwrap();

    let received = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let config = update_rx.recv().await.expect("watcher channel closed");
            if config.services.iter().any(|s| s.name == "orders") {
                return config;
            }
        }
    })
    .await
    .expect("no validated config arrived from the watcher");

    assert_eq!(received.services.len(), 1);
    assert_eq!(received.services[0].base_path, "/api/orders");
}
