use crate::{
    FleetApi, ProxmoxError,
    tests::fixtures::{
        FRESH_TICKET, authenticated_client, client, mount_data, mount_login, mount_version,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn two_nodes() -> serde_json::Value {
    serde_json::json!([
        {
            "node": "pve1",
            "status": "online",
            "cpu": 0.15,
            "maxcpu": 8,
            "mem": 8589934592_u64,
            "maxmem": 17179869184_u64,
            "disk": 1099511627776_u64,
            "maxdisk": 2199023255552_u64,
            "uptime": 1234567,
            "id": "node/pve1",
            "ssl_fingerprint": "AA:BB:CC:DD:EE:FF"
        },
        {
            "node": "pve2",
            "status": "offline",
            "id": "node/pve2"
        }
    ])
}

#[tokio::test]
async fn test_list_nodes_success() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_data(&server, "GET", "/api2/json/nodes", two_nodes()).await;

    let nodes = client.list_nodes().await;
    assert_eq!(nodes.len(), 2);

    let pve1 = &nodes[0];
    assert_eq!(pve1.node, "pve1");
    assert!(pve1.is_online());
    assert_eq!(pve1.maxcpu, Some(8));
    assert_eq!(pve1.cpu_percentage(), 15.0);
    assert_eq!(pve1.memory_percentage(), 50.0);
    assert_eq!(pve1.memory_total_gb(), 16.0);
    assert_eq!(pve1.uptime_seconds(), 1234567);

    let pve2 = &nodes[1];
    assert!(!pve2.is_online());
    assert_eq!(pve2.cpu_percentage(), 0.0);
    assert_eq!(pve2.memory_percentage(), 0.0);
    assert_eq!(pve2.uptime_seconds(), 0);
}

#[tokio::test]
async fn test_list_nodes_server_error_is_empty() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.list_nodes().await.is_empty());
    // A server error does not cost the session.
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn test_list_nodes_reconnects_once_on_rejected_ticket() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .and(header("Cookie", format!("PVEAuthCookie={}", FRESH_TICKET).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": two_nodes() })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, FRESH_TICKET, 1).await;
    mount_version(&server).await;

    let nodes = client.list_nodes().await;
    let names: Vec<&str> = nodes.iter().map(|n| n.node.as_str()).collect();
    assert_eq!(names, vec!["pve1", "pve2"]);
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn test_list_nodes_retries_only_once() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_login(&server, FRESH_TICKET, 1).await;
    mount_version(&server).await;

    assert!(client.list_nodes().await.is_empty());
}

#[tokio::test]
async fn test_failed_reconnect_soft_fails() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_nodes().await.is_empty());
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn test_failed_reconnect_is_missing_session_for_fleet_listing() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = FleetApi::list_nodes(&client).await;
    assert!(matches!(result, Err(ProxmoxError::SessionUnavailable(_))));
}

#[tokio::test]
async fn test_fleet_listing_propagates_missing_session() {
    let server = MockServer::start().await;
    let client = client(&server);
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = FleetApi::list_nodes(&client).await;
    assert!(matches!(result, Err(ProxmoxError::SessionUnavailable(_))));

    // The public listing stays soft for the same failure.
    assert!(client.list_nodes().await.is_empty());
}

#[tokio::test]
async fn test_fleet_listing_soft_fails_other_errors() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let nodes = FleetApi::list_nodes(&client).await.unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_get_node_status() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_data(
        &server,
        "GET",
        "/api2/json/nodes/pve1/status",
        serde_json::json!({
            "cpu": 0.05,
            "memory": {"total": 17179869184_u64, "used": 4294967296_u64, "free": 12884901888_u64},
            "swap": {"total": 0, "used": 0, "free": 0},
            "uptime": 86400,
            "kversion": "Linux 6.8.12-1-pve",
            "loadavg": ["0.10", "0.20", "0.30"],
            "wait": 0.001,
            "pveversion": "pve-manager/8.2.4/faa83925c9641325"
        }),
    )
    .await;

    let status = client.get_node_status("pve1").await.unwrap();
    assert_eq!(status.memory.total, 17179869184);
    assert_eq!(status.uptime, 86400);
    assert_eq!(status.loadavg.as_deref().map(<[String]>::len), Some(3));
    assert!(status.pveversion.unwrap().starts_with("pve-manager/8"));

    assert!(client.get_node_status("pve9").await.is_none());
}
