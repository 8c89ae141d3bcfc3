use crate::{
    ProxmoxClient, ProxmoxError, ValidationError,
    tests::fixtures::{FRESH_TICKET, TICKET, authenticated_client, client, mount_data, mount_login, mount_version},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

#[tokio::test]
async fn test_connect_logs_in_and_probes_version() {
    let server = MockServer::start().await;
    let client = client(&server);
    mount_login(&server, FRESH_TICKET, 1).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .and(header("Cookie", format!("PVEAuthCookie={}", FRESH_TICKET).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"version": "8.2.4", "repoid": "faa83925", "release": "8.2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_connected().await);
    assert!(client.connect().await);
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn test_connect_with_bad_credentials_is_false() {
    let server = MockServer::start().await;
    let client = client(&server);
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!client.connect().await);
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn test_connect_to_unreachable_host_is_false() {
    let client = ProxmoxClient::new("127.0.0.1", "monitor", "secret", 1, "pam", false).unwrap();
    assert!(!client.connect().await);
}

#[tokio::test]
async fn test_connect_drops_session_when_version_probe_fails() {
    let server = MockServer::start().await;
    let client = client(&server);
    mount_login(&server, FRESH_TICKET, 1).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.connect().await);
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn test_first_call_logs_in_lazily() {
    let server = MockServer::start().await;
    let client = client(&server);
    mount_login(&server, FRESH_TICKET, 1).await;
    mount_data(&server, "GET", "/api2/json/nodes", serde_json::json!([{"node": "pve1"}])).await;

    assert_eq!(client.list_nodes().await.len(), 1);
    assert_eq!(client.list_nodes().await.len(), 1);
}

#[tokio::test]
async fn test_disconnect_forces_new_login() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_login(&server, FRESH_TICKET, 1).await;
    mount_version(&server).await;

    assert!(client.is_connected().await);
    client.disconnect().await;
    assert!(!client.is_connected().await);

    let version = client.get_version().await.unwrap();
    assert_eq!(version.version, "8.2.4");
    assert_eq!(version.release.as_deref(), Some("8.2"));
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn test_held_ticket_is_sent() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .and(header("Cookie", format!("PVEAuthCookie={}", TICKET).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"version": "8.1.3", "repoid": "b46aac3b", "release": "8.1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get_version().await.unwrap().version, "8.1.3");
}

#[test]
fn test_address_is_sanitized() {
    let client = ProxmoxClient::new(
        "https://pve.example.com/",
        "monitor",
        "secret",
        8006,
        "pve",
        true,
    )
    .unwrap();
    assert_eq!(client.connection().host().as_str(), "pve.example.com");
    assert_eq!(client.connection().user_id(), "monitor@pve");
}

#[test]
fn test_directory_realm_and_ipv6_address_are_accepted() {
    let client =
        ProxmoxClient::new("https://[fd00::10]/", "monitor", "secret", 8006, "Corp-AD", true)
            .unwrap();
    assert_eq!(client.connection().host().as_str(), "[fd00::10]");
    assert_eq!(client.connection().user_id(), "monitor@Corp-AD");

    let client = ProxmoxClient::new("pve1", "monitor", "secret", 8006, "ad.example", true).unwrap();
    assert_eq!(client.connection().realm().as_str(), "ad.example");
}

#[test]
fn test_builder_requires_host_and_credentials() {
    let result = ProxmoxClient::builder()
        .credentials("monitor", "secret", "pam")
        .build();
    assert!(matches!(
        result,
        Err(ProxmoxError::Validation(ValidationError::Field { ref field, .. })) if field == "host"
    ));

    let result = ProxmoxClient::builder().host("pve1").build();
    assert!(matches!(result, Err(ProxmoxError::Validation(_))));
}

#[test]
fn test_builder_rejects_invalid_settings() {
    assert!(ProxmoxClient::new("pve1", "monitor", "secret", 0, "pam", true).is_err());
    assert!(ProxmoxClient::new("pve1", "", "secret", 8006, "pam", true).is_err());
    assert!(ProxmoxClient::new("pve1", "monitor", "", 8006, "pam", true).is_err());
    assert!(ProxmoxClient::new("pve1", "monitor", "secret", 8006, "PAM!", true).is_err());
    assert!(ProxmoxClient::new("https:///", "monitor", "secret", 8006, "pam", true).is_err());
}

#[test]
fn test_builder_defaults() {
    let client = ProxmoxClient::builder()
        .host("10.0.0.5")
        .credentials("monitor", "secret", "pam")
        .build()
        .unwrap();
    assert_eq!(client.connection().port().get(), 8006);
    assert!(client.connection().tls_verify());
}
