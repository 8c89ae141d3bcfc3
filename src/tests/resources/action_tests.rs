use crate::{
    GuestKind, PowerAction,
    tests::fixtures::{CSRF_TOKEN, FRESH_TICKET, authenticated_client, mount_data, mount_login},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const TASK_ID: &str = "UPID:pve1:0000ABCD:00112233:66AABBCC:qmstart:100:monitor@pam:";

#[tokio::test]
async fn test_start_vm() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/start"))
        .and(header("CSRFPreventionToken", CSRF_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": TASK_ID })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.start("pve1", 100, GuestKind::Vm).await);
}

#[tokio::test]
async fn test_power_actions_use_kind_segment() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    for action in ["stop", "shutdown", "reboot"] {
        Mock::given(method("POST"))
            .and(path(format!("/api2/json/nodes/pve2/lxc/200/status/{}", action)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": TASK_ID })),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    assert!(client.stop("pve2", 200, GuestKind::Container).await);
    assert!(client.shutdown("pve2", 200, GuestKind::Container).await);
    assert!(client.reboot("pve2", 200, GuestKind::Container).await);
}

#[tokio::test]
async fn test_failed_power_action_is_false() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/shutdown"))
        .respond_with(ResponseTemplate::new(500).set_body_string("VM 100 not running"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(
        !client
            .set_power_state("pve1", 100, GuestKind::Vm, PowerAction::Shutdown)
            .await
    );
}

#[tokio::test]
async fn test_rejected_power_action_is_not_retried() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/start"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, FRESH_TICKET, 0).await;

    assert!(!client.start("pve1", 100, GuestKind::Vm).await);
}

#[tokio::test]
async fn test_get_guest_config() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_data(
        &server,
        "GET",
        "/api2/json/nodes/pve1/qemu/100/config",
        serde_json::json!({
            "name": "web",
            "onboot": 1,
            "cores": 4,
            "memory": "8192",
            "digest": "3f2a9c"
        }),
    )
    .await;

    let config = client
        .get_guest_config("pve1", 100, GuestKind::Vm)
        .await
        .unwrap();
    assert_eq!(config.name(), Some("web"));
    assert!(config.onboot());
    assert_eq!(config.digest(), Some("3f2a9c"));
    assert_eq!(config.get("cores"), Some(&serde_json::json!(4)));

    assert_eq!(
        client.get_boot_on_start("pve1", 100, GuestKind::Vm).await,
        Some(true)
    );
}

#[tokio::test]
async fn test_boot_on_start_unset_and_missing_guest() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_data(
        &server,
        "GET",
        "/api2/json/nodes/pve2/lxc/200/config",
        serde_json::json!({"hostname": "dns", "memory": 512}),
    )
    .await;

    assert_eq!(
        client
            .get_boot_on_start("pve2", 200, GuestKind::Container)
            .await,
        Some(false)
    );
    // Nothing mounted for 999: the lookup degrades to None.
    assert!(
        client
            .get_boot_on_start("pve2", 999, GuestKind::Container)
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_set_boot_on_start() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve2/lxc/200/config"))
        .and(body_json(serde_json::json!({"onboot": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve2/lxc/200/config"))
        .and(body_json(serde_json::json!({"onboot": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(
        client
            .set_boot_on_start("pve2", 200, GuestKind::Container, true)
            .await
    );
    assert!(
        client
            .set_boot_on_start("pve2", 200, GuestKind::Container, false)
            .await
    );
}

#[tokio::test]
async fn test_set_guest_config_failure_is_false() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve1/qemu/100/config"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parameter verification failed"))
        .mount(&server)
        .await;

    assert!(
        !client
            .set_guest_config(
                "pve1",
                100,
                GuestKind::Vm,
                "description",
                serde_json::json!("front end")
            )
            .await
    );
}
