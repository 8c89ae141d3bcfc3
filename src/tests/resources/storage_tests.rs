use crate::tests::fixtures::{FRESH_TICKET, authenticated_client, mount_data, mount_login};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_list_storage() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    mount_data(
        &server,
        "GET",
        "/api2/json/nodes/pve1/storage",
        serde_json::json!([
            {
                "storage": "local",
                "type": "dir",
                "content": "iso,vztmpl,backup",
                "active": 1,
                "enabled": 1,
                "shared": 0,
                "used": 500_000_000_000_u64,
                "total": 1_000_000_000_000_u64,
                "avail": 500_000_000_000_u64
            },
            {"storage": "nfs-backup", "type": "nfs", "active": 0, "enabled": 1, "shared": 1}
        ]),
    )
    .await;

    let volumes = client.list_storage("pve1").await;
    assert_eq!(volumes.len(), 2);

    let local = &volumes[0];
    assert_eq!(local.storage_type.as_deref(), Some("dir"));
    assert!(local.active && local.enabled && !local.shared);
    assert_eq!(local.usage_percentage(), 50.0);
    assert_eq!(local.total_gb(), 931.32);
    assert_eq!(local.used_gb(), 465.66);

    let nfs = &volumes[1];
    assert!(!nfs.active);
    assert!(nfs.shared);
    assert_eq!(nfs.usage_percentage(), 0.0);
}

#[tokio::test]
async fn test_list_storage_does_not_reconnect() {
    let server = MockServer::start().await;
    let client = authenticated_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/storage"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, FRESH_TICKET, 0).await;

    assert!(client.list_storage("pve1").await.is_empty());
}
