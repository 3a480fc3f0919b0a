//! Integration tests for the site reconciliation loop using wiremock.
//!
//! Each test mounts a token endpoint, a list endpoint and per-record detail
//! and update endpoints, then checks both the reported outcomes and the
//! number of PUTs the server actually received.

use jamfsync_core::api::{Computers, MobileDevices};
use jamfsync_core::auth::Credential;
use jamfsync_core::reconcile::{
    reconcile, reconcile_entries, Outcome, Tally, DEFAULT_SITE_ATTRIBUTE,
};
use jamfsync_core::{JamfClient, JamfError, Session};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "abc",
            "expires": "2099-01-01T00:00:00.000Z"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer, list_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(list_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_computer(server: &MockServer, id: u32, site: &str, ext_value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/JSSResource/computers/id/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "computer": {
                "general": {"id": id, "name": format!("mac{}", id), "site": {"name": site}},
                "extension_attributes": [{"name": "Jamf Site", "value": ext_value}]
            }
        })))
        .mount(server)
        .await;
}

fn mock_client(server: &MockServer) -> JamfClient {
    let credential = Credential::Basic {
        username: "admin".to_string(),
        password: "pw".to_string(),
        server: server.uri(),
    };
    JamfClient::new(Session::with_credential(credential)).unwrap()
}

#[tokio::test]
async fn drifted_record_gets_exactly_one_update() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": [{"id": 7, "name": "mac1"}]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "computer": {
                "general": {"id": 7, "name": "mac1", "site": {"name": "HQ"}},
                "extension_attributes": [{"name": "Jamf Site", "value": "Remote"}]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/computers/id/7"))
        .and(body_string_contains("<computer><extension_attributes><extension_attribute>"))
        .and(body_string_contains("<name>Jamf Site</name><value>HQ</value>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let reports = reconcile::<Computers>(&mut client, DEFAULT_SITE_ATTRIBUTE, |_, _, _| {})
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, "7");
    assert_eq!(reports[0].name, "mac1");
    assert_eq!(reports[0].site.as_deref(), Some("HQ"));
    assert_eq!(reports[0].outcome, Outcome::Updated);
}

#[tokio::test]
async fn record_in_sync_is_not_updated() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": [{"id": 1, "name": "mac1"}]}),
    )
    .await;
    mount_computer(&server, 1, "HQ", "HQ").await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let reports = reconcile::<Computers>(&mut client, DEFAULT_SITE_ATTRIBUTE, |_, _, _| {})
        .await
        .unwrap();
    assert_eq!(reports[0].outcome, Outcome::Unchanged);
}

#[tokio::test]
async fn rejected_update_is_recorded_as_failed() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": [{"id": 1, "name": "mac1"}]}),
    )
    .await;
    mount_computer(&server, 1, "HQ", "").await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/computers/id/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let reports = reconcile::<Computers>(&mut client, DEFAULT_SITE_ATTRIBUTE, |_, _, _| {})
        .await
        .unwrap();

    match &reports[0].outcome {
        Outcome::Failed(reason) => assert!(reason.contains("500"), "reason: {}", reason),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn one_failing_detail_does_not_stop_the_loop() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": [
            {"id": 1, "name": "mac1"},
            {"id": 2, "name": "mac2"},
            {"id": 3, "name": "mac3"}
        ]}),
    )
    .await;
    mount_computer(&server, 1, "HQ", "HQ").await;
    mount_computer(&server, 3, "Branch", "HQ").await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/computers/id/3"))
        .and(body_string_contains("<value>Branch</value>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut progress = Vec::new();
    let mut client = mock_client(&server);
    let reports = reconcile::<Computers>(&mut client, DEFAULT_SITE_ATTRIBUTE, |i, n, r| {
        progress.push((i, n, r.id.clone()))
    })
    .await
    .unwrap();

    let outcomes: Vec<&Outcome> = reports.iter().map(|r| &r.outcome).collect();
    assert_eq!(outcomes[0], &Outcome::Unchanged);
    assert!(outcomes[1].is_failed());
    assert_eq!(outcomes[2], &Outcome::Updated);
    assert_eq!(reports[1].name, "mac2");
    assert!(reports[1].site.is_none());

    assert_eq!(
        progress,
        vec![
            (0, 3, "1".to_string()),
            (1, 3, "2".to_string()),
            (2, 3, "3".to_string())
        ]
    );
    assert_eq!(
        Tally::from_reports(&reports),
        Tally {
            unchanged: 1,
            updated: 1,
            failed: 1
        }
    );
}

#[tokio::test]
async fn list_failure_aborts_the_run() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let err = reconcile::<Computers>(&mut client, DEFAULT_SITE_ATTRIBUTE, |_, _, _| {
        panic!("no record should be reported")
    })
    .await
    .unwrap_err();
    assert!(matches!(err, JamfError::InvalidHttpStatus { status: 401, .. }));
}

#[tokio::test]
async fn mobile_devices_use_mobile_root_tag() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/mobiledevices",
        serde_json::json!({"mobile_devices": [{"id": 5, "name": "ipad"}]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/mobiledevices/id/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mobile_device": {
                "general": {"id": 5, "name": "ipad", "site": {"name": "Remote"}},
                "extension_attributes": []
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/mobiledevices/id/5"))
        .and(body_string_contains("<mobile_device><extension_attributes>"))
        .and(body_string_contains("<value>Remote</value>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let reports = reconcile::<MobileDevices>(&mut client, DEFAULT_SITE_ATTRIBUTE, |_, _, _| {})
        .await
        .unwrap();
    assert_eq!(reports[0].outcome, Outcome::Updated);
}

#[tokio::test]
async fn custom_attribute_name_is_used() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": [{"id": 1, "name": "mac1"}]}),
    )
    .await;
    // "Jamf Site" already matches, but the configured attribute is unset.
    mount_computer(&server, 1, "HQ", "HQ").await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/computers/id/1"))
        .and(body_string_contains("<name>Site Mirror</name><value>HQ</value>"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = mock_client(&server);
    let reports = reconcile::<Computers>(&mut client, "Site Mirror", |_, _, _| {})
        .await
        .unwrap();
    assert_eq!(reports[0].outcome, Outcome::Updated);
}

#[tokio::test]
async fn empty_listing_reports_nothing() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_list(
        &server,
        "/JSSResource/computers",
        serde_json::json!({"computers": []}),
    )
    .await;

    let mut client = mock_client(&server);
    let entries = client.list_all::<Computers>().await.unwrap();
    assert!(entries.is_empty());

    let reports = reconcile_entries::<Computers>(
        &mut client,
        DEFAULT_SITE_ATTRIBUTE,
        entries,
        |_, _, _| panic!("no record should be reported"),
    )
    .await;
    assert!(reports.is_empty());
    assert_eq!(Tally::from_reports(&reports).total(), 0);
}
