use rand::Rng;
use redfish_common::mock::MockTransport;
use redfish_common::{
    get, list_referenced, refresh, CollectionResolver, Entity, Error, Resource, TransportError,
    Updatable,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

// --- Test Resource ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Processor {
    #[serde(flatten)]
    entity: Entity,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    operating_speed_mhz: u32,
    #[serde(default)]
    total_cores: u32,
    #[serde(default)]
    asset_tag: Option<String>,
}

impl Resource for Processor {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

redfish_common::updatable!(Processor {
    "Enabled" => enabled,
    "OperatingSpeedMhz" => operating_speed_mhz,
    "AssetTag" => asset_tag,
});

const CPU0: &str = "/redfish/v1/Systems/1/Processors/CPU0";

fn processor(uri: &str) -> serde_json::Value {
    json!({
        "@odata.id": uri,
        "@odata.type": "#Processor.v1_18_0.Processor",
        "Id": uri.rsplit('/').next().unwrap(),
        "Enabled": true,
        "OperatingSpeedMhz": 2400,
        "TotalCores": 32,
        "AssetTag": null
    })
}

fn collection(uris: &[String]) -> serde_json::Value {
    let members: Vec<_> = uris.iter().map(|u| json!({ "@odata.id": u })).collect();
    json!({ "Members": members })
}

async fn fetch_cpu0(mock: &MockTransport) -> Processor {
    mock.expect_get(CPU0).return_json(processor(CPU0));
    get(&mock.client(), CPU0).await.unwrap()
}

// --- Update Protocol ---

#[tokio::test]
async fn unchanged_resource_updates_without_network() {
    let mock = MockTransport::new();
    let cpu = fetch_cpu0(&mock).await;

    cpu.update().await.unwrap();

    assert_eq!(mock.patch_count(), 0);
    assert_eq!(mock.get_count(), 1);
    mock.verify();
}

#[tokio::test]
async fn single_change_patches_exactly_that_field() {
    let mock = MockTransport::new();
    let mut cpu = fetch_cpu0(&mock).await;
    mock.expect_patch(CPU0).return_ok("");

    cpu.operating_speed_mhz = 3000;
    cpu.update().await.unwrap();

    let patches = mock.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].uri, CPU0);
    assert_eq!(patches[0].payload, json!({"OperatingSpeedMhz": 3000}));
    mock.verify();
}

#[tokio::test]
async fn read_only_fields_are_never_sent() {
    let mock = MockTransport::new();
    let mut cpu = fetch_cpu0(&mock).await;
    mock.expect_patch(CPU0).return_ok("");

    cpu.total_cores = 1;
    cpu.update().await.unwrap();
    assert_eq!(mock.patch_count(), 0);

    cpu.enabled = false;
    cpu.asset_tag = Some("rack-7".into());
    cpu.update().await.unwrap();

    let payload = &mock.patches()[0].payload;
    assert_eq!(payload, &json!({"AssetTag": "rack-7", "Enabled": false}));
    assert!(payload.get("TotalCores").is_none());
    mock.verify();
}

#[tokio::test]
async fn patch_payload_is_deterministic() {
    let mock = MockTransport::new();
    let mut cpu = fetch_cpu0(&mock).await;
    cpu.enabled = false;
    cpu.operating_speed_mhz = 1200;

    let first = serde_json::to_string(&cpu.patch_payload().unwrap()).unwrap();
    for _ in 0..10 {
        assert_eq!(serde_json::to_string(&cpu.patch_payload().unwrap()).unwrap(), first);
    }
}

#[tokio::test]
async fn update_failure_is_propagated() {
    let mock = MockTransport::new();
    let mut cpu = fetch_cpu0(&mock).await;
    mock.expect_patch(CPU0).return_status(400);

    cpu.enabled = false;
    match cpu.update().await {
        Err(Error::Transport(err)) => assert_eq!(err.status(), Some(400)),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn etag_is_sent_as_if_match() {
    let mock = MockTransport::new();
    let mut body = processor(CPU0);
    body["@odata.etag"] = json!("W/\"7\"");
    mock.expect_get(CPU0).return_json(body);
    mock.expect_patch(CPU0).return_ok("");
    mock.expect_patch(CPU0).return_ok("");

    let mut cpu: Processor = get(&mock.client(), CPU0).await.unwrap();
    cpu.enabled = false;
    cpu.update().await.unwrap();

    cpu.entity_mut().disable_etag_match(true);
    cpu.update().await.unwrap();

    let patches = mock.patches();
    assert_eq!(patches[0].headers, [("If-Match".to_string(), "W/\"7\"".to_string())]);
    assert!(patches[1].headers.is_empty());
}

#[tokio::test]
async fn snapshot_is_kept_until_refresh() {
    let mock = MockTransport::new();
    let mut cpu = fetch_cpu0(&mock).await;
    mock.expect_patch(CPU0).return_ok("");

    cpu.enabled = false;
    cpu.update().await.unwrap();
    // Still diffed against the old snapshot.
    assert_eq!(cpu.patch_payload().unwrap().len(), 1);

    let mut updated = processor(CPU0);
    updated["Enabled"] = json!(false);
    mock.expect_get(CPU0).return_json(updated);
    refresh(&mut cpu).await.unwrap();

    assert!(!cpu.enabled);
    assert!(cpu.patch_payload().unwrap().is_empty());
    mock.verify();
}

#[tokio::test]
async fn corrupt_snapshot_fails_without_patching() {
    let mock = MockTransport::new();
    mock.expect_get(CPU0).return_ok(r#"{"@odata.id": "/x", "Enabled": "yes"}"#);

    let result = get::<Processor>(&mock.client(), CPU0).await;
    assert!(matches!(result, Err(Error::Decode { uri, .. }) if uri == CPU0));
    assert_eq!(mock.patch_count(), 0);
}

// --- Collection Resolver ---

#[tokio::test]
async fn partial_failures_are_aggregated() {
    let mock = MockTransport::new();
    let uris: Vec<String> = (0..5)
        .map(|i| format!("/redfish/v1/Systems/1/Processors/CPU{i}"))
        .collect();
    mock.expect_get("/redfish/v1/Systems/1/Processors")
        .return_json(collection(&uris));
    for (i, uri) in uris.iter().enumerate() {
        match i {
            1 => mock.expect_get(uri).return_status(500),
            3 => mock.expect_get(uri).return_err(TransportError::Connection {
                uri: uri.clone(),
                message: "timed out".into(),
            }),
            _ => mock.expect_get(uri).return_json(processor(uri)),
        }
    }

    let (cpus, errors) =
        list_referenced::<Processor>(&mock.client(), "/redfish/v1/Systems/1/Processors").await;

    assert_eq!(cpus.len(), 3);
    let errors = errors.expect("two members failed");
    assert_eq!(errors.len(), 2);
    assert!(errors.get(&uris[1]).is_some());
    assert!(errors.get(&uris[3]).is_some());
    mock.verify();
}

#[tokio::test]
async fn empty_reference_returns_nothing() {
    let mock = MockTransport::new();
    let (cpus, errors) = list_referenced::<Processor>(&mock.client(), "").await;

    assert!(cpus.is_empty());
    assert!(errors.is_none());
    assert_eq!(mock.get_count(), 0);
}

#[tokio::test]
async fn hundred_members_with_random_latency_are_all_accounted_for() {
    let mock = MockTransport::new();
    let uris: Vec<String> = (0..100).map(|i| format!("/Processors/{i}")).collect();
    mock.expect_get("/Processors").return_json(collection(&uris));

    let mut rng = rand::thread_rng();
    let mut expected_failures = 0;
    for uri in &uris {
        let delay = Duration::from_millis(rng.gen_range(0..30));
        if rng.gen_bool(0.2) {
            expected_failures += 1;
            mock.expect_get(uri).with_delay(delay).return_status(503);
        } else {
            mock.expect_get(uri).with_delay(delay).return_json(processor(uri));
        }
    }

    let (cpus, errors) = list_referenced::<Processor>(&mock.client(), "/Processors").await;
    let failed = errors.as_ref().map_or(0, |e| e.len());

    assert_eq!(cpus.len() + failed, 100);
    assert_eq!(failed, expected_failures);
    assert_eq!(errors.is_none(), expected_failures == 0);
    mock.verify();
}

#[tokio::test]
async fn resolved_members_can_be_updated() {
    let mock = MockTransport::new();
    let uris = vec![CPU0.to_string()];
    mock.expect_get("/redfish/v1/Systems/1/Processors")
        .return_json(collection(&uris));
    mock.expect_get(CPU0).return_json(processor(CPU0));
    mock.expect_patch(CPU0).return_ok("");

    let resolver = CollectionResolver::new(mock.client()).with_concurrency_limit(4);
    let (mut cpus, errors) = resolver
        .resolve::<Processor>("/redfish/v1/Systems/1/Processors")
        .await;
    assert!(errors.is_none());

    cpus[0].enabled = false;
    cpus[0].update().await.unwrap();
    assert_eq!(mock.patches()[0].payload, json!({"Enabled": false}));
    mock.verify();
}

#[test]
fn mutable_fields_are_declared_statically() {
    assert_eq!(
        Processor::MUTABLE_FIELDS,
        &["Enabled", "OperatingSpeedMhz", "AssetTag"]
    );
}
