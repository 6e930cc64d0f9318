use std::sync::Arc;

use health_bridge_core::HealthProvider;
use health_bridge_core::fixture::FixtureProvider;
use health_bridge_core::{Permission, PermissionCoordinator};

fn coordinator(json: serde_json::Value) -> (Arc<FixtureProvider>, PermissionCoordinator) {
    let provider = Arc::new(FixtureProvider::from_json(&json.to_string()).expect("fixture"));
    let dyn_provider: Arc<dyn HealthProvider> = provider.clone();
    (provider, PermissionCoordinator::new(dyn_provider))
}

#[tokio::test]
async fn health_connect_reports_each_grant_after_the_prompt() {
    let (provider, perms) = coordinator(serde_json::json!({
        "platform": "health_connect",
        "grantable": [
            "android.permission.health.READ_STEPS",
            "android.permission.health.READ_DISTANCE"
        ]
    }));

    let before = perms
        .check_granted(&["READ_STEPS", "READ_HEART_RATE"])
        .await
        .expect("check");
    assert_eq!(before.get("READ_STEPS"), Some(&false));
    assert_eq!(before.get("READ_HEART_RATE"), Some(&false));

    let after = perms
        .request_granted(&["READ_STEPS", "READ_HEART_RATE", "READ_DISTANCE"])
        .await
        .expect("request");
    assert_eq!(provider.authorization_requests(), 1);
    assert_eq!(after.get("READ_STEPS"), Some(&true));
    assert_eq!(after.get("READ_DISTANCE"), Some(&true));
    assert_eq!(after.get("READ_HEART_RATE"), Some(&false));

    assert!(perms.is_granted(Permission::Steps).await.expect("granted"));
}

#[tokio::test]
async fn healthkit_denial_reports_everything_false() {
    let (provider, perms) = coordinator(serde_json::json!({
        "platform": "health_kit",
        "prompt": "deny"
    }));
    let map = perms
        .request_granted(&["READ_STEPS", "READ_WORKOUTS", "READ_ROUTE"])
        .await
        .expect("request");
    assert_eq!(provider.authorization_requests(), 1);
    assert_eq!(map.len(), 3);
    assert!(map.values().all(|granted| !granted));
}

#[tokio::test]
async fn healthkit_success_is_remembered_for_later_checks() {
    let (_provider, perms) = coordinator(serde_json::json!({ "platform": "health_kit" }));
    let map = perms
        .request_granted(&["READ_HEART_RATE"])
        .await
        .expect("request");
    assert_eq!(map.get("READ_HEART_RATE"), Some(&true));

    let checked = perms
        .check_granted(&["READ_HEART_RATE", "READ_STEPS"])
        .await
        .expect("check");
    assert_eq!(checked.get("READ_HEART_RATE"), Some(&true));
    assert_eq!(checked.get("READ_STEPS"), Some(&false));
}

#[tokio::test]
async fn unknown_names_never_reach_the_store() {
    let (provider, perms) = coordinator(serde_json::json!({ "platform": "health_connect" }));
    let map = perms
        .request_granted(&["READ_SLEEP", "READ_BLOOD_GLUCOSE"])
        .await
        .expect("request");
    assert!(map.is_empty());
    assert_eq!(provider.authorization_requests(), 0);
}
