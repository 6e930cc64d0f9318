//! Capability catalog: abstract permissions and their native identifiers.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Capabilities a caller can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Steps,
    Workouts,
    HeartRate,
    Route,
    Calories,
    Distance,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Steps,
        Permission::Workouts,
        Permission::HeartRate,
        Permission::Route,
        Permission::Calories,
        Permission::Distance,
    ];

    /// Canonical boundary name, e.g. `READ_STEPS`.
    pub fn name(self) -> &'static str {
        match self {
            Permission::Steps => "READ_STEPS",
            Permission::Workouts => "READ_WORKOUTS",
            Permission::HeartRate => "READ_HEART_RATE",
            Permission::Route => "READ_ROUTE",
            Permission::Calories => "READ_CALORIES",
            Permission::Distance => "READ_DISTANCE",
        }
    }

    /// Parse a boundary permission name. Unknown names yield `None`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "READ_STEPS" => Some(Permission::Steps),
            "READ_WORKOUTS" => Some(Permission::Workouts),
            "READ_HEART_RATE" => Some(Permission::HeartRate),
            "READ_ROUTE" => Some(Permission::Route),
            "READ_CALORIES" | "READ_ACTIVE_CALORIES" => Some(Permission::Calories),
            "READ_DISTANCE" => Some(Permission::Distance),
            _ => None,
        }
    }
}

/// How a platform reports the outcome of an authorization prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantReporting {
    /// Granted identifiers can be read back after the prompt.
    PerIdentifier,
    /// Only an overall success flag is available.
    Coarse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    HealthConnect,
    HealthKit,
}

impl Platform {
    pub fn grant_reporting(self) -> GrantReporting {
        match self {
            Platform::HealthConnect => GrantReporting::PerIdentifier,
            Platform::HealthKit => GrantReporting::Coarse,
        }
    }

    pub fn catalog(self) -> PermissionCatalog {
        PermissionCatalog { platform: self }
    }
}

/// Static mapping between [`Permission`] and the identifiers of one platform.
#[derive(Clone, Copy, Debug)]
pub struct PermissionCatalog {
    platform: Platform,
}

impl PermissionCatalog {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Native identifiers backing `permission`. All of them must be granted
    /// for the permission to read as granted.
    pub fn resolve_native(&self, permission: Permission) -> &'static [&'static str] {
        match (self.platform, permission) {
            (Platform::HealthConnect, Permission::Steps) => {
                &["android.permission.health.READ_STEPS"]
            }
            (Platform::HealthConnect, Permission::Workouts) => {
                &["android.permission.health.READ_EXERCISE"]
            }
            (Platform::HealthConnect, Permission::HeartRate) => {
                &["android.permission.health.READ_HEART_RATE"]
            }
            (Platform::HealthConnect, Permission::Route) => {
                &["android.permission.health.READ_EXERCISE_ROUTE"]
            }
            (Platform::HealthConnect, Permission::Calories) => {
                &["android.permission.health.READ_ACTIVE_CALORIES_BURNED"]
            }
            (Platform::HealthConnect, Permission::Distance) => {
                &["android.permission.health.READ_DISTANCE"]
            }
            (Platform::HealthKit, Permission::Steps) => &["HKQuantityTypeIdentifierStepCount"],
            (Platform::HealthKit, Permission::Workouts) => &["HKWorkoutTypeIdentifier"],
            (Platform::HealthKit, Permission::HeartRate) => &["HKQuantityTypeIdentifierHeartRate"],
            (Platform::HealthKit, Permission::Route) => &["HKWorkoutRouteTypeIdentifier"],
            (Platform::HealthKit, Permission::Calories) => {
                &["HKQuantityTypeIdentifierActiveEnergyBurned"]
            }
            (Platform::HealthKit, Permission::Distance) => &[
                "HKQuantityTypeIdentifierDistanceCycling",
                "HKQuantityTypeIdentifierDistanceSwimming",
                "HKQuantityTypeIdentifierDistanceWalkingRunning",
                "HKQuantityTypeIdentifierDistanceDownhillSnowSports",
            ],
        }
    }

    /// Reverse lookup. Identifiers that back no permission yield `None`.
    pub fn resolve_abstract(&self, identifier: &str) -> Option<Permission> {
        let key = identifier_key(identifier);
        Permission::ALL.into_iter().find(|p| {
            self.resolve_native(*p)
                .iter()
                .any(|native| identifier_key(native) == key)
        })
    }

    /// Union of native identifiers for a set of permissions.
    pub fn native_union<'a, I>(&self, permissions: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        permissions
            .into_iter()
            .flat_map(|p| self.resolve_native(*p).iter())
            .map(|s| s.to_string())
            .collect()
    }

    /// True when every identifier behind `permission` is in `granted`.
    pub fn is_satisfied(&self, permission: Permission, granted: &BTreeSet<String>) -> bool {
        let keys: BTreeSet<&str> = granted.iter().map(|g| identifier_key(g)).collect();
        self.resolve_native(permission)
            .iter()
            .all(|native| keys.contains(identifier_key(native)))
    }

    /// Store listing for the platform's health app, if it has one.
    pub fn store_listing(&self) -> Option<&'static str> {
        match self.platform {
            Platform::HealthConnect => Some(
                "https://play.google.com/store/apps/details?id=com.google.android.apps.healthdata",
            ),
            Platform::HealthKit => None,
        }
    }
}

/// Comparison key of a native identifier: the segment after the last `.`.
///
/// Health Connect reports granted permissions both with and without the
/// `android.permission.health.` prefix depending on the API level.
pub fn identifier_key(identifier: &str) -> &str {
    identifier.rsplit('.').next().unwrap_or(identifier)
}

/// Parse caller-supplied permission names, keeping the caller's spelling.
///
/// Unknown names are dropped and duplicates collapse to the first occurrence.
pub fn parse_permissions<S: AsRef<str>>(names: &[S]) -> Vec<(String, Permission)> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter_map(|n| {
            let n = n.as_ref();
            Permission::from_name(n).map(|p| (n.to_string(), p))
        })
        .filter(|(n, _)| seen.insert(n.clone()))
        .collect()
}
