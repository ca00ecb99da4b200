//! Names and defaults shared across the crate.

pub const APP_NAME: &str = "resource-dispatcher";

/// Relation data key holding a producer's encoded manifest list.
pub const KUBERNETES_MANIFESTS_FIELD: &str = "kubernetes_manifests";

/// Extension of materialized manifest files.
pub const MANIFEST_EXT: &str = "yaml";

/// Where the workload picks up dispatched manifests.
pub const DEFAULT_RESOURCES_ROOT: &str = "/app/resources";

/// Categories handled by the dispatcher, in reconciliation order.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["secrets", "service-accounts", "pod-defaults", "roles", "role-bindings"];

/// Relation store file name within the data directory.
pub const STATE_FILENAME: &str = "relations.json";

/// Configuration file name within the config directory.
pub const CONFIG_FILENAME: &str = "config.yaml";
