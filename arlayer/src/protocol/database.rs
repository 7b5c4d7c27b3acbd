//! Target-database channel.
//!
//! Image-target databases are managed by the AR engine. The bridge exposes
//! the method surface with stable response shapes; [`PlaceholderTargetDatabase`]
//! answers every call with empty results until a real integration replaces
//! it behind the [`TargetDatabase`] trait.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::args::Arguments;
use super::command::MethodInfo;
use super::error::DispatchError;

/// Database loaded when none has been requested.
pub const DEFAULT_DATABASE_NAME: &str = "db_fashion";

/// Every database-channel method.
pub const DATABASE_METHODS: &[MethodInfo] = &[
    MethodInfo {
        name: "loadDatabase",
        aliases: &[],
        arguments: "databaseName",
        summary: "Load an image-target database",
    },
    MethodInfo {
        name: "unloadDatabase",
        aliases: &[],
        arguments: "",
        summary: "Unload the current database",
    },
    MethodInfo {
        name: "activateDataset",
        aliases: &[],
        arguments: "databaseName, datasetName",
        summary: "Activate a dataset",
    },
    MethodInfo {
        name: "deactivateDataset",
        aliases: &[],
        arguments: "[datasetName]",
        summary: "Deactivate a dataset",
    },
    MethodInfo {
        name: "getImageTargets",
        aliases: &[],
        arguments: "",
        summary: "List image targets",
    },
    MethodInfo {
        name: "addImageTarget",
        aliases: &[],
        arguments: "[targetName], [imagePath]",
        summary: "Add an image target",
    },
    MethodInfo {
        name: "removeImageTarget",
        aliases: &[],
        arguments: "[targetName]",
        summary: "Remove an image target",
    },
    MethodInfo {
        name: "getTrackingResults",
        aliases: &[],
        arguments: "",
        summary: "Current target tracking results",
    },
    MethodInfo {
        name: "searchTargets",
        aliases: &[],
        arguments: "[query]",
        summary: "Search targets by name",
    },
    MethodInfo {
        name: "getTargetsByCategory",
        aliases: &[],
        arguments: "[category]",
        summary: "Targets in a category",
    },
    MethodInfo {
        name: "syncDatabase",
        aliases: &[],
        arguments: "",
        summary: "Synchronize the database",
    },
    MethodInfo {
        name: "getDatabaseStats",
        aliases: &[],
        arguments: "",
        summary: "Database statistics",
    },
];

/// A parsed database-channel request.
///
/// Arguments are read leniently; a missing or mistyped argument is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseCommand {
    LoadDatabase { name: Option<String> },
    UnloadDatabase,
    ActivateDataset {
        database: Option<String>,
        dataset: Option<String>,
    },
    DeactivateDataset { dataset: Option<String> },
    GetImageTargets,
    AddImageTarget {
        name: Option<String>,
        image_path: Option<String>,
    },
    RemoveImageTarget { name: Option<String> },
    GetTrackingResults,
    SearchTargets { query: Option<String> },
    GetTargetsByCategory { category: Option<String> },
    SyncDatabase,
    GetDatabaseStats,
}

impl DatabaseCommand {
    /// Parse a database-channel method call.
    pub fn parse(method: &str, arguments: &Map<String, Value>) -> Result<Self, DispatchError> {
        let args = Arguments::new(arguments);
        let text = |names: &[&'static str]| args.lenient_str(names).map(str::to_string);

        let command = match method {
            "loadDatabase" => DatabaseCommand::LoadDatabase {
                name: text(&["databaseName"]),
            },
            "unloadDatabase" => DatabaseCommand::UnloadDatabase,
            "activateDataset" => DatabaseCommand::ActivateDataset {
                database: text(&["databaseName"]),
                dataset: text(&["datasetName"]),
            },
            "deactivateDataset" => DatabaseCommand::DeactivateDataset {
                dataset: text(&["datasetName"]),
            },
            "getImageTargets" => DatabaseCommand::GetImageTargets,
            "addImageTarget" => DatabaseCommand::AddImageTarget {
                name: text(&["targetName", "name"]),
                image_path: text(&["imagePath"]),
            },
            "removeImageTarget" => DatabaseCommand::RemoveImageTarget {
                name: text(&["targetName", "name"]),
            },
            "getTrackingResults" => DatabaseCommand::GetTrackingResults,
            "searchTargets" => DatabaseCommand::SearchTargets {
                query: text(&["query"]),
            },
            "getTargetsByCategory" => DatabaseCommand::GetTargetsByCategory {
                category: text(&["category"]),
            },
            "syncDatabase" => DatabaseCommand::SyncDatabase,
            "getDatabaseStats" => DatabaseCommand::GetDatabaseStats,
            other => {
                return Err(DispatchError::MethodNotImplemented {
                    channel: "database".to_string(),
                    method: other.to_string(),
                })
            }
        };

        Ok(command)
    }
}

/// An image target known to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTarget {
    pub name: String,
    pub category: String,
    pub active: bool,
}

/// A target currently seen by the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub name: String,
    pub confidence: f32,
}

/// The `getDatabaseStats` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub database_name: String,
    pub total_targets: u64,
    pub active_targets: u64,
    pub tracked_targets: u64,
    pub average_confidence: f32,
    /// Milliseconds since the Unix epoch.
    pub last_sync_timestamp: i64,
}

/// Backend for the database channel.
pub trait TargetDatabase: Send + Sync + 'static {
    fn load(&self, name: &str);
    fn unload(&self);
    fn activate_dataset(&self, database: Option<&str>, dataset: Option<&str>);
    fn deactivate_dataset(&self, dataset: Option<&str>);
    fn image_targets(&self) -> Vec<ImageTarget>;
    fn add_image_target(&self, name: Option<&str>, image_path: Option<&str>);
    fn remove_image_target(&self, name: Option<&str>);
    fn tracking_results(&self) -> Vec<TargetResult>;
    fn search(&self, query: Option<&str>) -> Vec<ImageTarget>;
    fn by_category(&self, category: Option<&str>) -> Vec<ImageTarget>;
    fn sync(&self);
    fn stats(&self) -> DatabaseStats;
}

#[derive(Debug)]
struct PlaceholderState {
    database_name: String,
    last_sync_ms: i64,
}

/// Always-succeeding database with no targets.
///
/// Remembers the loaded database name and the last sync time so that
/// `getDatabaseStats` reflects the calls made against it.
#[derive(Debug)]
pub struct PlaceholderTargetDatabase {
    default_name: String,
    state: Mutex<PlaceholderState>,
}

impl Default for PlaceholderTargetDatabase {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_NAME)
    }
}

impl PlaceholderTargetDatabase {
    pub fn new(default_name: impl Into<String>) -> Self {
        let default_name = default_name.into();
        Self {
            state: Mutex::new(PlaceholderState {
                database_name: default_name.clone(),
                last_sync_ms: chrono::Utc::now().timestamp_millis(),
            }),
            default_name,
        }
    }

    /// Name of the database currently loaded.
    pub fn database_name(&self) -> String {
        self.state.lock().database_name.clone()
    }
}

impl TargetDatabase for PlaceholderTargetDatabase {
    fn load(&self, name: &str) {
        debug!(database = %name, "Target database loaded");
        self.state.lock().database_name = name.to_string();
    }

    fn unload(&self) {
        debug!("Target database unloaded");
        self.state.lock().database_name = self.default_name.clone();
    }

    fn activate_dataset(&self, database: Option<&str>, dataset: Option<&str>) {
        debug!(?database, ?dataset, "Dataset activated");
    }

    fn deactivate_dataset(&self, dataset: Option<&str>) {
        debug!(?dataset, "Dataset deactivated");
    }

    fn image_targets(&self) -> Vec<ImageTarget> {
        Vec::new()
    }

    fn add_image_target(&self, name: Option<&str>, image_path: Option<&str>) {
        debug!(?name, ?image_path, "Image target add ignored");
    }

    fn remove_image_target(&self, name: Option<&str>) {
        debug!(?name, "Image target remove ignored");
    }

    fn tracking_results(&self) -> Vec<TargetResult> {
        Vec::new()
    }

    fn search(&self, _query: Option<&str>) -> Vec<ImageTarget> {
        Vec::new()
    }

    fn by_category(&self, _category: Option<&str>) -> Vec<ImageTarget> {
        Vec::new()
    }

    fn sync(&self) {
        self.state.lock().last_sync_ms = chrono::Utc::now().timestamp_millis();
    }

    fn stats(&self) -> DatabaseStats {
        let state = self.state.lock();
        DatabaseStats {
            database_name: state.database_name.clone(),
            total_targets: 0,
            active_targets: 0,
            tracked_targets: 0,
            average_confidence: 0.0,
            last_sync_timestamp: state.last_sync_ms,
        }
    }
}
