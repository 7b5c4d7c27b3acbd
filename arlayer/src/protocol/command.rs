//! Typed session-channel commands.

use serde_json::{Map, Value};

use super::args::Arguments;
use super::error::DispatchError;
use crate::model::{ModelDescriptor, TransformUpdate};

/// One entry in the method catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub arguments: &'static str,
    pub summary: &'static str,
}

/// Every session-channel method, in protocol order.
pub const SESSION_METHODS: &[MethodInfo] = &[
    MethodInfo {
        name: "initialize",
        aliases: &[],
        arguments: "credential (alias licenseKey)",
        summary: "Validate the license credential and create a session",
    },
    MethodInfo {
        name: "startSession",
        aliases: &["startARSession"],
        arguments: "",
        summary: "Start the camera session",
    },
    MethodInfo {
        name: "stopSession",
        aliases: &["stopARSession"],
        arguments: "",
        summary: "Stop the camera session",
    },
    MethodInfo {
        name: "loadModel",
        aliases: &[],
        arguments: "id, sourcePath, displayName, category",
        summary: "Load a 3D model into the scene, hidden",
    },
    MethodInfo {
        name: "setVisibility",
        aliases: &["setModelVisibility"],
        arguments: "id, visible",
        summary: "Show or hide a model",
    },
    MethodInfo {
        name: "updateTransform",
        aliases: &["updateModelTransform"],
        arguments: "id, [position], [rotation], [scale]",
        summary: "Partially update a model's transform",
    },
    MethodInfo {
        name: "removeModel",
        aliases: &[],
        arguments: "id",
        summary: "Remove a model (idempotent)",
    },
    MethodInfo {
        name: "listModels",
        aliases: &[],
        arguments: "",
        summary: "List loaded models",
    },
    MethodInfo {
        name: "getTrackingState",
        aliases: &[],
        arguments: "",
        summary: "World-tracking quality and tracked object count",
    },
    MethodInfo {
        name: "getBodyTrackingData",
        aliases: &[],
        arguments: "",
        summary: "Body landmarks and measurements",
    },
    MethodInfo {
        name: "enableBodyTracking",
        aliases: &[],
        arguments: "enable",
        summary: "Turn body tracking on or off",
    },
    MethodInfo {
        name: "dispose",
        aliases: &[],
        arguments: "",
        summary: "Release the session and all models",
    },
];

/// A parsed session-channel request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Initialize { credential: String },
    StartSession,
    StopSession,
    LoadModel(ModelDescriptor),
    SetVisibility { id: String, visible: bool },
    UpdateTransform { id: String, update: TransformUpdate },
    RemoveModel { id: String },
    ListModels,
    GetTrackingState,
    GetBodyTrackingData,
    EnableBodyTracking { enable: bool },
    Dispose,
}

const ID: &[&str] = &["id", "modelId"];
const SOURCE_PATH: &[&str] = &["sourcePath", "modelPath"];
const DISPLAY_NAME: &[&str] = &["displayName", "modelName"];

impl Command {
    /// Parse a method call.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MethodNotImplemented`] for unknown methods and
    /// [`DispatchError::InvalidArgument`] for missing or malformed arguments.
    pub fn parse(method: &str, arguments: &Map<String, Value>) -> Result<Self, DispatchError> {
        let info = Self::resolve(method)?;
        Self::from_arguments(info, arguments)
    }

    /// Look up a method by name or alias.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MethodNotImplemented`] if no session method matches.
    pub fn resolve(method: &str) -> Result<&'static MethodInfo, DispatchError> {
        SESSION_METHODS
            .iter()
            .find(|info| info.name == method || info.aliases.contains(&method))
            .ok_or_else(|| DispatchError::MethodNotImplemented {
                channel: "session".to_string(),
                method: method.to_string(),
            })
    }

    /// Whether the method needs an initialized session.
    ///
    /// The dispatcher checks this before reading any argument.
    pub fn requires_session(info: &MethodInfo) -> bool {
        !matches!(
            info.name,
            "initialize" | "stopSession" | "dispose" | "enableBodyTracking"
        )
    }

    /// Extract typed arguments for an already resolved method.
    ///
    /// # Errors
    ///
    /// [`DispatchError::InvalidArgument`] for missing or malformed arguments.
    pub fn from_arguments(
        info: &MethodInfo,
        arguments: &Map<String, Value>,
    ) -> Result<Self, DispatchError> {
        let args = Arguments::new(arguments);

        let command = match info.name {
            "initialize" => Command::Initialize {
                credential: args.required_str(&["credential", "licenseKey"])?.to_string(),
            },
            "startSession" => Command::StartSession,
            "stopSession" => Command::StopSession,
            "loadModel" => {
                let id = args.required_str(ID)?;
                let source_path = args.required_str(SOURCE_PATH)?;
                let display_name = args.required_str(DISPLAY_NAME)?;
                let category = args.required_str(&["category"])?;
                Command::LoadModel(ModelDescriptor::new(id, source_path, display_name, category))
            }
            "setVisibility" => Command::SetVisibility {
                id: args.required_str(ID)?.to_string(),
                visible: args.required_bool(&["visible"])?,
            },
            "updateTransform" => {
                let id = args.required_str(ID)?.to_string();
                let position = args.optional_floats("position")?;
                let rotation = args.optional_floats("rotation")?;
                let scale = args.optional_floats("scale")?;
                let update = TransformUpdate::from_slices(
                    position.as_deref(),
                    rotation.as_deref(),
                    scale.as_deref(),
                )
                .map_err(|e| DispatchError::InvalidArgument(e.to_string()))?;
                Command::UpdateTransform { id, update }
            }
            "removeModel" => Command::RemoveModel {
                id: args.required_str(ID)?.to_string(),
            },
            "listModels" => Command::ListModels,
            "getTrackingState" => Command::GetTrackingState,
            "getBodyTrackingData" => Command::GetBodyTrackingData,
            "enableBodyTracking" => Command::EnableBodyTracking {
                enable: args.required_bool(&["enable"])?,
            },
            "dispose" => Command::Dispose,
            other => {
                return Err(DispatchError::MethodNotImplemented {
                    channel: "session".to_string(),
                    method: other.to_string(),
                })
            }
        };

        Ok(command)
    }

    /// Canonical method name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize { .. } => "initialize",
            Command::StartSession => "startSession",
            Command::StopSession => "stopSession",
            Command::LoadModel(_) => "loadModel",
            Command::SetVisibility { .. } => "setVisibility",
            Command::UpdateTransform { .. } => "updateTransform",
            Command::RemoveModel { .. } => "removeModel",
            Command::ListModels => "listModels",
            Command::GetTrackingState => "getTrackingState",
            Command::GetBodyTrackingData => "getBodyTrackingData",
            Command::EnableBodyTracking { .. } => "enableBodyTracking",
            Command::Dispose => "dispose",
        }
    }

    /// Whether the command changes session or model state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::ListModels | Command::GetTrackingState | Command::GetBodyTrackingData
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vec3;
    use serde_json::json;

    fn parse(method: &str, args: Value) -> Result<Command, DispatchError> {
        match args {
            Value::Object(map) => Command::parse(method, &map),
            _ => Command::parse(method, &Map::new()),
        }
    }

    #[test]
    fn test_parse_initialize_alias() {
        let command = parse("initialize", json!({"licenseKey": "abc"})).unwrap();
        assert_eq!(
            command,
            Command::Initialize {
                credential: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_parse_method_aliases() {
        assert_eq!(parse("startARSession", json!({})).unwrap(), Command::StartSession);
        assert_eq!(parse("stopARSession", json!({})).unwrap(), Command::StopSession);
        assert_eq!(
            parse("setModelVisibility", json!({"modelId": "m", "visible": true}))
                .unwrap()
                .name(),
            "setVisibility"
        );
    }

    #[test]
    fn test_parse_load_model() {
        let command = parse(
            "loadModel",
            json!({
                "id": "shirt1",
                "sourcePath": "/a/b.glb",
                "displayName": "Shirt",
                "category": "tops",
            }),
        )
        .unwrap();
        assert_eq!(
            command,
            Command::LoadModel(ModelDescriptor::new("shirt1", "/a/b.glb", "Shirt", "tops"))
        );
    }

    #[test]
    fn test_parse_load_model_aliases() {
        let command = parse(
            "loadModel",
            json!({"modelId": "m1", "modelPath": "/m.glb", "modelName": "Dress", "category": ""}),
        )
        .unwrap();
        let Command::LoadModel(descriptor) = command else {
            panic!("expected LoadModel");
        };
        assert_eq!(descriptor.display_name, "Dress");
        assert_eq!(descriptor.category, "");
    }

    #[test]
    fn test_parse_load_model_missing_category() {
        let err = parse(
            "loadModel",
            json!({"id": "m1", "sourcePath": "/m.glb", "displayName": "M1"}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidArgument("missing required argument 'category'".to_string())
        );
    }

    #[test]
    fn test_parse_load_model_missing_display_name() {
        let err = parse(
            "loadModel",
            json!({"id": "m1", "sourcePath": "/m.glb", "category": "tops"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("displayName"));
    }

    #[test]
    fn test_parse_load_model_missing_path() {
        let err = parse("loadModel", json!({"id": "m1"})).unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidArgument("missing required argument 'sourcePath'".to_string())
        );
    }

    #[test]
    fn test_parse_update_transform_partial() {
        let command = parse("updateTransform", json!({"id": "m1", "position": [1, 2, 3]})).unwrap();
        let Command::UpdateTransform { update, .. } = command else {
            panic!("expected UpdateTransform");
        };
        assert_eq!(update.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(update.rotation, None);
        assert_eq!(update.scale, None);
    }

    #[test]
    fn test_parse_update_transform_bad_arity() {
        let err = parse("updateTransform", json!({"id": "m1", "scale": [1, 2]})).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
        assert!(err.to_string().contains("scale"));
    }

    #[test]
    fn test_parse_unknown_method() {
        let err = parse("teleport", json!({})).unwrap_err();
        assert_eq!(
            err,
            DispatchError::MethodNotImplemented {
                channel: "session".to_string(),
                method: "teleport".to_string()
            }
        );
    }

    #[test]
    fn test_catalog_matches_parser() {
        for info in SESSION_METHODS {
            let err = parse(info.name, json!({}));
            assert!(
                !matches!(err, Err(DispatchError::MethodNotImplemented { .. })),
                "{} missing from parser",
                info.name
            );
            for alias in info.aliases {
                assert!(!matches!(
                    parse(alias, json!({})),
                    Err(DispatchError::MethodNotImplemented { .. })
                ));
            }
        }
    }

    #[test]
    fn test_resolve_alias_to_canonical() {
        assert_eq!(Command::resolve("updateModelTransform").unwrap().name, "updateTransform");
        assert!(matches!(
            Command::resolve("teleport"),
            Err(DispatchError::MethodNotImplemented { .. })
        ));
    }

    #[test]
    fn test_session_free_methods() {
        let free: Vec<&str> = SESSION_METHODS
            .iter()
            .filter(|info| !Command::requires_session(info))
            .map(|info| info.name)
            .collect();
        assert_eq!(free, ["initialize", "stopSession", "enableBodyTracking", "dispose"]);
    }

    #[test]
    fn test_reads_are_not_mutations() {
        assert!(!Command::GetTrackingState.is_mutation());
        assert!(Command::Dispose.is_mutation());
    }
}
