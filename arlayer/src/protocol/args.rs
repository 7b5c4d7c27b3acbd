//! Typed access to request arguments.

use serde_json::{Map, Value};

use super::error::DispatchError;

/// Borrowed view over a request's argument map.
///
/// Each lookup takes a list of accepted names; the first one present (and
/// not `null`) wins, which is how argument aliases are resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arguments<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn lookup(&self, names: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        names.iter().find_map(|name| match self.map.get(*name) {
            Some(Value::Null) | None => None,
            Some(value) => Some((*name, value)),
        })
    }

    fn missing(names: &[&'static str]) -> DispatchError {
        DispatchError::InvalidArgument(format!(
            "missing required argument '{}'",
            names.first().copied().unwrap_or("?")
        ))
    }

    pub(crate) fn optional_str(
        &self,
        names: &[&'static str],
    ) -> Result<Option<&'a str>, DispatchError> {
        match self.lookup(names) {
            None => Ok(None),
            Some((_, Value::String(s))) => Ok(Some(s.as_str())),
            Some((name, _)) => Err(DispatchError::InvalidArgument(format!(
                "argument '{}' must be a string",
                name
            ))),
        }
    }

    pub(crate) fn required_str(&self, names: &[&'static str]) -> Result<&'a str, DispatchError> {
        self.optional_str(names)?
            .ok_or_else(|| Self::missing(names))
    }

    pub(crate) fn required_bool(&self, names: &[&'static str]) -> Result<bool, DispatchError> {
        match self.lookup(names) {
            None => Err(Self::missing(names)),
            Some((_, Value::Bool(b))) => Ok(*b),
            Some((name, _)) => Err(DispatchError::InvalidArgument(format!(
                "argument '{}' must be a boolean",
                name
            ))),
        }
    }

    /// A numeric array, or `None` when absent.
    ///
    /// Arity is left to the caller.
    pub(crate) fn optional_floats(
        &self,
        name: &'static str,
    ) -> Result<Option<Vec<f32>>, DispatchError> {
        let values = match self.lookup(&[name]) {
            None => return Ok(None),
            Some((_, Value::Array(values))) => values,
            Some(_) => {
                return Err(DispatchError::InvalidArgument(format!(
                    "argument '{}' must be an array of numbers",
                    name
                )))
            }
        };

        values
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    DispatchError::InvalidArgument(format!(
                        "argument '{}' must be an array of numbers",
                        name
                    ))
                })
            })
            .collect::<Result<Vec<f32>, _>>()
            .map(Some)
    }

    /// Lenient string lookup for stub methods: wrong types count as absent.
    pub(crate) fn lenient_str(&self, names: &[&'static str]) -> Option<&'a str> {
        self.lookup(names).and_then(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_alias_resolution() {
        let args = map(json!({"modelId": "m1"}));
        let args = Arguments::new(&args);
        assert_eq!(args.required_str(&["id", "modelId"]).unwrap(), "m1");
    }

    #[test]
    fn test_primary_name_wins() {
        let args = map(json!({"id": "a", "modelId": "b"}));
        let args = Arguments::new(&args);
        assert_eq!(args.required_str(&["id", "modelId"]).unwrap(), "a");
    }

    #[test]
    fn test_null_counts_as_missing() {
        let args = map(json!({"id": null}));
        let err = Arguments::new(&args).required_str(&["id"]).unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidArgument("missing required argument 'id'".to_string())
        );
    }

    #[test]
    fn test_wrong_type_rejected() {
        let args = map(json!({"visible": "yes"}));
        let err = Arguments::new(&args).required_bool(&["visible"]).unwrap_err();
        assert!(err.to_string().contains("must be a boolean"));
    }

    #[test]
    fn test_floats() {
        let args = map(json!({"position": [1, 2.5, -3]}));
        let args = Arguments::new(&args);
        assert_eq!(
            args.optional_floats("position").unwrap(),
            Some(vec![1.0, 2.5, -3.0])
        );
        assert_eq!(args.optional_floats("scale").unwrap(), None);
    }

    #[test]
    fn test_floats_reject_strings() {
        let args = map(json!({"position": [1, "2", 3]}));
        assert!(Arguments::new(&args).optional_floats("position").is_err());
    }

    #[test]
    fn test_lenient_ignores_types() {
        let args = map(json!({"databaseName": 5}));
        assert_eq!(Arguments::new(&args).lenient_str(&["databaseName"]), None);
    }
}
