//! Pipeline description parsing
//!
//! Accepts `{"pipeline": [stage, ...]}` or a bare array of stage objects.
//! Every stage object needs a `"type"`; all other keys are stage options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One stage entry of a pipeline description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl StageSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    /// Deserialize the options into a stage-specific struct.
    pub fn options_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.options.clone()))
            .map_err(|e| Error::option(&self.kind, e.to_string()))
    }
}

/// Parse a JSON pipeline description into its ordered stage list.
pub fn parse(json: &str) -> Result<Vec<StageSpec>> {
    let root: Value = serde_json::from_str(json)?;
    let stages = match root {
        Value::Object(mut object) => match object.remove("pipeline") {
            Some(Value::Array(stages)) => stages,
            Some(_) => {
                return Err(Error::InvalidPipeline(
                    "\"pipeline\" must be an array".to_string(),
                ))
            }
            None => {
                return Err(Error::InvalidPipeline(
                    "missing \"pipeline\" key".to_string(),
                ))
            }
        },
        Value::Array(stages) => stages,
        _ => {
            return Err(Error::InvalidPipeline(
                "description must be an object or an array".to_string(),
            ))
        }
    };

    if stages.is_empty() {
        return Err(Error::InvalidPipeline("pipeline has no stages".to_string()));
    }

    stages
        .into_iter()
        .enumerate()
        .map(|(i, stage)| match stage {
            Value::String(name) => Err(Error::InvalidPipeline(format!(
                "stage {} is a file name ({}); only inline stages are supported",
                i, name
            ))),
            Value::Object(_) => serde_json::from_value::<StageSpec>(stage).map_err(|e| {
                Error::InvalidPipeline(format!("stage {}: {}", i, e))
            }),
            other => Err(Error::InvalidPipeline(format!(
                "stage {} must be an object, found {}",
                i, other
            ))),
        })
        .collect()
}

/// Canonical JSON form of a stage list.
pub fn to_json(stages: &[StageSpec]) -> String {
    let root = serde_json::json!({ "pipeline": stages });
    serde_json::to_string_pretty(&root).unwrap_or_default()
}
