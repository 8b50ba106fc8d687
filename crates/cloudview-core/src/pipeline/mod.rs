//! Pipeline execution boundary
//!
//! A [`Pipeline`] owns a parsed description and, once executed, the ordered
//! point views the stages produced. Stages run in description order; each
//! receives every view produced so far.
//!
//! ```text
//! JSON ──parse──▶ [StageSpec] ──registry──▶ [Box<dyn Stage>] ──run──▶ [Arc<PointView>]
//! ```

pub mod description;
pub mod filters;
pub mod readers;
pub mod stage;

use std::sync::Arc;

use serde_json::json;

use crate::error::{Error, Result};
use crate::view::{PointView, PointViewIterator};

pub use description::StageSpec;
pub use stage::{Stage, StageFactory, StageRegistry};

/// Largest description accepted, in bytes.
pub const MAX_PIPELINE_JSON_LEN: usize = 1 << 20;

#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<StageSpec>,
    registry: StageRegistry,
    views: Option<Vec<Arc<PointView>>>,
}

impl Pipeline {
    /// Parse a description using the built-in stages.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::with_registry(json, StageRegistry::default())
    }

    pub fn with_registry(json: &str, registry: StageRegistry) -> Result<Self> {
        if json.len() > MAX_PIPELINE_JSON_LEN {
            return Err(Error::InvalidPipeline(format!(
                "description is {} bytes, limit is {}",
                json.len(),
                MAX_PIPELINE_JSON_LEN
            )));
        }
        let stages = description::parse(json)?;
        tracing::debug!(stages = stages.len(), "parsed pipeline description");
        Ok(Self {
            stages,
            registry,
            views: None,
        })
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Check every stage is registered and its options are usable.
    pub fn validate(&self) -> Result<()> {
        self.build_stages().map(|_| ())
    }

    fn build_stages(&self) -> Result<Vec<Box<dyn Stage>>> {
        self.stages
            .iter()
            .map(|spec| self.registry.create(spec))
            .collect()
    }

    /// Run every stage and keep the resulting views. Returns the total
    /// number of points across all views.
    ///
    /// Executing again replaces the previous results; views handed out
    /// earlier stay valid.
    pub fn execute(&mut self) -> Result<usize> {
        let stages = self.build_stages()?;
        let mut views = Vec::new();
        for stage in &stages {
            views = stage.run(views).map_err(|e| {
                tracing::warn!(stage = stage.kind(), error = %e, "stage failed");
                e
            })?;
            tracing::debug!(stage = stage.kind(), views = views.len(), "stage complete");
        }
        let count = views.iter().map(|v| v.len()).sum();
        tracing::info!(views = views.len(), points = count, "pipeline executed");
        self.views = Some(views);
        Ok(count)
    }

    pub fn is_executed(&self) -> bool {
        self.views.is_some()
    }

    /// Views of the last execution, in production order.
    pub fn views(&self) -> Result<&[Arc<PointView>]> {
        self.views.as_deref().ok_or(Error::NotExecuted)
    }

    /// Fresh iterator positioned at the first view.
    pub fn point_views(&self) -> Result<PointViewIterator> {
        self.views().map(|views| PointViewIterator::new(views.to_vec()))
    }

    /// Canonical JSON form of the description.
    pub fn to_json(&self) -> String {
        description::to_json(&self.stages)
    }

    /// Dimensions of the first view as
    /// `{"schema":{"dimensions":[{"name","type","base","size"}]}}`.
    pub fn schema(&self) -> Result<serde_json::Value> {
        let views = self.views()?;
        let dimensions: Vec<serde_json::Value> = match views.first() {
            Some(view) => {
                let layout = view.layout();
                layout
                    .names()
                    .iter()
                    .zip(layout.dim_types())
                    .map(|(name, dim)| {
                        json!({
                            "name": name,
                            "type": dim.kind.name(),
                            "base": dim.kind.base().name(),
                            "size": dim.size(),
                        })
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        Ok(json!({ "schema": { "dimensions": dimensions } }))
    }
}
