//! Stage trait and registry

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pipeline::description::StageSpec;
use crate::pipeline::{filters, readers};
use crate::view::PointView;

/// One step of a pipeline.
///
/// Readers append the views they produce to their input; filters map the
/// incoming views to new ones. Input views are never modified.
pub trait Stage: fmt::Debug + Send + Sync {
    /// Registered type name, e.g. `"filters.head"`.
    fn kind(&self) -> &'static str;

    fn run(&self, views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>>;
}

/// Builds a stage from its description entry.
pub type StageFactory = fn(&StageSpec) -> Result<Box<dyn Stage>>;

/// Maps stage type names to factories.
#[derive(Clone)]
pub struct StageRegistry {
    factories: Vec<(String, StageFactory)>,
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Default for StageRegistry {
    /// Registry with every built-in reader and filter.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(readers::INLINE, readers::inline);
        registry.register(readers::FAUX, readers::faux);
        registry.register(filters::REPROJECTION, filters::reprojection);
        registry.register(filters::GROUPBY, filters::groupby);
        registry.register(filters::HEAD, filters::head);
        registry.register(filters::MERGE, filters::merge);
        registry
    }
}

impl StageRegistry {
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a factory, replacing any existing one with the same name.
    pub fn register(&mut self, kind: &str, factory: StageFactory) {
        self.factories.retain(|(name, _)| name != kind);
        self.factories.push((kind.to_string(), factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.names().any(|name| name == kind)
    }

    pub fn create(&self, spec: &StageSpec) -> Result<Box<dyn Stage>> {
        let (_, factory) = self
            .factories
            .iter()
            .find(|(name, _)| *name == spec.kind)
            .ok_or_else(|| Error::UnknownStage(spec.kind.clone()))?;
        factory(spec)
    }
}
