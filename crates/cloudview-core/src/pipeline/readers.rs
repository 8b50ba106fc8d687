//! Reader stages: inline points and synthetic (faux) points

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Number;

use crate::dimension::{DimId, DimensionType, Value};
use crate::error::{Error, Result};
use crate::layout::PointLayout;
use crate::pipeline::description::StageSpec;
use crate::pipeline::stage::Stage;
use crate::srs::SpatialReference;
use crate::table::PointTableBuilder;
use crate::view::PointView;

pub const INLINE: &str = "readers.inline";
pub const FAUX: &str = "readers.faux";

/// Largest `count` accepted by `readers.faux`.
pub const MAX_FAUX_COUNT: usize = 100_000_000;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DimensionSpec {
    /// `"Name"` or `"Name:type"`
    Short(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

impl DimensionSpec {
    fn resolve(&self) -> Result<(String, DimensionType)> {
        let (name, kind) = match self {
            DimensionSpec::Short(s) => match s.split_once(':') {
                Some((name, kind)) => (name.trim(), Some(kind.trim())),
                None => (s.trim(), None),
            },
            DimensionSpec::Full { name, kind } => (name.trim(), kind.as_deref()),
        };
        if name.is_empty() {
            return Err(Error::option(INLINE, "dimension with empty name"));
        }
        let kind = match kind {
            Some(k) => DimensionType::from_name(k)
                .ok_or_else(|| Error::UnknownDimension(format!("{}: unknown type {}", name, k)))?,
            None => DimId::lookup(name)
                .and_then(DimId::default_type)
                .ok_or_else(|| {
                    Error::UnknownDimension(format!("{} needs an explicit type", name))
                })?,
        };
        Ok((name.to_string(), kind))
    }
}

#[derive(Debug, Deserialize)]
struct InlineOptions {
    dimensions: Vec<DimensionSpec>,
    #[serde(default)]
    points: Vec<Vec<Number>>,
    #[serde(default)]
    spatialreference: String,
}

/// Points listed directly in the pipeline description.
#[derive(Debug)]
pub struct InlineReader {
    layout: Arc<PointLayout>,
    points: Vec<Vec<Value>>,
    srs: SpatialReference,
}

pub fn inline(spec: &StageSpec) -> Result<Box<dyn Stage>> {
    let options: InlineOptions = spec.options_as()?;
    let dims = options
        .dimensions
        .iter()
        .map(DimensionSpec::resolve)
        .collect::<Result<Vec<_>>>()?;
    let layout = Arc::new(PointLayout::new(&dims)?);
    let points = options
        .points
        .iter()
        .map(|row| row.iter().map(number_value).collect())
        .collect();
    Ok(Box::new(InlineReader {
        layout,
        points,
        srs: SpatialReference::from_user_input(&options.spatialreference)?,
    }))
}

fn number_value(n: &Number) -> Value {
    if let Some(v) = n.as_u64() {
        Value::Unsigned(v)
    } else if let Some(v) = n.as_i64() {
        Value::Signed(v)
    } else {
        Value::Floating(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl Stage for InlineReader {
    fn kind(&self) -> &'static str {
        INLINE
    }

    fn run(&self, mut views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        let mut builder = PointTableBuilder::with_capacity(self.layout.clone(), self.points.len());
        for (i, row) in self.points.iter().enumerate() {
            builder.push_values(row).map_err(|e| {
                Error::option(INLINE, format!("point {}: {}", i, e))
            })?;
        }
        let view = PointView::new(builder.build(), self.srs.clone());
        tracing::debug!(view = view.id(), points = view.len(), "inline reader produced view");
        views.push(Arc::new(view));
        Ok(views)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FauxMode {
    Constant,
    Ramp,
}

#[derive(Debug, Deserialize)]
struct FauxOptions {
    count: usize,
    #[serde(default = "default_mode")]
    mode: FauxMode,
    #[serde(default)]
    bounds: Option<String>,
    #[serde(default)]
    spatialreference: String,
}

fn default_mode() -> FauxMode {
    FauxMode::Constant
}

/// Axis-aligned box `[min, max]` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: [0.0; 3],
            max: [1.0; 3],
        }
    }
}

impl Bounds {
    /// Parse `([xmin, xmax], [ymin, ymax])` or
    /// `([xmin, xmax], [ymin, ymax], [zmin, zmax])`.
    pub fn parse(s: &str) -> Result<Bounds> {
        let numbers = s
            .split(|c: char| matches!(c, '(' | ')' | '[' | ']' | ','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| Error::option(FAUX, format!("bad bounds value {:?}", t)))
            })
            .collect::<Result<Vec<f64>>>()?;

        let (min, max) = match numbers.as_slice() {
            [x0, x1, y0, y1] => ([*x0, *y0, 0.0], [*x1, *y1, 0.0]),
            [x0, x1, y0, y1, z0, z1] => ([*x0, *y0, *z0], [*x1, *y1, *z1]),
            _ => return Err(Error::option(FAUX, format!("bounds must have 4 or 6 values: {}", s))),
        };
        Ok(Bounds { min, max })
    }
}

/// Generates `count` synthetic points inside a bounding box.
#[derive(Debug)]
pub struct FauxReader {
    count: usize,
    mode: FauxMode,
    bounds: Bounds,
    srs: SpatialReference,
}

pub fn faux(spec: &StageSpec) -> Result<Box<dyn Stage>> {
    let options: FauxOptions = spec.options_as()?;
    if options.count > MAX_FAUX_COUNT {
        return Err(Error::option(
            FAUX,
            format!("count {} exceeds limit {}", options.count, MAX_FAUX_COUNT),
        ));
    }
    let bounds = match options.bounds.as_deref() {
        Some(b) => Bounds::parse(b)?,
        None => Bounds::default(),
    };
    Ok(Box::new(FauxReader {
        count: options.count,
        mode: options.mode,
        bounds,
        srs: SpatialReference::from_user_input(&options.spatialreference)?,
    }))
}

impl FauxReader {
    fn layout() -> Result<PointLayout> {
        PointLayout::new(&[
            ("X", DimensionType::Double),
            ("Y", DimensionType::Double),
            ("Z", DimensionType::Double),
            ("OffsetTime", DimensionType::Unsigned32),
            ("ReturnNumber", DimensionType::Unsigned8),
            ("NumberOfReturns", DimensionType::Unsigned8),
        ])
    }

    fn coordinate(&self, axis: usize, index: usize) -> f64 {
        let min = self.bounds.min[axis];
        match self.mode {
            FauxMode::Constant => min,
            FauxMode::Ramp if self.count > 1 => {
                let step = (self.bounds.max[axis] - min) / (self.count - 1) as f64;
                min + step * index as f64
            }
            FauxMode::Ramp => min,
        }
    }
}

impl Stage for FauxReader {
    fn kind(&self) -> &'static str {
        FAUX
    }

    fn run(&self, mut views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        let layout = Arc::new(Self::layout()?);
        let mut builder = PointTableBuilder::with_capacity(layout, self.count);
        for i in 0..self.count {
            builder.push_values(&[
                Value::Floating(self.coordinate(0, i)),
                Value::Floating(self.coordinate(1, i)),
                Value::Floating(self.coordinate(2, i)),
                Value::Unsigned(i as u64),
                Value::Unsigned(1),
                Value::Unsigned(1),
            ])?;
        }
        let view = PointView::new(builder.build(), self.srs.clone());
        tracing::debug!(view = view.id(), points = view.len(), mode = ?self.mode, "faux reader produced view");
        views.push(Arc::new(view));
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(spec: StageSpec) -> Result<Vec<Arc<PointView>>> {
        let stage = match spec.kind.as_str() {
            INLINE => inline(&spec)?,
            _ => faux(&spec)?,
        };
        stage.run(Vec::new())
    }

    #[test]
    fn test_inline_typed_and_default_dimensions() {
        let spec = StageSpec::new(INLINE)
            .with_option("dimensions", json!(["X", "Y:float", {"name": "Weight", "type": "uint8"}]))
            .with_option("points", json!([[1.5, 2, 3], [4, -5.25, 6]]))
            .with_option("spatialreference", json!("EPSG:4326"));
        let views = run(spec).unwrap();
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.len(), 2);
        assert_eq!(view.layout().point_size(), 8 + 4 + 1);
        assert_eq!(view.table().value(DimId::X, 0), Some(Value::Floating(1.5)));
        assert_eq!(view.table().value(DimId::Y, 1), Some(Value::Floating(-5.25)));
        assert_eq!(view.spatial_reference().epsg(), Some(4326));
    }

    #[test]
    fn test_inline_rejects_bad_input() {
        let untyped_custom = StageSpec::new(INLINE).with_option("dimensions", json!(["Mystery"]));
        assert!(inline(&untyped_custom).is_err());

        let bad_type = StageSpec::new(INLINE).with_option("dimensions", json!(["X:complex"]));
        assert!(inline(&bad_type).is_err());

        let overflow = StageSpec::new(INLINE)
            .with_option("dimensions", json!(["Classification"]))
            .with_option("points", json!([[256]]));
        assert!(run(overflow).is_err());

        let short_row = StageSpec::new(INLINE)
            .with_option("dimensions", json!(["X", "Y"]))
            .with_option("points", json!([[1.0]]));
        assert!(run(short_row).is_err());
    }

    #[test]
    fn test_faux_ramp() {
        let spec = StageSpec::new(FAUX)
            .with_option("count", json!(5))
            .with_option("mode", json!("ramp"))
            .with_option("bounds", json!("([0, 4], [10, 30], [0, 0])"));
        let views = run(spec).unwrap();
        let view = &views[0];
        assert_eq!(view.len(), 5);
        assert_eq!(view.layout().point_size(), 30);
        assert_eq!(view.table().value(DimId::X, 3), Some(Value::Floating(3.0)));
        assert_eq!(view.table().value(DimId::Y, 4), Some(Value::Floating(30.0)));
        assert!(view.spatial_reference().is_empty());
    }

    #[test]
    fn test_faux_constant_default_bounds() {
        let spec = StageSpec::new(FAUX).with_option("count", json!(3));
        let views = run(spec).unwrap();
        assert_eq!(views[0].table().value(DimId::Z, 2), Some(Value::Floating(0.0)));
    }

    #[test]
    fn test_faux_count_limit() {
        let at_limit = StageSpec::new(FAUX).with_option("count", json!(MAX_FAUX_COUNT));
        assert!(faux(&at_limit).is_ok());
        let huge = StageSpec::new(FAUX).with_option("count", json!(2305843009213693952u64));
        assert!(matches!(faux(&huge), Err(Error::InvalidOption { .. })));
    }

    #[test]
    fn test_bounds_parse() {
        let b = Bounds::parse("([1,2],[3,4])").unwrap();
        assert_eq!(b.min, [1.0, 3.0, 0.0]);
        assert_eq!(b.max, [2.0, 4.0, 0.0]);
        assert!(Bounds::parse("([1,2])").is_err());
        assert!(Bounds::parse("([a,2],[3,4])").is_err());
    }
}
