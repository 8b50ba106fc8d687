//! Filter stages: reprojection, groupby, head, merge

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::dimension::{DimId, Value};
use crate::error::{Error, Result};
use crate::pipeline::description::StageSpec;
use crate::pipeline::stage::Stage;
use crate::srs::{SpatialReference, Transform};
use crate::table::PointTableBuilder;
use crate::view::PointView;

pub const REPROJECTION: &str = "filters.reprojection";
pub const GROUPBY: &str = "filters.groupby";
pub const HEAD: &str = "filters.head";
pub const MERGE: &str = "filters.merge";

// ============================================================================
// filters.reprojection
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReprojectionOptions {
    out_srs: String,
    #[serde(default)]
    in_srs: Option<String>,
}

/// Transforms X/Y of every view into `out_srs`.
#[derive(Debug)]
pub struct Reprojection {
    in_srs: Option<SpatialReference>,
    out_srs: SpatialReference,
}

pub fn reprojection(spec: &StageSpec) -> Result<Box<dyn Stage>> {
    let options: ReprojectionOptions = spec.options_as()?;
    let out_srs = SpatialReference::from_user_input(&options.out_srs)?;
    if out_srs.is_empty() {
        return Err(Error::option(REPROJECTION, "out_srs is empty"));
    }
    let in_srs = options
        .in_srs
        .as_deref()
        .map(SpatialReference::from_user_input)
        .transpose()?;
    Ok(Box::new(Reprojection { in_srs, out_srs }))
}

impl Reprojection {
    fn reproject(&self, view: &PointView) -> Result<PointView> {
        let from = self.in_srs.as_ref().unwrap_or_else(|| view.spatial_reference());
        let transform = Transform::between(from, &self.out_srs)?;

        if transform == Transform::Identity {
            return Ok(PointView::with_rows(
                view.table().clone(),
                view.rows().to_vec(),
                self.out_srs.clone(),
            ));
        }

        let table = view.table();
        let layout = table.layout();
        let missing = |name: &str| Error::UnknownDimension(format!("{} required for reprojection", name));
        let x_index = layout.index_of(DimId::X).ok_or_else(|| missing("X"))?;
        let y_index = layout.index_of(DimId::Y).ok_or_else(|| missing("Y"))?;
        let x_offset = layout.packed_offset("X").ok_or_else(|| missing("X"))?;
        let y_offset = layout.packed_offset("Y").ok_or_else(|| missing("Y"))?;
        let dims = layout.dim_types();
        let (x_kind, y_kind) = match (dims.get(x_index), dims.get(y_index)) {
            (Some(x), Some(y)) => (x.kind, y.kind),
            _ => return Err(missing("X/Y")),
        };

        let mut builder = PointTableBuilder::with_capacity(layout.clone(), view.len());
        let mut packed = vec![0u8; layout.point_size()];
        for &row in view.rows() {
            let row = row as usize;
            let mut offset = 0;
            for index in 0..dims.len() {
                if let Some(bytes) = table.field(index, row) {
                    packed[offset..offset + bytes.len()].copy_from_slice(bytes);
                    offset += bytes.len();
                }
            }
            let x = x_kind.read(&packed[x_offset..x_offset + x_kind.size()]).as_f64();
            let y = y_kind.read(&packed[y_offset..y_offset + y_kind.size()]).as_f64();
            let (tx, ty) = transform.apply(x, y);
            let fits = x_kind.write(Value::Floating(tx), &mut packed[x_offset..x_offset + x_kind.size()])
                && y_kind.write(Value::Floating(ty), &mut packed[y_offset..y_offset + y_kind.size()]);
            if !fits {
                return Err(Error::ValueOutOfRange(format!(
                    "reprojected ({}, {}) does not fit X/Y storage",
                    tx, ty
                )));
            }
            builder.push_packed(&packed);
        }
        Ok(PointView::new(builder.build(), self.out_srs.clone()))
    }
}

impl Stage for Reprojection {
    fn kind(&self) -> &'static str {
        REPROJECTION
    }

    fn run(&self, views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        views
            .iter()
            .map(|view| self.reproject(view).map(Arc::new))
            .collect()
    }
}

// ============================================================================
// filters.groupby
// ============================================================================

#[derive(Debug, Deserialize)]
struct GroupByOptions {
    dimension: String,
}

/// Splits each view into one view per distinct value of a dimension.
#[derive(Debug)]
pub struct GroupBy {
    dimension: String,
}

pub fn groupby(spec: &StageSpec) -> Result<Box<dyn Stage>> {
    let options: GroupByOptions = spec.options_as()?;
    Ok(Box::new(GroupBy {
        dimension: options.dimension,
    }))
}

impl Stage for GroupBy {
    fn kind(&self) -> &'static str {
        GROUPBY
    }

    fn run(&self, views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        let id = DimId::lookup(&self.dimension)
            .ok_or_else(|| Error::UnknownDimension(self.dimension.clone()))?;
        let mut out = Vec::new();
        for view in &views {
            if view.layout().index_of(id).is_none() {
                return Err(Error::UnknownDimension(format!(
                    "{} not present in view {}",
                    self.dimension,
                    view.id()
                )));
            }

            let mut groups: Vec<(f64, Vec<usize>)> = Vec::new();
            let mut slot: HashMap<u64, usize> = HashMap::new();
            for index in 0..view.len() {
                let key = view
                    .row(index)
                    .and_then(|row| view.table().value(id, row))
                    .map(Value::as_f64)
                    .unwrap_or(f64::NAN);
                let group = *slot.entry(key.to_bits()).or_insert_with(|| {
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                });
                groups[group].1.push(index);
            }
            groups.sort_by(|a, b| a.0.total_cmp(&b.0));

            tracing::debug!(view = view.id(), groups = groups.len(), dimension = %self.dimension, "grouped view");
            out.extend(groups.into_iter().map(|(_, indices)| Arc::new(view.select(indices))));
        }
        Ok(out)
    }
}

// ============================================================================
// filters.head
// ============================================================================

#[derive(Debug, Deserialize)]
struct HeadOptions {
    count: usize,
}

/// Keeps the first `count` points of each view.
#[derive(Debug)]
pub struct Head {
    count: usize,
}

pub fn head(spec: &StageSpec) -> Result<Box<dyn Stage>> {
    let options: HeadOptions = spec.options_as()?;
    Ok(Box::new(Head {
        count: options.count,
    }))
}

impl Stage for Head {
    fn kind(&self) -> &'static str {
        HEAD
    }

    fn run(&self, views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        Ok(views
            .iter()
            .map(|view| Arc::new(view.select(0..self.count.min(view.len()))))
            .collect())
    }
}

// ============================================================================
// filters.merge
// ============================================================================

/// Concatenates all views into one. Layouts must match.
#[derive(Debug)]
pub struct Merge;

pub fn merge(_spec: &StageSpec) -> Result<Box<dyn Stage>> {
    Ok(Box::new(Merge))
}

impl Stage for Merge {
    fn kind(&self) -> &'static str {
        MERGE
    }

    fn run(&self, views: Vec<Arc<PointView>>) -> Result<Vec<Arc<PointView>>> {
        let Some(first) = views.first() else {
            return Ok(views);
        };
        if views.len() == 1 {
            return Ok(views);
        }

        let layout = first.layout().clone();
        if let Some(other) = views.iter().find(|v| **v.layout() != *layout) {
            return Err(Error::LayoutMismatch(format!(
                "view {} does not match the layout of view {}",
                other.id(),
                first.id()
            )));
        }

        let srs = views
            .iter()
            .map(|v| v.spatial_reference())
            .find(|srs| !srs.is_empty())
            .cloned()
            .unwrap_or_default();

        let merged = if views.iter().all(|v| Arc::ptr_eq(v.table(), first.table())) {
            let rows = views.iter().flat_map(|v| v.rows().iter().copied()).collect();
            PointView::with_rows(first.table().clone(), rows, srs)
        } else {
            let total = views.iter().map(|v| v.len()).sum();
            let mut builder = PointTableBuilder::with_capacity(layout, total);
            for view in &views {
                for &row in view.rows() {
                    builder.push_row_from(view.table(), row as usize);
                }
            }
            PointView::new(builder.build(), srs)
        };
        Ok(vec![Arc::new(merged)])
    }
}
