//! Point views and the view iterator
//!
//! A [`PointView`] is an ordered selection of rows from a shared
//! [`PointTable`] plus the spatial reference of those points. Views are
//! immutable after creation; cloning yields the same points under a new id.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::layout::PointLayout;
use crate::srs::SpatialReference;
use crate::table::PointTable;

/// Id that never belongs to a view.
pub const INVALID_VIEW_ID: u32 = 0;

static NEXT_VIEW_ID: AtomicU32 = AtomicU32::new(1);

fn next_view_id() -> u32 {
    loop {
        let id = NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed);
        if id != INVALID_VIEW_ID {
            return id;
        }
    }
}

/// One homogeneous collection of points produced by a pipeline.
#[derive(Debug)]
pub struct PointView {
    id: u32,
    table: Arc<PointTable>,
    rows: Vec<u32>,
    srs: SpatialReference,
}

impl PointView {
    /// View over every row of `table`.
    pub fn new(table: Arc<PointTable>, srs: SpatialReference) -> Self {
        let rows = (0..table.len() as u32).collect();
        Self::with_rows(table, rows, srs)
    }

    /// View over selected rows of `table`, in the given order.
    pub fn with_rows(table: Arc<PointTable>, rows: Vec<u32>, srs: SpatialReference) -> Self {
        debug_assert!(rows.iter().all(|&r| (r as usize) < table.len()));
        Self {
            id: next_view_id(),
            table,
            rows,
            srs,
        }
    }

    /// Process-unique, non-zero identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of points in the view.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn layout(&self) -> &Arc<PointLayout> {
        self.table.layout()
    }

    pub fn table(&self) -> &Arc<PointTable> {
        &self.table
    }

    /// Table rows backing this view, in view order.
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Table row for the point at `index`.
    pub fn row(&self, index: usize) -> Option<usize> {
        self.rows.get(index).map(|&r| r as usize)
    }

    pub fn spatial_reference(&self) -> &SpatialReference {
        &self.srs
    }

    /// Independent copy with a new id. Storage is shared; both views are
    /// immutable, so neither can observe changes through the other.
    pub fn clone_view(&self) -> PointView {
        Self::with_rows(self.table.clone(), self.rows.clone(), self.srs.clone())
    }

    /// New view over a subset of this view's points, preserving order.
    pub fn select(&self, indices: impl IntoIterator<Item = usize>) -> PointView {
        let rows = indices
            .into_iter()
            .filter_map(|i| self.rows.get(i).copied())
            .collect();
        Self::with_rows(self.table.clone(), rows, self.srs.clone())
    }
}

/// Resettable forward cursor over the views of one pipeline execution.
#[derive(Debug, Clone)]
pub struct PointViewIterator {
    views: Vec<Arc<PointView>>,
    position: usize,
}

impl PointViewIterator {
    pub fn new(views: Vec<Arc<PointView>>) -> Self {
        Self { views, position: 0 }
    }

    /// Rewind to the first view.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn has_next(&self) -> bool {
        self.position < self.views.len()
    }

    /// Number of views in the sequence.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Iterator for PointViewIterator {
    type Item = Arc<PointView>;

    fn next(&mut self) -> Option<Arc<PointView>> {
        let view = self.views.get(self.position)?.clone();
        self.position += 1;
        Some(view)
    }
}
