//! Columnar point storage
//!
//! A [`PointTable`] keeps one contiguous byte column per dimension, each
//! strided by that dimension's width and stored in native byte order. Tables
//! are immutable once built and shared between views through `Arc`.

use std::sync::Arc;

use crate::dimension::{DimId, Value};
use crate::error::{Error, Result};
use crate::layout::PointLayout;

/// Immutable columnar storage for a set of points sharing one layout.
#[derive(Debug)]
pub struct PointTable {
    layout: Arc<PointLayout>,
    columns: Vec<Vec<u8>>,
    len: usize,
}

impl PointTable {
    pub fn layout(&self) -> &Arc<PointLayout> {
        &self.layout
    }

    /// Number of rows stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw column for the dimension at `index` in the layout.
    pub fn column(&self, index: usize) -> Option<&[u8]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Raw bytes of one field.
    pub fn field(&self, index: usize, row: usize) -> Option<&[u8]> {
        let width = self.layout.dim_types().get(index)?.size();
        let column = self.column(index)?;
        column.get(row * width..(row + 1) * width)
    }

    /// Decoded value of one field.
    pub fn value(&self, id: DimId, row: usize) -> Option<Value> {
        let index = self.layout.index_of(id)?;
        let kind = self.layout.dim_types().get(index)?.kind;
        self.field(index, row).map(|bytes| kind.read(bytes))
    }
}

/// Row-at-a-time builder for [`PointTable`].
#[derive(Debug)]
pub struct PointTableBuilder {
    layout: Arc<PointLayout>,
    columns: Vec<Vec<u8>>,
    len: usize,
}

impl PointTableBuilder {
    pub fn new(layout: Arc<PointLayout>) -> Self {
        let columns = vec![Vec::new(); layout.dim_types().len()];
        Self {
            layout,
            columns,
            len: 0,
        }
    }

    pub fn with_capacity(layout: Arc<PointLayout>, rows: usize) -> Self {
        let columns = layout
            .dim_types()
            .iter()
            .map(|d| d.size().checked_mul(rows).map_or_else(Vec::new, Vec::with_capacity))
            .collect();
        Self {
            layout,
            columns,
            len: 0,
        }
    }

    pub fn layout(&self) -> &Arc<PointLayout> {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one point given as values in layout order.
    ///
    /// The row is rejected as a whole if any value cannot be stored in its
    /// dimension's type.
    pub fn push_values(&mut self, values: &[Value]) -> Result<()> {
        let dims = self.layout.dim_types();
        if values.len() != dims.len() {
            return Err(Error::LayoutMismatch(format!(
                "point has {} values, layout has {} dimensions",
                values.len(),
                dims.len()
            )));
        }

        let mut row = Vec::with_capacity(self.layout.point_size());
        for (value, dim) in values.iter().zip(dims) {
            let start = row.len();
            row.resize(start + dim.size(), 0);
            if !dim.kind.write(*value, &mut row[start..]) {
                let name = dim.id.name().unwrap_or_default();
                return Err(Error::ValueOutOfRange(format!(
                    "{:?} does not fit {} ({})",
                    value, name, dim.kind
                )));
            }
        }
        self.push_packed(&row);
        Ok(())
    }

    /// Append one point already packed in layout order.
    pub fn push_packed(&mut self, packed: &[u8]) {
        let mut offset = 0;
        for (column, dim) in self.columns.iter_mut().zip(self.layout.dim_types()) {
            column.extend_from_slice(&packed[offset..offset + dim.size()]);
            offset += dim.size();
        }
        self.len += 1;
    }

    /// Append one row copied from another table with the same layout.
    pub fn push_row_from(&mut self, table: &PointTable, row: usize) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            if let Some(bytes) = table.field(index, row) {
                column.extend_from_slice(bytes);
            }
        }
        self.len += 1;
    }

    pub fn build(self) -> Arc<PointTable> {
        Arc::new(PointTable {
            layout: self.layout,
            columns: self.columns,
            len: self.len,
        })
    }
}
