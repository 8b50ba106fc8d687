//! Point packing
//!
//! Converts points of a [`PointView`] into contiguous bytes following a
//! [`DimTypeList`]: fields in list order, each exactly its declared width,
//! native byte order, no padding.
//!
//! ```text
//! DimTypeList: X:double  Y:double  Z:double  Intensity:uint16
//! packed:      ┌────────┬────────┬────────┬──┐
//!              │ 8B     │ 8B     │ 8B     │2B│   point_size = 26
//!              └────────┴────────┴────────┴──┘
//! ```
//!
//! Both entry points go through the same [`PackPlan`], so bulk output is
//! byte-for-byte the concatenation of single-point output.

use thiserror::Error;

use crate::dimension::DimensionType;
use crate::layout::DimTypeList;
use crate::view::PointView;

/// Errors raised while packing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("point index {index} out of range for view of {len} points")]
    OutOfRange { index: usize, len: usize },

    #[error("buffer of {actual} bytes is smaller than the {required} bytes required")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("view has no dimension with id {0}")]
    MissingDimension(u32),

    #[error("value of dimension {id} cannot be represented as {target}")]
    Conversion { id: u32, target: DimensionType },

    #[error("view is empty")]
    EmptyView,

    #[error("dimension list is empty")]
    EmptyDimensions,
}

/// One resolved field copy: source column plus widths and types.
#[derive(Debug)]
struct FieldCopy<'a> {
    id: u32,
    column: &'a [u8],
    source: DimensionType,
    target: DimensionType,
}

/// Dimension list resolved against one view's storage.
///
/// Resolving once and reusing the plan keeps per-point work to the raw
/// field copies.
#[derive(Debug)]
pub struct PackPlan<'a> {
    view: &'a PointView,
    fields: Vec<FieldCopy<'a>>,
    point_size: usize,
}

impl<'a> PackPlan<'a> {
    pub fn new(view: &'a PointView, dims: &DimTypeList) -> Result<Self, PackError> {
        if dims.is_empty() {
            return Err(PackError::EmptyDimensions);
        }
        let table = view.table();
        let layout = table.layout();
        let mut fields = Vec::with_capacity(dims.len());
        for dim in dims {
            let index = layout
                .index_of(dim.id)
                .ok_or(PackError::MissingDimension(dim.id.0))?;
            let source = layout
                .dim_types()
                .get(index)
                .map(|d| d.kind)
                .ok_or(PackError::MissingDimension(dim.id.0))?;
            let column = table
                .column(index)
                .ok_or(PackError::MissingDimension(dim.id.0))?;
            fields.push(FieldCopy {
                id: dim.id.0,
                column,
                source,
                target: dim.kind,
            });
        }
        Ok(Self {
            view,
            fields,
            point_size: dims.byte_count(),
        })
    }

    /// Bytes produced per point.
    pub fn point_size(&self) -> usize {
        self.point_size
    }

    /// Pack the point at view index `index` into `out[..point_size]`.
    pub fn pack_point(&self, index: usize, out: &mut [u8]) -> Result<usize, PackError> {
        let row = self.view.row(index).ok_or(PackError::OutOfRange {
            index,
            len: self.view.len(),
        })?;
        if out.len() < self.point_size {
            return Err(PackError::BufferTooSmall {
                required: self.point_size,
                actual: out.len(),
            });
        }
        self.pack_row(row, &mut out[..self.point_size])?;
        Ok(self.point_size)
    }

    /// Pack every point of the view back to back into `out`.
    pub fn pack_all(&self, out: &mut [u8]) -> Result<usize, PackError> {
        if self.view.is_empty() {
            return Err(PackError::EmptyView);
        }
        let required = self.view.len() * self.point_size;
        if out.len() < required {
            return Err(PackError::BufferTooSmall {
                required,
                actual: out.len(),
            });
        }
        for (&row, chunk) in self
            .view
            .rows()
            .iter()
            .zip(out[..required].chunks_exact_mut(self.point_size))
        {
            self.pack_row(row as usize, chunk)?;
        }
        Ok(required)
    }

    fn pack_row(&self, row: usize, out: &mut [u8]) -> Result<(), PackError> {
        let mut offset = 0;
        for field in &self.fields {
            let src_width = field.source.size();
            let dst_width = field.target.size();
            let src = &field.column[row * src_width..(row + 1) * src_width];
            let dst = &mut out[offset..offset + dst_width];
            if field.source == field.target {
                dst.copy_from_slice(src);
            } else if !field.target.write(field.source.read(src), dst) {
                return Err(PackError::Conversion {
                    id: field.id,
                    target: field.target,
                });
            }
            offset += dst_width;
        }
        Ok(())
    }
}

/// Pack point `index` of `view` into `out`, returning the bytes written.
pub fn pack_point(
    view: &PointView,
    dims: &DimTypeList,
    index: usize,
    out: &mut [u8],
) -> Result<usize, PackError> {
    PackPlan::new(view, dims)?.pack_point(index, out)
}

/// Pack every point of `view` into `out`, returning the bytes written.
pub fn pack_all(view: &PointView, dims: &DimTypeList, out: &mut [u8]) -> Result<usize, PackError> {
    PackPlan::new(view, dims)?.pack_all(out)
}
