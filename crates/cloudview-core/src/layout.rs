//! Point layouts and ordered dimension type lists
//!
//! A [`PointLayout`] is the ordered schema of the points in a table. Its
//! [`DimTypeList`] is the materialized `(id, type)` sequence the packing
//! engine walks; list order is packing order.

use crate::dimension::{DimId, DimensionType};
use crate::error::{Error, Result};

/// One entry of a dimension type list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimType {
    pub id: DimId,
    pub kind: DimensionType,
    pub scale: f64,
    pub offset: f64,
}

impl DimType {
    pub fn new(id: DimId, kind: DimensionType) -> Self {
        Self {
            id,
            kind,
            scale: 1.0,
            offset: 0.0,
        }
    }

    pub fn size(&self) -> usize {
        self.kind.size()
    }
}

/// Ordered list of dimension types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimTypeList {
    dims: Vec<DimType>,
}

impl DimTypeList {
    pub fn new(dims: Vec<DimType>) -> Self {
        Self { dims }
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DimType> {
        self.dims.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DimType> {
        self.dims.iter()
    }

    /// Packed size of one point described by this list.
    pub fn byte_count(&self) -> usize {
        self.dims.iter().map(DimType::size).sum()
    }
}

impl<'a> IntoIterator for &'a DimTypeList {
    type Item = &'a DimType;
    type IntoIter = std::slice::Iter<'a, DimType>;

    fn into_iter(self) -> Self::IntoIter {
        self.dims.iter()
    }
}

/// Ordered schema of the points in one table.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLayout {
    dim_types: DimTypeList,
    names: Vec<String>,
}

impl PointLayout {
    /// Build a layout from `(name, type)` pairs.
    ///
    /// Names are resolved through the dimension registry. A name given
    /// twice is rejected.
    pub fn new<S: AsRef<str>>(dims: &[(S, DimensionType)]) -> Result<Self> {
        let mut types = Vec::with_capacity(dims.len());
        let mut names = Vec::with_capacity(dims.len());
        for (name, kind) in dims {
            let name = name.as_ref();
            let id = DimId::resolve(name)
                .ok_or_else(|| Error::UnknownDimension(format!("{} (dimension registry full)", name)))?;
            if types.iter().any(|d: &DimType| d.id == id) {
                return Err(Error::LayoutMismatch(format!("duplicate dimension {}", name)));
            }
            types.push(DimType::new(id, *kind));
            names.push(id.name().unwrap_or_else(|| name.to_string()));
        }
        if types.is_empty() {
            return Err(Error::LayoutMismatch("layout has no dimensions".to_string()));
        }
        Ok(Self {
            dim_types: DimTypeList::new(types),
            names,
        })
    }

    pub fn dim_types(&self) -> &DimTypeList {
        &self.dim_types
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sum of the byte widths of every dimension in the layout.
    pub fn point_size(&self) -> usize {
        self.dim_types.byte_count()
    }

    /// Position of a dimension within the layout.
    pub fn index_of(&self, id: DimId) -> Option<usize> {
        self.dim_types.iter().position(|d| d.id == id)
    }

    /// Find a dimension by name (case-insensitive for well-known names).
    pub fn find(&self, name: &str) -> Option<&DimType> {
        let id = DimId::lookup(name)?;
        self.index_of(id).and_then(|i| self.dim_types.get(i))
    }

    /// Byte offset of a dimension within a packed point.
    pub fn packed_offset(&self, name: &str) -> Option<usize> {
        let id = DimId::lookup(name)?;
        let index = self.index_of(id)?;
        Some(self.dim_types.iter().take(index).map(DimType::size).sum())
    }
}
