//! cloudview core
//!
//! Point views produced by a pipeline, their dimension layouts, and the
//! packing engine that turns strided columnar storage into contiguous
//! caller buffers. The `cloudview-c` crate exposes all of this over a C ABI.
//!
//! # Example
//!
//! ```rust
//! use cloudview_core::pipeline::Pipeline;
//! use cloudview_core::packing::pack_all;
//!
//! let mut pipeline = Pipeline::from_json(
//!     r#"[{"type":"readers.inline","dimensions":["X","Y"],"points":[[1,2],[3,4]]}]"#,
//! ).unwrap();
//! assert_eq!(pipeline.execute().unwrap(), 2);
//!
//! let view = pipeline.point_views().unwrap().next().unwrap();
//! let dims = view.layout().dim_types();
//! let mut out = vec![0u8; view.len() * dims.byte_count()];
//! assert_eq!(pack_all(&view, dims, &mut out), Ok(32));
//! ```

pub mod config;
pub mod dimension;
pub mod error;
pub mod layout;
pub mod packing;
pub mod pipeline;
pub mod srs;
pub mod table;
pub mod view;

// Re-export main types at crate root
pub use dimension::{BaseType, DimId, DimensionType, Value};
pub use error::{Error, Result};
pub use layout::{DimType, DimTypeList, PointLayout};
pub use packing::{pack_all, pack_point, PackError, PackPlan};
pub use pipeline::{Pipeline, Stage, StageRegistry, StageSpec};
pub use srs::SpatialReference;
pub use table::{PointTable, PointTableBuilder};
pub use view::{PointView, PointViewIterator, INVALID_VIEW_ID};
