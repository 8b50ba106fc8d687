//! cloudview C library
//!
//! Opaque-handle C ABI over `cloudview-core`: execute a pipeline, walk its
//! point views, inspect their layouts and pack points into caller buffers.
//!
//! Every entry point is total over null input. Failures are reported with
//! sentinel values (`0`, `false`, null, `-1` for execution) and logged.
//!
//! ## Usage from C
//!
//! ```c
//! Pipeline *p = pipeline_create(json);
//! if (pipeline_execute(p) < 0) { ... }
//! PointViewIterator *it = pipeline_get_point_views(p);
//! while (point_view_iterator_has_next(it)) {
//!     PointViewHandle *v = point_view_iterator_next(it);
//!     const DimTypeList *dims = point_layout_get_dim_types(point_view_get_layout(v));
//!     char *buf = malloc(point_view_get_size(v) * dim_type_list_byte_count(dims));
//!     point_view_get_all_packed_points(v, dims, buf);
//!     point_view_free(v);
//! }
//! point_view_iterator_free(it);
//! pipeline_free(p);
//! ```

pub mod ffi;

/// Install the tracing subscriber for the library.
/// Safe to call more than once; only the first call has an effect.
///
/// The log level is controlled via the RUST_LOG environment variable and
/// defaults to `warn`:
/// - RUST_LOG=cloudview_core=debug
/// - RUST_LOG=cloudview_c=trace
pub fn init_logger() {
    use std::sync::Once;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // A host application may already have installed a subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init();
        tracing::debug!("cloudview logging initialized");
    });
}

// Re-export handle types for C consumers
pub use ffi::layout::CDimType;
pub use ffi::view::PointViewHandle;
