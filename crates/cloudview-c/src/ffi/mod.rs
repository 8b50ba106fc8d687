//! C-compatible FFI interface
//!
//! # Memory Ownership Rules
//!
//! - `pipeline_create()`, `pipeline_get_point_views()`,
//!   `point_view_iterator_next()` and `point_view_clone()` return owning
//!   handles; each has a matching `*_free` function
//! - Point view handles hold their own reference to the view's storage and
//!   stay valid after the iterator or pipeline they came from is freed
//! - Layout and dimension list pointers are borrowed from a point view
//!   handle and are valid as long as that handle (or any clone) is alive
//! - Strings are written into caller buffers; functions return the length
//!   written excluding the terminator, or 0 on failure

pub mod config;
pub mod iterator;
pub mod layout;
pub mod packing;
pub mod pipeline;
pub mod view;

#[no_mangle]
pub extern "C" fn cloudview_init_logger() {
    crate::init_logger();
}
