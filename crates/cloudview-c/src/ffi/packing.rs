//! Packing points into caller buffers
//!
//! Both functions trust the caller to size `buf`: `dim_type_list_byte_count`
//! bytes for one point, `point_view_get_size` times that for a whole view.

use std::os::raw::c_char;
use std::slice;

use cloudview_core::{DimTypeList, PackPlan};
use cloudview_ffi_common::handle_ref;

use super::view::{view_ref, PointViewHandle};

/// Pack point `index` of `view` using `dims`. Returns the bytes written,
/// or 0 on null input, an out-of-range index or an unresolvable dimension.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_packed_point(
    view: *const PointViewHandle,
    dims: *const DimTypeList,
    index: u64,
    buf: *mut c_char,
) -> usize {
    let (Some(view), Some(dims)) = (unsafe { view_ref(view) }, unsafe { handle_ref(dims) }) else {
        return 0;
    };
    if buf.is_null() {
        return 0;
    }
    let Ok(index) = usize::try_from(index) else {
        return 0;
    };

    let result = PackPlan::new(view, dims).and_then(|plan| {
        let out = unsafe { slice::from_raw_parts_mut(buf as *mut u8, plan.point_size()) };
        plan.pack_point(index, out)
    });
    match result {
        Ok(written) => written,
        Err(e) => {
            tracing::debug!(view = view.id(), index, error = %e, "pack point failed");
            0
        }
    }
}

/// Pack every point of `view` back to back. Returns the bytes written, or 0
/// on null input or an empty view.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_all_packed_points(
    view: *const PointViewHandle,
    dims: *const DimTypeList,
    buf: *mut c_char,
) -> u64 {
    let (Some(view), Some(dims)) = (unsafe { view_ref(view) }, unsafe { handle_ref(dims) }) else {
        return 0;
    };
    if buf.is_null() || view.is_empty() {
        return 0;
    }

    let result = PackPlan::new(view, dims).and_then(|plan| {
        let total = view.len().checked_mul(plan.point_size()).unwrap_or(0);
        let out = unsafe { slice::from_raw_parts_mut(buf as *mut u8, total) };
        plan.pack_all(out)
    });
    match result {
        Ok(written) => written as u64,
        Err(e) => {
            tracing::debug!(view = view.id(), error = %e, "pack all points failed");
            0
        }
    }
}
