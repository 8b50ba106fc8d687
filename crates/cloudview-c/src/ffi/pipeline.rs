//! Pipeline lifecycle and execution

use std::os::raw::c_char;
use std::ptr;

use cloudview_core::pipeline::MAX_PIPELINE_JSON_LEN;
use cloudview_core::{Pipeline, PointViewIterator};
use cloudview_ffi_common::{cstr_to_str, define_handle_free, handle_mut, handle_ref, into_handle, write_cstr};

/// Parse a JSON pipeline description. Returns null on any error.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_create(json: *const c_char) -> *mut Pipeline {
    crate::init_logger();

    let json = match unsafe { cstr_to_str(json) } {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = e, "pipeline_create: bad description pointer");
            return ptr::null_mut();
        }
    };
    if json.len() > MAX_PIPELINE_JSON_LEN {
        tracing::warn!(len = json.len(), "pipeline_create: description too long");
        return ptr::null_mut();
    }

    match Pipeline::from_json(json) {
        Ok(pipeline) => into_handle(pipeline),
        Err(e) => {
            tracing::warn!(error = %e, "pipeline_create failed");
            ptr::null_mut()
        }
    }
}

define_handle_free!(pipeline_free, Pipeline);

/// Check that every stage exists and its options are usable.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_validate(pipeline: *const Pipeline) -> bool {
    let Some(pipeline) = (unsafe { handle_ref(pipeline) }) else {
        return false;
    };
    match pipeline.validate() {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "pipeline_validate failed");
            false
        }
    }
}

/// Execute the pipeline. Returns the total point count, or -1 on failure.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_execute(pipeline: *mut Pipeline) -> i64 {
    let Some(pipeline) = (unsafe { handle_mut(pipeline) }) else {
        return -1;
    };
    match pipeline.execute() {
        Ok(count) => i64::try_from(count).unwrap_or(i64::MAX),
        Err(e) => {
            tracing::warn!(error = %e, "pipeline_execute failed");
            -1
        }
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_is_executed(pipeline: *const Pipeline) -> bool {
    unsafe { handle_ref(pipeline) }.is_some_and(Pipeline::is_executed)
}

/// Write the canonical JSON description into `buf`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_get_as_string(pipeline: *const Pipeline, buf: *mut c_char, capacity: usize) -> usize {
    let json = unsafe { handle_ref(pipeline) }
        .map(Pipeline::to_json)
        .unwrap_or_default();
    unsafe { write_cstr(&json, buf, capacity) }
}

/// Write the schema of the first view as JSON into `buf`.
/// Returns 0 before execution.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_get_schema(pipeline: *const Pipeline, buf: *mut c_char, capacity: usize) -> usize {
    let schema = unsafe { handle_ref(pipeline) }
        .and_then(|p| p.schema().ok())
        .map(|schema| schema.to_string())
        .unwrap_or_default();
    unsafe { write_cstr(&schema, buf, capacity) }
}

/// New iterator over the executed views, or null before execution.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn pipeline_get_point_views(pipeline: *const Pipeline) -> *mut PointViewIterator {
    let Some(pipeline) = (unsafe { handle_ref(pipeline) }) else {
        return ptr::null_mut();
    };
    match pipeline.point_views() {
        Ok(iterator) => into_handle(iterator),
        Err(e) => {
            tracing::debug!(error = %e, "pipeline_get_point_views failed");
            ptr::null_mut()
        }
    }
}
