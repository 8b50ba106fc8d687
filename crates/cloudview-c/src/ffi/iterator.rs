//! Point view iterator

use std::ptr;

use cloudview_core::PointViewIterator;
use cloudview_ffi_common::{define_handle_free, handle_mut, handle_ref, into_handle};

use super::view::PointViewHandle;

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_iterator_has_next(iterator: *const PointViewIterator) -> bool {
    unsafe { handle_ref(iterator) }.is_some_and(PointViewIterator::has_next)
}

/// Next view as a new caller-owned handle, or null when exhausted.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_iterator_next(iterator: *mut PointViewIterator) -> *mut PointViewHandle {
    match unsafe { handle_mut(iterator) }.and_then(|it| it.next()) {
        Some(view) => into_handle(PointViewHandle::new(view)),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_iterator_reset(iterator: *mut PointViewIterator) {
    if let Some(iterator) = unsafe { handle_mut(iterator) } {
        iterator.reset();
    }
}

define_handle_free!(point_view_iterator_free, PointViewIterator);
