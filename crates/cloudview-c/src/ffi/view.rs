//! Point view accessors

use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use cloudview_core::{PointLayout, PointView, INVALID_VIEW_ID};
use cloudview_ffi_common::{define_handle_free, handle_ref, into_handle, write_cstr};

/// Caller-owned reference to one point view.
#[derive(Debug, Clone)]
pub struct PointViewHandle {
    view: Arc<PointView>,
}

impl PointViewHandle {
    pub fn new(view: Arc<PointView>) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &PointView {
        &self.view
    }
}

/// Borrow the view behind a handle.
///
/// # Safety
/// `handle` must be null or a live handle.
pub(crate) unsafe fn view_ref<'a>(handle: *const PointViewHandle) -> Option<&'a PointView> {
    unsafe { handle_ref(handle) }.map(PointViewHandle::view)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_id(view: *const PointViewHandle) -> u32 {
    unsafe { view_ref(view) }.map_or(INVALID_VIEW_ID, PointView::id)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_size(view: *const PointViewHandle) -> u64 {
    unsafe { view_ref(view) }.map_or(0, |v| v.len() as u64)
}

/// True for a null view or a view without points.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_is_empty(view: *const PointViewHandle) -> bool {
    unsafe { view_ref(view) }.map_or(true, PointView::is_empty)
}

/// Copy of the view under a new id. The copy is an independent handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_clone(view: *const PointViewHandle) -> *mut PointViewHandle {
    match unsafe { view_ref(view) } {
        Some(view) => into_handle(PointViewHandle::new(Arc::new(view.clone_view()))),
        None => ptr::null_mut(),
    }
}

define_handle_free!(point_view_free, PointViewHandle);

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_proj4(view: *const PointViewHandle, buf: *mut c_char, capacity: usize) -> usize {
    let proj4 = unsafe { view_ref(view) }.map_or("", |v| v.spatial_reference().proj4());
    unsafe { write_cstr(proj4, buf, capacity) }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_wkt(
    view: *const PointViewHandle,
    buf: *mut c_char,
    capacity: usize,
    pretty: bool,
) -> usize {
    let wkt = unsafe { view_ref(view) }
        .map(|v| v.spatial_reference().wkt(pretty))
        .unwrap_or_default();
    unsafe { write_cstr(&wkt, buf, capacity) }
}

/// Layout of the view's points, borrowed from the view.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_view_get_layout(view: *const PointViewHandle) -> *const PointLayout {
    unsafe { view_ref(view) }.map_or(ptr::null(), |v| Arc::as_ptr(v.layout()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudview_core::{DimensionType, PointTableBuilder, SpatialReference, Value};
    use pretty_assertions::assert_eq;
    use std::ffi::CStr;

    fn handle(srs: &str, points: usize) -> *mut PointViewHandle {
        let layout = Arc::new(PointLayout::new(&[("X", DimensionType::Double)]).unwrap());
        let mut builder = PointTableBuilder::new(layout);
        for i in 0..points {
            builder.push_values(&[Value::Floating(i as f64)]).unwrap();
        }
        let view = PointView::new(builder.build(), SpatialReference::from_user_input(srs).unwrap());
        into_handle(PointViewHandle::new(Arc::new(view)))
    }

    fn wkt(view: *const PointViewHandle, pretty: bool) -> String {
        let mut buf = vec![0 as c_char; 2048];
        let len = point_view_get_wkt(view, buf.as_mut_ptr(), buf.len(), pretty);
        let s = unsafe { CStr::from_ptr(buf.as_ptr()) }.to_str().unwrap().to_string();
        assert_eq!(s.len(), len);
        s
    }

    #[test]
    fn test_null_view() {
        assert_eq!(point_view_get_id(ptr::null()), 0);
        assert_eq!(point_view_get_size(ptr::null()), 0);
        assert!(point_view_is_empty(ptr::null()));
        assert!(point_view_clone(ptr::null()).is_null());
        assert!(point_view_get_layout(ptr::null()).is_null());

        let mut buf = [b'x' as c_char; 16];
        assert_eq!(point_view_get_proj4(ptr::null(), buf.as_mut_ptr(), buf.len()), 0);
        assert_eq!(buf[0], 0);
        buf[0] = b'x' as c_char;
        assert_eq!(point_view_get_wkt(ptr::null(), buf.as_mut_ptr(), buf.len(), true), 0);
        assert_eq!(buf[0], 0);
        point_view_free(ptr::null_mut());
    }

    #[test]
    fn test_size_and_empty() {
        let v = handle("", 3);
        assert_eq!(point_view_get_size(v), 3);
        assert!(!point_view_is_empty(v));
        let empty = handle("", 0);
        assert!(point_view_is_empty(empty));
        point_view_free(v);
        point_view_free(empty);
    }

    #[test]
    fn test_clone_matches_source() {
        let v = handle("EPSG:4326", 2);
        let c = point_view_clone(v);
        assert_ne!(point_view_get_id(v), point_view_get_id(c));
        assert_eq!(point_view_get_size(v), point_view_get_size(c));
        assert_eq!(wkt(v, true), wkt(c, true));
        assert_eq!(wkt(v, false), wkt(c, false));
        assert_eq!(point_view_get_layout(v), point_view_get_layout(c));
        point_view_free(v);
        // The clone keeps the storage alive on its own.
        assert_eq!(point_view_get_size(c), 2);
        point_view_free(c);
    }

    #[test]
    fn test_pretty_wkt_is_longer() {
        let v = handle("EPSG:3857", 1);
        let compact = wkt(v, false);
        let pretty = wkt(v, true);
        assert!(pretty.len() > compact.len());
        assert_ne!(pretty, compact);
        assert_eq!(wkt(v, false), compact);
        point_view_free(v);
    }

    #[test]
    fn test_string_capacity() {
        let v = handle("EPSG:4326", 1);
        let proj4 = "+proj=longlat +datum=WGS84 +no_defs";
        let mut buf = vec![b'x' as c_char; proj4.len()];
        assert_eq!(point_view_get_proj4(v, buf.as_mut_ptr(), buf.len()), 0);
        assert_eq!(buf[0], 0);
        assert_eq!(point_view_get_proj4(v, buf.as_mut_ptr(), 0), 0);
        assert_eq!(point_view_get_proj4(v, ptr::null_mut(), 64), 0);

        let mut buf = vec![0 as c_char; proj4.len() + 1];
        assert_eq!(point_view_get_proj4(v, buf.as_mut_ptr(), buf.len()), proj4.len());
        point_view_free(v);
    }

    #[test]
    fn test_empty_reference_is_absence() {
        let v = handle("", 1);
        let mut buf = [0 as c_char; 64];
        assert_eq!(point_view_get_proj4(v, buf.as_mut_ptr(), buf.len()), 0);
        assert_eq!(point_view_get_wkt(v, buf.as_mut_ptr(), buf.len(), false), 0);
        point_view_free(v);
    }
}
