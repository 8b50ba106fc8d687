//! Point layouts and dimension type lists

use std::os::raw::c_char;
use std::ptr;

use cloudview_core::{DimId, DimType, DimTypeList, DimensionType, PointLayout};
use cloudview_ffi_common::{cstr_to_str, handle_ref, write_cstr};

/// C-compatible dimension type entry.
///
/// `type_` is the `DimensionType` code; its low byte is the width in bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CDimType {
    pub id: u32,
    pub type_: u32,
    pub scale: f64,
    pub offset: f64,
}

impl From<&DimType> for CDimType {
    fn from(dim: &DimType) -> Self {
        Self {
            id: dim.id.0,
            type_: dim.kind.code(),
            scale: dim.scale,
            offset: dim.offset,
        }
    }
}

/// Look up a layout dimension by its C name.
///
/// # Safety
/// `layout` must be null or live; `name` must be null or a C string.
unsafe fn find<'a>(layout: *const PointLayout, name: *const c_char) -> Option<(&'a PointLayout, &'a DimType, &'a str)> {
    let layout = unsafe { handle_ref(layout) }?;
    let name = unsafe { cstr_to_str(name) }.ok()?;
    layout.find(name).map(|dim| (layout, dim, name))
}

/// Ordered dimension list of the layout, borrowed from it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_layout_get_dim_types(layout: *const PointLayout) -> *const DimTypeList {
    unsafe { handle_ref(layout) }.map_or(ptr::null(), |l| l.dim_types() as *const DimTypeList)
}

/// Bytes needed for one packed point; 0 for a null layout.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_layout_get_point_size(layout: *const PointLayout) -> usize {
    unsafe { handle_ref(layout) }.map_or(0, PointLayout::point_size)
}

/// Fill `out` with the dimension named `name`. False when it is absent.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_layout_find_dim_type(
    layout: *const PointLayout,
    name: *const c_char,
    out: *mut CDimType,
) -> bool {
    if out.is_null() {
        return false;
    }
    match unsafe { find(layout, name) } {
        Some((_, dim, _)) => {
            unsafe { *out = CDimType::from(dim) };
            true
        }
        None => false,
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_layout_get_dim_size(layout: *const PointLayout, name: *const c_char) -> usize {
    unsafe { find(layout, name) }.map_or(0, |(_, dim, _)| dim.size())
}

/// Offset of the named dimension inside a packed point.
/// Returns 0 when absent; check with `point_layout_find_dim_type` first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn point_layout_get_dim_packed_offset(layout: *const PointLayout, name: *const c_char) -> usize {
    unsafe { find(layout, name) }
        .and_then(|(layout, _, name)| layout.packed_offset(name))
        .unwrap_or(0)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dim_type_list_size(dims: *const DimTypeList) -> usize {
    unsafe { handle_ref(dims) }.map_or(0, DimTypeList::len)
}

/// Sum of widths of every entry; the packed size of one point.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dim_type_list_byte_count(dims: *const DimTypeList) -> usize {
    unsafe { handle_ref(dims) }.map_or(0, DimTypeList::byte_count)
}

/// Entry `index` of the list, or a zeroed entry when out of range.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dim_type_list_get(dims: *const DimTypeList, index: usize) -> CDimType {
    unsafe { handle_ref(dims) }
        .and_then(|d| d.get(index))
        .map(CDimType::from)
        .unwrap_or_default()
}

/// Name of a dimension id, e.g. `"X"`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dim_type_id_name(id: u32, buf: *mut c_char, capacity: usize) -> usize {
    let name = DimId(id).name().unwrap_or_default();
    unsafe { write_cstr(&name, buf, capacity) }
}

/// Interpretation name of a type code, e.g. `"uint16"`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn dim_type_interpretation_name(type_: u32, buf: *mut c_char, capacity: usize) -> usize {
    let name = DimensionType::from_code(type_).map_or("", DimensionType::name);
    unsafe { write_cstr(name, buf, capacity) }
}

/// Width in bytes of a type code; 0 for unknown codes.
#[no_mangle]
pub extern "C" fn dim_type_interpretation_byte_count(type_: u32) -> usize {
    DimensionType::from_code(type_).map_or(0, DimensionType::size)
}
