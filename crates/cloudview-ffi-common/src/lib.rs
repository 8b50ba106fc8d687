//! Common FFI utilities for cloudview C-compatible interfaces.
//!
//! This crate provides shared utilities for building the C ABI in
//! `cloudview-c`: opaque handle lifecycle, caller-buffer string output and
//! C string input.
//!
//! # Memory Ownership
//!
//! - Handles created with [`into_handle`] are owned by the caller
//! - Callers must use the corresponding `*_free` function to deallocate
//! - NULL pointers are handled safely (no-op for free functions)
//! - Strings are never returned as owned allocations; they are copied into
//!   caller-supplied buffers with a caller-supplied capacity

use std::ffi::CStr;
use std::os::raw::c_char;
use std::slice;

/// Move a value to the heap and return an owning raw pointer.
///
/// The returned pointer is owned by the caller and must be released with
/// [`free_boxed`].
#[inline]
pub fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

/// Safely free a boxed value.
///
/// Does nothing if the pointer is null.
///
/// # Safety
/// The pointer must have been allocated by `Box::into_raw()` or be null.
#[inline]
pub unsafe fn free_boxed<T>(ptr: *mut T) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(ptr);
        }
    }
}

/// Borrow the value behind a handle, mapping null to `None`.
///
/// # Safety
/// The pointer must be null or point to a live `T` for the duration of `'a`.
#[inline]
pub unsafe fn handle_ref<'a, T>(ptr: *const T) -> Option<&'a T> {
    unsafe { ptr.as_ref() }
}

/// Mutably borrow the value behind a handle, mapping null to `None`.
///
/// # Safety
/// The pointer must be null or point to a live `T` that is not aliased for
/// the duration of `'a`.
#[inline]
pub unsafe fn handle_mut<'a, T>(ptr: *mut T) -> Option<&'a mut T> {
    unsafe { ptr.as_mut() }
}

/// Copy `s` plus a NUL terminator into `out`.
///
/// Returns the number of bytes written excluding the terminator, or `None`
/// when `s` is empty, contains an interior NUL, or does not fit. On `None`
/// the first byte of a non-empty `out` is set to NUL so the buffer always
/// holds a terminated string.
pub fn fill_buffer(s: &str, out: &mut [u8]) -> Option<usize> {
    if let Some(first) = out.first_mut() {
        *first = 0;
    }

    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.contains(&0) || bytes.len() >= out.len() {
        return None;
    }

    out[..bytes.len()].copy_from_slice(bytes);
    out[bytes.len()] = 0;
    Some(bytes.len())
}

/// Copy `s` into a caller-owned C buffer of `capacity` bytes.
///
/// Returns the length written excluding the terminator, or `0` when `buf`
/// is null, `capacity` is zero, or the string does not fit. Never writes
/// beyond `capacity`.
///
/// # Safety
/// `buf` must be null or valid for writes of `capacity` bytes.
pub unsafe fn write_cstr(s: &str, buf: *mut c_char, capacity: usize) -> usize {
    if buf.is_null() || capacity == 0 {
        return 0;
    }
    let out = unsafe { slice::from_raw_parts_mut(buf as *mut u8, capacity) };
    fill_buffer(s, out).unwrap_or(0)
}

/// Safely convert a C string pointer to a Rust string reference.
///
/// # Arguments
/// * `ptr` - Pointer to null-terminated C string
///
/// # Returns
/// `Ok(&str)` on success, `Err(&'static str)` with error message on failure.
///
/// # Safety
/// The pointer must be valid and null-terminated, or null.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, &'static str> {
    if ptr.is_null() {
        return Err("null pointer");
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| "invalid UTF-8")
}

/// Generate a version function that returns a static C string.
///
/// # Example
/// ```ignore
/// cloudview_ffi_common::define_version_fn!(my_lib_version);
/// // Expands to:
/// // #[no_mangle]
/// // pub extern "C" fn my_lib_version() -> *const c_char {
/// //     concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
/// // }
/// ```
#[macro_export]
macro_rules! define_version_fn {
    ($fn_name:ident) => {
        #[no_mangle]
        pub extern "C" fn $fn_name() -> *const std::os::raw::c_char {
            concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const std::os::raw::c_char
        }
    };
}

/// Generate a free function for an owning handle type.
///
/// # Example
/// ```ignore
/// cloudview_ffi_common::define_handle_free!(pipeline_free, Pipeline);
/// // Expands to:
/// // #[no_mangle]
/// // #[allow(clippy::not_unsafe_ptr_arg_deref)]
/// // pub extern "C" fn pipeline_free(ptr: *mut Pipeline) {
/// //     cloudview_ffi_common::free_boxed(ptr);
/// // }
/// ```
#[macro_export]
macro_rules! define_handle_free {
    ($fn_name:ident, $handle_type:ty) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(ptr: *mut $handle_type) {
            unsafe { $crate::free_boxed(ptr) };
        }
    };
}

/// Generate a buffer-fill function for a string known at call time.
///
/// The generated function has the shape
/// `fn(buf: *mut c_char, capacity: usize) -> usize` and follows the
/// returned-length convention of [`write_cstr`].
#[macro_export]
macro_rules! define_buffer_fn {
    ($fn_name:ident, $value:expr) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(buf: *mut std::os::raw::c_char, capacity: usize) -> usize {
            let value: String = $value;
            unsafe { $crate::write_cstr(&value, buf, capacity) }
        }
    };
}
