//! Version and build information

use cloudview_core::config;
use cloudview_ffi_common::{define_buffer_fn, define_version_fn};

define_version_fn!(cloudview_version);

#[no_mangle]
pub extern "C" fn cloudview_version_integer() -> u32 {
    config::version_integer()
}

#[no_mangle]
pub extern "C" fn cloudview_version_major() -> u32 {
    config::version_major()
}

#[no_mangle]
pub extern "C" fn cloudview_version_minor() -> u32 {
    config::version_minor()
}

#[no_mangle]
pub extern "C" fn cloudview_version_patch() -> u32 {
    config::version_patch()
}

define_buffer_fn!(cloudview_version_string, config::VERSION_STRING.to_string());
define_buffer_fn!(cloudview_sha1, config::SHA1.to_string());
define_buffer_fn!(cloudview_full_version_string, config::full_version_string());
define_buffer_fn!(cloudview_debug_information, config::debug_information());
define_buffer_fn!(cloudview_plugin_install_path, config::plugin_install_path());
