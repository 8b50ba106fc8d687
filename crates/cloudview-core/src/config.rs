//! Build metadata and runtime configuration

use std::env;

use crate::pipeline::StageRegistry;

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Git revision baked in at build time, `"unknown"` when not provided.
pub const SHA1: &str = match option_env!("CLOUDVIEW_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

/// Environment variable that overrides the plugin install path.
pub const DRIVER_PATH_ENV: &str = "CLOUDVIEW_DRIVER_PATH";

const DEFAULT_PLUGIN_INSTALL_PATH: &str = match option_env!("CLOUDVIEW_PLUGIN_INSTALL_PATH") {
    Some(path) => path,
    None => "/usr/local/lib/cloudview/plugins",
};

fn component(index: usize) -> u32 {
    VERSION_STRING
        .split('.')
        .nth(index)
        .and_then(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .unwrap_or(0)
}

pub fn version_major() -> u32 {
    component(0)
}

pub fn version_minor() -> u32 {
    component(1)
}

pub fn version_patch() -> u32 {
    component(2)
}

/// `major * 10000 + minor * 100 + patch`
pub fn version_integer() -> u32 {
    version_major() * 10_000 + version_minor() * 100 + version_patch()
}

/// `"X.Y.Z (git-version: abcdef)"` using the first six characters of the sha.
pub fn full_version_string() -> String {
    let short: String = SHA1.chars().take(6).collect();
    format!("{} (git-version: {})", VERSION_STRING, short)
}

/// Directory searched for stage plugins.
pub fn plugin_install_path() -> String {
    match env::var(DRIVER_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => path,
        _ => DEFAULT_PLUGIN_INSTALL_PATH.to_string(),
    }
}

/// Human-readable summary of the build and runtime environment.
pub fn debug_information() -> String {
    let stages = StageRegistry::default()
        .names()
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "cloudview {}\n\
         Plugin install path: {}\n\
         Stages: {}\n\
         Target: {}-{}\n",
        full_version_string(),
        plugin_install_path(),
        stages,
        env::consts::ARCH,
        env::consts::OS,
    )
}
