use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 5] = [
    "FFMPEG_DIR",
    "PKG_CONFIG_PATH",
    "VCPKG_ROOT",
    "VCPKGRS_DYNAMIC",
    "VCPKGRS_TRIPLET",
];

fn warn(message: impl AsRef<str>) {
    println!("cargo:warning={}", message.as_ref());
}

/// Where vcpkg installs FFmpeg for the configured triplet.
fn vcpkg_ffmpeg_dir(vcpkg_root: &Path) -> PathBuf {
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    vcpkg_root.join("installed").join(triplet)
}

fn windows_hints() {
    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT").map(PathBuf::from) else {
        warn("FFMPEG_DIR is not set. Install FFmpeg via vcpkg and set FFMPEG_DIR to its prefix.");
        return;
    };

    let ffmpeg_dir = vcpkg_ffmpeg_dir(&vcpkg_root);
    if !ffmpeg_dir.join("include").join("libavformat").exists() {
        warn(format!(
            "VCPKG_ROOT is set but libavformat headers are missing under {}.",
            ffmpeg_dir.display()
        ));
        return;
    }

    warn(format!(
        "Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it explicitly.",
        ffmpeg_dir.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("Set VCPKGRS_DYNAMIC=1 when linking a dynamic vcpkg FFmpeg build.");
    }
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if let Some(dir) = env::var_os("FFMPEG_DIR").map(PathBuf::from) {
        if !dir.join("lib").exists() {
            warn(format!("FFMPEG_DIR={} has no lib directory.", dir.display()));
        }
        return;
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        windows_hints();
    }
}
