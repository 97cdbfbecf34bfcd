//! Directory layout for one packaging run

use crate::core::config::BuildConfig;
use std::path::{Path, PathBuf};

/// Relative location of the durable build log inside the PWA Kit directory
pub const LOGS_DIR: &str = ".logs";
pub const LOG_FILE: &str = "build.log";
/// `tracing` diagnostics, next to the build log
pub const DIAGNOSTICS_FILE: &str = "diagnostics.log";

/// Absolute paths used by the stages, computed once from the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPaths {
    /// Project root (where the framework build runs)
    pub root: PathBuf,
    /// Native framework output (`.next`)
    pub framework_build_dir: PathBuf,
    /// Static assets copied next to the standalone server
    pub public_dir: PathBuf,
    /// PWA Kit project directory (`.pwakit`)
    pub pwakit_dir: PathBuf,
    /// Staging area the framework output is copied into (`.pwakit/app/next`)
    pub app_next_dir: PathBuf,
    /// Output of the secondary packaging build (`.pwakit/build`)
    pub pwakit_build_dir: PathBuf,
    /// Final standalone server directory (`.pwakit/build/next/standalone`)
    pub standalone_dir: PathBuf,
    /// Final static asset directory (`.pwakit/build/next/static`)
    pub static_dir: PathBuf,
    /// Entry file produced by the packaging build (`.pwakit/build/ssr.js`)
    pub bundled_entry: PathBuf,
    /// Where the bundled entry is moved to
    pub standalone_entry: PathBuf,
    /// Shim template that replaces the bundled entry
    pub entry_shim: PathBuf,
    /// JSON artifact carrying the runtime config
    pub server_files_manifest: PathBuf,
    /// Durable log file
    pub log_file: PathBuf,
    /// Diagnostics file for `tracing` output
    pub diagnostics_file: PathBuf,
}

impl StagingPaths {
    /// Compute every path from the project root and layout config
    pub fn from_root(root: impl AsRef<Path>, config: &BuildConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        let pwakit_dir = root.join(&config.pwakit_dir);
        let app_next_dir = pwakit_dir.join("app").join("next");
        let pwakit_build_dir = pwakit_dir.join("build");
        let standalone_dir = pwakit_build_dir.join("next").join("standalone");

        Self {
            framework_build_dir: root.join(&config.framework_output_dir),
            public_dir: root.join(&config.public_dir),
            static_dir: pwakit_build_dir.join("next").join("static"),
            bundled_entry: pwakit_build_dir.join("ssr.js"),
            standalone_entry: standalone_dir.join("ssr.js"),
            entry_shim: pwakit_dir.join("app").join("ssr-shim.js"),
            server_files_manifest: standalone_dir
                .join("next")
                .join("required-server-files.json"),
            log_file: pwakit_dir.join(LOGS_DIR).join(LOG_FILE),
            diagnostics_file: pwakit_dir.join(LOGS_DIR).join(DIAGNOSTICS_FILE),
            app_next_dir,
            standalone_dir,
            pwakit_build_dir,
            pwakit_dir,
            root,
        }
    }

    /// `.pwakit/app`
    pub fn app_dir(&self) -> PathBuf {
        self.pwakit_dir.join("app")
    }

    /// The copied standalone server before the hidden `.next` is renamed
    pub fn staged_standalone_dir(&self) -> PathBuf {
        self.app_next_dir.join("standalone")
    }

    /// `.pwakit/app/next/static`
    pub fn staged_static_dir(&self) -> PathBuf {
        self.app_next_dir.join("static")
    }
}
