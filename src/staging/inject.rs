//! Runtime config injection into the generated server entry

use crate::error::BuildError;
use crate::staging::{patch_file, path_exists, PatchOutcome};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Comment token in the entry shim that receives the config
pub const CONFIG_PLACEHOLDER: &str = "/* -- INSERT NEXT CONFIG HERE -- */";

/// Constant the entry shim expects the config to be assigned to
pub const CONFIG_CONSTANT: &str = "nextConfig";

/// What happened when injecting the config
///
/// Everything except `Injected` leaves the target untouched and is reported
/// as a warning; none of them fail the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    Injected,
    MissingArtifact(PathBuf),
    MissingConfigField(PathBuf),
    MissingPlaceholder(PathBuf),
    DuplicatePlaceholder { path: PathBuf, count: usize },
}

impl InjectionOutcome {
    /// Warning text for the degraded outcomes
    pub fn warning(&self) -> Option<String> {
        match self {
            InjectionOutcome::Injected => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for InjectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionOutcome::Injected => write!(f, "config injected"),
            InjectionOutcome::MissingArtifact(path) => write!(
                f,
                "{} not found. Cannot inject Next.js config.",
                path.display()
            ),
            InjectionOutcome::MissingConfigField(path) => {
                write!(f, "{} has no `config` field. Skipping injection.", path.display())
            }
            InjectionOutcome::MissingPlaceholder(path) => write!(
                f,
                "config placeholder not found in {}. Skipping injection.",
                path.display()
            ),
            InjectionOutcome::DuplicatePlaceholder { path, count } => write!(
                f,
                "config placeholder appears {} times in {}. Skipping injection.",
                count,
                path.display()
            ),
        }
    }
}

/// The `config` field of a server-files manifest, if present
pub fn extract_config(manifest: &str) -> Result<Option<Value>, serde_json::Error> {
    let mut data: Value = serde_json::from_str(manifest)?;
    Ok(data.get_mut("config").map(Value::take))
}

/// JavaScript statement that replaces the placeholder
pub fn render_assignment(config: &Value) -> String {
    // `Display` on `Value` is compact JSON
    format!("const {} = {};", CONFIG_CONSTANT, config)
}

/// Read `config` out of `manifest` and substitute it into `target`
///
/// The placeholder must appear exactly once in `target`; otherwise the file is
/// left as it is.
pub async fn inject_config(manifest: &Path, target: &Path) -> Result<InjectionOutcome, BuildError> {
    if !path_exists(manifest).await? {
        return Ok(InjectionOutcome::MissingArtifact(manifest.to_path_buf()));
    }

    let raw = fs::read_to_string(manifest)
        .await
        .map_err(|e| BuildError::staging("read", manifest, e))?;
    let config = match extract_config(&raw) {
        Ok(Some(config)) => config,
        Ok(None) => return Ok(InjectionOutcome::MissingConfigField(manifest.to_path_buf())),
        Err(source) => {
            return Err(BuildError::Artifact {
                path: manifest.to_path_buf(),
                source,
            })
        }
    };

    let content = fs::read_to_string(target)
        .await
        .map_err(|e| BuildError::staging("read", target, e))?;
    match content.matches(CONFIG_PLACEHOLDER).count() {
        0 => return Ok(InjectionOutcome::MissingPlaceholder(target.to_path_buf())),
        1 => {}
        count => {
            return Ok(InjectionOutcome::DuplicatePlaceholder {
                path: target.to_path_buf(),
                count,
            })
        }
    }

    match patch_file(target, CONFIG_PLACEHOLDER, &render_assignment(&config)).await? {
        PatchOutcome::Patched => Ok(InjectionOutcome::Injected),
        PatchOutcome::MarkerNotFound => Ok(InjectionOutcome::MissingPlaceholder(target.to_path_buf())),
    }
}
