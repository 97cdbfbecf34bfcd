//! The fixed list of packaging stages

use std::fmt;

/// One unit of orchestrated work, run in the order of [`Stage::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Install the PWA Kit project's dependencies
    InstallDependencies,
    /// Run the framework build with its output going straight to the console
    BuildFramework,
    /// Copy the framework output into the PWA Kit app directory
    ProcessArtifacts,
    /// Copy public assets next to the standalone server
    CopyPublicAssets,
    /// Run the secondary packaging build
    BuildPackaging,
    /// Assemble the final standalone layout and swap in the entry shim
    PrepareStandalone,
    /// Inject the extracted runtime config into the entry shim
    FinalizeConfig,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::InstallDependencies,
        Stage::BuildFramework,
        Stage::ProcessArtifacts,
        Stage::CopyPublicAssets,
        Stage::BuildPackaging,
        Stage::PrepareStandalone,
        Stage::FinalizeConfig,
    ];

    /// Text shown on the step line
    pub fn description(&self) -> &'static str {
        match self {
            Stage::InstallDependencies => "Installing PWAKit dependencies",
            Stage::BuildFramework => "Building Next.js app",
            Stage::ProcessArtifacts => "Processing build artifacts",
            Stage::CopyPublicAssets => "Copying public assets",
            Stage::BuildPackaging => "Building PWA Kit",
            Stage::PrepareStandalone => "Preparing standalone build",
            Stage::FinalizeConfig => "Finalizing configuration",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
