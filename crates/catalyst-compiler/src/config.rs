//! Configuration types for the compiler

use std::collections::BTreeMap;

use catalyst_core::{CompileError, Manifest, ProjectConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::defaults;

/// Target settings for one compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Target runtime (only `python`)
    pub runtime: String,
    /// Production framework (only `fastapi`)
    pub framework: String,
    /// Default bind address, overridable by `HOST` at run time
    pub host: String,
    /// Default port, overridable by `PORT` at run time
    pub port: u16,
    pub python_version: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            runtime: defaults::RUNTIME.to_string(),
            framework: defaults::FRAMEWORK.to_string(),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            python_version: defaults::PYTHON_VERSION.to_string(),
        }
    }
}

impl From<&ProjectConfig> for CompilerConfig {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            runtime: config.runtime.clone(),
            framework: config.framework.clone(),
            host: config.host.clone(),
            port: config.port,
            python_version: config.python_version.clone(),
        }
    }
}

impl CompilerConfig {
    /// Override the default port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Fail unless a code generator exists for this runtime/framework pair
    pub fn ensure_supported(&self) -> Result<()> {
        let runtime = self.runtime.trim().to_lowercase();
        let framework = self.framework.trim().to_lowercase();
        if runtime == defaults::RUNTIME && framework == defaults::FRAMEWORK {
            Ok(())
        } else {
            Err(CompileError::UnsupportedTarget {
                runtime: self.runtime.clone(),
                framework: self.framework.clone(),
            })
        }
    }
}

/// Project-wide values a workflow is compiled against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    /// Secret name -> environment variable read at run time
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    /// Initial value of the `globals` root for every execution
    #[serde(default)]
    pub global_variables: Map<String, Value>,
}

impl ProjectContext {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            secrets: manifest.secrets.clone(),
            global_variables: manifest.global_variables.clone(),
        }
    }
}
