//! Compiler-wide constants
//!
//! Single source of truth for target defaults and the marker protocol shared
//! with the process that supervises a generated program.

/// Default target configuration
pub mod defaults {
    /// Only runtime with a code generator
    pub const RUNTIME: &str = "python";
    /// Only production framework with a code generator
    pub const FRAMEWORK: &str = "fastapi";
    /// Default bind address of the generated service
    pub const HOST: &str = "0.0.0.0";
    /// Default port of the generated service
    pub const PORT: u16 = 8000;
    /// Minimum Python version the generated program targets
    pub const PYTHON_VERSION: &str = "3.10";
    /// Slug used when a workflow name has no usable characters
    pub const WORKFLOW_SLUG: &str = "workflow";
}

/// Test-mode protocol between the generated program and its supervisor
pub mod protocol {
    /// Environment variable selecting the execution mode
    pub const EXECUTION_MODE_ENV: &str = "CATALYST_EXECUTION_MODE";
    /// Value of `EXECUTION_MODE_ENV` that selects test mode
    pub const TEST_MODE_VALUE: &str = "test";
    /// Printed on its own line before the result JSON
    pub const EXECUTION_START_MARKER: &str = "__CATALYST_EXECUTION_START__";
    /// Printed on its own line after the result JSON
    pub const EXECUTION_END_MARKER: &str = "__CATALYST_EXECUTION_END__";
}

/// Pip packages the program itself needs, beyond what nodes declare
pub mod packages {
    /// Production server
    pub const SERVER: &[&str] = &["fastapi", "uvicorn"];
}
