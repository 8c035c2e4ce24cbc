//! High-level operations.
//!
//! This module contains the implementation of drydock commands.

pub mod check;
pub mod deploy;
pub mod version_check;

pub use check::load_package;
pub use deploy::{
    deploy, deploy_with_hooks, CommandHooks, CommandRunner, DeployError, DeployOptions,
    DeployOptionsBuilder, DeployReport, NoHooks, ProcessRunner, Step, StepHooks,
};
pub use version_check::{check_version_bump, VersionCheck, VersionCheckError};
