//! Test utilities and mocks for drydock unit tests.
//!
//! Provides mock package builders and a command runner that records what
//! the deploy pipeline would have executed instead of spawning processes.

pub mod fixtures;

use std::path::PathBuf;

use anyhow::{bail, Result};

pub use fixtures::*;

use crate::ops::deploy::CommandRunner;
use crate::util::process::ProcessBuilder;

/// Command runner that records commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    commands: Vec<String>,
    cwds: Vec<Option<PathBuf>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given command line fail (after recording it).
    pub fn fail_on(mut self, command: impl Into<String>) -> Self {
        self.fail_on = Some(command.into());
        self
    }

    /// Command lines run so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Working directory of the last command.
    pub fn last_cwd(&self) -> Option<PathBuf> {
        self.cwds.last().cloned().flatten()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &ProcessBuilder) -> Result<String> {
        let line = command.display_command();
        self.commands.push(line.clone());
        self.cwds.push(command.get_cwd().map(PathBuf::from));

        if self.fail_on.as_deref() == Some(line.as_str()) {
            bail!("`{}` failed with exit code Some(1)", line);
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PackageManifest;
    use crate::staged::Assemble;

    #[test]
    fn test_mock_builder_and_manifest_agree() {
        let from_builder = mock_package_builder().assemble().unwrap();
        let from_manifest = PackageManifest::parse(mock_manifest_json())
            .unwrap()
            .to_builder()
            .assemble()
            .unwrap();

        assert_eq!(from_builder.specifier(), from_manifest.specifier());
        assert_eq!(
            from_builder.details().unwrap().license,
            from_manifest.details().unwrap().license
        );
    }

    #[test]
    fn test_recording_runner_fails_on_request() {
        let mut runner = RecordingRunner::new().fail_on("npm test");

        assert!(runner.run(&ProcessBuilder::new("npm").arg("test")).is_err());
        assert_eq!(runner.commands(), ["npm test"]);
    }
}
