//! The deploy pipeline: verify, build, stage and publish a package.
//!
//! Steps run in a fixed order and each can be skipped. Every failure maps to
//! a distinct process exit code so CI can tell which step broke.
//!
//! Deploy options are themselves staged through a builder: the config layer
//! seeds defaults, CLI flags override them, and assembly checks that the
//! fields the enabled steps need are present.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use miette::Diagnostic as MietteDiagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::core::{Package, MANIFEST_NAME};
use crate::ops::version_check::{check_version_bump, VersionCheck, VersionCheckError};
use crate::staged::{AssembleResult, Buildable, Builder, MissingFieldError};
use crate::util::config::{self, DeployConfig};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{
    copy_dir_all, copy_into, normalize_path, remove_dir_all_if_exists, write_string,
};
use crate::util::json::read_json;
use crate::util::process::{find_executable, ProcessBuilder};

/// A deploy step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    CompareVersion,
    Lint,
    Test,
    Build,
    CopyArtifacts,
    PrepareAuth,
    Publish,
}

impl Step {
    /// All steps, in execution order.
    pub const ALL: [Step; 7] = [
        Step::CompareVersion,
        Step::Lint,
        Step::Test,
        Step::Build,
        Step::CopyArtifacts,
        Step::PrepareAuth,
        Step::Publish,
    ];

    /// 1-based position in the pipeline.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::CompareVersion => "compare-version",
            Step::Lint => "lint",
            Step::Test => "test",
            Step::Build => "build",
            Step::CopyArtifacts => "copy-artifacts",
            Step::PrepareAuth => "prepare-auth",
            Step::Publish => "publish",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::CompareVersion => "Compare the local version with the latest registry release",
            Step::Lint => "Ensure the linter reports no issues",
            Step::Test => "Ensure all tests pass",
            Step::Build => "Build the project",
            Step::CopyArtifacts => "Copy the build output and manifest into the publish directory",
            Step::PrepareAuth => "Set up registry credentials for publishing",
            Step::Publish => "Publish to the registry",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.parse::<usize>() {
            if let Some(step) = n.checked_sub(1).and_then(|i| Step::ALL.get(i)) {
                return Ok(*step);
            }
        }
        Step::ALL
            .into_iter()
            .find(|step| step.name() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown step `{}` (expected 1-7 or one of: {})",
                    s,
                    Step::ALL.map(Step::name).join(", ")
                )
            })
    }
}

/// Fully validated deploy options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Project root; relative paths below resolve against it.
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    /// `None` only when the copy step is skipped.
    pub build_dir: Option<PathBuf>,
    pub publish_dir: PathBuf,
    pub skipped_steps: BTreeSet<Step>,
    pub dry_run: bool,
    /// Latest registry version, `None` if unpublished.
    pub registry_version: Option<String>,
    /// `None` only when the auth step is skipped.
    pub access_token: Option<String>,
    pub registry_url: String,
    pub lint_command: String,
    pub test_command: String,
    pub build_command: String,
    pub publish_command: String,
}

crate::partial! {
    /// Partially-filled [`DeployOptions`].
    #[derive(Debug)]
    pub struct DeployOptionsPartial {
        pub root: PathBuf,
        pub manifest_path: PathBuf,
        pub build_dir: PathBuf,
        pub publish_dir: PathBuf,
        pub skipped_steps: BTreeSet<Step>,
        pub dry_run: bool,
        pub registry_version: String,
        pub access_token: String,
        pub registry_url: String,
        pub lint_command: String,
        pub test_command: String,
        pub build_command: String,
        pub publish_command: String,
    }
}

/// Builder for [`DeployOptions`].
pub type DeployOptionsBuilder = Builder<DeployOptions, DeployOptionsPartial>;

impl Buildable for DeployOptions {
    type Partial = DeployOptionsPartial;

    fn assemble_from(src: &DeployOptionsPartial) -> AssembleResult<Self> {
        let skipped_steps = crate::optional!(src, skipped_steps, BTreeSet::new())?;
        let runs = |step: Step| !skipped_steps.contains(&step);

        Ok(DeployOptions {
            root: crate::optional!(src, root, PathBuf::from("."))?,
            manifest_path: crate::optional!(src, manifest_path, PathBuf::from(MANIFEST_NAME))?,
            build_dir: crate::required_if!(src, build_dir, || runs(Step::CopyArtifacts))?,
            publish_dir: crate::optional!(
                src,
                publish_dir,
                PathBuf::from(config::DEFAULT_PUBLISH_DIR)
            )?,
            dry_run: crate::optional!(src, dry_run, false)?,
            registry_version: crate::optional!(src, registry_version)?,
            access_token: crate::required_if!(src, access_token, || runs(Step::PrepareAuth))?,
            registry_url: crate::optional!(
                src,
                registry_url,
                config::DEFAULT_REGISTRY_URL.to_string()
            )?,
            lint_command: crate::optional!(
                src,
                lint_command,
                config::DEFAULT_LINT_COMMAND.to_string()
            )?,
            test_command: crate::optional!(
                src,
                test_command,
                config::DEFAULT_TEST_COMMAND.to_string()
            )?,
            build_command: crate::optional!(
                src,
                build_command,
                config::DEFAULT_BUILD_COMMAND.to_string()
            )?,
            publish_command: crate::optional!(
                src,
                publish_command,
                config::DEFAULT_PUBLISH_COMMAND.to_string()
            )?,
            skipped_steps,
        })
    }
}

impl DeployOptions {
    /// Seed a builder from configuration. `build_dir` stays unset unless configured.
    pub fn builder_from_config(config: &DeployConfig) -> DeployOptionsBuilder {
        let mut partial = DeployOptionsPartial::default();
        if let Some(build_dir) = &config.build_dir {
            partial.set_build_dir(build_dir.as_path());
        }
        partial
            .set_publish_dir(config.publish_dir())
            .set_registry_url(config.registry_url())
            .set_lint_command(config.lint_command())
            .set_test_command(config.test_command())
            .set_build_command(config.build_command())
            .set_publish_command(config.publish_command());

        DeployOptions::builder_with(partial)
    }

    /// Whether `step` will be skipped, including publish under dry run.
    pub fn is_skipped(&self, step: Step) -> bool {
        self.skipped_steps.contains(&step) || (step == Step::Publish && self.dry_run)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    out_dir: Option<PathBuf>,
}

/// The compiler output directory declared in `<root>/tsconfig.json`, if any.
pub fn build_dir_from_tsconfig(root: &Path) -> Result<Option<PathBuf>> {
    let path = root.join("tsconfig.json");
    if !path.exists() {
        return Ok(None);
    }
    let tsconfig: TsConfig = read_json(&path)?;
    Ok(tsconfig.compiler_options.out_dir)
}

/// Deploy failures, each with its own exit code.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum DeployError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Options(#[from] MissingFieldError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    VersionCheck(#[from] VersionCheckError),

    #[error("step `{step}` failed: `{command}`")]
    #[diagnostic(code(drydock::deploy::command_failed))]
    CommandFailed {
        step: Step,
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to copy project to publish directory")]
    #[diagnostic(code(drydock::deploy::copy_project))]
    CopyProject {
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to copy package.json into publish directory")]
    #[diagnostic(code(drydock::deploy::copy_manifest))]
    CopyManifest {
        #[source]
        source: anyhow::Error,
    },

    #[error("registry access token is empty")]
    #[diagnostic(code(drydock::deploy::empty_token))]
    EmptyToken,

    #[error("failed to create .npmrc")]
    #[diagnostic(code(drydock::deploy::npmrc))]
    WriteNpmrc {
        #[source]
        source: anyhow::Error,
    },

    #[error("hook after step `{step}` failed")]
    #[diagnostic(code(drydock::deploy::hook))]
    Hook {
        step: Step,
        #[source]
        source: anyhow::Error,
    },
}

impl DeployError {
    /// Process exit code for this failure.
    ///
    /// A missing access token shares the empty-token code. Hook failures
    /// exit with 200 plus the step number.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Options(e) if e.field() == "access_token" => 106,
            DeployError::Options(_) => 1,
            DeployError::VersionCheck(VersionCheckError::NotGreater { .. }) => 101,
            DeployError::VersionCheck(VersionCheckError::InvalidVersion { .. }) => 100,
            DeployError::CommandFailed { step, .. } => match step {
                Step::Lint => 102,
                Step::Test => 103,
                Step::Build => 104,
                Step::Publish => 108,
                _ => 1,
            },
            DeployError::CopyManifest { .. } => 105,
            DeployError::EmptyToken => 106,
            DeployError::WriteNpmrc { .. } => 107,
            DeployError::CopyProject { .. } => 111,
            DeployError::Hook { step, .. } => 200 + step.number() as i32,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DeployError::Options(e) if e.field() == "access_token" => {
                e.to_diagnostic().with_suggestion(suggestions::NO_TOKEN)
            }
            DeployError::Options(e) => e.to_diagnostic(),
            DeployError::VersionCheck(e) => e.to_diagnostic(),
            DeployError::CommandFailed { source, .. } => Diagnostic::error(self.to_string())
                .with_context(format!("{:#}", source))
                .with_suggestion(suggestions::STEP_FAILED),
            DeployError::EmptyToken => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::NO_TOKEN)
            }
            DeployError::CopyProject { source }
            | DeployError::CopyManifest { source }
            | DeployError::WriteNpmrc { source }
            | DeployError::Hook { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(format!("{:#}", source))
            }
        }
    }
}

/// Runs the external commands of the pipeline.
pub trait CommandRunner {
    /// Run `command` to completion, returning its stdout; non-zero exit is an error.
    fn run(&mut self, command: &ProcessBuilder) -> Result<String>;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &ProcessBuilder) -> Result<String> {
        let program = command.get_program().to_string_lossy();
        if find_executable(&program).is_none() {
            anyhow::bail!("`{}` not found in PATH", program);
        }
        let output = command.exec_and_check()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extra work run after a deploy step succeeds.
pub trait StepHooks {
    /// Called after `step` ran. `work_dir` is where the following steps run,
    /// which is the publish directory once artifacts are copied.
    fn after_step(&mut self, step: Step, work_dir: &Path) -> Result<()>;
}

impl<F> StepHooks for F
where
    F: FnMut(Step, &Path) -> Result<()>,
{
    fn after_step(&mut self, step: Step, work_dir: &Path) -> Result<()> {
        self(step, work_dir)
    }
}

/// No extra work.
#[derive(Debug, Default)]
pub struct NoHooks;

impl StepHooks for NoHooks {
    fn after_step(&mut self, _step: Step, _work_dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Hooks that run a configured command line after a step.
#[derive(Debug, Default)]
pub struct CommandHooks<R> {
    commands: BTreeMap<Step, String>,
    runner: R,
}

impl<R: CommandRunner> CommandHooks<R> {
    pub fn new(runner: R) -> Self {
        CommandHooks {
            commands: BTreeMap::new(),
            runner,
        }
    }

    /// Hooks from the `[deploy.hooks]` table, keyed by step name or number.
    pub fn from_config(config: &DeployConfig, runner: R) -> Result<Self> {
        let mut hooks = CommandHooks::new(runner);
        for (key, command) in &config.hooks {
            let step = key
                .parse::<Step>()
                .with_context(|| format!("invalid hook key `{}`", key))?;
            hooks.commands.insert(step, command.clone());
        }
        Ok(hooks)
    }

    pub fn with_command(mut self, step: Step, command: impl Into<String>) -> Self {
        self.commands.insert(step, command.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> StepHooks for CommandHooks<R> {
    fn after_step(&mut self, step: Step, work_dir: &Path) -> Result<()> {
        let Some(line) = self.commands.get(&step) else {
            return Ok(());
        };
        tracing::info!("Running hook after step `{}`: {}", step, line);
        let command = ProcessBuilder::from_command_line(line)?.cwd(work_dir);
        self.runner.run(&command)?;
        Ok(())
    }
}

/// What a deploy run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub executed: Vec<Step>,
    pub skipped: Vec<Step>,
    pub version_check: Option<VersionCheck>,
    /// Set once the copy step has staged the publish directory.
    pub publish_dir: Option<PathBuf>,
}

/// `.npmrc` granting `token` access to `registry_url`.
///
/// A registry other than the default is also made the publish target.
pub fn npmrc_contents(registry_url: &str, token: &str) -> String {
    let registry = registry_url.trim_end_matches('/');
    let host = registry
        .trim_start_matches("https:")
        .trim_start_matches("http:");
    let auth = format!("{}/:_authToken={}\n", host, token);

    if registry == config::DEFAULT_REGISTRY_URL {
        auth
    } else {
        format!("registry={}/\n{}", registry, auth)
    }
}

/// Run the deploy pipeline for `package`.
pub fn deploy(
    package: &Package,
    options: &DeployOptions,
    runner: &mut dyn CommandRunner,
) -> Result<DeployReport, DeployError> {
    deploy_with_hooks(package, options, runner, &mut NoHooks)
}

/// Run the deploy pipeline, calling `hooks` after every step that runs.
pub fn deploy_with_hooks(
    package: &Package,
    options: &DeployOptions,
    runner: &mut dyn CommandRunner,
    hooks: &mut dyn StepHooks,
) -> Result<DeployReport, DeployError> {
    let mut report = DeployReport::default();
    // Commands after the copy step run inside the publish directory.
    let mut work_dir = options.root.clone();

    for step in Step::ALL {
        let skipped = options.is_skipped(step);
        tracing::info!(
            "-- STEP {:02}{} -- {}",
            step.number(),
            if skipped { " (SKIPPED)" } else { "" },
            step.description()
        );

        if skipped {
            report.skipped.push(step);
            continue;
        }

        match step {
            Step::CompareVersion => {
                let check = check_version_bump(package, options.registry_version.as_deref())?;
                report.version_check = Some(check);
            }
            Step::Lint => run_step(runner, step, &options.lint_command, &options.root)?,
            Step::Test => run_step(runner, step, &options.test_command, &options.root)?,
            Step::Build => run_step(runner, step, &options.build_command, &options.root)?,
            Step::CopyArtifacts => {
                let publish_dir = options.resolve(&options.publish_dir);
                copy_artifacts(options, &publish_dir)?;
                tracing::info!(
                    "Copied {} and entered publish directory `{}`",
                    MANIFEST_NAME,
                    publish_dir.display()
                );
                work_dir = publish_dir.clone();
                report.publish_dir = Some(publish_dir);
            }
            Step::PrepareAuth => {
                let token = options
                    .access_token
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(DeployError::EmptyToken)?;
                write_string(
                    &work_dir.join(".npmrc"),
                    &npmrc_contents(&options.registry_url, token),
                )
                .map_err(|source| DeployError::WriteNpmrc { source })?;
                tracing::info!("Created .npmrc with registry access token");
            }
            Step::Publish => {
                run_step(runner, step, &options.publish_command, &work_dir)?;
                tracing::info!("Published {}", package.specifier());
            }
        }

        hooks
            .after_step(step, &work_dir)
            .map_err(|source| DeployError::Hook { step, source })?;
        report.executed.push(step);
    }

    Ok(report)
}

fn run_step(
    runner: &mut dyn CommandRunner,
    step: Step,
    command_line: &str,
    cwd: &Path,
) -> Result<(), DeployError> {
    let failed = |source| DeployError::CommandFailed {
        step,
        command: command_line.to_string(),
        source,
    };

    let command = ProcessBuilder::from_command_line(command_line)
        .map_err(failed)?
        .cwd(cwd);
    let stdout = runner.run(&command).map_err(failed)?;
    if !stdout.trim().is_empty() {
        tracing::debug!("{}", stdout.trim_end());
    }
    tracing::info!("Step `{}` succeeded", step);
    Ok(())
}

fn copy_artifacts(options: &DeployOptions, publish_dir: &Path) -> Result<(), DeployError> {
    let copy_failed = |source| DeployError::CopyProject { source };
    let build_dir = options
        .build_dir
        .as_deref()
        .map(|dir| options.resolve(dir))
        .ok_or_else(|| copy_failed(anyhow::anyhow!("no build directory configured")))?;

    check_publish_dir(&options.root, &build_dir, publish_dir).map_err(copy_failed)?;

    // Stale files from an earlier run must not be published.
    remove_dir_all_if_exists(publish_dir)
        .and_then(|()| copy_dir_all(&build_dir.join("src"), publish_dir))
        .map_err(copy_failed)?;
    copy_into(&options.resolve(&options.manifest_path), publish_dir)
        .map_err(|source| DeployError::CopyManifest { source })?;
    Ok(())
}

/// The publish directory is wiped before copying, so it must not contain
/// the project root or overlap the build output.
fn check_publish_dir(root: &Path, build_dir: &Path, publish_dir: &Path) -> Result<()> {
    let root = normalize_path(root)?;
    let build_dir = normalize_path(build_dir)?;
    let publish_dir = normalize_path(publish_dir)?;

    if root.starts_with(&publish_dir) {
        bail!(
            "publish directory `{}` contains the project root",
            publish_dir.display()
        );
    }
    if publish_dir.starts_with(&build_dir) || build_dir.starts_with(&publish_dir) {
        bail!(
            "publish directory `{}` overlaps the build directory `{}`",
            publish_dir.display(),
            build_dir.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::staged::{Assemble, MissingFieldError};
    use crate::test_support::{mock_package_builder, RecordingRunner};
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("dist/src/lib")).unwrap();
        fs::write(tmp.path().join("dist/src/index.js"), "module.exports = {};").unwrap();
        fs::write(tmp.path().join("dist/src/lib/util.js"), "exports.x = 1;").unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{ "name": "mock-package", "version": "0.1.0" }"#,
        )
        .unwrap();
        tmp
    }

    fn options(root: &Path) -> DeployOptionsBuilder {
        let mut builder = DeployOptions::builder_from_config(&DeployConfig::default());
        builder
            .set_root(root)
            .set_build_dir("dist")
            .set_access_token("secret");
        builder
    }

    #[test]
    fn test_step_parsing() {
        assert_eq!("lint".parse::<Step>().unwrap(), Step::Lint);
        assert_eq!("7".parse::<Step>().unwrap(), Step::Publish);
        assert_eq!("copy-artifacts".parse::<Step>().unwrap(), Step::CopyArtifacts);
        assert!("0".parse::<Step>().is_err());
        assert!("deploy".parse::<Step>().is_err());
    }

    #[test]
    fn test_step_numbers_follow_order() {
        let numbers: Vec<_> = Step::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_options_defaults() {
        let opts = options(Path::new(".")).assemble().unwrap();

        assert_eq!(opts.publish_dir, PathBuf::from("_publish"));
        assert_eq!(opts.manifest_path, PathBuf::from("package.json"));
        assert_eq!(opts.lint_command, "npm run lint");
        assert!(opts.skipped_steps.is_empty());
        assert!(!opts.dry_run);
    }

    #[test]
    fn test_options_require_token_unless_auth_skipped() {
        let mut builder = options(Path::new("."));
        builder.clear_access_token();
        assert_eq!(
            builder.assemble().unwrap_err(),
            MissingFieldError::new("access_token")
        );

        builder.set_skipped_steps([Step::PrepareAuth]);
        assert!(builder.assemble().unwrap().access_token.is_none());
    }

    #[test]
    fn test_options_require_build_dir_unless_copy_skipped() {
        let mut builder = options(Path::new("."));
        builder.clear_build_dir();
        assert_eq!(builder.assemble().unwrap_err().field(), "build_dir");

        builder.set_skipped_steps([Step::CopyArtifacts]);
        assert!(builder.assemble().is_ok());
    }

    #[test]
    fn test_build_dir_from_tsconfig() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(build_dir_from_tsconfig(tmp.path()).unwrap(), None);

        fs::write(
            tmp.path().join("tsconfig.json"),
            "{\n  // compiled output\n  \"compilerOptions\": { \"outDir\": \"./dist\" }\n}",
        )
        .unwrap();
        assert_eq!(
            build_dir_from_tsconfig(tmp.path()).unwrap(),
            Some(PathBuf::from("./dist"))
        );
    }

    #[test]
    fn test_npmrc_contents() {
        assert_eq!(
            npmrc_contents("https://registry.npmjs.org/", "abc"),
            "//registry.npmjs.org/:_authToken=abc\n"
        );
        assert_eq!(
            npmrc_contents("https://npm.example.com/repo/", "abc"),
            "registry=https://npm.example.com/repo/\n//npm.example.com/repo/:_authToken=abc\n"
        );
    }

    #[test]
    fn test_custom_registry_is_written_to_npmrc() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_registry_url("https://npm.example.com");
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        deploy(&pkg, &opts, &mut RecordingRunner::new()).unwrap();

        let npmrc = fs::read_to_string(tmp.path().join("_publish/.npmrc")).unwrap();
        assert!(npmrc.starts_with("registry=https://npm.example.com/\n"));
        assert!(npmrc.contains("//npm.example.com/:_authToken=secret"));
    }

    #[test]
    fn test_missing_token_shares_empty_token_exit_code() {
        let mut builder = options(Path::new("."));
        builder.clear_access_token();

        let err = DeployError::from(builder.assemble().unwrap_err());
        assert_eq!(err.exit_code(), 106);
        assert!(err.to_diagnostic().format(false).contains("--skip prepare-auth"));

        builder.set_access_token("secret").clear_build_dir();
        let err = DeployError::from(builder.assemble().unwrap_err());
        assert_eq!(err.exit_code(), 1);
    }

    fn deploy_into(publish_dir: &str) -> (TempDir, Result<DeployReport, DeployError>) {
        let tmp = project();
        fs::write(tmp.path().join("README.md"), "# mock-package").unwrap();
        let mut builder = options(tmp.path());
        builder.set_publish_dir(publish_dir);
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let result = deploy(&pkg, &opts, &mut RecordingRunner::new());
        (tmp, result)
    }

    #[test]
    fn test_publish_dir_at_project_root_is_refused() {
        for publish_dir in [".", "dist/..", ".."] {
            let (tmp, result) = deploy_into(publish_dir);

            let err = result.unwrap_err();
            assert_eq!(err.exit_code(), 111, "publish dir `{}`", publish_dir);
            assert!(format!("{:#}", anyhow::Error::new(err)).contains("contains the project root"));
            assert!(tmp.path().join("README.md").exists());
            assert!(tmp.path().join("dist/src/index.js").exists());
        }
    }

    #[test]
    fn test_publish_dir_overlapping_build_dir_is_refused() {
        for publish_dir in ["dist", "dist/src", "dist/src/out"] {
            let (tmp, result) = deploy_into(publish_dir);

            let err = result.unwrap_err();
            assert_eq!(err.exit_code(), 111, "publish dir `{}`", publish_dir);
            assert!(err.to_diagnostic().format(false).contains("overlaps the build directory"));
            assert!(tmp.path().join("dist/src/index.js").exists());
        }
    }

    #[test]
    fn test_sibling_publish_dir_is_allowed() {
        let (tmp, result) = deploy_into("out/publish");

        result.unwrap();
        assert!(tmp.path().join("out/publish/index.js").exists());
        assert!(tmp.path().join("README.md").exists());
    }

    #[test]
    fn test_copy_without_build_dir_fails() {
        let tmp = project();
        let mut opts = options(tmp.path()).assemble().unwrap();
        opts.build_dir = None;
        let pkg = mock_package_builder().assemble().unwrap();

        let err = deploy(&pkg, &opts, &mut RecordingRunner::new()).unwrap_err();
        assert_eq!(err.exit_code(), 111);
        assert!(!tmp.path().join("_publish").exists());
    }

    #[test]
    fn test_hook_runs_after_copy_in_publish_dir() {
        let tmp = project();
        fs::create_dir_all(tmp.path().join("types")).unwrap();
        fs::write(tmp.path().join("types/index.d.ts"), "export {};").unwrap();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let mut seen = Vec::new();
        let mut hook = |step: Step, work_dir: &Path| -> Result<()> {
            seen.push(step);
            if step == Step::CopyArtifacts {
                copy_dir_all(&work_dir.join("../types"), &work_dir.join("types"))?;
            }
            Ok(())
        };
        deploy_with_hooks(&pkg, &opts, &mut RecordingRunner::new(), &mut hook).unwrap();

        assert_eq!(seen, Step::ALL.to_vec());
        assert!(tmp.path().join("_publish/types/index.d.ts").exists());
    }

    #[test]
    fn test_hooks_skip_skipped_steps() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_dry_run(true).set_skipped_steps([Step::Lint]);
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let mut seen = Vec::new();
        let mut hook = |step: Step, _: &Path| -> Result<()> {
            seen.push(step);
            Ok(())
        };
        deploy_with_hooks(&pkg, &opts, &mut RecordingRunner::new(), &mut hook).unwrap();

        assert!(!seen.contains(&Step::Lint));
        assert!(!seen.contains(&Step::Publish));
    }

    #[test]
    fn test_failing_hook_stops_pipeline() {
        let tmp = project();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new();

        let mut hook = |step: Step, _: &Path| -> Result<()> {
            if step == Step::CopyArtifacts {
                bail!("types directory missing");
            }
            Ok(())
        };
        let err = deploy_with_hooks(&pkg, &opts, &mut runner, &mut hook).unwrap_err();

        assert!(matches!(err, DeployError::Hook { step: Step::CopyArtifacts, .. }));
        assert_eq!(err.exit_code(), 205);
        assert!(err.to_diagnostic().format(false).contains("types directory missing"));
        assert!(!runner.commands().iter().any(|c| c == "npm publish"));
        assert!(!tmp.path().join("_publish/.npmrc").exists());
    }

    #[test]
    fn test_command_hooks_run_in_work_dir() {
        let tmp = project();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let mut config = DeployConfig::default();
        config
            .hooks
            .insert("copy-artifacts".to_string(), "cp -r ../types ./types".to_string());
        config.hooks.insert("3".to_string(), "npm run coverage".to_string());
        let mut hooks = CommandHooks::from_config(&config, RecordingRunner::new()).unwrap();

        deploy_with_hooks(&pkg, &opts, &mut RecordingRunner::new(), &mut hooks).unwrap();

        assert_eq!(
            hooks.runner().commands(),
            ["npm run coverage", "cp -r ../types ./types"]
        );
        assert_eq!(hooks.runner().last_cwd(), Some(tmp.path().join("_publish")));
    }

    #[test]
    fn test_command_hooks_reject_unknown_step() {
        let mut config = DeployConfig::default();
        config.hooks.insert("deploy".to_string(), "true".to_string());

        let err = CommandHooks::from_config(&config, RecordingRunner::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid hook key `deploy`"));
    }

    #[test]
    fn test_full_deploy() {
        let tmp = project();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new();

        let report = deploy(&pkg, &opts, &mut runner).unwrap();

        assert_eq!(report.executed, Step::ALL.to_vec());
        assert!(report.skipped.is_empty());
        assert_eq!(
            runner.commands(),
            ["npm run lint", "npm test", "npm run build", "npm publish"]
        );

        let publish_dir = tmp.path().join("_publish");
        assert_eq!(report.publish_dir.as_deref(), Some(publish_dir.as_path()));
        assert!(publish_dir.join("index.js").exists());
        assert!(publish_dir.join("lib/util.js").exists());
        assert!(publish_dir.join("package.json").exists());
        assert_eq!(
            fs::read_to_string(publish_dir.join(".npmrc")).unwrap(),
            "//registry.npmjs.org/:_authToken=secret\n"
        );
        assert_eq!(runner.last_cwd(), Some(publish_dir));
    }

    #[test]
    fn test_dry_run_skips_publish() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_dry_run(true);
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new();

        let report = deploy(&pkg, &opts, &mut runner).unwrap();

        assert_eq!(report.skipped, vec![Step::Publish]);
        assert!(!runner.commands().iter().any(|c| c == "npm publish"));
    }

    #[test]
    fn test_skipped_steps_are_not_run() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_skipped_steps([
            Step::Lint,
            Step::Test,
            Step::CopyArtifacts,
            Step::PrepareAuth,
        ]);
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new();

        let report = deploy(&pkg, &opts, &mut runner).unwrap();

        assert_eq!(
            report.executed,
            vec![Step::CompareVersion, Step::Build, Step::Publish]
        );
        assert_eq!(runner.commands(), ["npm run build", "npm publish"]);
        // Without the copy step, publishing happens from the project root.
        assert_eq!(runner.last_cwd(), Some(tmp.path().to_path_buf()));
        assert!(!tmp.path().join("_publish").exists());
    }

    #[test]
    fn test_version_not_bumped_fails_first() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_registry_version("0.1.0");
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new();

        let err = deploy(&pkg, &opts, &mut runner).unwrap_err();

        assert_eq!(err.exit_code(), 101);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_failing_test_command_stops_pipeline() {
        let tmp = project();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();
        let mut runner = RecordingRunner::new().fail_on("npm test");

        let err = deploy(&pkg, &opts, &mut runner).unwrap_err();

        assert!(matches!(err, DeployError::CommandFailed { step: Step::Test, .. }));
        assert_eq!(err.exit_code(), 103);
        assert_eq!(runner.commands(), ["npm run lint", "npm test"]);
    }

    #[test]
    fn test_missing_build_output_fails_copy() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_build_dir("missing");
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let err = deploy(&pkg, &opts, &mut RecordingRunner::new()).unwrap_err();
        assert_eq!(err.exit_code(), 111);
    }

    #[test]
    fn test_copy_clears_stale_publish_dir() {
        let tmp = project();
        fs::create_dir_all(tmp.path().join("_publish")).unwrap();
        fs::write(tmp.path().join("_publish/old.js"), "").unwrap();
        let opts = options(tmp.path()).assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        deploy(&pkg, &opts, &mut RecordingRunner::new()).unwrap();

        assert!(!tmp.path().join("_publish/old.js").exists());
        assert!(tmp.path().join("_publish/index.js").exists());
    }

    #[test]
    fn test_blank_token_fails_auth() {
        let tmp = project();
        let mut builder = options(tmp.path());
        builder.set_access_token("  ");
        let opts = builder.assemble().unwrap();
        let pkg = mock_package_builder().assemble().unwrap();

        let err = deploy(&pkg, &opts, &mut RecordingRunner::new()).unwrap_err();
        assert!(matches!(err, DeployError::EmptyToken));
        assert_eq!(err.exit_code(), 106);
        assert!(err.to_diagnostic().format(false).contains("--skip prepare-auth"));
    }
}
