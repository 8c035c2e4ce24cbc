//! `drydock deploy` command

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::cli::DeployArgs;
use drydock::ops::deploy::{
    build_dir_from_tsconfig, deploy_with_hooks, CommandHooks, DeployError, DeployOptions,
    ProcessRunner, Step,
};
use drydock::staged::Assemble;
use drydock::util::config::{global_config_path, load_config, project_config_path};
use drydock::util::diagnostic::emit;

pub fn execute(args: DeployArgs, color: bool) -> Result<()> {
    let root = std::env::current_dir().context("failed to get current directory")?;
    let manifest_path = root.join(&args.manifest);
    let package = super::load_package_or_exit(&manifest_path, color)?;

    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    let skipped_steps = args
        .skip
        .iter()
        .map(|s| s.parse::<Step>())
        .collect::<Result<BTreeSet<_>>>()
        .context("invalid --skip value")?;

    let mut builder = DeployOptions::builder_from_config(&config.deploy);
    builder
        .set_root(root.as_path())
        .set_manifest_path(args.manifest.as_path())
        .set_skipped_steps(skipped_steps)
        .set_dry_run(args.dry_run);

    if let Some(build_dir) = args.build_dir {
        builder.set_build_dir(build_dir);
    } else if builder.build_dir.is_none() {
        if let Some(build_dir) = build_dir_from_tsconfig(&root)? {
            tracing::debug!("Using build directory `{}` from tsconfig.json", build_dir.display());
            builder.set_build_dir(build_dir);
        }
    }
    if let Some(publish_dir) = args.publish_dir {
        builder.set_publish_dir(publish_dir);
    }
    if let Some(registry_version) = args.registry_version {
        builder.set_registry_version(registry_version);
    }
    // Unset and empty are told apart later: empty fails the auth step.
    if let Ok(token) = std::env::var(config.deploy.token_env()) {
        builder.set_access_token(token);
    }

    let options = match builder.assemble() {
        Ok(options) => options,
        Err(e) => {
            let field = e.field();
            let e = DeployError::from(e);
            let diagnostic = match field {
                "access_token" => e.to_diagnostic().with_context(format!(
                    "the token is read from ${}",
                    config.deploy.token_env()
                )),
                "build_dir" => e.to_diagnostic().with_context(
                    "pass --build-dir, set `deploy.build_dir` in .drydock/config.toml, \
                     or declare `compilerOptions.outDir` in tsconfig.json",
                ),
                _ => e.to_diagnostic(),
            };
            emit(&diagnostic, color);
            std::process::exit(e.exit_code());
        }
    };

    let mut hooks = CommandHooks::from_config(&config.deploy, ProcessRunner)?;
    let report = match deploy_with_hooks(&package, &options, &mut ProcessRunner, &mut hooks) {
        Ok(report) => report,
        Err(e) => {
            emit(&e.to_diagnostic(), color);
            std::process::exit(e.exit_code());
        }
    };

    if options.dry_run {
        println!("Dry run complete for {}", package.specifier());
    } else {
        println!("Deployed {}", package.specifier());
    }
    println!(
        "  {} step(s) run, {} skipped",
        report.executed.len(),
        report.skipped.len()
    );
    if let Some(publish_dir) = &report.publish_dir {
        println!("  staged in {}", publish_dir.display());
    }

    Ok(())
}
