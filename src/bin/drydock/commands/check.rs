//! `drydock check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use drydock::ops::check_version_bump;
use drydock::util::diagnostic::{emit, Diagnostic};

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let package = super::load_package_or_exit(&args.manifest, color)?;

    println!("{}", package.specifier());
    if let Some(details) = package.details() {
        println!("  license:    {}", details.license);
        println!("  homepage:   {}", details.homepage);
        println!("  repository: {}", details.repository_url);
        match &details.publish_author {
            Some(author) => println!("  author:     {}", author),
            None => emit(
                &Diagnostic::warning("package.json has no `author`")
                    .with_location(&args.manifest),
                color,
            ),
        }
    }

    if let Some(registry_version) = args.registry_version.as_deref() {
        if let Err(e) = check_version_bump(&package, Some(registry_version)) {
            emit(&e.to_diagnostic(), color);
            std::process::exit(1);
        }
        println!("  version:    ahead of registry ({})", registry_version);
    }

    Ok(())
}
