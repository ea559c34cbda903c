//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// File written by `init`.
pub const CONFIG_FILE_NAME: &str = ".twig-cs-fixer.toml";

const DEFAULT_CONFIG: &str = r#"# twig-cs-fixer configuration

# Rule set to start from: "TwigCsFixer" (default) or "Twig"
standard = "TwigCsFixer"

# Lowest severity that makes the run fail: notice, warning, error or fatal
fail_on = "error"

# Cache of files already known to be clean, relative to the root
# cache_file = ".twig-cs-fixer.cache"

[linter]
# Root directory to lint, relative to this file (default: this directory)
# root = "./templates"

# Glob patterns to exclude, relative to the root
exclude = [
    "**/vendor/**",
    "**/node_modules/**",
]

# Respect .gitignore files
respect_gitignore = true

# Template file extensions
extensions = ["twig"]

# Worker threads (default: one per core)
# parallelism = 4

# Rule configurations

# [rules.Indent]
# spaces = 4

# [rules.VariableName]
# case = "snake_case"   # or "camelCase", "PascalCase"

# [rules.TrailingSpace]
# enabled = false

# [rules.OperatorSpacing]
# paths = ["emails/**"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = write_config(&cwd, force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: twig-cs-fixer lint");

    Ok(())
}

/// Writes the default configuration into `dir`.
fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}
