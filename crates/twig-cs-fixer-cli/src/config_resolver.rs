//! Locating the configuration file.
//!
//! `--config` always wins. Otherwise the working directory and then its
//! ancestors are searched, nearest first, up to the repository root (the
//! first directory holding `.git`). In each directory a local
//! `.twig-cs-fixer.toml` beats the committed `.twig-cs-fixer.dist.toml`.
//! Without a project file the user file applies:
//! `$TWIG_CS_FIXER_CONFIG_DIR/config.toml`, else `~/.twig-cs-fixer/config.toml`.
//!
//! A relative `linter.root` in a project file is read from the directory of
//! that file, so running from a subdirectory still lints the whole project.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use twig_cs_fixer_core::Config;

const PROJECT_FILES: [&str; 2] = [".twig-cs-fixer.toml", ".twig-cs-fixer.dist.toml"];

const CONFIG_DIR_ENV: &str = "TWIG_CS_FIXER_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the templates.
    Project(PathBuf),
    /// The per-user file.
    User(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Finds the configuration for a run started in `cwd`.
    #[must_use]
    pub fn discover(cwd: &Path, explicit: Option<&Path>) -> Self {
        Self::discover_with(cwd, explicit, user_config_file())
    }

    fn discover_with(cwd: &Path, explicit: Option<&Path>, user_file: Option<PathBuf>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }
        if let Some(path) = project_config_file(cwd) {
            return Self::Project(path);
        }
        match user_file {
            Some(path) if path.is_file() => Self::User(path),
            _ => Self::Default,
        }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let path = match self {
            Self::Default => return Ok(Config::default()),
            Self::Explicit(path) | Self::Project(path) | Self::User(path) => path,
        };
        tracing::debug!("Using config {}", path.display());

        let mut config = Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;

        if !matches!(self, Self::User(_)) {
            if let Some(dir) = path.parent() {
                config.linter.root = anchored(dir, &config.linter.root);
            }
        }
        Ok(config)
    }
}

fn project_config_file(cwd: &Path) -> Option<PathBuf> {
    for dir in cwd.ancestors() {
        let found = PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

fn user_config_file() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".twig-cs-fixer")))
        .map(|dir| dir.join("config.toml"))
}

fn anchored(dir: &Path, root: &Path) -> PathBuf {
    if root.is_absolute() {
        root.to_path_buf()
    } else if root == Path::new(".") {
        dir.to_path_buf()
    } else {
        dir.join(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn explicit_file_is_used_as_given() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join(".twig-cs-fixer.toml"), "");
        let explicit = tmp.path().join("ci.toml");

        let source = ConfigSource::discover_with(tmp.path(), Some(&explicit), None);
        assert_eq!(source, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn nearest_directory_wins_and_local_beats_dist() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path();
        let nested = project.join("templates/emails");
        touch(&project.join(".twig-cs-fixer.toml"), "");
        touch(&nested.join(".twig-cs-fixer.dist.toml"), "");

        assert_eq!(
            ConfigSource::discover_with(&nested, None, None),
            ConfigSource::Project(nested.join(".twig-cs-fixer.dist.toml"))
        );
        assert_eq!(
            ConfigSource::discover_with(&project.join("templates"), None, None),
            ConfigSource::Project(project.join(".twig-cs-fixer.toml"))
        );

        touch(&nested.join(".twig-cs-fixer.toml"), "");
        assert_eq!(
            ConfigSource::discover_with(&nested, None, None),
            ConfigSource::Project(nested.join(".twig-cs-fixer.toml"))
        );
    }

    #[test]
    fn search_stops_at_repository_root() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join(".twig-cs-fixer.toml"), "");
        let repo = tmp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(repo.join("templates")).unwrap();

        let user = tmp.path().join("user/config.toml");
        touch(&user, "");
        assert_eq!(
            ConfigSource::discover_with(&repo.join("templates"), None, Some(user.clone())),
            ConfigSource::User(user)
        );
        assert_eq!(
            ConfigSource::discover_with(&repo, None, None),
            ConfigSource::Default
        );
    }

    #[test]
    fn project_root_is_read_from_the_config_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join(".twig-cs-fixer.toml");

        touch(&file, "standard = \"Twig\"\n");
        let config = ConfigSource::Project(file.clone()).load().unwrap();
        assert_eq!(config.standard.as_deref(), Some("Twig"));
        assert_eq!(config.linter.root, tmp.path());

        touch(&file, "[linter]\nroot = \"templates\"\n");
        let config = ConfigSource::Project(file.clone()).load().unwrap();
        assert_eq!(config.linter.root, tmp.path().join("templates"));

        let config = ConfigSource::User(file).load().unwrap();
        assert_eq!(config.linter.root, PathBuf::from("templates"));
    }

    #[test]
    fn missing_file_is_an_error_and_default_is_empty() {
        let tmp = TempDir::new().unwrap();
        let err = ConfigSource::Explicit(tmp.path().join("missing.toml"))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
        assert!(ConfigSource::Default.load().unwrap().standard.is_none());
    }
}
