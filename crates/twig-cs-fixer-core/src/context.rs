//! Context types for rule execution.

use std::path::{Path, PathBuf};

/// Context provided to the tokenizer and to rules for one file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as given to the linter.
    pub path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Path relative to the project root, used by path-aware rules.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Creates a context for in-memory content, with the path used as is.
    #[must_use]
    pub fn from_source(path: &'a Path, content: &'a str) -> Self {
        Self {
            path,
            content,
            relative_path: path.to_path_buf(),
        }
    }

    /// Same file, different content. Used by the fixer between passes.
    #[must_use]
    pub fn with_content<'b>(&self, content: &'b str) -> FileContext<'b>
    where
        'a: 'b,
    {
        FileContext {
            path: self.path,
            content,
            relative_path: self.relative_path.clone(),
        }
    }

    /// Name under which tokens of this file are recorded.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_root() {
        let ctx = FileContext::new(
            Path::new("/project/templates/base.html.twig"),
            "",
            Path::new("/project"),
        );
        assert_eq!(ctx.relative_path, PathBuf::from("templates/base.html.twig"));

        let outside = FileContext::new(Path::new("/elsewhere/a.twig"), "", Path::new("/project"));
        assert_eq!(outside.relative_path, PathBuf::from("/elsewhere/a.twig"));
    }

    #[test]
    fn with_content_keeps_paths() {
        let ctx = FileContext::new(Path::new("/p/a.twig"), "old", Path::new("/p"));
        let next = ctx.with_content("new");
        assert_eq!(next.content, "new");
        assert_eq!(next.relative_path, PathBuf::from("a.twig"));
    }
}
