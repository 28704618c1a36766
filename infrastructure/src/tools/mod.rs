//! Read-only local tools for review agents
//!
//! | Tool | Module |
//! |------|--------|
//! | `read_file`, `list_directory` | [`file`] |
//! | `glob_search`, `grep_search` | [`search`] |
//!
//! Every tool resolves its paths through a [`Workspace`], which keeps them
//! inside the configured root directory.

pub mod file;
pub mod search;

mod executor;

pub use executor::LocalToolExecutor;

use prismatic_domain::{ToolDefinition, ToolError};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

/// Definitions of every built-in tool, in catalog order.
pub fn read_only_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        file::read_file_definition(),
        file::list_directory_definition(),
        search::glob_search_definition(),
        search::grep_search_definition(),
    ]
}

/// Root directory that tool paths are resolved against.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `raw` (relative to the root, or absolute) to an existing path
    /// inside the root.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let candidate = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            self.root.join(raw)
        };

        let canonical = candidate.canonicalize().map_err(|e| io_error(raw, e))?;
        if !canonical.starts_with(&self.root) {
            return Err(ToolError::permission_denied(format!(
                "{} is outside {}",
                raw,
                self.root.display()
            )));
        }
        Ok(canonical)
    }

    /// Path as shown to the model: relative to the root when possible.
    pub fn display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}

/// Map an I/O failure on `resource` to a tool error code.
pub(crate) fn io_error(resource: &str, error: io::Error) -> ToolError {
    match error.kind() {
        io::ErrorKind::NotFound => ToolError::not_found(resource),
        io::ErrorKind::PermissionDenied => ToolError::permission_denied(resource),
        _ => ToolError::execution_failed(format!("{}: {}", resource, error)),
    }
}

/// Typed access to a tool's JSON arguments.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a>(pub &'a Value);

impl<'a> ToolArgs<'a> {
    pub fn require_str(&self, name: &str) -> Result<&'a str, ToolError> {
        self.get_str(name).ok_or_else(|| {
            ToolError::invalid_argument(format!("Missing required string argument '{}'", name))
        })
    }

    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Non-negative integer, also accepted as a numeric string.
    pub fn get_usize(&self, name: &str) -> Option<usize> {
        match self.0.get(name)? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        let workspace = Workspace::new(dir.path());

        let resolved = workspace.resolve("src/lib.rs").unwrap();
        assert_eq!(workspace.display(&resolved), "src/lib.rs");
        assert_eq!(workspace.display(&workspace.resolve(".").unwrap()), ".");

        let escape = workspace.resolve("..").unwrap_err();
        assert_eq!(escape.code, "PERMISSION_DENIED");

        let missing = workspace.resolve("nope.rs").unwrap_err();
        assert_eq!(missing.code, "NOT_FOUND");
    }

    #[test]
    fn test_args_accept_numeric_strings() {
        let value = json!({"limit": "5", "offset": 2, "flag": "true", "path": "a"});
        let args = ToolArgs(&value);

        assert_eq!(args.get_usize("limit"), Some(5));
        assert_eq!(args.get_usize("offset"), Some(2));
        assert_eq!(args.get_bool("flag"), Some(true));
        assert_eq!(args.require_str("path").unwrap(), "a");
        assert_eq!(
            args.require_str("pattern").unwrap_err().code,
            "INVALID_ARGUMENT"
        );
    }

    #[test]
    fn test_catalog_has_unique_names() {
        let names: Vec<String> = read_only_tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["read_file", "list_directory", "glob_search", "grep_search"]
        );
    }
}
