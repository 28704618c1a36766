//! File tools: read_file, list_directory

use super::{ToolArgs, Workspace, io_error};
use prismatic_domain::{ToolDefinition, ToolError, ToolOutput, ToolParameter};
use serde_json::Value;
use std::fs;

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const LIST_DIRECTORY: &str = "list_directory";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum directory entries to list
const MAX_ENTRIES: usize = 1000;

pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read the contents of a text file in the repository",
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to read", true).with_type("path"))
    .with_parameter(
        ToolParameter::new(
            "offset",
            "Line number to start reading from (0-indexed)",
            false,
        )
        .with_type("integer"),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of lines to read", false).with_type("integer"),
    )
}

pub fn list_directory_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_DIRECTORY,
        "List the files and subdirectories of a directory",
    )
    .with_parameter(
        ToolParameter::new("path", "Directory to list (default: repository root)", false)
            .with_type("path"),
    )
}

pub fn execute_read_file(workspace: &Workspace, arguments: &Value) -> ToolOutput {
    match read_file(workspace, ToolArgs(arguments)) {
        Ok(content) => ToolOutput::success(content),
        Err(e) => ToolOutput::failure(e),
    }
}

pub fn execute_list_directory(workspace: &Workspace, arguments: &Value) -> ToolOutput {
    match list_directory(workspace, ToolArgs(arguments)) {
        Ok(listing) => ToolOutput::success(listing),
        Err(e) => ToolOutput::failure(e),
    }
}

fn read_file(workspace: &Workspace, args: ToolArgs<'_>) -> Result<String, ToolError> {
    let raw = args.require_str("path")?;
    let path = workspace.resolve(raw)?;

    if !path.is_file() {
        return Err(ToolError::invalid_argument(format!("'{}' is not a file", raw)));
    }

    let metadata = fs::metadata(&path).map_err(|e| io_error(raw, e))?;
    if metadata.len() > MAX_READ_SIZE {
        return Err(ToolError::invalid_argument(format!(
            "File too large ({} bytes). Maximum size is {} bytes",
            metadata.len(),
            MAX_READ_SIZE
        )));
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            ToolError::invalid_argument(format!("'{}' is not a UTF-8 text file", raw))
        } else {
            io_error(raw, e)
        }
    })?;

    let offset = args.get_usize("offset").unwrap_or(0);
    let limit = args.get_usize("limit");
    if offset == 0 && limit.is_none() {
        return Ok(content);
    }

    let lines: Vec<&str> = content.lines().collect();
    if offset >= lines.len() {
        return Ok(String::new());
    }
    let end = match limit {
        Some(l) => offset.saturating_add(l).min(lines.len()),
        None => lines.len(),
    };
    Ok(lines[offset..end].join("\n"))
}

fn list_directory(workspace: &Workspace, args: ToolArgs<'_>) -> Result<String, ToolError> {
    let raw = args.get_str("path").unwrap_or(".");
    let path = workspace.resolve(raw)?;

    if !path.is_dir() {
        return Err(ToolError::invalid_argument(format!(
            "'{}' is not a directory",
            raw
        )));
    }

    let mut entries: Vec<(bool, String)> = fs::read_dir(&path)
        .map_err(|e| io_error(raw, e))?
        .filter_map(Result::ok)
        .map(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (is_dir, entry.file_name().to_string_lossy().into_owned())
        })
        .collect();

    if entries.is_empty() {
        return Ok(format!("{} is empty", workspace.display(&path)));
    }

    // Directories first, then by name
    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let total = entries.len();

    let mut lines: Vec<String> = entries
        .into_iter()
        .take(MAX_ENTRIES)
        .map(|(is_dir, name)| {
            if is_dir {
                format!("[DIR] {}", name)
            } else {
                format!("[FILE] {}", name)
            }
        })
        .collect();
    if total > MAX_ENTRIES {
        lines.push(format!("... ({} more entries)", total - MAX_ENTRIES));
    }
    Ok(lines.join("\n"))
}
