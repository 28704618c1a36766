//! Search tools: glob_search, grep_search

use super::{ToolArgs, Workspace};
use glob::{MatchOptions, Pattern};
use prismatic_domain::{ToolDefinition, ToolError, ToolOutput, ToolParameter};
use regex::RegexBuilder;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Tool name constants
pub const GLOB_SEARCH: &str = "glob_search";
pub const GREP_SEARCH: &str = "grep_search";

/// Maximum number of results to return
const MAX_RESULTS: usize = 1000;

/// Maximum file size for grep (5 MB)
const MAX_GREP_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Directories never descended into.
const SKIPPED_DIRS: [&str; 3] = [".git", "target", "node_modules"];

pub fn glob_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GLOB_SEARCH,
        "Search for files matching a glob pattern (e.g., '**/*.rs', 'src/*.toml')",
    )
    .with_parameter(
        ToolParameter::new("pattern", "Glob pattern, relative to base_dir", true)
            .with_type("string"),
    )
    .with_parameter(
        ToolParameter::new(
            "base_dir",
            "Directory to search from (default: repository root)",
            false,
        )
        .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new(
            "max_results",
            "Maximum number of results to return (default: 1000)",
            false,
        )
        .with_type("integer"),
    )
}

pub fn grep_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GREP_SEARCH,
        "Search file contents for a regular expression",
    )
    .with_parameter(
        ToolParameter::new("pattern", "Regex pattern to search for", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new(
            "path",
            "File or directory to search in (default: repository root)",
            false,
        )
        .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new(
            "file_pattern",
            "Glob pattern to filter files (e.g., '*.rs')",
            false,
        )
        .with_type("string"),
    )
    .with_parameter(
        ToolParameter::new(
            "context_lines",
            "Number of context lines before and after each match",
            false,
        )
        .with_type("integer"),
    )
    .with_parameter(
        ToolParameter::new("case_insensitive", "Perform case-insensitive search", false)
            .with_type("boolean"),
    )
}

pub fn execute_glob_search(workspace: &Workspace, arguments: &Value) -> ToolOutput {
    match glob_search(workspace, ToolArgs(arguments)) {
        Ok(output) => ToolOutput::success(output),
        Err(e) => ToolOutput::failure(e),
    }
}

pub fn execute_grep_search(workspace: &Workspace, arguments: &Value) -> ToolOutput {
    match grep_search(workspace, ToolArgs(arguments)) {
        Ok(output) => ToolOutput::success(output),
        Err(e) => ToolOutput::failure(e),
    }
}

fn glob_search(workspace: &Workspace, args: ToolArgs<'_>) -> Result<String, ToolError> {
    let raw_pattern = args.require_str("pattern")?;
    if Path::new(raw_pattern).is_absolute()
        || Path::new(raw_pattern)
            .components()
            .any(|c| c == Component::ParentDir)
    {
        return Err(ToolError::invalid_argument(
            "Pattern must be relative and must not contain '..'",
        ));
    }
    let pattern = Pattern::new(raw_pattern)
        .map_err(|e| ToolError::invalid_argument(format!("Invalid glob pattern: {}", e)))?;

    let base = workspace.resolve(args.get_str("base_dir").unwrap_or("."))?;
    let max_results = args
        .get_usize("max_results")
        .unwrap_or(MAX_RESULTS)
        .min(MAX_RESULTS);

    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    let mut results = Vec::new();
    let mut truncated = false;
    for path in walk_files(&base) {
        let Ok(relative) = path.strip_prefix(&base) else {
            continue;
        };
        if pattern.matches_path_with(relative, options) {
            if results.len() >= max_results {
                truncated = true;
                break;
            }
            results.push(workspace.display(&path));
        }
    }

    if results.is_empty() {
        return Ok("No files found matching the pattern".to_string());
    }
    let mut output = results.join("\n");
    if truncated {
        output.push_str(&format!("\n... (limited to {} results)", max_results));
    }
    Ok(output)
}

fn grep_search(workspace: &Workspace, args: ToolArgs<'_>) -> Result<String, ToolError> {
    let raw_pattern = args.require_str("pattern")?;
    let regex = RegexBuilder::new(raw_pattern)
        .case_insensitive(args.get_bool("case_insensitive").unwrap_or(false))
        .build()
        .map_err(|e| ToolError::invalid_argument(format!("Invalid regex pattern: {}", e)))?;

    let root = workspace.resolve(args.get_str("path").unwrap_or("."))?;
    let file_pattern = match args.get_str("file_pattern") {
        Some(p) => Some(
            Pattern::new(p)
                .map_err(|e| ToolError::invalid_argument(format!("Invalid file pattern: {}", e)))?,
        ),
        None => None,
    };
    let context_lines = args.get_usize("context_lines").unwrap_or(0);

    let files = if root.is_file() {
        vec![root.clone()]
    } else {
        walk_files(&root)
            .into_iter()
            .filter(|p| match (&file_pattern, p.file_name()) {
                (Some(pattern), Some(name)) => pattern.matches(&name.to_string_lossy()),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect()
    };

    let mut results = Vec::new();
    let mut total_matches = 0;

    'files: for file in files {
        if fs::metadata(&file).is_ok_and(|m| m.len() > MAX_GREP_FILE_SIZE) {
            continue;
        }
        // Binary and unreadable files are skipped
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();
        let shown = workspace.display(&file);

        for (index, line) in lines.iter().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            total_matches += 1;
            if results.len() >= MAX_RESULTS {
                break 'files;
            }

            if context_lines == 0 {
                results.push(format!("{}:{}: {}", shown, index + 1, line));
                continue;
            }

            let start = index.saturating_sub(context_lines);
            let end = (index + context_lines + 1).min(lines.len());
            let mut block = format!("{}:", shown);
            for (offset, context) in lines[start..end].iter().enumerate() {
                let number = start + offset + 1;
                let marker = if number == index + 1 { ">" } else { " " };
                block.push_str(&format!("\n{}{}: {}", marker, number, context));
            }
            results.push(block);
        }
    }

    if results.is_empty() {
        return Ok("No matches found".to_string());
    }
    let mut output = results.join("\n");
    if total_matches > MAX_RESULTS {
        output.push_str(&format!("\n... (limited to {} matches)", MAX_RESULTS));
    }
    Ok(output)
}

/// Regular files under `dir`, sorted, skipping VCS and build directories.
fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if !SKIPPED_DIRS.iter().any(|skipped| *skipped == name) {
                    pending.push(path);
                }
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/cache")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod cache;\nfn helper() {}\n").unwrap();
        fs::write(
            root.join("src/cache/mod.rs"),
            "// TODO: evict\npub struct Cache;\nimpl Cache {}\n",
        )
        .unwrap();
        fs::write(root.join("Cargo.toml"), "[package]\nname = \"demo\"\n").unwrap();
        fs::write(root.join(".git/config"), "pub struct Hidden;\n").unwrap();
        let workspace = Workspace::new(root);
        (dir, workspace)
    }

    #[test]
    fn test_glob_search_recursive() {
        let (_dir, workspace) = workspace();
        let output = execute_glob_search(&workspace, &json!({"pattern": "**/*.rs"}));

        assert!(!output.is_error);
        assert_eq!(output.content, "src/cache/mod.rs\nsrc/lib.rs");
    }

    #[test]
    fn test_glob_search_single_level() {
        let (_dir, workspace) = workspace();
        let output = execute_glob_search(
            &workspace,
            &json!({"pattern": "*.rs", "base_dir": "src"}),
        );

        assert_eq!(output.content, "src/lib.rs");
    }

    #[test]
    fn test_glob_search_limits_results() {
        let (_dir, workspace) = workspace();
        let output = execute_glob_search(
            &workspace,
            &json!({"pattern": "**/*", "max_results": 1}),
        );

        assert!(output.content.contains("limited to 1 results"));
    }

    #[test]
    fn test_glob_search_rejects_parent_pattern() {
        let (_dir, workspace) = workspace();
        let output = execute_glob_search(&workspace, &json!({"pattern": "../*"}));

        assert!(output.is_error);
    }

    #[test]
    fn test_grep_search_finds_matches() {
        let (_dir, workspace) = workspace();
        let output = execute_grep_search(&workspace, &json!({"pattern": "pub struct"}));

        assert_eq!(output.content, "src/cache/mod.rs:2: pub struct Cache;");
    }

    #[test]
    fn test_grep_search_with_context_and_filter() {
        let (_dir, workspace) = workspace();
        let output = execute_grep_search(
            &workspace,
            &json!({
                "pattern": "todo",
                "case_insensitive": true,
                "file_pattern": "mod.rs",
                "context_lines": 1
            }),
        );

        assert_eq!(
            output.content,
            "src/cache/mod.rs:\n>1: // TODO: evict\n 2: pub struct Cache;"
        );
    }

    #[test]
    fn test_grep_search_invalid_regex() {
        let (_dir, workspace) = workspace();
        let output = execute_grep_search(&workspace, &json!({"pattern": "("}));

        assert!(output.is_error);
        assert!(output.content.starts_with("[INVALID_ARGUMENT]"));
    }

    #[test]
    fn test_grep_search_no_matches() {
        let (_dir, workspace) = workspace();
        let output = execute_grep_search(&workspace, &json!({"pattern": "unsafe"}));

        assert_eq!(output.content, "No matches found");
    }
}
