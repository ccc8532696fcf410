//! Assistant reply to file write.
//!
//! An assistant reply is markdown. The first fenced code block is the payload;
//! an optional `path:` / `file:` / `filepath:` hint names a file to create.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_]+)?\n(.*?)```").expect("code block pattern is valid")
});

static PATH_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:path|file|filepath)\s*:\s*([^\n]+)").expect("path hint pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

/// First fenced block of `markdown`, body trimmed.
pub fn extract_first_code_block(markdown: &str) -> Option<CodeBlock> {
    let captures = CODE_BLOCK.captures(markdown)?;
    Some(CodeBlock {
        language: captures.get(1).map(|m| m.as_str().to_string()),
        code: captures.get(2).map_or("", |m| m.as_str()).trim().to_string(),
    })
}

pub fn extract_file_path(markdown: &str) -> Option<String> {
    let hint = PATH_HINT.captures(markdown)?.get(1)?.as_str().trim();
    (!hint.is_empty()).then(|| hint.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWrite {
    /// Create `path` (unless it exists) and make it the active tab
    CreateAndOpen { path: String, content: String },
    /// Replace the content of the active file
    UpdateActive { path: String, content: String },
}

impl FileWrite {
    pub fn path(&self) -> &str {
        match self {
            FileWrite::CreateAndOpen { path, .. } | FileWrite::UpdateActive { path, .. } => path,
        }
    }
}

/// Decide what an assistant reply does to the project. Replies without a
/// non-empty code block change nothing.
pub fn plan_file_write(markdown: &str, active_file: &str) -> Option<FileWrite> {
    let block = extract_first_code_block(markdown)?;
    if block.code.is_empty() {
        return None;
    }

    Some(match extract_file_path(markdown) {
        Some(path) => FileWrite::CreateAndOpen {
            path,
            content: block.code,
        },
        None => FileWrite::UpdateActive {
            path: active_file.to_string(),
            content: block.code,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "Here is a counter.\n\npath: ./contracts/Counter.sol\n\n```solidity\npragma solidity ^0.8.0;\ncontract Counter {}\n```\n\nAnd a test:\n```js\nit()\n```";

    #[test]
    fn test_extract_first_code_block() {
        let block = extract_first_code_block(REPLY).unwrap();
        assert_eq!(block.language.as_deref(), Some("solidity"));
        assert_eq!(block.code, "pragma solidity ^0.8.0;\ncontract Counter {}");
    }

    #[test]
    fn test_code_block_without_language() {
        let block = extract_first_code_block("```\n  x = 1  \n```").unwrap();
        assert_eq!(block.language, None);
        assert_eq!(block.code, "x = 1");
    }

    #[test]
    fn test_no_code_block() {
        assert!(extract_first_code_block("just prose").is_none());
        // fence must be followed by a newline
        assert!(extract_first_code_block("```inline```").is_none());
    }

    #[test]
    fn test_extract_file_path() {
        assert_eq!(extract_file_path(REPLY).as_deref(), Some("./contracts/Counter.sol"));
        assert_eq!(extract_file_path("FilePath:   Token.sol  \nrest").as_deref(), Some("Token.sol"));
        assert_eq!(extract_file_path("no hint here"), None);
    }

    #[test]
    fn test_plan_with_hint_creates() {
        let plan = plan_file_write(REPLY, "contract.sol").unwrap();
        assert_eq!(
            plan,
            FileWrite::CreateAndOpen {
                path: "./contracts/Counter.sol".to_string(),
                content: "pragma solidity ^0.8.0;\ncontract Counter {}".to_string(),
            }
        );
    }

    #[test]
    fn test_plan_without_hint_updates_active() {
        let plan = plan_file_write("```solidity\ncontract A {}\n```", "A.sol").unwrap();
        assert_eq!(plan.path(), "A.sol");
        assert!(matches!(plan, FileWrite::UpdateActive { .. }));
    }

    #[test]
    fn test_plan_ignores_empty_block() {
        assert_eq!(plan_file_write("```\n   \n```", "A.sol"), None);
        assert_eq!(plan_file_write("path: A.sol, no code", "A.sol"), None);
    }
}
