//! Validated Anchor program source.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};

/// Every accepted program must open with the Anchor prelude import.
pub const REQUIRED_HEADER: &str = "use anchor_lang";

const FENCE: &str = "```";
const PREVIEW_LEN: usize = 48;

/// Program source text that passed the structural check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    pub fn new(value: impl Into<String>) -> ContractResult<Self> {
        let value = value.into();
        if !value.starts_with(REQUIRED_HEADER) {
            return Err(ContractError::InvalidCode(preview(&value)));
        }
        Ok(Self(value))
    }

    /// Clean raw model output and validate the result.
    ///
    /// Fence markers (with their language tag) and markdown headings are
    /// removed, blank lines dropped and the remainder trimmed.
    pub fn from_ai_response(raw: &str) -> ContractResult<Self> {
        Self::new(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// New code with `suffix` after the existing source. The header is untouched.
    pub fn append(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }

    /// Replace every literal occurrence of `from` and revalidate.
    pub fn replace(&self, from: &str, to: &str) -> ContractResult<Self> {
        Self::new(self.0.replace(from, to))
    }
}

impl TryFrom<String> for Code {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| match line.find(FENCE) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .filter(|line| !is_markdown_heading(line))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// `#[program]` and `#![...]` are attributes, not headings.
fn is_markdown_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return false;
    }
    match trimmed[hashes..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace(),
    }
}

fn preview(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
