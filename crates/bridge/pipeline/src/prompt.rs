//! Prompt template for Anchor program generation.
//!
//! Pure and deterministic: the same [`CodeParams`] always yield the same
//! prompt and the same placeholder program id.

use sha2::{Digest, Sha256};

use bridge_types::CodeParams;

/// Hex characters kept from the name digest.
pub const PLACEHOLDER_LEN: usize = 32;

const ANCHOR_VERSION: &str = "0.28.0";

/// Builds generation prompts from request parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(params: &CodeParams) -> String {
        let purpose = params.contract_type();
        let program_id = Self::placeholder_for(params);
        let module_name = params.contract_name().to_lowercase();

        let mut prompt = format!("Generate a Solana smart contract in Rust for {purpose}.\n");
        prompt.push_str("Requirements:\n");
        prompt.push_str(&format!("- Use anchor framework v{ANCHOR_VERSION}\n"));
        prompt.push_str("- No unsafe code\n");
        prompt.push_str("- Add input validation for all functions\n");
        prompt.push_str(
            "- Include error handling with custom error codes for common validation cases\n",
        );
        prompt.push_str(&format!("- Implement logic for {purpose} or other tokens\n"));
        prompt.push_str("- Add unit tests for initialization, minting, and validation functions\n");
        prompt.push_str(
            "- Include all necessary Anchor attributes like `#[account]`, `#[program]`, and `#[derive(Accounts)]`\n",
        );
        prompt.push_str(&format!(
            "- Use the program id \"{program_id}\" verbatim in `declare_id!`; it is replaced at deployment\n"
        ));
        prompt.push_str(&format!("- Target the Solana {} cluster\n", params.network()));
        if let Some(author) = params.author() {
            prompt.push_str(&format!("- Credit the author \"{author}\" in a header comment\n"));
        }
        prompt.push_str("\nPlease return only the Rust code, without explanations or extra text.\n");
        prompt.push_str("\nExample structure:\n");
        prompt.push_str("use anchor_lang::prelude::*;\n");
        prompt.push_str("use std::str::FromStr;\n\n");
        prompt.push_str(&format!("declare_id!(\"{program_id}\");\n\n"));
        prompt.push_str("#[program]\n");
        prompt.push_str(&format!("pub mod {module_name} {{\n"));
        prompt.push_str("    // ... logic\n");
        prompt.push_str("}\n");
        prompt
    }

    /// First [`PLACEHOLDER_LEN`] hex characters of SHA-256(`name`).
    pub fn generate_program_id(name: &str) -> String {
        let digest = Sha256::digest(name.as_bytes());
        let mut id = hex::encode(digest);
        id.truncate(PLACEHOLDER_LEN);
        id
    }

    pub fn placeholder_for(params: &CodeParams) -> String {
        Self::generate_program_id(params.contract_name())
    }
}
