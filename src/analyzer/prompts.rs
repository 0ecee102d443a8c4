use crate::analyzer::context::BLOCK_SEPARATOR;

pub struct PromptTemplate;

/// The fixed task instruction. It asks the model for the two anchored
/// formats the extractor understands: `{id, Priority}` and
/// `Patches: [id, content]`.
pub const DEFAULT_QUESTION: &str = "Explain the vulnerabilities and suggest mitigations, \
along with commands based on the OS. \
Also list the severity and priority of the vulnerabilities. \
The priority should have values {Critical, High, Medium, Low} placed inside {} brackets, \
along with their id {id, Priority} where id is id of vulnerability like 'vulners'. \
Also place the suggested mitigations inside [] brackets for each vulnerability, \
in the format Patches: [id, content] where id is id of vulnerability like 'vulners'.";

/// Rough token budget for the scan context inside one prompt.
pub const MAX_CONTEXT_TOKENS: usize = 24_000;

impl PromptTemplate {
    pub fn build_advisory_prompt(context: &str) -> String {
        format!(
            "Here are the scan results from an Nmap scan:\n\n{}\n\nQuestion: {}\nAnswer based on the above data.\n",
            context, DEFAULT_QUESTION
        )
    }

    pub fn build_system_prompt() -> String {
        r#"You are a network security analyst reviewing vulnerability scan results.
For every vulnerability id you are given:
- Assign exactly one priority and write it as {id, Priority}.
- Give the mitigation as Patches: [id, content] and do not use ']' inside content.
- Use the vulnerability id exactly as it appears in the scan results.
Prefer concrete package upgrades and configuration changes for the reported OS."#
            .to_string()
    }

    /// Join finding blocks into prompt context that fits in roughly
    /// `max_tokens` tokens (1 token ≈ 4 characters). Blocks are kept or
    /// dropped whole, in order; a marker line records how many were left out.
    pub fn fit_context(blocks: &[String], max_tokens: usize) -> String {
        let max_chars = max_tokens.saturating_mul(4);
        let mut kept: Vec<&str> = Vec::new();
        let mut used = 0usize;

        for block in blocks {
            let cost = block.len() + BLOCK_SEPARATOR.len();
            if used + cost > max_chars {
                break;
            }
            kept.push(block);
            used += cost;
        }

        let mut fitted = kept.join(BLOCK_SEPARATOR);
        let omitted = blocks.len() - kept.len();
        if omitted > 0 {
            if !fitted.is_empty() {
                fitted.push_str(BLOCK_SEPARATOR);
            }
            fitted.push_str(&format!(
                "[... {} further findings omitted to fit the model context ...]",
                omitted
            ));
        }
        fitted
    }
}
