//! Prompt construction for AI-generated commit messages.

use crate::rules::CommitRules;

/// Heading that separates the instructions from the analysis text.
pub const ANALYSIS_HEADING: &str = "Git diff to analyze:";

/// Sample outputs shown to the provider, one per commit type.
const EXAMPLE_OUTPUTS: &[&str] = &[
    "feat(core): add user authentication",
    "fix(api): resolve null pointer exception",
    "docs(readme): update installation guide",
    "style(ui): format button components",
    "refactor(db): simplify query logic",
    "test(auth): add unit tests for login",
    "chore(deps): update go modules",
];

/// Builds the single-shot instruction prompt sent to the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    rules: CommitRules,
}

impl PromptBuilder {
    pub fn new(rules: CommitRules) -> Self {
        Self { rules }
    }

    /// Build the prompt for the given change analysis.
    ///
    /// The analysis text is appended verbatim after [`ANALYSIS_HEADING`], so
    /// the returned prompt always ends with it, even when it is empty.
    pub fn build(&self, analysis: &str) -> String {
        let types_list = self.rules.types().join(", ");

        let type_meanings: String = self
            .rules
            .iter()
            .map(|rule| format!("- {rule}\n"))
            .collect();

        let examples = EXAMPLE_OUTPUTS.join("\n");

        format!(
            r#"You are a commit message generator. Your ONLY task is to output a single conventional commit message.

FORMAT: type(scope): description
RULES:
- Maximum 50 characters total
- Types: {types_list}
- Extract scope from file paths (api, ui, core, scripts, pkg, etc.)
- Use lowercase, present tense, imperative mood
- No periods, quotes, or extra text

TYPE MEANINGS:
{type_meanings}
EXAMPLE OUTPUTS:
{examples}

CRITICAL: Respond with ONLY the commit message. No explanations, no quotes, no "Here is the commit message:", no extra text whatsoever.

{ANALYSIS_HEADING}
{analysis}"#
        )
    }
}

/// Build the commit prompt using the conventional commit types.
pub fn build_prompt(analysis: &str) -> String {
    PromptBuilder::new(CommitRules::conventional()).build(analysis)
}
