//! Provider name resolution.

use std::fmt;

use crate::error::ProviderError;

/// How a provider writes its answer to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The response text is the whole of stdout.
    PlainText,
    /// Claude CLI `--output-format json` envelope.
    ClaudeJson,
}

/// Invocation parameters for one provider CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub output: OutputFormat,
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const CLAUDE: ProviderSpec = ProviderSpec {
    name: "claude",
    program: "claude",
    args: &["-p", "--output-format", "json"],
    output: OutputFormat::ClaudeJson,
};

const GEMINI: ProviderSpec = ProviderSpec {
    name: "gemini",
    program: "gemini",
    args: &[],
    output: OutputFormat::PlainText,
};

const COPILOT: ProviderSpec = ProviderSpec {
    name: "copilot",
    program: "copilot",
    args: &[],
    output: OutputFormat::PlainText,
};

const STANDARD_PROVIDERS: &[ProviderSpec] = &[CLAUDE, GEMINI, COPILOT];

/// Lookup table from provider name to invocation parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRegistry {
    providers: &'static [ProviderSpec],
}

impl ProviderRegistry {
    pub const fn standard() -> Self {
        Self {
            providers: STANDARD_PROVIDERS,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name).collect()
    }

    /// Resolve a provider name.
    ///
    /// Exact names win. Any other name starting with `claude` (for example a
    /// `claudex` wrapper configured through `ANTHROPIC_*` variables) runs the
    /// Claude CLI.
    pub fn resolve(&self, name: &str) -> Result<ProviderSpec, ProviderError> {
        if let Some(spec) = self.providers.iter().find(|p| p.name == name) {
            return Ok(*spec);
        }

        if name.starts_with(CLAUDE.name)
            && let Some(spec) = self.providers.iter().find(|p| p.name == CLAUDE.name)
        {
            return Ok(*spec);
        }

        Err(ProviderError::Unsupported {
            name: name.to_string(),
            supported: self.names().into_iter().map(String::from).collect(),
        })
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
