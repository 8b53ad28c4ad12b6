//! The fixed table of commit types accepted by the prompt and the validator.

use std::fmt;

/// One recognized conventional commit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTypeRule {
    pub commit_type: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

impl fmt::Display for CommitTypeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.commit_type, self.description)
    }
}

/// The standard commit types, in prompt order.
pub const CONVENTIONAL_TYPES: &[CommitTypeRule] = &[
    CommitTypeRule {
        commit_type: "feat",
        description: "A new feature",
        examples: &[
            "feat(core): add user authentication service",
            "feat(ui): implement dark mode toggle",
        ],
    },
    CommitTypeRule {
        commit_type: "fix",
        description: "A bug fix",
        examples: &[
            "fix(api): resolve null pointer in validation",
            "fix(ui): correct button alignment",
        ],
    },
    CommitTypeRule {
        commit_type: "docs",
        description: "Documentation only changes",
        examples: &[
            "docs(readme): update installation instructions",
            "docs(api): add endpoint documentation",
        ],
    },
    CommitTypeRule {
        commit_type: "style",
        description: "Changes that do not affect the meaning of the code (white-space, formatting, missing semi-colons, etc)",
        examples: &[
            "style(utils): format code with prettier",
            "style(ui): fix indentation",
        ],
    },
    CommitTypeRule {
        commit_type: "refactor",
        description: "A code change that neither fixes a bug nor adds a feature",
        examples: &[
            "refactor(utils): extract validation logic",
            "refactor(api): simplify request handling",
        ],
    },
    CommitTypeRule {
        commit_type: "test",
        description: "Adding missing tests or correcting existing tests",
        examples: &[
            "test(core): add unit tests for user service",
            "test(api): fix integration tests",
        ],
    },
    CommitTypeRule {
        commit_type: "chore",
        description: "Other changes that don't modify src or test files",
        examples: &[
            "chore(deps): update dependencies",
            "chore(build): update build configuration",
        ],
    },
];

/// Immutable lookup table of commit type rules.
///
/// Cheap to copy; the prompt builder and validator each hold one.
#[derive(Debug, Clone, Copy)]
pub struct CommitRules {
    rules: &'static [CommitTypeRule],
}

impl CommitRules {
    pub const fn new(rules: &'static [CommitTypeRule]) -> Self {
        Self { rules }
    }

    /// The standard conventional commit table.
    pub const fn conventional() -> Self {
        Self::new(CONVENTIONAL_TYPES)
    }

    pub fn get(&self, commit_type: &str) -> Option<&'static CommitTypeRule> {
        self.rules.iter().find(|r| r.commit_type == commit_type)
    }

    pub fn contains(&self, commit_type: &str) -> bool {
        self.get(commit_type).is_some()
    }

    /// Registered type identifiers, in table order.
    pub fn types(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.commit_type).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static CommitTypeRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for CommitRules {
    fn default() -> Self {
        Self::conventional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_types_in_order() {
        let rules = CommitRules::conventional();
        assert_eq!(
            rules.types(),
            vec!["feat", "fix", "docs", "style", "refactor", "test", "chore"]
        );
    }

    #[test]
    fn test_type_identifiers_are_lowercase_ascii() {
        for rule in CommitRules::conventional().iter() {
            assert!(!rule.commit_type.is_empty());
            assert!(
                rule.commit_type.chars().all(|c| c.is_ascii_lowercase()),
                "bad type identifier: {}",
                rule.commit_type
            );
        }
    }

    #[test]
    fn test_type_identifiers_are_unique() {
        let mut types = CommitRules::conventional().types();
        let before = types.len();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), before);
    }

    #[test]
    fn test_examples_use_their_own_type() {
        for rule in CommitRules::conventional().iter() {
            assert!(!rule.examples.is_empty());
            for example in rule.examples {
                assert!(
                    example.starts_with(&format!("{}(", rule.commit_type)),
                    "example '{}' does not start with '{}'",
                    example,
                    rule.commit_type
                );
            }
        }
    }

    #[test]
    fn test_lookup() {
        let rules = CommitRules::default();
        assert!(rules.contains("feat"));
        assert!(!rules.contains("perf"));
        assert!(!rules.contains("Feat"));
        assert_eq!(rules.get("fix").unwrap().description, "A bug fix");
        assert_eq!(rules.len(), 7);
    }

    #[test]
    fn test_display() {
        let rule = CommitRules::conventional().get("docs").unwrap();
        assert_eq!(rule.to_string(), "docs: Documentation only changes");
    }
}
