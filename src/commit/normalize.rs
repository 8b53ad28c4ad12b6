//! Reduce raw provider output to a single commit message line.
//!
//! Providers do not always follow instructions: they wrap the message in
//! quotes, add a body, or bury it in prose such as
//! `The commit message should be: "feat: add x"`. [`clean_commit_message`]
//! recovers the most plausible line and never fails; rejecting a bad result
//! is left to [`crate::commit::validate`].

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

/// Candidates at or above this many characters are not trusted as-is.
const MAX_CANDIDATE_CHARS: usize = 72;

const QUOTES: &[char] = &['"', '\''];

/// Extracts a message candidate from a line of prose.
type Matcher = fn(&str) -> Option<&str>;

/// Matchers in priority order. The first one yielding a usable candidate wins.
const MATCHERS: &[(&str, Matcher)] = &[
    ("commit message:", after_commit_message),
    ("should be:", after_should_be),
    ("message is:", after_message_is),
    ("message:", after_message),
    ("type(scope) prefix", leading_type_scope),
];

static COMMIT_MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"commit message:\s*"?([^"]+)"?"#).expect("valid regex"));
static SHOULD_BE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"should be:\s*"?([^"]+)"?"#).expect("valid regex"));
static MESSAGE_IS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"message is:\s*"?([^"]+)"?"#).expect("valid regex"));
static MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"message:\s*"?([^"]+)"?"#).expect("valid regex"));
static TYPE_SCOPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([a-z]+\([^)]+\):\s*[^.]+)").expect("valid regex"));

fn first_capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn after_commit_message(line: &str) -> Option<&str> {
    first_capture(&COMMIT_MESSAGE_RE, line)
}

fn after_should_be(line: &str) -> Option<&str> {
    first_capture(&SHOULD_BE_RE, line)
}

fn after_message_is(line: &str) -> Option<&str> {
    first_capture(&MESSAGE_IS_RE, line)
}

fn after_message(line: &str) -> Option<&str> {
    first_capture(&MESSAGE_RE, line)
}

fn leading_type_scope(line: &str) -> Option<&str> {
    first_capture(&TYPE_SCOPE_RE, line)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(QUOTES).trim()
}

/// Whether a line already reads like `type(scope): description`.
///
/// The type before any `(scope)` must be a single token: prose such as
/// `The commit message should be: ...` has a colon but is not a message.
/// Scopes may contain spaces (`feat(ui, api): ...`).
fn looks_well_formed(line: &str) -> bool {
    let Some((header, description)) = line.split_once(':') else {
        return false;
    };
    let header = header.trim();
    let commit_type = header.split_once('(').map_or(header, |(ty, _)| ty);
    !commit_type.is_empty()
        && !commit_type.contains(char::is_whitespace)
        && !description.trim().is_empty()
        && char_len(line) < MAX_CANDIDATE_CHARS
}

/// Clean a raw provider response into a single commit message line.
///
/// Returns an empty string for empty or whitespace-only input. Applying it to
/// its own output is a no-op.
pub fn clean_commit_message(raw: &str) -> String {
    let message = strip_quotes(raw);
    // A quoted subject followed by a body leaves a quote on the first line.
    let first_line = strip_quotes(message.lines().next().unwrap_or(""));

    if looks_well_formed(first_line) {
        return first_line.to_string();
    }

    for (name, matcher) in MATCHERS {
        let Some(capture) = matcher(first_line) else {
            continue;
        };
        let candidate = capture.trim();
        if candidate.contains(':') && char_len(candidate) < MAX_CANDIDATE_CHARS {
            debug!("Extracted commit message using '{}' matcher", name);
            return strip_quotes(candidate).to_string();
        }
    }

    if first_line.contains(':') && char_len(first_line) < MAX_CANDIDATE_CHARS {
        return first_line.to_string();
    }

    debug!("No commit message pattern matched, using first line as-is");
    first_line.to_string()
}
