use super::extract::extract_diff;

/// Token the reviewer answers with when the diff needs replacing.
pub const CORRECTED_TOKEN: &str = "CORRECTED";

/// Verdict of the review pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reflection {
    /// Keep the generated diff.
    Approved,
    /// Replace the generated diff with this one.
    Corrected(String),
}

impl Reflection {
    pub fn is_correct(&self) -> bool {
        matches!(self, Reflection::Approved)
    }

    /// Replacement diff, empty when approved.
    pub fn correction(&self) -> &str {
        match self {
            Reflection::Approved => "",
            Reflection::Corrected(diff) => diff,
        }
    }

    /// Final diff after applying the verdict to `original`.
    pub fn resolve(self, original: String) -> String {
        match self {
            Reflection::Approved => original,
            Reflection::Corrected(diff) => diff,
        }
    }
}

fn is_leading_decoration(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | '_' | '#' | '`')
}

fn is_token_suffix(c: char) -> bool {
    matches!(c, '*' | '_' | ':' | '.' | '!' | ' ' | '\t')
}

fn strip_token<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    let head = text.get(..token.len())?;
    head.eq_ignore_ascii_case(token)
        .then(|| &text[token.len()..])
}

/// Parse the reviewer's answer.
///
/// The answer is trimmed and leading markdown emphasis is skipped before a
/// case-insensitive comparison with [`CORRECTED_TOKEN`]. A correction is only
/// taken when a non-empty diff follows the token. `CORRECT`, a bare
/// `CORRECTED` and anything unrecognised all approve the original diff.
pub fn parse_reflection(response: &str) -> Reflection {
    let text = response.trim_start_matches(is_leading_decoration).trim_end();

    let Some(rest) = strip_token(text, CORRECTED_TOKEN) else {
        // CORRECT or unclear: keep the original.
        return Reflection::Approved;
    };

    let rest = rest.trim_start_matches(is_token_suffix).trim();
    if rest.is_empty() {
        return Reflection::Approved;
    }

    let diff = extract_diff(rest).into_text();
    if diff.is_empty() {
        Reflection::Approved
    } else {
        Reflection::Corrected(diff)
    }
}
