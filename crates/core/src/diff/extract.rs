/// Marker that opens every file section of a git-style unified diff.
pub const DIFF_MARKER: &str = "diff --git";

const FENCE: &str = "```";

/// Outcome of pulling a diff out of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Interior of a fenced code block.
    Fenced(String),
    /// Everything from the first [`DIFF_MARKER`] to the end of the response.
    Marker(String),
    /// No diff found; the trimmed response as-is.
    Verbatim(String),
}

impl Extraction {
    /// Whether a diff was actually located.
    pub fn is_diff(&self) -> bool {
        !matches!(self, Extraction::Verbatim(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Extraction::Fenced(text) | Extraction::Marker(text) | Extraction::Verbatim(text) => {
                text
            }
        }
    }
}

#[derive(Debug)]
struct FencedBlock<'a> {
    tag: &'a str,
    body: &'a str,
}

impl FencedBlock<'_> {
    fn is_diff_tagged(&self) -> bool {
        self.tag.eq_ignore_ascii_case("diff") || self.tag.eq_ignore_ascii_case("patch")
    }
}

/// Split out every fenced block of `text`.
///
/// An opening fence may appear anywhere; its tag is the rest of that line when
/// it is a single word. A closing fence must start a line. An unclosed block
/// runs to the end of the text.
fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after = &rest[open + FENCE.len()..];

        let (tag, body) = match after.split_once('\n') {
            Some((line, body)) if !line.trim().contains(char::is_whitespace) => (line.trim(), body),
            Some(_) => ("", after),
            None => (after.trim(), ""),
        };

        match find_closing_fence(body) {
            Some(close) => {
                blocks.push(FencedBlock {
                    tag,
                    body: &body[..close],
                });
                rest = &body[close + FENCE.len()..];
            }
            None => {
                blocks.push(FencedBlock { tag, body });
                break;
            }
        }
    }

    blocks
}

fn find_closing_fence(body: &str) -> Option<usize> {
    if body.starts_with(FENCE) {
        return Some(0);
    }
    body.find("\n```").map(|newline| newline + 1)
}

/// Pull a unified diff out of a model response.
///
/// Prefers a block fenced as `diff` (or `patch`), then any fenced block that
/// contains [`DIFF_MARKER`], then the text from the first marker onward. When
/// none of those exist the trimmed response is returned verbatim.
pub fn extract_diff(response: &str) -> Extraction {
    let text = response.trim();

    if text.contains(FENCE) {
        let blocks = fenced_blocks(text);

        if let Some(block) = blocks.iter().find(|b| b.is_diff_tagged()) {
            return Extraction::Fenced(block.body.trim().to_string());
        }

        if let Some(block) = blocks.iter().find(|b| b.body.contains(DIFF_MARKER)) {
            return Extraction::Fenced(block.body.trim().to_string());
        }
    }

    if let Some(start) = text.find(DIFF_MARKER) {
        return Extraction::Marker(text[start..].trim().to_string());
    }

    Extraction::Verbatim(text.to_string())
}
