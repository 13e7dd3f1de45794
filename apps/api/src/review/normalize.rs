//! Response normalizer. Turns raw model text into a [`ReviewResult`].
//!
//! Never fails. Tries, in order: the fence-stripped text, the span between
//! the first `{` and the last `}`, and finally the fallback object.

use serde_json::error::Category;
use tracing::{debug, warn};

use crate::models::review::ReviewResult;

/// Note appended to the fallback when the model output could not be used.
pub const NON_JSON_NOTE: &str = "LLM returned non-JSON; using fallback.";

const FENCE: &str = "```";

pub fn normalize(raw: &str) -> ReviewResult {
    if let Some(result) = parse_review("fenced", strip_code_fence(raw)) {
        return result;
    }

    if let Some(result) = embedded_object(raw).and_then(|span| parse_review("embedded", span)) {
        return result;
    }

    warn!(
        bytes = raw.len(),
        "Model output is not a valid review object; using fallback"
    );
    ReviewResult::fallback_with_note(NON_JSON_NOTE)
}

/// One parse attempt. Rejections are logged with whether the text was not
/// JSON at all or JSON of the wrong shape.
fn parse_review(tier: &str, text: &str) -> Option<ReviewResult> {
    match serde_json::from_str::<ReviewResult>(text) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!(tier, reason = rejection_reason(&e), "Review parse rejected: {e}");
            None
        }
    }
}

fn rejection_reason(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Data => "wrong shape",
        Category::Syntax | Category::Eof => "not JSON",
        Category::Io => "io",
    }
}

/// Strips a surrounding ```` ``` ```` fence and its optional language-tag line.
/// Text without a complete fence is returned trimmed and otherwise untouched.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    else {
        return text;
    };

    let inner = match inner.split_once('\n') {
        Some((tag, body)) if is_language_tag(tag) => body,
        _ => inner,
    };
    inner.trim()
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// The substring from the first `{` to the last `}`, if they are in order.
fn embedded_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
