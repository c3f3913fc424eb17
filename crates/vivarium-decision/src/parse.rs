//! JSON recovery parsing for model output.
//!
//! Models asked for structured output mostly return clean JSON, but not
//! always. [`extract_json`] attempts multiple recovery strategies before
//! giving up: direct parse, markdown code-fence extraction, and
//! trailing-comma stripping. Callers treat `None` as "no decision".

use tracing::debug;

/// Attempt to extract a JSON value from raw model output.
///
/// Strategies, in order:
/// 1. Direct `serde_json` parse of the trimmed text.
/// 2. Extract the body of a ```` ```json ```` (or plain ```` ``` ````)
///    code fence and parse that.
/// 3. Strip trailing commas before `}` / `]` and retry both.
pub fn extract_json(raw: &str) -> Option<serde_json::Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = extract_codeblock(trimmed)
        && let Ok(value) = serde_json::from_str(fenced)
    {
        return Some(value);
    }

    let stripped = strip_trailing_commas(trimmed);
    if let Ok(value) = serde_json::from_str(&stripped) {
        return Some(value);
    }
    if let Some(fenced) = extract_codeblock(trimmed) {
        let stripped = strip_trailing_commas(fenced);
        if let Ok(value) = serde_json::from_str(&stripped) {
            return Some(value);
        }
    }

    debug!(raw_len = raw.len(), "no JSON recoverable from response");
    None
}

/// The body of the first markdown code fence, if any.
fn extract_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = text.get(start + 3..)?;
    // Skip an optional language tag on the fence line.
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = after_fence.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Remove commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            // Look ahead past whitespace for a closer.
            let mut lookahead = chars.clone();
            let mut skipped = 0usize;
            while let Some(&next) = lookahead.peek() {
                if next.is_whitespace() {
                    lookahead.next();
                    skipped += 1;
                } else {
                    break;
                }
            }
            if matches!(lookahead.peek(), Some('}') | Some(']')) {
                // Drop the comma, keep the whitespace.
                for _ in 0..skipped {
                    if let Some(ws) = chars.next() {
                        out.push(ws);
                    }
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn direct_json_parses() {
        let v = extract_json("{\"winner\": \"Asha\"}").unwrap();
        assert_eq!(v["winner"], "Asha");
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "Here is my decision:\n```json\n{\"winner\": \"Bram\"}\n```\nDone.";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["winner"], "Bram");
    }

    #[test]
    fn plain_fence_parses() {
        let raw = "```\n{\"score\": 3}\n```";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["score"], 3);
    }

    #[test]
    fn trailing_commas_are_stripped() {
        let raw = "{\"a\": 1, \"b\": [1, 2,], }";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["b"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn garbage_yields_none() {
        assert!(extract_json("the dog barked thrice").is_none());
        assert!(extract_json("").is_none());
    }
}
