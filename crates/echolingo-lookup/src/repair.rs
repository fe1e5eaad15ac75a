//! Response repair: completion endpoints routinely wrap JSON in a fenced
//! code block or surround it with prose despite instructions not to.

use crate::LookupError;

/// Strip a surrounding ``` fence, including an optional language tag
/// on the opening line.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse completion output as JSON; on failure, retry on the first
/// brace-delimited substring. Anything still unparseable is a
/// malformed response.
pub fn parse_lenient(text: &str) -> Result<serde_json::Value, LookupError> {
    let stripped = strip_code_fence(text);

    if let Ok(value) = serde_json::from_str(stripped) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str(&stripped[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(LookupError::MalformedResponse(preview(text)))
}

/// Bounded excerpt for error messages and logs
fn preview(text: &str) -> String {
    const MAX: usize = 120;
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut cut = MAX;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &trimmed[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let value = parse_lenient(r#"{"word":"x"}"#).unwrap();
        assert_eq!(value["word"], "x");
    }

    #[test]
    fn fenced_json_parses_identically_to_unfenced() {
        let fenced = "```json\n{\"word\":\"x\",\"pronunciation\":\"/ks/\"}\n```";
        let plain = "{\"word\":\"x\",\"pronunciation\":\"/ks/\"}";
        assert_eq!(parse_lenient(fenced).unwrap(), parse_lenient(plain).unwrap());
    }

    #[test]
    fn strips_fence_without_language_tag() {
        let fenced = "```\n{\"word\":\"x\"}\n```";
        assert_eq!(parse_lenient(fenced).unwrap()["word"], "x");
    }

    #[test]
    fn recovers_json_wrapped_in_prose() {
        let text = "Sure! Here is the result: {\"word\":\"x\"} Hope that helps.";
        assert_eq!(parse_lenient(text).unwrap()["word"], "x");
    }

    #[test]
    fn rejects_unrecoverable_text() {
        let err = parse_lenient("no json here at all").unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_broken_braces() {
        let err = parse_lenient("{\"word\": oops").unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }
}
