//! Fragment merging and prompt canonicalization.
//!
//! The accumulated prompt is kept well-formed as a comma-separated tag
//! list even when free natural-language text is appended: tags are
//! deduplicated case-insensitively, joined with `", "`, and a non-empty
//! prompt always carries a trailing comma.

use std::collections::HashSet;

/// Canonicalize a prompt: split on commas, trim fragments, drop empties,
/// deduplicate case-insensitively (first occurrence wins, original casing
/// kept), rejoin with `", "` and a trailing comma.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(prompt: &str) -> String {
    let mut seen = HashSet::new();
    let mut tags: Vec<&str> = Vec::new();
    for raw in prompt.split(',') {
        let tag = raw.trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            tags.push(tag);
        }
    }
    if tags.is_empty() {
        return String::new();
    }
    let mut joined = tags.join(", ");
    joined.push(',');
    joined
}

/// Join a fragment onto a prompt without normalizing. The separator is
/// `", "` unless the prompt already ends with a comma, in which case a
/// single space is enough.
pub fn join_fragment(prompt: &str, fragment: &str) -> String {
    let prompt = prompt.trim();
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return prompt.to_string();
    }
    if prompt.is_empty() {
        return fragment.to_string();
    }
    let separator = if prompt.ends_with(',') { " " } else { ", " };
    format!("{prompt}{separator}{fragment}")
}

/// Merge a new fragment into the accumulated prompt and normalize.
/// An empty or comma-only fragment leaves the prompt untouched.
pub fn append_fragment(prompt: &str, fragment: &str) -> String {
    if !has_content(fragment) {
        return prompt.to_string();
    }
    normalize(&join_fragment(prompt, fragment))
}

/// True when `text` contains anything besides commas and whitespace.
pub fn has_content(text: &str) -> bool {
    text.chars().any(|c| c != ',' && !c.is_whitespace())
}

/// Strip model formatting artifacts from AI-produced text: prefer the
/// inner content of a fenced code block, otherwise drop fenced blocks
/// entirely; remove stray backticks; collapse whitespace runs. Returns
/// an empty string when nothing usable remains.
pub fn clean_ai_response(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned = match extract_fenced_block(trimmed) {
        Some(inner) => inner,
        None => strip_fenced_blocks(trimmed),
    };
    let cleaned = cleaned.replace('`', "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if !has_content(&cleaned) {
        return String::new();
    }
    cleaned
}

/// Inner content of the first complete fenced block, with an optional
/// language tag on the opening fence skipped. `None` when there is no
/// complete fence or the block is empty.
fn extract_fenced_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let rest = rest.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let close = rest.find("```")?;
    let inner = rest[..close].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Remove every complete fenced block. An unterminated fence is left in
/// place; the stray backticks are stripped by the caller.
fn strip_fenced_blocks(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        match after.find("```") {
            Some(close) => {
                out.push_str(&rest[..start]);
                rest = &after[close + 3..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dedupes_case_insensitively() {
        assert_eq!(normalize("Cat, cat, DOG,"), "Cat, DOG,");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "",
            "blue hair",
            "blue hair,",
            "a, b,,c , A ,",
            "  spaced ,  tags , spaced ,",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" ,, , "), "");
    }

    #[test]
    fn test_append_on_empty_prompt() {
        assert_eq!(append_fragment("", "blue hair"), "blue hair,");
    }

    #[test]
    fn test_append_duplicate_does_not_grow() {
        assert_eq!(append_fragment("blue hair,", "blue hair"), "blue hair,");
    }

    #[test]
    fn test_append_empty_fragment_is_noop() {
        assert_eq!(append_fragment("blue hair,", ""), "blue hair,");
        assert_eq!(append_fragment("blue hair,", " ,, "), "blue hair,");
    }

    #[test]
    fn test_append_normal_growth() {
        assert_eq!(append_fragment("blue hair,", "green eyes"), "blue hair, green eyes,");
        assert_eq!(
            append_fragment("blue hair, green eyes,", "smiling, waving"),
            "blue hair, green eyes, smiling, waving,"
        );
    }

    #[test]
    fn test_join_fragment_separator_rules() {
        assert_eq!(join_fragment("blue hair", "bow"), "blue hair, bow");
        assert_eq!(join_fragment("blue hair,", "bow"), "blue hair, bow");
        assert_eq!(join_fragment("", "bow"), "bow");
    }

    #[test]
    fn test_clean_ai_response_extracts_fenced_block() {
        assert_eq!(clean_ai_response("```\nsmiling, waving\n```"), "smiling, waving");
        assert_eq!(clean_ai_response("```text\nsoft lighting\n```"), "soft lighting");
    }

    #[test]
    fn test_clean_ai_response_commas_only_is_empty() {
        assert_eq!(clean_ai_response(",,,"), "");
        assert_eq!(clean_ai_response("``` , , ```"), "");
        assert_eq!(clean_ai_response(""), "");
    }

    #[test]
    fn test_clean_ai_response_strips_stray_backticks() {
        assert_eq!(clean_ai_response("`cherry blossoms`"), "cherry blossoms");
    }

    #[test]
    fn test_clean_ai_response_collapses_whitespace() {
        assert_eq!(
            clean_ai_response("a girl\n  standing   in\tthe rain"),
            "a girl standing in the rain"
        );
    }

    #[test]
    fn test_clean_ai_response_drops_empty_fenced_blocks() {
        assert_eq!(clean_ai_response("keep this ``` ``` and this"), "keep this and this");
    }
}
