/*!
 * Markdown cleanup passes.
 *
 * A link-normalization pre-pass runs before chunking so the round-trip
 * invariant is stated against normalized text; the remaining passes run
 * once over the reassembled document. Model responses are additionally
 * stripped of any delimiter tags they echo back.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// A markdown image wrapped in a link: `[![alt](src)](href)`.
static NESTED_IMAGE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(!\[.*?\]\(.*?\))\]\(.*?\)").unwrap());

/// Lines consisting only of `#` characters and whitespace.
static HASH_ONLY_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#+\s*$").unwrap());

/// A markdown link whose target parentheses were replaced by fullwidth
/// ones, which some models produce when translating into CJK languages.
static FULLWIDTH_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]（([^）]+)）").unwrap());

/// A regular markdown link, for target rewriting.
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Three or more consecutive newlines.
static EXCESS_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Collapse an image nested inside a link down to the image alone.
///
/// Applied to the source document before token counting and chunking.
pub fn normalize_markdown_links(text: &str) -> String {
    NESTED_IMAGE_LINK_RE.replace_all(text, "$1").into_owned()
}

/// Remove lines that contain nothing but `#` markers.
pub fn remove_hash_only_lines(text: &str) -> String {
    HASH_ONLY_LINE_RE.replace_all(text, "").into_owned()
}

/// Rewrite `[text]（target）` back to `[text](target)`.
pub fn repair_fullwidth_link_parens(text: &str) -> String {
    FULLWIDTH_LINK_RE.replace_all(text, "[$1]($2)").into_owned()
}

/// Percent-encode spaces inside link targets.
pub fn encode_spaces_in_link_targets(text: &str) -> String {
    LINK_RE
        .replace_all(text, |caps: &regex::Captures| {
            format!("[{}]({})", &caps[1], caps[2].replace(' ', "%20"))
        })
        .into_owned()
}

/// Collapse runs of three or more newlines to exactly two.
pub fn collapse_excess_newlines(text: &str) -> String {
    EXCESS_NEWLINES_RE.replace_all(text, "\n\n").into_owned()
}

/// Strip delimiter tags that models sometimes echo into their output.
pub fn strip_translation_tags(text: &str) -> String {
    let mut cleaned = text.to_string();
    for tag in [
        "<TRANSLATION>",
        "</TRANSLATION>",
        "</TRANSLATE_THIS>",
        "<TRANSLATE_THIS>",
        "<TRANSLATE_this>",
        "</TRANSLATE_this>",
    ] {
        cleaned = cleaned.replace(tag, "");
    }
    cleaned.trim().to_string()
}

/// The post-assembly cleanup pipeline, applied once after the revised
/// chunks are concatenated.
pub fn cleanup(text: &str) -> String {
    let cleaned = remove_hash_only_lines(text);
    let cleaned = repair_fullwidth_link_parens(&cleaned);
    let cleaned = encode_spaces_in_link_targets(&cleaned);
    collapse_excess_newlines(&cleaned)
}
