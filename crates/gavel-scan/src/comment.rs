use std::sync::OnceLock;

use regex::Regex;

/// One `contract:<Name>` occurrence inside a comment. `config` is the raw
/// JSON object text, or empty when the annotation carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentMatch {
    pub contract: String,
    pub config: String,
}

fn contract_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"contract\s*:\s*(\w+)").unwrap())
}

/// Extracts every contract annotation from one comment's text. The
/// configuration payload starts at the first `{` after the name and extends
/// to its balanced closing brace within the same comment; string literals
/// and escapes inside the payload are respected.
pub fn scan_comment(text: &str) -> Vec<CommentMatch> {
    let mut matches = Vec::new();
    let mut at = 0;
    while let Some(m) = contract_re().captures_at(text, at) {
        let whole = m.get(0).unwrap();
        let name = m.get(1).unwrap().as_str().to_string();
        let rest = &text[whole.end()..];
        let trimmed = rest.trim_start();
        let mut next = whole.end();
        let mut config = String::new();
        if trimmed.starts_with('{') {
            let open = whole.end() + (rest.len() - trimmed.len());
            if let Some(len) = balanced_object(&text[open..]) {
                config = text[open..open + len].to_string();
                next = open + len;
            }
        }
        matches.push(CommentMatch {
            contract: name,
            config,
        });
        at = next;
    }
    matches
}

/// Length of the balanced `{...}` object at the start of `text`, or `None`
/// when the braces never close.
fn balanced_object(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
