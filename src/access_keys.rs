//! Access-key markup in menu labels.
//!
//! A single `&` marks the character after it as the label's access key;
//! `&&` stands for a literal ampersand. `"Save &As..."` shows as
//! `Save As...` with the `A` underlined and answers to the `a` key.
//!
//! A marker only counts when it is not itself part of an escape and is
//! followed by a character that is neither `&` nor whitespace.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Label split around its access key, escapes already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyParts {
    pub before: String,
    pub key: Option<char>,
    pub after: String,
}

/// Double every `&` so the text renders literally.
pub fn escape(label: &str) -> String {
    label.replace('&', "&&")
}

/// Resolve `&&` escapes.
pub fn unescape(label: &str) -> String {
    label.replace("&&", "&")
}

/// Character index of the access-key marker, if any.
pub fn index_of(label: &str) -> Option<usize> {
    let chars: Vec<char> = label.chars().collect();
    (0..chars.len()).find(|&i| {
        let prev_ok = i == 0 || chars[i - 1] != '&';
        let next_ok = chars
            .get(i + 1)
            .is_some_and(|next| *next != '&' && !next.is_whitespace());
        chars[i] == '&' && prev_ok && next_ok
    })
}

pub fn has(label: &str) -> bool {
    index_of(label).is_some()
}

/// The access key, upper-cased.
pub fn get(label: &str) -> Option<char> {
    let index = index_of(label)?;
    label
        .chars()
        .nth(index + 1)
        .and_then(|c| c.to_uppercase().next())
}

/// Plain display text: marker dropped, escapes resolved.
pub fn to_text(label: &str) -> String {
    let parts = parts(label);
    let mut out = parts.before;
    if let Some(key) = parts.key {
        out.push(key);
    }
    out.push_str(&parts.after);
    out
}

/// Like [`to_text`], but a trailing parenthetical key such as `" (&F)"` is
/// removed entirely instead of leaving `"(F)"` behind.
pub fn remove(label: &str) -> String {
    if let Some((start, end)) = parenthetical_span(label) {
        let mut stripped = String::with_capacity(label.len());
        stripped.push_str(&label[..start]);
        stripped.push_str(&label[end..]);
        return unescape(&stripped);
    }
    to_text(label)
}

pub fn parts(label: &str) -> AccessKeyParts {
    match index_of(label) {
        Some(index) => {
            let chars: Vec<char> = label.chars().collect();
            let before: String = chars[..index].iter().collect();
            let after: String = chars[index + 2..].iter().collect();
            AccessKeyParts {
                before: unescape(&before),
                key: Some(chars[index + 1]),
                after: unescape(&after),
            }
        }
        None => AccessKeyParts {
            before: unescape(label),
            key: None,
            after: String::new(),
        },
    }
}

/// Render the label with the access key underlined on top of `style`.
pub fn to_line(label: &str, style: Style) -> Line<'static> {
    let parts = parts(label);
    let mut spans = vec![Span::styled(parts.before, style)];
    if let Some(key) = parts.key {
        spans.push(Span::styled(
            key.to_string(),
            style.add_modifier(Modifier::UNDERLINED),
        ));
        spans.push(Span::styled(parts.after, style));
    }
    Line::from(spans)
}

/// Byte span of an optional leading space followed by `(&X)`.
fn parenthetical_span(label: &str) -> Option<(usize, usize)> {
    let bytes: Vec<(usize, char)> = label.char_indices().collect();
    for (pos, &(start, c)) in bytes.iter().enumerate() {
        if c != '(' {
            continue;
        }
        let Some(&(_, amp)) = bytes.get(pos + 1) else {
            continue;
        };
        let Some(&(_, key)) = bytes.get(pos + 2) else {
            continue;
        };
        let Some(&(close_at, close)) = bytes.get(pos + 3) else {
            continue;
        };
        if amp != '&' || key == '&' || close != ')' {
            continue;
        }
        let begin = match pos.checked_sub(1).map(|p| bytes[p]) {
            Some((space_at, prev)) if prev.is_whitespace() => space_at,
            _ => start,
        };
        return Some((begin, close_at + close.len_utf8()));
    }
    None
}
