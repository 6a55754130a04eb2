//! Style-aware decode/encode of literal text
//!
//! Decoding removes one escaping level per character: a single-escaped `\n`
//! becomes a real newline, a double-escaped `\\n` becomes the two visible
//! characters `\n`. Encoding is the inverse and restores each character's
//! own convention from the literal's [`StyleMap`].

use std::borrow::Cow;

use super::style::{EscapeStyle, Special, StyleMap};

/// Decode literal text into real text
///
/// Without a style map every `\x` of the seven supported markers is
/// treated as single-escaped. Text without a backslash is returned as-is.
pub fn decode<'a>(literal: &'a str, styles: Option<&StyleMap>) -> Cow<'a, str> {
    if !literal.contains('\\') {
        return Cow::Borrowed(literal);
    }

    match styles {
        Some(styles) => Cow::Owned(decode_styled(literal, styles)),
        None => decode_global(literal),
    }
}

/// Decode with the global single-escaped rule, ignoring per-character styles
///
/// Unknown escapes such as `\u00e9` are kept verbatim.
pub fn decode_global(literal: &str) -> Cow<'_, str> {
    if !literal.contains('\\') {
        return Cow::Borrowed(literal);
    }

    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied().and_then(Special::from_marker) {
            Some(special) => {
                chars.next();
                out.push(special.real());
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Single left-to-right pass over the literal
///
/// At a given position the longest applicable form wins: a double-escaped
/// marker (`\\n`) before a double-escaped backslash (`\\\\`) before any
/// single-escaped form. Because matches are consumed in one pass, a
/// substitution can never create a false match for a later character.
fn decode_styled(literal: &str, styles: &StyleMap) -> String {
    let chars: Vec<char> = literal.chars().collect();
    let mut out = String::with_capacity(literal.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        match escape_at(&chars[i..], styles) {
            Some((special, EscapeStyle::Double, consumed)) => {
                out.push_str(special.escaped(EscapeStyle::Single).unwrap_or_default());
                i += consumed;
            }
            Some((special, _, consumed)) => {
                out.push(special.real());
                i += consumed;
            }
            None => {
                out.push('\\');
                i += 1;
            }
        }
    }

    out
}

/// Recognize an escape starting at `rest[0]` (always a backslash)
fn escape_at(rest: &[char], styles: &StyleMap) -> Option<(Special, EscapeStyle, usize)> {
    if rest.get(1) == Some(&'\\') {
        if let Some(special) = rest.get(2).copied().and_then(Special::non_backslash_from_marker) {
            if styles.get(special) == EscapeStyle::Double {
                return Some((special, EscapeStyle::Double, 3));
            }
        }
        if styles.get(Special::Backslash) == EscapeStyle::Double
            && rest.len() >= 4
            && rest[2] == '\\'
            && rest[3] == '\\'
        {
            return Some((Special::Backslash, EscapeStyle::Double, 4));
        }
    }

    let special = rest.get(1).copied().and_then(Special::from_marker)?;
    (styles.get(special) == EscapeStyle::Single).then_some((special, EscapeStyle::Single, 2))
}

/// Encode real text back into literal form
///
/// Characters whose style is absent in `styles` use `default`; an absent
/// default writes the character raw.
pub fn encode(real: &str, styles: &StyleMap, default: EscapeStyle) -> String {
    encode_with(real, styles, |_| default)
}

/// Encode with a per-character fallback for styles absent from the map
///
/// One pass over the real characters. Never replace pattern-by-pattern on
/// the output: a later pass would re-escape backslashes inserted by an
/// earlier one.
pub fn encode_with<F>(real: &str, styles: &StyleMap, fallback: F) -> String
where
    F: Fn(Special) -> EscapeStyle,
{
    let resolve = |special: Special| match styles.get(special) {
        EscapeStyle::Absent => fallback(special),
        style => style,
    };

    let mut out = String::with_capacity(real.len() + real.len() / 8);
    let mut chars = real.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let next = chars.peek().copied();

            // `\n` as visible text in a literal whose newlines were double-escaped
            if let Some(special) = next
                .and_then(Special::from_marker)
                .filter(|s| styles.get(*s) == EscapeStyle::Double)
            {
                chars.next();
                push_escaped(&mut out, special, EscapeStyle::Double);
                continue;
            }

            // An unknown escape (`\u00e9`) came through decode untouched
            let keep_raw = styles.get(Special::Backslash) == EscapeStyle::Absent
                && styles.keeps_raw_backslashes()
                && next.and_then(Special::non_backslash_from_marker).is_none();
            let style = if keep_raw {
                EscapeStyle::Absent
            } else {
                resolve(Special::Backslash)
            };
            push_escaped(&mut out, Special::Backslash, style);
            continue;
        }

        match Special::from_real(ch) {
            Some(special) => push_escaped(&mut out, special, resolve(special)),
            None => out.push(ch),
        }
    }

    out
}

fn push_escaped(out: &mut String, special: Special, style: EscapeStyle) {
    match special.escaped(style) {
        Some(escaped) => out.push_str(escaped),
        None => out.push(special.real()),
    }
}
