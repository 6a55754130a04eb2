//! Per-character escape style inference
//!
//! A literal can mix conventions: a JSON value that embeds an already
//! escaped snippet (`\\n`) next to a live newline marker (`\n`). Each of
//! the seven special characters is therefore classified on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters whose escaped form is tracked per literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Newline,
    CarriageReturn,
    Tab,
    ForwardSlash,
    Backslash,
    DoubleQuote,
    SingleQuote,
}

impl Special {
    /// All special characters, in decode precedence order
    pub const ALL: [Special; 7] = [
        Special::Newline,
        Special::CarriageReturn,
        Special::Tab,
        Special::ForwardSlash,
        Special::Backslash,
        Special::DoubleQuote,
        Special::SingleQuote,
    ];

    /// The real character this special stands for
    pub fn real(self) -> char {
        match self {
            Special::Newline => '\n',
            Special::CarriageReturn => '\r',
            Special::Tab => '\t',
            Special::ForwardSlash => '/',
            Special::Backslash => '\\',
            Special::DoubleQuote => '"',
            Special::SingleQuote => '\'',
        }
    }

    /// The character written after the backslash in escaped form
    pub fn marker(self) -> char {
        match self {
            Special::Newline => 'n',
            Special::CarriageReturn => 'r',
            Special::Tab => 't',
            other => other.real(),
        }
    }

    pub fn from_real(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.real() == ch)
    }

    pub fn from_marker(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.marker() == ch)
    }

    /// Marker of a special other than the backslash
    ///
    /// A backslash followed by one of these belongs to that character's
    /// escape, not to an escaped backslash.
    pub fn non_backslash_from_marker(ch: char) -> Option<Self> {
        Self::from_marker(ch).filter(|s| *s != Special::Backslash)
    }

    /// Escaped spelling in the given style (`None` for absent)
    ///
    /// The double form of the backslash is four backslashes; every other
    /// double form is two backslashes and the marker.
    pub fn escaped(self, style: EscapeStyle) -> Option<&'static str> {
        let (single, double) = match self {
            Special::Newline => ("\\n", "\\\\n"),
            Special::CarriageReturn => ("\\r", "\\\\r"),
            Special::Tab => ("\\t", "\\\\t"),
            Special::ForwardSlash => ("\\/", "\\\\/"),
            Special::Backslash => ("\\\\", "\\\\\\\\"),
            Special::DoubleQuote => ("\\\"", "\\\\\""),
            Special::SingleQuote => ("\\'", "\\\\'"),
        };
        match style {
            EscapeStyle::Absent => None,
            EscapeStyle::Single => Some(single),
            EscapeStyle::Double => Some(double),
        }
    }

    fn index(self) -> usize {
        match self {
            Special::Newline => 0,
            Special::CarriageReturn => 1,
            Special::Tab => 2,
            Special::ForwardSlash => 3,
            Special::Backslash => 4,
            Special::DoubleQuote => 5,
            Special::SingleQuote => 6,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Special::Newline => "newline",
            Special::CarriageReturn => "carriage return",
            Special::Tab => "tab",
            Special::ForwardSlash => "forward slash",
            Special::Backslash => "backslash",
            Special::DoubleQuote => "double quote",
            Special::SingleQuote => "single quote",
        }
    }
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a special character was written inside one literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeStyle {
    /// Never written escaped in the literal
    #[default]
    Absent,
    /// Backslash + marker, e.g. `\n`
    Single,
    /// Backslash + backslash + marker, e.g. `\\n`
    Double,
}

impl fmt::Display for EscapeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscapeStyle::Absent => "absent",
            EscapeStyle::Single => "single",
            EscapeStyle::Double => "double",
        })
    }
}

/// Escape style of every special character, inferred from one literal
///
/// Built once per literal and shared by decode and encode so the two stay
/// inverses. There is no mutation API; a new literal needs a new map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleMap {
    styles: [EscapeStyle; 7],
    /// The literal holds escapes outside the seven (`\u00e9`, `\x41`)
    raw_backslashes: bool,
}

impl StyleMap {
    /// Classify each special character from the raw literal text
    ///
    /// Read-only: every pattern is tested against the untouched input, so
    /// one character's classification never sees another's substitutions.
    pub fn infer(raw: &str) -> Self {
        let mut styles = [EscapeStyle::Absent; 7];
        if !raw.contains('\\') {
            return Self {
                styles,
                raw_backslashes: false,
            };
        }

        let chars: Vec<char> = raw.chars().collect();
        for special in Special::ALL {
            styles[special.index()] = if has_pattern(&chars, special, 2) {
                EscapeStyle::Double
            } else if has_pattern(&chars, special, 1) {
                EscapeStyle::Single
            } else {
                EscapeStyle::Absent
            };
        }

        Self {
            styles,
            raw_backslashes: has_unknown_escape(&chars),
        }
    }

    /// Every character classified with the same style
    pub fn uniform(style: EscapeStyle) -> Self {
        Self {
            styles: [style; 7],
            raw_backslashes: false,
        }
    }

    pub fn get(&self, special: Special) -> EscapeStyle {
        self.styles[special.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Special, EscapeStyle)> + '_ {
        Special::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// True when the literal writes backslashes raw in front of unknown
    /// escapes, so encode should leave such backslashes alone
    pub fn keeps_raw_backslashes(&self) -> bool {
        self.raw_backslashes
    }

    /// True when at least one character was written escaped
    pub fn has_escapes(&self) -> bool {
        self.styles.iter().any(|s| *s != EscapeStyle::Absent)
    }

    /// True when the two styles are mixed within the literal
    pub fn is_mixed(&self) -> bool {
        let mut seen = self.styles.iter().filter(|s| **s != EscapeStyle::Absent);
        match seen.next() {
            Some(first) => seen.any(|s| s != first),
            None => false,
        }
    }
}

impl Serialize for StyleMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Special::ALL.len()))?;
        for (special, style) in self.iter() {
            map.serialize_entry(&special, &style)?;
        }
        map.end()
    }
}

/// Look for `depth` backslashes followed by the special's marker
///
/// The backslash's own marker is a backslash, so its pattern is `2 * depth`
/// backslashes that are not followed by another special's marker. Without
/// that guard `\\n` would read as an escaped backslash followed by `n`.
fn has_pattern(chars: &[char], special: Special, depth: usize) -> bool {
    if special == Special::Backslash {
        let run = depth * 2;
        return (0..chars.len()).any(|i| {
            i + run <= chars.len()
                && chars[i..i + run].iter().all(|c| *c == '\\')
                && chars
                    .get(i + run)
                    .map_or(true, |next| Special::non_backslash_from_marker(*next).is_none())
        });
    }

    let marker = special.marker();
    chars.windows(depth + 1).any(|window| {
        let (slashes, last) = window.split_at(depth);
        slashes.iter().all(|c| *c == '\\') && last[0] == marker
    })
}

/// An odd run of backslashes ending in something other than a marker
///
/// The last backslash of the run then starts an escape none of the seven
/// specials account for, or dangles at the end of the literal.
fn has_unknown_escape(chars: &[char]) -> bool {
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            i += 1;
            continue;
        }
        let run = chars[i..].iter().take_while(|c| **c == '\\').count();
        let next = chars.get(i + run).copied();
        if run % 2 == 1 && next.and_then(Special::from_marker).is_none() {
            return true;
        }
        i += run;
    }
    false
}
