//! Escape-style inference and the round-trip codec
//!
//! ```text
//! literal ──infer──► StyleMap
//!    │                  │
//!    └──decode(styles)──┴──► real text ──(edit)──► encode(styles) ──► literal
//! ```
//!
//! The same [`StyleMap`] must be used for both directions. For a literal `L`
//! with `styles = StyleMap::infer(L)`:
//!
//! `encode(&decode(L, Some(&styles)), &styles, default) == L`

mod codec;
mod style;

pub use codec::{decode, decode_global, encode, encode_with};
pub use style::{EscapeStyle, Special, StyleMap};
