//! Unicode utilities for glint-text.
//!
//! Byte-level UTF-8 decoding with explicit validity tracking, used by the
//! shapers to walk text code point by code point with cheap lookahead.

pub mod decoder;

pub use decoder::Utf8Decoder;
