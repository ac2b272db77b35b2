//! Borrowed byte-span view over protocol text.
//!
//! Every AT response, URC payload and metadata field the modem hands us is
//! a slice of some buffer owned elsewhere (the engine's response buffer, the
//! line decoder, a caller's array).  [`ByteSpan`] is a thin `Copy` wrapper
//! over `&[u8]` that carries the handful of text operations the protocol
//! layer needs: prefix matching/stripping, whitespace trimming, tokenising
//! and integer parsing.  It never allocates and never outlives its buffer.

use core::fmt;
use core::ops::Deref;

/// A non-owning, length-bounded view over caller-owned bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSpan<'a>(&'a [u8]);

impl<'a> ByteSpan<'a> {
    /// The empty span.
    pub const EMPTY: ByteSpan<'static> = ByteSpan(&[]);

    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    /// View a string literal (or any `&str`) as a span.
    pub const fn from_text(s: &'a str) -> Self {
        Self(s.as_bytes())
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// UTF-8 view, if the bytes happen to be valid text.
    pub fn to_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.0).ok()
    }

    /// Returns the span with `prefix` removed, or `None` if it does not
    /// start with `prefix`.
    pub fn strip_prefix(self, prefix: &[u8]) -> Option<Self> {
        self.0.strip_prefix(prefix).map(Self)
    }

    /// Like [`strip_prefix`](Self::strip_prefix) but returns the span
    /// unchanged when the prefix is absent.  This is the behaviour AT
    /// response filtering wants: `+UMNOPROF: 5` and a bare `5` parse alike.
    pub fn skip_prefix(self, prefix: &[u8]) -> Self {
        self.strip_prefix(prefix).unwrap_or(self)
    }

    /// Strip ASCII whitespace (including CR/LF) from both ends.
    pub fn trim(self) -> Self {
        Self(self.0.trim_ascii())
    }

    /// Strip trailing ASCII whitespace only.
    pub fn trim_end(self) -> Self {
        Self(self.0.trim_ascii_end())
    }

    /// Cap the span at `max` bytes.
    pub fn truncate(self, max: usize) -> Self {
        Self(&self.0[..self.0.len().min(max)])
    }

    /// Remove one pair of surrounding double quotes, if present.
    pub fn unquote(self) -> Self {
        match self.0 {
            [b'"', inner @ .., b'"'] => Self(inner),
            _ => self,
        }
    }

    /// Split at the first occurrence of `sep`; the separator is dropped.
    pub fn split_once(self, sep: u8) -> Option<(Self, Self)> {
        let idx = self.0.iter().position(|&b| b == sep)?;
        Some((Self(&self.0[..idx]), Self(&self.0[idx + 1..])))
    }

    /// Iterate over the fields separated by `sep`, keeping empty fields
    /// (`"1,,3"` yields `"1"`, `""`, `"3"`).
    pub fn fields(self, sep: u8) -> impl Iterator<Item = ByteSpan<'a>> {
        self.0.split(move |&b| b == sep).map(ByteSpan)
    }

    /// Parse a signed decimal integer, tolerating surrounding whitespace
    /// and one pair of quotes.  Returns `None` on empty input, junk or
    /// overflow.
    pub fn parse_int(self) -> Option<i64> {
        let digits = self.trim().unquote().to_str()?;
        digits.parse().ok()
    }
}

impl Deref for ByteSpan<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0
    }
}

impl<'a> From<&'a [u8]> for ByteSpan<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl<'a> From<&'a str> for ByteSpan<'a> {
    fn from(s: &'a str) -> Self {
        Self(s.as_bytes())
    }
}

impl fmt::Debug for ByteSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

impl fmt::Display for ByteSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}
