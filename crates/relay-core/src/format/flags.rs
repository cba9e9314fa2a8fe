//! Log format selection.
//!
//! The operator picks which representations of each forwarded chunk end up
//! in the log with a comma-separated selector such as `plain`, `fhex,hex` or
//! `all`.  Each recognised token sets one bit in a [`LogFormat`] mask:
//!
//! | Token   | Bit    | Representation                              |
//! |---------|--------|---------------------------------------------|
//! | `all`   | `0x01` | every representation below                  |
//! | `fhex`  | `0x02` | formatted hex dump with offsets             |
//! | `hex`   | `0x04` | contiguous lowercase hex string             |
//! | `plain` | `0x08` | the raw bytes, written as-is                |
//!
//! Unknown tokens are ignored rather than rejected, so a typo never stops the
//! relay from starting.  They are returned in [`FormatParseOutcome::ignored`]
//! so the caller can warn about them.

use std::fmt;

/// Bitmask of enabled log representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogFormat(pub u8);

impl LogFormat {
    pub const ALL: u8 = 1 << 0;
    pub const FHEX: u8 = 1 << 1;
    pub const HEX: u8 = 1 << 2;
    pub const PLAIN: u8 = 1 << 3;

    /// Selector tokens in bit order, used for parsing and display.
    const TOKENS: [(&'static str, u8); 4] = [
        ("all", Self::ALL),
        ("fhex", Self::FHEX),
        ("hex", Self::HEX),
        ("plain", Self::PLAIN),
    ];

    /// A mask with no representation enabled: records carry the header only.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Parses a comma-separated selector.
    ///
    /// Tokens are trimmed and matched case-sensitively, the same way they
    /// appear on the command line.  Empty tokens (e.g. from `"plain,"`) are
    /// skipped silently; anything else unrecognised is collected in
    /// [`FormatParseOutcome::ignored`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relay_core::LogFormat;
    ///
    /// let outcome = LogFormat::parse("fhex,plain");
    /// assert!(outcome.format.fhex_enabled());
    /// assert!(outcome.format.plain_enabled());
    /// assert!(!outcome.format.hex_enabled());
    /// assert!(outcome.ignored.is_empty());
    /// ```
    pub fn parse(selector: &str) -> FormatParseOutcome {
        let mut bits = 0u8;
        let mut ignored = Vec::new();

        for token in selector.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match Self::TOKENS.iter().find(|(name, _)| *name == token) {
                Some((_, bit)) => bits |= bit,
                None => ignored.push(token.to_string()),
            }
        }

        FormatParseOutcome {
            format: Self(bits),
            ignored,
        }
    }

    /// Returns `true` if `all` was selected.
    pub fn all_enabled(&self) -> bool {
        self.0 & Self::ALL != 0
    }

    /// Returns `true` if the hex dump is part of each record.
    pub fn fhex_enabled(&self) -> bool {
        self.0 & (Self::FHEX | Self::ALL) != 0
    }

    /// Returns `true` if the contiguous hex string is part of each record.
    pub fn hex_enabled(&self) -> bool {
        self.0 & (Self::HEX | Self::ALL) != 0
    }

    /// Returns `true` if the raw bytes are part of each record.
    pub fn plain_enabled(&self) -> bool {
        self.0 & (Self::PLAIN | Self::ALL) != 0
    }

    /// Returns `true` if no representation is selected.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Names of the tokens whose bits are set, in bit order.
    pub fn token_names(&self) -> Vec<&'static str> {
        Self::TOKENS
            .iter()
            .filter(|(_, bit)| self.0 & bit != 0)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Default for LogFormat {
    /// `plain`, matching the relay's command-line default.
    fn default() -> Self {
        Self(Self::PLAIN)
    }
}

impl fmt::Display for LogFormat {
    /// Renders the mask back into selector syntax, e.g. `fhex,plain`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token_names().join(","))
    }
}

/// Result of [`LogFormat::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatParseOutcome {
    /// The combined mask of every recognised token.
    pub format: LogFormat,
    /// Tokens that matched no representation, in input order.
    pub ignored: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_plain_only() {
        let f = LogFormat::default();
        assert!(f.plain_enabled());
        assert!(!f.hex_enabled());
        assert!(!f.fhex_enabled());
        assert!(!f.all_enabled());
    }

    #[test]
    fn test_parse_single_token() {
        // Act
        let outcome = LogFormat::parse("hex");

        // Assert
        assert_eq!(outcome.format, LogFormat(LogFormat::HEX));
        assert!(outcome.ignored.is_empty());
    }

    #[test]
    fn test_parse_combines_tokens_with_or() {
        let outcome = LogFormat::parse("fhex,hex");
        assert_eq!(outcome.format.0, LogFormat::FHEX | LogFormat::HEX);
    }

    #[test]
    fn test_all_forces_every_representation() {
        let f = LogFormat::parse("all").format;
        assert!(f.fhex_enabled());
        assert!(f.hex_enabled());
        assert!(f.plain_enabled());
    }

    #[test]
    fn test_parse_ignores_unknown_tokens_and_reports_them() {
        // Arrange / Act
        let outcome = LogFormat::parse("plain,json,HEX");

        // Assert: only `plain` is recognised; matching is case-sensitive
        assert_eq!(outcome.format, LogFormat(LogFormat::PLAIN));
        assert_eq!(outcome.ignored, vec!["json".to_string(), "HEX".to_string()]);
    }

    #[test]
    fn test_parse_trims_whitespace_and_skips_empty_tokens() {
        let outcome = LogFormat::parse(" fhex , ,plain,");
        assert_eq!(outcome.format.0, LogFormat::FHEX | LogFormat::PLAIN);
        assert!(outcome.ignored.is_empty());
    }

    #[test]
    fn test_empty_selector_enables_nothing() {
        let f = LogFormat::parse("").format;
        assert!(f.is_empty());
        assert!(!f.plain_enabled());
    }

    #[test]
    fn test_duplicate_tokens_are_idempotent() {
        let f = LogFormat::parse("hex,hex,hex").format;
        assert_eq!(f, LogFormat(LogFormat::HEX));
    }

    #[test]
    fn test_display_uses_selector_syntax_in_bit_order() {
        let f = LogFormat::parse("plain,fhex").format;
        assert_eq!(f.to_string(), "fhex,plain");
    }

    #[test]
    fn test_display_of_empty_mask_is_empty() {
        assert_eq!(LogFormat::none().to_string(), "");
    }
}
