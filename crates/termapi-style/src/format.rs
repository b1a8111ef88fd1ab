#![forbid(unsafe_code)]

//! Text format flags (bold, invert, underline) and their SGR sequences.

use termapi_core::sequence::{Sequence, graphics_rendition};

/// SGR: reset all attributes.
pub const SGR_RESET: u32 = 0;
/// SGR: bold.
pub const SGR_BOLD: u32 = 1;
/// SGR: normal intensity (clears bold).
pub const SGR_RESET_BOLD: u32 = 22;
/// SGR: underline.
pub const SGR_UNDERLINE: u32 = 4;
/// SGR: not underlined.
pub const SGR_RESET_UNDERLINE: u32 = 24;
/// SGR: reverse video.
pub const SGR_INVERT: u32 = 7;
/// SGR: not reversed.
pub const SGR_RESET_INVERT: u32 = 27;

bitflags::bitflags! {
    /// Formatting requests attached to a color setter.
    ///
    /// Set and reset flags are independent bits; setting both emits both.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatFlags: u8 {
        const BOLD            = 1;
        const RESET_BOLD      = 2;
        const INVERT          = 4;
        const RESET_INVERT    = 8;
        const UNDERLINE       = 16;
        const RESET_UNDERLINE = 32;
    }
}

/// Flag → SGR code, in emission order.
const FLAG_CODES: [(FormatFlags, u32); 6] = [
    (FormatFlags::BOLD, SGR_BOLD),
    (FormatFlags::RESET_BOLD, SGR_RESET_BOLD),
    (FormatFlags::INVERT, SGR_INVERT),
    (FormatFlags::RESET_INVERT, SGR_RESET_INVERT),
    (FormatFlags::UNDERLINE, SGR_UNDERLINE),
    (FormatFlags::RESET_UNDERLINE, SGR_RESET_UNDERLINE),
];

impl FormatFlags {
    /// Whether every flag in `other` is set.
    #[must_use]
    pub const fn has_all(self, other: Self) -> bool {
        self.contains(other)
    }

    /// Whether any flag in `other` is set.
    #[must_use]
    pub const fn has_any(self, other: Self) -> bool {
        self.intersects(other)
    }

    /// SGR codes for the set flags, in fixed order: bold, reset bold,
    /// invert, reset invert, underline, reset underline.
    pub fn sgr_codes(self) -> impl Iterator<Item = u32> {
        FLAG_CODES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, code)| code)
    }

    /// One `CSI n m` per set flag, concatenated.
    #[must_use]
    pub fn to_sequence(self) -> Sequence {
        self.sgr_codes()
            .fold(Sequence::empty(), |seq, code| seq.chain(&graphics_rendition(code)))
    }
}

/// `CSI 0 m`
#[must_use]
pub fn reset() -> Sequence {
    graphics_rendition(SGR_RESET)
}

/// `CSI 1 m`
#[must_use]
pub fn bold() -> Sequence {
    graphics_rendition(SGR_BOLD)
}

/// `CSI 22 m`
#[must_use]
pub fn reset_bold() -> Sequence {
    graphics_rendition(SGR_RESET_BOLD)
}

/// `CSI 4 m`
#[must_use]
pub fn underline() -> Sequence {
    graphics_rendition(SGR_UNDERLINE)
}

/// `CSI 24 m`
#[must_use]
pub fn reset_underline() -> Sequence {
    graphics_rendition(SGR_RESET_UNDERLINE)
}

/// `CSI 7 m`
#[must_use]
pub fn invert() -> Sequence {
    graphics_rendition(SGR_INVERT)
}

/// `CSI 27 m`
#[must_use]
pub fn reset_invert() -> Sequence {
    graphics_rendition(SGR_RESET_INVERT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values() {
        assert_eq!(FormatFlags::empty().bits(), 0);
        assert_eq!(FormatFlags::BOLD.bits(), 1);
        assert_eq!(FormatFlags::RESET_BOLD.bits(), 2);
        assert_eq!(FormatFlags::INVERT.bits(), 4);
        assert_eq!(FormatFlags::RESET_INVERT.bits(), 8);
        assert_eq!(FormatFlags::UNDERLINE.bits(), 16);
        assert_eq!(FormatFlags::RESET_UNDERLINE.bits(), 32);
    }

    #[test]
    fn has_all_and_has_any() {
        let f = FormatFlags::BOLD | FormatFlags::UNDERLINE;
        assert!(f.has_all(FormatFlags::BOLD));
        assert!(!f.has_all(FormatFlags::BOLD | FormatFlags::INVERT));
        assert!(f.has_any(FormatFlags::BOLD | FormatFlags::INVERT));
        assert!(!f.has_any(FormatFlags::INVERT));
    }

    #[test]
    fn empty_flags_emit_nothing() {
        assert!(FormatFlags::empty().to_sequence().is_empty());
    }

    #[test]
    fn single_flag_sequences() {
        assert_eq!(FormatFlags::BOLD.to_sequence(), bold());
        assert_eq!(FormatFlags::RESET_BOLD.to_sequence(), reset_bold());
        assert_eq!(FormatFlags::INVERT.to_sequence(), invert());
        assert_eq!(FormatFlags::RESET_INVERT.to_sequence(), reset_invert());
        assert_eq!(FormatFlags::UNDERLINE.to_sequence(), underline());
        assert_eq!(FormatFlags::RESET_UNDERLINE.to_sequence(), reset_underline());
    }

    #[test]
    fn combined_flags_in_fixed_order() {
        let f = FormatFlags::UNDERLINE | FormatFlags::BOLD | FormatFlags::RESET_INVERT;
        assert_eq!(f.to_sequence().as_bytes(), b"\x1b[1m\x1b[27m\x1b[4m");
        assert_eq!(f.sgr_codes().collect::<Vec<_>>(), vec![1, 27, 4]);
    }

    #[test]
    fn free_functions() {
        assert_eq!(reset().as_bytes(), b"\x1b[0m");
        assert_eq!(bold().as_bytes(), b"\x1b[1m");
        assert_eq!(reset_bold().as_bytes(), b"\x1b[22m");
        assert_eq!(underline().as_bytes(), b"\x1b[4m");
        assert_eq!(reset_underline().as_bytes(), b"\x1b[24m");
        assert_eq!(invert().as_bytes(), b"\x1b[7m");
        assert_eq!(reset_invert().as_bytes(), b"\x1b[27m");
    }
}
