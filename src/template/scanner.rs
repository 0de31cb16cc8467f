use crate::error::TemplateError;
use crate::types::PlaceholderKind;

/// What a `%` introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Directive {
    /// `%%`
    Percent,
    Placeholder(PlaceholderKind),
}

/// Scan the directive following a `%`.
///
/// `rest` starts right after the `%`, `position` is the byte offset of that `%` in the
/// template. Returns the directive and how many bytes of `rest` it consumed.
pub(super) fn scan_directive(
    rest: &str,
    position: usize,
) -> Result<(Directive, usize), TemplateError> {
    let bytes = rest.as_bytes();
    match bytes.first() {
        None => Err(TemplateError::DanglingPercent { position }),
        Some(b'%') => Ok((Directive::Percent, 1)),
        Some(b'z') => match bytes.get(1) {
            Some(b'u') => Ok((Directive::Placeholder(PlaceholderKind::Size), 2)),
            Some(_) => Err(TemplateError::UnsupportedSizeModifier {
                position,
                found: first_char(&rest[1..]),
            }),
            None => Err(TemplateError::DanglingPercent { position }),
        },
        Some(&letter) => PlaceholderKind::from_letter(letter)
            .map(|kind| (Directive::Placeholder(kind), 1))
            .ok_or_else(|| TemplateError::UnknownPlaceholder {
                position,
                found: first_char(rest),
            }),
    }
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Byte length of the positional marker `$index`.
pub(super) fn marker_len(index: usize) -> usize {
    let mut digits = 1;
    let mut rest = index / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    1 + digits
}
