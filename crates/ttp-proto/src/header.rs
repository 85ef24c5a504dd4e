//! The header catalog: a closed, extensible set of symbolic tags mapped to
//! the integer masks that travel on the wire.
//!
//! The catalog is advisory. The codec never validates that a decoded header
//! is a known mask, and the wire never carries a symbolic name, only the
//! integer itself.

/// No operation / placeholder.
pub const NOP: i32 = 0;
/// Caller-defined operation; the footer carries the subtype.
pub const OP: i32 = 1;
/// Body is the UTF-8 text `"true"` or `"false"`.
pub const BOOLEAN: i32 = 100;
/// Body is UTF-8 decimal text for a signed integer.
pub const INTEGER: i32 = 101;
/// Body is UTF-8 decimal text for a double-precision float.
pub const DOUBLE: i32 = 102;
/// Body is arbitrary UTF-8 text.
pub const STRING: i32 = 103;
/// Negative response.
pub const BAD: i32 = 200;
/// Positive response.
pub const OK: i32 = 201;

/// The broad category a mask belongs to, derived from its leading decimal
/// digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Masks in `0..100`.
    Operation,
    /// Masks in `100..200`.
    Datum,
    /// Masks in `200..300`.
    Response,
    /// Anything outside the three reserved bands.
    Unknown,
}

/// Returns the symbolic name registered for `mask`, or `None` if the mask is
/// not part of the reference catalog.
///
/// Unknown masks are not an error: the protocol permits foreign catalogs to
/// assign their own meaning to them.
#[must_use]
pub fn name(mask: i32) -> Option<&'static str> {
    match mask {
        NOP => Some("NOP"),
        OP => Some("OP"),
        BOOLEAN => Some("BOOLEAN"),
        INTEGER => Some("INTEGER"),
        DOUBLE => Some("DOUBLE"),
        STRING => Some("STRING"),
        BAD => Some("BAD"),
        OK => Some("OK"),
        _ => None,
    }
}

/// Returns the mask registered under `name`, or `None` if unrecognized.
#[must_use]
pub fn mask(name: &str) -> Option<i32> {
    match name {
        "NOP" => Some(NOP),
        "OP" => Some(OP),
        "BOOLEAN" => Some(BOOLEAN),
        "INTEGER" => Some(INTEGER),
        "DOUBLE" => Some(DOUBLE),
        "STRING" => Some(STRING),
        "BAD" => Some(BAD),
        "OK" => Some(OK),
        _ => None,
    }
}

/// Classifies `mask` by its leading decimal digit.
#[must_use]
pub fn category(mask: i32) -> Category {
    match mask {
        0..100 => Category::Operation,
        100..200 => Category::Datum,
        200..300 => Category::Response,
        _ => Category::Unknown,
    }
}
