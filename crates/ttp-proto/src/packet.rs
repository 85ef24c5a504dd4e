//! The [`Packet`] value type: an immutable (header, body, footer) triple.

use bytes::Bytes;

use crate::header;

/// An immutable unit of data exchanged over a TTP connection.
///
/// A `Packet` is fully defined by its three fields; equality, ordering, and
/// hashing are all structural. Once constructed, a packet is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Packet {
    header: i32,
    body: Bytes,
    footer: u16,
}

impl Packet {
    /// Builds a packet from an already-encoded mask, body, and footer.
    ///
    /// This does not re-encode `body`; callers that have UTF-8 text should
    /// prefer [`Packet::of`] or one of the typed constructors.
    #[must_use]
    pub fn raw(header: i32, body: impl Into<Bytes>, footer: u16) -> Self {
        Self { header, body: body.into(), footer }
    }

    /// Builds a packet whose body is the UTF-8 encoding of `body`.
    #[must_use]
    pub fn of(header: i32, body: &str, footer: u16) -> Self {
        Self::raw(header, Bytes::copy_from_slice(body.as_bytes()), footer)
    }

    /// Builds a [`header::BOOLEAN`] packet.
    #[must_use]
    pub fn of_bool(value: bool) -> Self {
        Self::of(header::BOOLEAN, if value { "true" } else { "false" }, 0)
    }

    /// Builds a [`header::INTEGER`] packet.
    #[must_use]
    pub fn of_int(value: i64) -> Self {
        Self::of(header::INTEGER, &value.to_string(), 0)
    }

    /// Builds a [`header::DOUBLE`] packet.
    #[must_use]
    pub fn of_double(value: f64) -> Self {
        Self::of(header::DOUBLE, &value.to_string(), 0)
    }

    /// Builds a [`header::STRING`] packet.
    #[must_use]
    pub fn of_string(value: &str) -> Self {
        Self::of(header::STRING, value, 0)
    }

    /// The header mask.
    #[must_use]
    pub fn header(&self) -> i32 {
        self.header
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The footer code point.
    #[must_use]
    pub fn footer(&self) -> u16 {
        self.footer
    }

    /// The body decoded as UTF-8, replacing any invalid sequences.
    ///
    /// This never fails: lossy decoding is the documented behavior so that
    /// observability code can always produce a string form.
    #[must_use]
    pub fn format(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The canonical string form `"[HHH:body:FFFFF]"`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        format!("[{:03}:{}:{:05}]", self.header, self.format(), self.footer)
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_constructors_pick_the_right_header() {
        assert_eq!(Packet::of_bool(true).header(), header::BOOLEAN);
        assert_eq!(Packet::of_int(7).header(), header::INTEGER);
        assert_eq!(Packet::of_double(1.5).header(), header::DOUBLE);
        assert_eq!(Packet::of_string("x").header(), header::STRING);
    }

    #[test]
    fn bool_body_is_lowercase_ascii() {
        assert_eq!(Packet::of_bool(true).format(), "true");
        assert_eq!(Packet::of_bool(false).format(), "false");
    }

    #[test]
    fn display_string_pads_header_and_footer() {
        let p = Packet::of_string("hi");
        assert_eq!(p.to_display_string(), "[103:hi:00000]");
    }

    #[test]
    fn raw_with_empty_body_is_not_an_error() {
        let p = Packet::raw(header::NOP, Bytes::new(), 0);
        assert_eq!(p.body().len(), 0);
    }

    #[test]
    fn equality_is_structural() {
        let a = Packet::of_int(42);
        let b = Packet::raw(header::INTEGER, Bytes::from_static(b"42"), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn ordering_is_lexicographic_on_header_then_body_then_footer() {
        let lo = Packet::raw(1, Bytes::from_static(b"a"), 0);
        let hi = Packet::raw(1, Bytes::from_static(b"a"), 1);
        assert!(lo < hi);
    }
}
