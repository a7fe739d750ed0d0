//! Netlink attribute building and parsing.
//!
//! Netlink uses a TLV (Type-Length-Value) format for attributes. CEETM options are nested
//! attributes inside `TCA_OPTIONS`, so we need to both produce and consume them.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Length (2 bytes) │  Type (2 bytes)     │  <- NLA header (4 bytes)
//! ├─────────────────────────────────────────┤
//! │  Value (variable length, padded to 4)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Reference: <linux/netlink.h>

use crate::DecodeError;

/// Size of the attribute header (length + type).
pub const NLA_HEADER_SIZE: usize = 4;
/// Attribute alignment.
pub const NLA_ALIGNTO: usize = 4;
/// Flag marking an attribute as carrying nested attributes.
pub const NLA_F_NESTED: u16 = 1 << 15;
/// Flag marking an attribute payload as network byte order.
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
/// Mask selecting the attribute type out of the type field.
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

/// Round `len` up to the attribute alignment.
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Build a single NLA with the given type and value.
///
/// # Returns
///
/// A byte vector containing the complete NLA (header + value + padding).
pub fn build_nla(nla_type: u16, value: &[u8]) -> Vec<u8> {
    // NLA length includes the 4-byte header, but not the trailing padding.
    let nla_len = NLA_HEADER_SIZE + value.len();
    let mut buf = vec![0u8; nla_align(nla_len)];

    buf[0..2].copy_from_slice(&(nla_len as u16).to_ne_bytes());
    buf[2..4].copy_from_slice(&nla_type.to_ne_bytes());
    buf[NLA_HEADER_SIZE..nla_len].copy_from_slice(value);
    // Padding bytes are already zero from vec initialization

    buf
}

/// A borrowed attribute: its type (flags stripped) and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nla<'a> {
    /// Attribute type, with [`NLA_F_NESTED`] and [`NLA_F_NET_BYTEORDER`] masked out.
    pub kind: u16,
    /// Attribute payload, without header or padding.
    pub payload: &'a [u8],
}

/// Iterator over the attributes packed in a buffer.
///
/// Trailing bytes too short to hold a header are ignored, as the kernel's `nla_ok()` does.
/// A header whose length is smaller than the header itself, or runs past the end of the
/// buffer, yields [`DecodeError::MalformedAttribute`] and ends the iteration.
#[derive(Debug, Clone)]
pub struct NlaIter<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> NlaIter<'a> {
    /// Iterate over the attributes in `buf`.
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }
}

impl<'a> Iterator for NlaIter<'a> {
    type Item = Result<Nla<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.buf.get(self.offset..)?;
        if rest.len() < NLA_HEADER_SIZE {
            return None;
        }

        let len = u16::from_ne_bytes([rest[0], rest[1]]) as usize;
        let kind = u16::from_ne_bytes([rest[2], rest[3]]) & NLA_TYPE_MASK;

        if len < NLA_HEADER_SIZE || len > rest.len() {
            let offset = self.offset;
            self.offset = self.buf.len();
            return Some(Err(DecodeError::MalformedAttribute { offset }));
        }

        self.offset += nla_align(len);
        Some(Ok(Nla { kind, payload: &rest[NLA_HEADER_SIZE..len] }))
    }
}

/// A table of nested attributes indexed by type, like iproute2's `parse_rtattr_nested()`.
///
/// Attributes with a type above `max` are skipped; when a type occurs more than once, the last
/// occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedAttributes<'a> {
    table: Vec<Option<&'a [u8]>>,
}

impl<'a> NestedAttributes<'a> {
    /// Parse the payload of a nested attribute, keeping types `1..=max`.
    pub fn parse(buf: &'a [u8], max: u16) -> Result<Self, DecodeError> {
        let mut table = vec![None; max as usize + 1];

        for nla in NlaIter::new(buf) {
            let nla = nla?;
            match table.get_mut(nla.kind as usize) {
                Some(slot) => *slot = Some(nla.payload),
                None => tracing::trace!(kind = nla.kind, "skipping unknown nested attribute"),
            }
        }

        Ok(Self { table })
    }

    /// The payload of the attribute with the given type, if present.
    pub fn get(&self, kind: u16) -> Option<&'a [u8]> {
        self.table.get(kind as usize).copied().flatten()
    }
}
