//! Wire formats for the CEETM queueing discipline.
//!
//! The kernel side of CEETM exchanges three fixed-layout records with user space, all carried
//! inside the `TCA_OPTIONS` (or statistics) attribute of an rtnetlink traffic-control message:
//!
//! - [`TcCeetmQopt`]: qdisc options, nested as [`TCA_CEETM_QOPS`].
//! - [`TcCeetmCopt`]: class options, nested as [`TCA_CEETM_COPT`].
//! - [`TcCeetmXstats`]: extended statistics.
//!
//! All multi-byte fields are native endian and follow the C layout of the kernel structs,
//! including padding. The [`nla`] module provides the TLV helpers used to nest them.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use thiserror::Error;

pub mod nla;

mod options;
pub use options::{TcCeetmCopt, TcCeetmQopt};

mod stats;
pub use stats::TcCeetmXstats;

// CEETM-specific TCA_OPTIONS sub-attributes (from linux/pkt_sched.h)
/// Class options attribute type.
pub const TCA_CEETM_COPT: u16 = 1;
/// Qdisc options attribute type.
pub const TCA_CEETM_QOPS: u16 = 2;
/// Highest attribute type understood inside `TCA_OPTIONS`.
pub const TCA_CEETM_MAX: u16 = TCA_CEETM_QOPS;

/// Maximum number of class queues of a prio qdisc.
pub const CEETM_MAX_PRIO_QCOUNT: u16 = 8;
/// Smaller of the two class queue counts allowed for a wbfs qdisc.
pub const CEETM_MIN_WBFS_QCOUNT: u16 = 4;
/// Larger of the two class queue counts allowed for a wbfs qdisc.
pub const CEETM_MAX_WBFS_QCOUNT: u16 = 8;
/// Maximum weight of a wbfs class.
pub const CEETM_MAX_WBFS_VALUE: u16 = 248;

/// The `kind` attribute value identifying CEETM qdiscs and classes.
pub const CEETM_KIND: &str = "ceetm";

/// The type tag shared by qdisc and class records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CeetmType {
    /// Links a CEETM LNI to a port. Root classes are channels.
    Root = 1,
    /// Eight-class priority scheduler.
    Prio = 2,
    /// Four or eight class weighted bandwidth fair scheduler.
    Wbfs = 3,
}

impl CeetmType {
    /// The keyword used for this type on the command line and in printed output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Prio => "prio",
            Self::Wbfs => "wbfs",
        }
    }
}

impl TryFrom<u32> for CeetmType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Root),
            2 => Ok(Self::Prio),
            3 => Ok(Self::Wbfs),
            _ => Err(value),
        }
    }
}

impl std::fmt::Display for CeetmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while decoding records or attributes received from the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A fixed-layout record is shorter than its C struct.
    #[error("{record} too short: need {expected} bytes, got {actual}")]
    TooShort {
        /// Name of the record.
        record: &'static str,
        /// Size of the record, in bytes.
        expected: usize,
        /// Bytes actually received.
        actual: usize,
    },
    /// An attribute header is truncated or claims more bytes than remain.
    #[error("malformed netlink attribute at offset {offset}")]
    MalformedAttribute {
        /// Offset of the bad header within the attribute stream.
        offset: usize,
    },
}
