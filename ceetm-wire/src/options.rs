use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{CeetmType, DecodeError, CEETM_MAX_WBFS_QCOUNT};

/// The kernel's `tc_ceetm_qopt` structure, carried in `TCA_OPTIONS` -> `TCA_CEETM_QOPS`.
///
/// Field order and padding must match the kernel definition exactly.
///
/// # Kernel Definition
///
/// ```c
/// struct tc_ceetm_qopt {
///     __u32 type;      /* CEETM_ROOT, CEETM_PRIO or CEETM_WBFS */
///     __u16 shaped;    /* LNI shaping enabled (root only) */
///     __u16 qcount;    /* Number of class queues (prio and wbfs) */
///     __u16 overhead;  /* Per-packet overhead in bytes (root only) */
///     __u32 rate;      /* Committed rate in bytes/s (root only) */
///     __u32 ceil;      /* Excess rate in bytes/s (root only) */
///     __u16 cr;        /* Group contributes to CR shaping (wbfs only) */
///     __u16 er;        /* Group contributes to ER shaping (wbfs only) */
///     __u8 qweight[CEETM_MAX_WBFS_QCOUNT];
/// };
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcCeetmQopt {
    /// Raw type tag, see [`CeetmType`].
    pub kind: u32,
    /// Non-zero when the LNI is shaped.
    pub shaped: u16,
    /// Number of class queues of a prio or wbfs group.
    pub qcount: u16,
    /// Per-packet overhead in bytes.
    pub overhead: u16,
    /// Committed rate in bytes per second.
    pub rate: u32,
    /// Excess rate in bytes per second.
    pub ceil: u32,
    /// Non-zero when a wbfs group contributes to committed rate shaping.
    pub cr: u16,
    /// Non-zero when a wbfs group contributes to excess rate shaping.
    pub er: u16,
    /// Per-queue weights of a wbfs group.
    pub qweight: [u8; CEETM_MAX_WBFS_QCOUNT as usize],
}

impl TcCeetmQopt {
    /// Size of the record on the wire, including padding.
    pub const SIZE: usize = 32;

    /// The decoded type tag, or `None` for tags this crate doesn't know.
    pub fn ceetm_type(&self) -> Option<CeetmType> {
        CeetmType::try_from(self.kind).ok()
    }

    /// Returns `true` if the shaped flag is set.
    pub const fn is_shaped(&self) -> bool {
        self.shaped != 0
    }

    /// Serialize to bytes in kernel format.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u32_ne(self.kind);
        buf.put_u16_ne(self.shaped);
        buf.put_u16_ne(self.qcount);
        buf.put_u16_ne(self.overhead);
        buf.put_bytes(0, 2);
        buf.put_u32_ne(self.rate);
        buf.put_u32_ne(self.ceil);
        buf.put_u16_ne(self.cr);
        buf.put_u16_ne(self.er);
        buf.put_slice(&self.qweight);
        buf.freeze()
    }

    /// Decode from an attribute payload at least [`Self::SIZE`] bytes long.
    pub fn decode(mut src: &[u8]) -> Result<Self, DecodeError> {
        if src.len() < Self::SIZE {
            return Err(DecodeError::TooShort {
                record: "tc_ceetm_qopt",
                expected: Self::SIZE,
                actual: src.len(),
            });
        }

        let kind = src.get_u32_ne();
        let shaped = src.get_u16_ne();
        let qcount = src.get_u16_ne();
        let overhead = src.get_u16_ne();
        src.advance(2);
        let rate = src.get_u32_ne();
        let ceil = src.get_u32_ne();
        let cr = src.get_u16_ne();
        let er = src.get_u16_ne();
        let mut qweight = [0u8; CEETM_MAX_WBFS_QCOUNT as usize];
        src.copy_to_slice(&mut qweight);

        Ok(Self { kind, shaped, qcount, overhead, rate, ceil, cr, er, qweight })
    }
}

/// The kernel's `tc_ceetm_copt` structure, carried in `TCA_OPTIONS` -> `TCA_CEETM_COPT`.
///
/// # Kernel Definition
///
/// ```c
/// struct tc_ceetm_copt {
///     __u32 type;     /* CEETM_ROOT, CEETM_PRIO or CEETM_WBFS */
///     __u16 shaped;   /* Channel or class queue is shaped */
///     __u32 rate;     /* Committed rate in bytes/s (root only) */
///     __u32 ceil;     /* Excess rate in bytes/s (root only) */
///     __u16 tbl;      /* Channel weight table index (unshaped root only) */
///     __u16 weight;   /* Class weight (wbfs only) */
///     __u8 cr;        /* Contributes to CR shaping (prio only) */
///     __u8 er;        /* Contributes to ER shaping (prio only) */
/// };
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcCeetmCopt {
    /// Raw type tag, see [`CeetmType`].
    pub kind: u32,
    /// Non-zero for a shaped root class or a shaped prio class.
    pub shaped: u16,
    /// Committed rate in bytes per second.
    pub rate: u32,
    /// Excess rate in bytes per second.
    pub ceil: u32,
    /// Channel index of an unshaped root class.
    pub tbl: u16,
    /// Weight of a wbfs class.
    pub weight: u16,
    /// Non-zero when a prio class contributes to committed rate shaping.
    pub cr: u8,
    /// Non-zero when a prio class contributes to excess rate shaping.
    pub er: u8,
}

impl TcCeetmCopt {
    /// Size of the record on the wire, including padding.
    pub const SIZE: usize = 24;

    /// The decoded type tag, or `None` for tags this crate doesn't know.
    pub fn ceetm_type(&self) -> Option<CeetmType> {
        CeetmType::try_from(self.kind).ok()
    }

    /// Returns `true` if the shaped flag is set.
    pub const fn is_shaped(&self) -> bool {
        self.shaped != 0
    }

    /// Serialize to bytes in kernel format.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u32_ne(self.kind);
        buf.put_u16_ne(self.shaped);
        buf.put_bytes(0, 2);
        buf.put_u32_ne(self.rate);
        buf.put_u32_ne(self.ceil);
        buf.put_u16_ne(self.tbl);
        buf.put_u16_ne(self.weight);
        buf.put_u8(self.cr);
        buf.put_u8(self.er);
        buf.put_bytes(0, 2);
        buf.freeze()
    }

    /// Decode from an attribute payload at least [`Self::SIZE`] bytes long.
    pub fn decode(mut src: &[u8]) -> Result<Self, DecodeError> {
        if src.len() < Self::SIZE {
            return Err(DecodeError::TooShort {
                record: "tc_ceetm_copt",
                expected: Self::SIZE,
                actual: src.len(),
            });
        }

        let kind = src.get_u32_ne();
        let shaped = src.get_u16_ne();
        src.advance(2);
        let rate = src.get_u32_ne();
        let ceil = src.get_u32_ne();
        let tbl = src.get_u16_ne();
        let weight = src.get_u16_ne();
        let cr = src.get_u8();
        let er = src.get_u8();

        Ok(Self { kind, shaped, rate, ceil, tbl, weight, cr, er })
    }
}
