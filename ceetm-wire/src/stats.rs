use bytes::Buf;

use crate::DecodeError;

/// The kernel's `tc_ceetm_xstats` structure, reported as the qdisc/class extended statistics.
///
/// ```c
/// struct tc_ceetm_xstats {
///     __u64 enqueue;
///     __u64 drop;
///     __u64 dequeue;
///     __u64 deq_bytes;
/// };
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcCeetmXstats {
    /// Frames enqueued.
    pub enqueue: u64,
    /// Frames dropped.
    pub drop: u64,
    /// Frames dequeued.
    pub dequeue: u64,
    /// Bytes dequeued.
    pub deq_bytes: u64,
}

impl TcCeetmXstats {
    /// Size of the record on the wire.
    pub const SIZE: usize = 32;

    /// Decode from a statistics payload at least [`Self::SIZE`] bytes long.
    pub fn decode(mut src: &[u8]) -> Result<Self, DecodeError> {
        if src.len() < Self::SIZE {
            return Err(DecodeError::TooShort {
                record: "tc_ceetm_xstats",
                expected: Self::SIZE,
                actual: src.len(),
            });
        }

        Ok(Self {
            enqueue: src.get_u64_ne(),
            drop: src.get_u64_ne(),
            dequeue: src.get_u64_ne(),
            deq_bytes: src.get_u64_ne(),
        })
    }

    /// Serialize to bytes in kernel format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(Self::SIZE);
        vec.extend_from_slice(&self.enqueue.to_ne_bytes());
        vec.extend_from_slice(&self.drop.to_ne_bytes());
        vec.extend_from_slice(&self.dequeue.to_ne_bytes());
        vec.extend_from_slice(&self.deq_bytes.to_ne_bytes());
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_counters_in_order() {
        let mut payload = Vec::new();
        for counter in [10u64, 2, 8, 12_000] {
            payload.extend_from_slice(&counter.to_ne_bytes());
        }

        let stats = TcCeetmXstats::decode(&payload).unwrap();
        assert_eq!(stats, TcCeetmXstats { enqueue: 10, drop: 2, dequeue: 8, deq_bytes: 12_000 });
        assert_eq!(stats.to_bytes(), payload);
    }

    #[test]
    fn decode_rejects_short_payload() {
        assert!(matches!(
            TcCeetmXstats::decode(&[0u8; 24]),
            Err(DecodeError::TooShort { expected: 32, actual: 24, .. })
        ));
    }
}
