use ceetm_wire::{DecodeError, TcCeetmXstats};

/// Render the CEETM extended statistics carried in `TCA_XSTATS` or `TCA_STATS_APP`.
pub fn render_xstats(payload: &[u8]) -> Result<String, DecodeError> {
    let stats = TcCeetmXstats::decode(payload)?;

    Ok(format!(
        "enqueue {} drop {} dequeue {} dequeue_bytes {}",
        stats.enqueue, stats.drop, stats.dequeue, stats.deq_bytes
    ))
}
