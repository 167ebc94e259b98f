use crate::packet_header::PacketHeader;
use anyhow::bail;

/// Sizing knobs for a single endpoint. Protocol tuning values (retry interval, retry ceiling,
///  ack window, RTT smoothing) are deliberately *not* in here - they are fixed constants of
///  the wire protocol, and both peers must agree on them.
pub struct EndPointConfig {
    /// Capacity of the staging buffer that `write` appends to and `flush` sends from, header
    ///  included. This bounds the size of a single packet: the protocol does not fragment, so
    ///  everything written between two flushes must fit in here. Writing past this capacity is
    ///  treated as a programming error and panics rather than silently truncating data.
    ///
    /// The channel below may impose its own (often much smaller) datagram limit; choosing this
    ///  value larger than what the channel can carry means oversized packets get dropped in
    ///  transit and retransmitted forever, so size it to the smallest link on the route.
    pub outgoing_capacity: usize,
}

impl EndPointConfig {
    /// Sized for the in-process pipe deployment, where a packet carries at most one tick's
    ///  worth of game messages.
    pub fn default_in_process() -> EndPointConfig {
        EndPointConfig {
            outgoing_capacity: 64 * 1024,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.outgoing_capacity <= PacketHeader::SERIALIZED_LEN {
            bail!("outgoing capacity {} leaves no room for payload after the {} byte header",
                self.outgoing_capacity, PacketHeader::SERIALIZED_LEN);
        }

        Ok(())
    }
}
