use crate::buffers::fixed_buffer::FixedBuf;
use crate::channel::Channel;
use crate::config::EndPointConfig;
use crate::packet_header::PacketHeader;
use crate::rtt::RttEstimator;
use crate::time::Clock;
use anyhow::bail;
use bytes::BufMut;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, span, trace, warn, Level};
use uuid::Uuid;

/// a sent packet retained byte-for-byte until it is acknowledged or given up on
struct SentPacket {
    sent_at_millis: u64,
    retries: u32,
    packet: Vec<u8>,
}

/// EndPoint is the place where all parts of the protocol come together: it stages outgoing
///  bytes, assigns sequence numbers, piggybacks selective acks on every flushed packet, retains
///  and retransmits unacknowledged packets, and maintains the smoothed RTT estimate.
///
/// One EndPoint holds one side's state for a single logical connection, owns a handle to the
///  [`Channel`] below it, and is driven by one `read` / `write ... flush` cycle per simulation
///  tick. It is deliberately single-threaded: all retry timing is checked against the injected
///  [`Clock`] inside `flush`, so timing granularity is bounded by the caller's tick rate.
///
/// Once `flush` has reported the peer unreachable, the EndPoint is permanently dead - there is
///  no reconnection, the caller drops it and builds a fresh one if desired.
pub struct EndPoint {
    channel: Box<dyn Channel>,
    clock: Rc<dyn Clock>,
    outgoing: FixedBuf,
    local_sequence_number: u32,
    remote_sequence_number: u32,
    received_queue: VecDeque<u32>,
    sent_packets: BTreeMap<u32, SentPacket>,
    rtt: RttEstimator,
    last_sent_millis: u64,
}

impl EndPoint {
    pub const RETRY_INTERVAL_MS: u64 = 1000;
    pub const MAX_RETRIES: u32 = 5;

    /// the 32 sequence numbers before the ack value that the bitfield can confirm
    pub const ACK_WINDOW: u32 = 32;

    /// ack value plus ack window
    pub const RECEIVED_QUEUE_LEN: usize = 33;

    pub fn new(channel: Box<dyn Channel>, clock: Rc<dyn Clock>, config: &EndPointConfig) -> anyhow::Result<EndPoint> {
        config.validate()?;

        let mut outgoing = FixedBuf::new(config.outgoing_capacity);
        outgoing.put_bytes(0, PacketHeader::SERIALIZED_LEN);

        let last_sent_millis = clock.now_millis();
        Ok(EndPoint {
            channel,
            clock,
            outgoing,
            local_sequence_number: 0,
            remote_sequence_number: 0,
            received_queue: VecDeque::with_capacity(Self::RECEIVED_QUEUE_LEN),
            sent_packets: BTreeMap::new(),
            rtt: RttEstimator::new(),
            last_sent_millis,
        })
    }

    /// Append application bytes to the packet staged for the next `flush`. The data is treated
    ///  as an opaque byte run: message framing inside the payload is the caller's concern.
    pub fn write(&mut self, data: &[u8]) {
        trace!("staging {} bytes for the next flush", data.len());
        self.outgoing.put_slice(data);
    }

    /// Drive the send side for this tick: retransmit overdue packets first, then - if anything
    ///  was staged since the last flush - seal the staged packet with a fresh header and send it.
    ///
    /// An `Err` means retry exhaustion: some packet went unacknowledged through
    ///  [`MAX_RETRIES`](Self::MAX_RETRIES) retransmissions, the whole outstanding send window
    ///  has been discarded, and the peer must be considered gone for good.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        let now = self.clock.now_millis();

        let mut exhausted = false;
        for (&sequence, pending) in self.sent_packets.iter_mut() {
            if now - pending.sent_at_millis < Self::RETRY_INTERVAL_MS {
                continue;
            }

            debug!("packet {} unacknowledged for {} ms, retransmitting (retry {})",
                sequence, now - pending.sent_at_millis, pending.retries + 1);
            self.channel.send(&pending.packet);
            self.last_sent_millis = now;
            pending.sent_at_millis = now;
            pending.retries += 1;

            if pending.retries >= Self::MAX_RETRIES {
                exhausted = true;
                break;
            }
        }

        if exhausted {
            warn!("a packet went through {} retransmissions without acknowledgment, discarding {} outstanding packets",
                Self::MAX_RETRIES, self.sent_packets.len());
            self.sent_packets.clear();
            bail!("peer unreachable after {} retransmissions", Self::MAX_RETRIES);
        }

        if self.outgoing.len() == PacketHeader::SERIALIZED_LEN {
            // nothing was written since the last flush - no empty packets on the wire
            return Ok(());
        }

        let header = PacketHeader {
            sequence: self.local_sequence_number,
            ack: self.remote_sequence_number,
            ack_bitfield: self.ack_bitfield(),
        };
        self.local_sequence_number = self.local_sequence_number.wrapping_add(1);

        let mut header_buf = &mut self.outgoing.as_mut()[..PacketHeader::SERIALIZED_LEN];
        header.ser(&mut header_buf);

        trace!("sending packet {} ({} bytes, ack {}, bitfield {:#010x})",
            header.sequence, self.outgoing.len(), header.ack, header.ack_bitfield);
        self.channel.send(self.outgoing.as_ref());
        self.last_sent_millis = now;

        self.sent_packets.insert(header.sequence, SentPacket {
            sent_at_millis: now,
            retries: 0,
            packet: self.outgoing.as_ref().to_vec(),
        });

        self.outgoing.truncate(PacketHeader::SERIALIZED_LEN);
        Ok(())
    }

    /// Pull one packet from the channel into `buf`, updating sequence / ack / RTT bookkeeping.
    ///
    /// Returns the packet's total length (header included) with the application payload at
    ///  `buf[PacketHeader::SERIALIZED_LEN..len]`, or 0 when nothing usable arrived - whether
    ///  because the channel was empty or because a truncated or foreign packet was dropped.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let len = self.channel.receive(buf);
        if len == 0 {
            return 0;
        }

        let correlation_id = Uuid::new_v4();
        let span = span!(Level::TRACE, "packet_received", ?correlation_id);
        let _entered = span.enter();

        if len < PacketHeader::SERIALIZED_LEN {
            debug!("incomplete packet header ({} bytes), dropping", len);
            return 0;
        }

        let header = match PacketHeader::deser(&mut &buf[..len]) {
            Ok(header) => header,
            Err(e) => {
                debug!("dropping packet: {}", e);
                return 0;
            }
        };

        trace!("received packet {} ({} bytes, ack {}, bitfield {:#010x})",
            header.sequence, len, header.ack, header.ack_bitfield);

        if header.sequence > self.remote_sequence_number {
            self.remote_sequence_number = header.sequence;
        }

        self.received_queue.push_front(header.sequence);
        self.received_queue.truncate(Self::RECEIVED_QUEUE_LEN);

        self.process_acks(&header);

        len
    }

    /// timestamp of the most recent transmission, for the keepalive collaborator
    pub fn last_sent_millis(&self) -> u64 {
        self.last_sent_millis
    }

    pub fn rtt_millis(&self) -> i64 {
        self.rtt.millis()
    }

    pub fn pending_send_count(&self) -> usize {
        self.sent_packets.len()
    }

    fn ack_bitfield(&self) -> u32 {
        let mut bitfield = 0u32;
        for offset in 1..=Self::ACK_WINDOW {
            let sequence = self.remote_sequence_number.wrapping_sub(offset);
            if self.received_queue.contains(&sequence) {
                bitfield |= 1 << (32 - offset);
            }
        }
        bitfield
    }

    fn process_acks(&mut self, header: &PacketHeader) {
        let now = self.clock.now_millis();

        for offset in 0..=Self::ACK_WINDOW {
            if offset != 0 && (header.ack_bitfield & (1 << (32 - offset))) == 0 {
                continue;
            }

            let acknowledged = header.ack.wrapping_sub(offset);
            if let Some(pending) = self.sent_packets.remove(&acknowledged) {
                self.rtt.on_sample((now - pending.sent_at_millis) as i64);
                trace!("packet {} acknowledged after {} ms, smoothed rtt now {} ms",
                    acknowledged, now - pending.sent_at_millis, self.rtt.millis());
            }
        }
    }
}
