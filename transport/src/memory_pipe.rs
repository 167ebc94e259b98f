use crate::buffers::ring_buffer::RingBuffer;
use crate::channel::Channel;
use crate::safe_converter::{PrecheckedCast, SafeCast};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// The reference [`Channel`] deployment: a pair of in-process circular byte buffers, one per
///  direction, shared between the two connected endpoints. Datagram boundaries are kept with a
///  u32 (BE) length prefix inside the ring.
///
/// Delivery is lossless and in-order *except* when a ring runs full, in which case the datagram
///  is dropped on the floor - which is exactly the failure mode the protocol above is built to
///  recover from.
pub struct MemoryPipe {
    incoming: Rc<RefCell<RingBuffer>>,
    outgoing: Rc<RefCell<RingBuffer>>,
}

impl MemoryPipe {
    const LEN_PREFIX: usize = size_of::<u32>();

    /// Create the two connected halves of a bidirectional pipe, each ring holding up to
    ///  `capacity` bytes of in-flight datagrams (length prefixes included).
    pub fn pair(capacity: usize) -> (MemoryPipe, MemoryPipe) {
        let a_to_b = Rc::new(RefCell::new(RingBuffer::new(capacity)));
        let b_to_a = Rc::new(RefCell::new(RingBuffer::new(capacity)));

        (
            MemoryPipe {
                incoming: b_to_a.clone(),
                outgoing: a_to_b.clone(),
            },
            MemoryPipe {
                incoming: a_to_b,
                outgoing: b_to_a,
            },
        )
    }
}

impl Channel for MemoryPipe {
    fn send(&mut self, data: &[u8]) {
        let mut ring = self.outgoing.borrow_mut();

        if ring.free() < Self::LEN_PREFIX + data.len() {
            warn!("pipe full, dropping {} byte datagram", data.len());
            return;
        }

        let len: u32 = data.len().prechecked_cast();
        ring.write(&len.to_be_bytes());
        ring.write(data);
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        let mut ring = self.incoming.borrow_mut();

        if ring.distance() < Self::LEN_PREFIX {
            return 0;
        }

        let mut len_bytes = [0u8; Self::LEN_PREFIX];
        ring.read(&mut len_bytes);
        let datagram_len: usize = u32::from_be_bytes(len_bytes).safe_cast();

        if datagram_len > buf.len() {
            warn!("skipping {} byte datagram that does not fit the caller's {} byte buffer",
                datagram_len, buf.len());
            ring.skip(datagram_len);
            return 0;
        }

        ring.read(&mut buf[..datagram_len]);
        datagram_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_both_directions() {
        let (mut a, mut b) = MemoryPipe::pair(64);

        a.send(&[1, 2, 3]);
        a.send(&[4, 5]);
        b.send(&[6]);

        let mut buf = [0u8; 16];
        assert_eq!(b.receive(&mut buf), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(b.receive(&mut buf), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(b.receive(&mut buf), 0);

        assert_eq!(a.receive(&mut buf), 1);
        assert_eq!(&buf[..1], &[6]);
    }

    #[test]
    fn test_receive_on_empty_pipe() {
        let (mut a, _b) = MemoryPipe::pair(64);

        let mut buf = [0u8; 16];
        assert_eq!(a.receive(&mut buf), 0);
    }

    #[test]
    fn test_oversized_datagram_is_skipped_not_truncated() {
        let (mut a, mut b) = MemoryPipe::pair(64);

        a.send(&[9; 10]);
        a.send(&[1, 2]);

        let mut small_buf = [0u8; 4];
        // the 10 byte datagram does not fit - it is consumed and discarded as a whole
        assert_eq!(b.receive(&mut small_buf), 0);
        // the following datagram is still intact
        assert_eq!(b.receive(&mut small_buf), 2);
        assert_eq!(&small_buf[..2], &[1, 2]);
    }

    #[test]
    fn test_full_pipe_drops_datagram() {
        let (mut a, mut b) = MemoryPipe::pair(16);

        a.send(&[7; 8]);  // 12 bytes with prefix
        a.send(&[8; 8]);  // does not fit any more - dropped

        let mut buf = [0u8; 16];
        assert_eq!(b.receive(&mut buf), 8);
        assert_eq!(&buf[..8], &[7; 8]);
        assert_eq!(b.receive(&mut buf), 0);
    }

    #[test]
    fn test_many_datagrams_wrap_the_ring() {
        let (mut a, mut b) = MemoryPipe::pair(16);

        let mut buf = [0u8; 16];
        for round in 0u8..20 {
            a.send(&[round, round, round]);
            assert_eq!(b.receive(&mut buf), 3);
            assert_eq!(&buf[..3], &[round, round, round]);
        }
    }
}
