//! Deterministic channel helpers for protocol tests and simulations. Production deployments
//!  wire endpoints to [`crate::memory_pipe::MemoryPipe`] or a real datagram transport; the
//!  helpers in here exist to script delivery and inspect what an endpoint put on the wire.

use crate::channel::Channel;
use crate::packet_header::PacketHeader;
use bytes::{BufMut, BytesMut};
use std::cell::RefCell;
use std::cmp::min;
use std::collections::VecDeque;
use std::rc::Rc;

/// A [`Channel`] whose incoming side is scripted by the test and whose outgoing side records
///  every sent datagram. Clones share the same queues, so a test can keep one handle for
///  scripting and assertions while the endpoint owns the other.
#[derive(Clone)]
pub struct ScriptedChannel {
    incoming: Rc<RefCell<VecDeque<Vec<u8>>>>,
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl ScriptedChannel {
    pub fn new() -> ScriptedChannel {
        ScriptedChannel {
            incoming: Rc::new(RefCell::new(VecDeque::new())),
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn enqueue_incoming(&self, datagram: &[u8]) {
        self.incoming.borrow_mut().push_back(datagram.to_vec());
    }

    /// everything sent through this channel so far, oldest first
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }

    pub fn clear_sent(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        ScriptedChannel::new()
    }
}

impl Channel for ScriptedChannel {
    fn send(&mut self, data: &[u8]) {
        self.sent.borrow_mut().push(data.to_vec());
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        match self.incoming.borrow_mut().pop_front() {
            None => 0,
            Some(datagram) => {
                let len = min(datagram.len(), buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                len
            }
        }
    }
}

/// assemble the bytes of a well-formed packet as a peer would have sent it
pub fn raw_packet(sequence: u32, ack: u32, ack_bitfield: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    PacketHeader { sequence, ack, ack_bitfield }.ser(&mut buf);
    buf.put_slice(payload);
    buf.to_vec()
}
