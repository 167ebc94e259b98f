use crate::dispatch::{dispatch_client_payload, ClientMessageHandler};
use crate::messages::ServerMessage;
use bytes::BytesMut;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use tracing::{trace, warn};
use transport::end_point::EndPoint;
use transport::packet_header::PacketHeader;
use transport::time::Clock;

/// the server's identifier for one connected client or bot agent
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PeerId(pub u32);

impl Display for PeerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// If nothing was transmitted to a peer for this long, the next tick sends a keepalive ping.
///  This keeps acks (and the disconnect detection built on them) flowing even while the game
///  itself has nothing to say, e.g. while waiting for another player's turn.
pub const KEEPALIVE_IDLE_MILLIS: u64 = 300;

/// The server-side bookkeeping for one peer: the transport endpoint, keepalive, and the
///  `connected` flag that retry exhaustion downgrades. A Connection that went unconnected
///  stays dead - the peer has to re-join through fresh channel setup.
pub struct Connection {
    peer_id: PeerId,
    end_point: EndPoint,
    clock: Rc<dyn Clock>,
    read_buffer: Vec<u8>,
    connected: bool,
}

impl Connection {
    pub fn new(peer_id: PeerId, end_point: EndPoint, clock: Rc<dyn Clock>, read_buffer_len: usize) -> Connection {
        Connection {
            peer_id,
            end_point,
            clock,
            read_buffer: vec![0; read_buffer_len],
            connected: true,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn rtt_millis(&self) -> i64 {
        self.end_point.rtt_millis()
    }

    /// stage a message for this peer's next packet
    pub fn send(&mut self, message: &ServerMessage) {
        let mut buf = BytesMut::new();
        message.ser(&mut buf);
        self.end_point.write(&buf);
    }

    /// drain all packets the peer sent since the last tick, dispatching their messages
    pub fn drain(&mut self, handler: &mut dyn ClientMessageHandler) -> anyhow::Result<()> {
        loop {
            let len = self.end_point.read(&mut self.read_buffer);
            if len == 0 {
                return Ok(());
            }
            dispatch_client_payload(&self.read_buffer[PacketHeader::SERIALIZED_LEN..len], handler)?;
        }
    }

    /// Per-tick service: send a keepalive ping if the link has been idle, then flush. Retry
    ///  exhaustion is absorbed here and turned into `connected = false`.
    pub fn tick(&mut self) {
        if !self.connected {
            return;
        }

        let idle_millis = self.clock.now_millis() - self.end_point.last_sent_millis();
        if idle_millis > KEEPALIVE_IDLE_MILLIS {
            trace!("peer {}: idle for {} ms, sending keepalive ping", self.peer_id, idle_millis);
            self.send(&ServerMessage::Ping);
        }

        if let Err(e) = self.end_point.flush() {
            warn!("peer {}: {} - marking disconnected", self.peer_id, e);
            self.connected = false;
        }
    }
}
