use crate::dispatch::ServerMessageHandler;
use crate::messages::{ClientMessage, ServerMessage};
use bytes::{Buf, BytesMut};
use tracing::{trace, warn};
use transport::end_point::EndPoint;
use transport::packet_header::PacketHeader;

/// The client / bot agent side of a connection to the server: staging outgoing client
///  messages, dispatching incoming server messages, and answering keepalive pings. Mirrors
///  [`crate::connection::Connection`] on the server side, minus the ping initiative - the
///  server probes, the client only answers.
pub struct ClientLink {
    end_point: EndPoint,
    read_buffer: Vec<u8>,
    connected: bool,
}

impl ClientLink {
    pub fn new(end_point: EndPoint, read_buffer_len: usize) -> ClientLink {
        ClientLink {
            end_point,
            read_buffer: vec![0; read_buffer_len],
            connected: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn rtt_millis(&self) -> i64 {
        self.end_point.rtt_millis()
    }

    /// stage a message for the next packet to the server
    pub fn send(&mut self, message: &ClientMessage) {
        let mut buf = BytesMut::new();
        message.ser(&mut buf);
        self.end_point.write(&buf);
    }

    /// Drain all packets the server sent since the last tick. Keepalive pings are answered
    ///  with a pong right here and not surfaced to the handler.
    pub fn drain(&mut self, handler: &mut dyn ServerMessageHandler) -> anyhow::Result<()> {
        loop {
            let len = self.end_point.read(&mut self.read_buffer);
            if len == 0 {
                return Ok(());
            }

            let mut parse: &[u8] = &self.read_buffer[PacketHeader::SERIALIZED_LEN..len];
            let mut messages = Vec::new();
            while parse.has_remaining() {
                messages.push(ServerMessage::deser(&mut parse)?);
            }

            for message in messages {
                match message {
                    ServerMessage::Ping => {
                        trace!("answering keepalive ping");
                        self.send(&ClientMessage::Pong);
                    }
                    other => handler.on_message(other),
                }
            }
        }
    }

    /// Per-tick service: flush staged messages and retransmissions. Retry exhaustion is
    ///  absorbed here and turned into `connected = false`.
    pub fn tick(&mut self) {
        if !self.connected {
            return;
        }

        if let Err(e) = self.end_point.flush() {
            warn!("server link: {} - marking disconnected", e);
            self.connected = false;
        }
    }
}
