//! The application-message layer on top of the `transport` crate: a typed catalog of the
//!  messages the game's server, clients and bot agents exchange, plus the per-connection
//!  bookkeeping around them (parsing packet payloads into messages, keepalive ping / pong,
//!  marking peers disconnected when the transport gives up on them).
//!
//! Messages travel back-to-back inside a packet payload with no per-message length prefix:
//!  every message is self-delimiting through its fixed-size or count-prefixed body, and the
//!  receiver parses the payload front to back.

pub mod client_link;
pub mod connection;
pub mod dispatch;
pub mod messages;
pub mod peer_table;

#[cfg(test)]
mod tests {
    use tracing::Level;

    #[ctor::ctor(unsafe)]
    fn init_test_logging() {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(Level::TRACE)
            .try_init()
            .ok();
    }
}
