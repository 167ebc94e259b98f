use crate::messages::{ClientMessage, ServerMessage};
use bytes::Buf;
#[cfg(test)] use mockall::automock;

/// Application callback for messages arriving at a client or bot agent.
#[cfg_attr(test, automock)]
pub trait ServerMessageHandler {
    fn on_message(&mut self, message: ServerMessage);
}

/// Application callback for messages arriving at the server.
#[cfg_attr(test, automock)]
pub trait ClientMessageHandler {
    fn on_message(&mut self, message: ClientMessage);
}

/// Parse a packet payload (everything after the shared header) into server messages, invoking
///  the handler once per message, front to back.
///
/// NB: a malformed tail fails the call, but messages before it have been dispatched already -
///  the payload is consumed incrementally, not validated up front.
pub fn dispatch_server_payload(mut payload: &[u8], handler: &mut dyn ServerMessageHandler) -> anyhow::Result<()> {
    while payload.has_remaining() {
        handler.on_message(ServerMessage::deser(&mut payload)?);
    }
    Ok(())
}

/// The server-side counterpart of [`dispatch_server_payload`].
pub fn dispatch_client_payload(mut payload: &[u8], handler: &mut dyn ClientMessageHandler) -> anyhow::Result<()> {
    while payload.has_remaining() {
        handler.on_message(ClientMessage::deser(&mut payload)?);
    }
    Ok(())
}
