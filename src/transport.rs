//! Transport abstraction (spec §9 design note): the Table Controller depends
//! only on this trait, never on `actix-web-actors` directly. `WsTransport` is
//! the production implementation, built the way the teacher's
//! `ws::session::WsSession` bridges an actix actor address to the socket.
//! `ChannelTransport` is an in-memory test double, playing the role the
//! teacher's `backend-test-support` crate plays for HTTP.

use actix::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::protocol::events::ServerEvent;

/// One outbound event delivered to a single connection.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct OutboundMessage(pub ServerEvent);

/// A single connection's outbound sink. The Table Controller holds one of
/// these per seated player and per spectator; it never knows whether the
/// connection is a live WebSocket or a test channel.
pub trait Outbound: Send + Sync {
    fn send(&self, event: ServerEvent);
}

/// Production transport: wraps an actix `Recipient` for a `WsSession`.
pub struct WsTransport {
    recipient: Recipient<OutboundMessage>,
}

impl WsTransport {
    pub fn new(recipient: Recipient<OutboundMessage>) -> Self {
        Self { recipient }
    }
}

impl Outbound for WsTransport {
    fn send(&self, event: ServerEvent) {
        if self.recipient.do_send(OutboundMessage(event)).is_err() {
            debug!("dropped outbound event: session mailbox gone");
        }
    }
}

/// Test/in-process transport: delivers events over an unbounded channel
/// instead of a socket. Used by integration tests that drive the Table
/// Controller without standing up an HTTP server.
pub struct ChannelTransport {
    sender: UnboundedSender<ServerEvent>,
}

impl ChannelTransport {
    pub fn new(sender: UnboundedSender<ServerEvent>) -> Self {
        Self { sender }
    }
}

impl Outbound for ChannelTransport {
    fn send(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_transport_delivers_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let transport = ChannelTransport::new(tx);
        transport.send(ServerEvent::TimerWarning {});
        let received = rx.try_recv().unwrap();
        matches!(received, ServerEvent::TimerWarning {});
    }
}
