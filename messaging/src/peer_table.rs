use crate::connection::{Connection, PeerId};
use crate::messages::ServerMessage;
use rustc_hash::FxHashMap;
use tracing::debug;

/// The server's registry of peer connections, one entry per client or bot agent wired up at
///  channel-setup time.
pub struct PeerTable {
    peers: FxHashMap<PeerId, Connection>,
}

impl PeerTable {
    pub fn new() -> PeerTable {
        PeerTable {
            peers: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, connection: Connection) {
        debug!("registering peer {}", connection.peer_id());
        self.peers.insert(connection.peer_id(), connection);
    }

    pub fn get_mut(&mut self, peer_id: PeerId) -> Option<&mut Connection> {
        self.peers.get_mut(&peer_id)
    }

    pub fn connected_ids(&self) -> Vec<PeerId> {
        let mut ids = self.peers.values()
            .filter(|connection| connection.is_connected())
            .map(|connection| connection.peer_id())
            .collect::<Vec<_>>();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// stage a message for every connected peer
    pub fn broadcast(&mut self, message: &ServerMessage) {
        for connection in self.peers.values_mut().filter(|connection| connection.is_connected()) {
            connection.send(message);
        }
    }

    /// per-tick service for all connections: keepalive, flush, disconnect bookkeeping
    pub fn tick_all(&mut self) {
        for connection in self.peers.values_mut() {
            connection.tick();
        }
    }

    /// drop the entries for peers the transport has given up on
    pub fn remove_disconnected(&mut self) {
        self.peers.retain(|peer_id, connection| {
            if !connection.is_connected() {
                debug!("removing disconnected peer {}", peer_id);
            }
            connection.is_connected()
        });
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for PeerTable {
    fn default() -> Self {
        PeerTable::new()
    }
}
