//! Directory of live WebSocket connections, keyed by username.

use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use super::protocol::ServerMessage;

/// Messages a socket may have queued before it counts as stalled.
pub const OUTBOX_CAPACITY: usize = 64;

/// Outbound queue of one socket. The socket's writer task drains it; once
/// that task is gone the sender reports closed.
pub type Outbox = mpsc::Sender<ServerMessage>;

pub fn outbox() -> (Outbox, mpsc::Receiver<ServerMessage>) {
    mpsc::channel(OUTBOX_CAPACITY)
}

struct Connection {
    game_id: i64,
    outbox: Outbox,
}

/// One live connection per username. Registering again replaces the
/// previous connection, whatever game it was in.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the game of the connection this one replaced, if any.
    pub async fn register(&self, username: &str, outbox: Outbox, game_id: i64) -> Option<i64> {
        self.connections
            .write()
            .await
            .insert(username.to_string(), Connection { game_id, outbox })
            .map(|previous| previous.game_id)
    }

    /// Remove `username` only while it is connected to `game_id`. A
    /// connection the user has since moved to another game is left alone.
    pub async fn remove_from(&self, username: &str, game_id: i64) -> bool {
        let mut connections = self.connections.write().await;
        if connections.get(username).is_some_and(|c| c.game_id == game_id) {
            connections.remove(username);
            true
        } else {
            false
        }
    }

    /// Drop every entry that sends through `outbox` (its socket closed).
    /// Returns the usernames removed.
    pub async fn remove_outbox(&self, outbox: &Outbox) -> Vec<String> {
        let mut connections = self.connections.write().await;
        let gone: Vec<String> = connections
            .iter()
            .filter(|(_, c)| c.outbox.same_channel(outbox))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &gone {
            connections.remove(name);
        }
        gone
    }

    /// The game `username` is currently connected to.
    pub async fn game_of(&self, username: &str) -> Option<i64> {
        self.connections.read().await.get(username).map(|c| c.game_id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Queue `message` for every connection in `game_id`, skipping `sender`
    /// unless `include_sender`. Never waits on a slow socket: a connection
    /// whose queue is full is dropped like a closed one. Returns how many
    /// connections the message was queued for.
    pub async fn broadcast(
        &self,
        sender: &str,
        game_id: i64,
        message: &ServerMessage,
        include_sender: bool,
    ) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();
        {
            let connections = self.connections.read().await;
            for (name, conn) in connections.iter() {
                if conn.outbox.is_closed() {
                    dead.push((name.clone(), conn.outbox.clone()));
                    continue;
                }
                if conn.game_id != game_id || (!include_sender && name == sender) {
                    continue;
                }
                match conn.outbox.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(user = %name, game_id, "Outbox full, dropping stalled connection");
                        dead.push((name.clone(), conn.outbox.clone()));
                    }
                    Err(TrySendError::Closed(_)) => dead.push((name.clone(), conn.outbox.clone())),
                }
            }
        }

        if !dead.is_empty() {
            let mut connections = self.connections.write().await;
            for (name, outbox) in dead {
                // Only prune if the entry was not replaced in the meantime.
                if connections.get(&name).is_some_and(|c| c.outbox.same_channel(&outbox)) {
                    debug!(user = %name, "Pruning connection");
                    connections.remove(&name);
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> ServerMessage {
        ServerMessage::notification(text)
    }

    #[tokio::test]
    async fn test_broadcast_scopes_to_game_and_skips_sender() {
        let registry = ConnectionRegistry::new();
        let (a_tx, mut a_rx) = outbox();
        let (b_tx, mut b_rx) = outbox();
        let (c_tx, mut c_rx) = outbox();
        registry.register("a", a_tx, 7).await;
        registry.register("b", b_tx, 7).await;
        registry.register("c", c_tx, 8).await;

        let sent = registry.broadcast("a", 7, &note("hello"), false).await;
        assert_eq!(sent, 1);
        assert_eq!(b_rx.try_recv().unwrap(), note("hello"));
        assert!(a_rx.try_recv().is_err());
        assert!(c_rx.try_recv().is_err());

        let sent = registry.broadcast("a", 7, &note("all"), true).await;
        assert_eq!(sent, 2);
        assert_eq!(a_rx.try_recv().unwrap(), note("all"));
    }

    #[tokio::test]
    async fn test_closed_connections_are_pruned() {
        let registry = ConnectionRegistry::new();
        let (a_tx, _a_rx) = outbox();
        let (b_tx, b_rx) = outbox();
        registry.register("a", a_tx, 1).await;
        registry.register("b", b_tx, 1).await;
        drop(b_rx);

        let sent = registry.broadcast("a", 1, &note("x"), false).await;
        assert_eq!(sent, 0);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.game_of("b").await, None);
    }

    #[tokio::test]
    async fn test_stalled_connection_is_dropped_without_blocking() {
        let registry = ConnectionRegistry::new();
        let (a_tx, mut a_rx) = outbox();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        registry.register("a", a_tx, 1).await;
        registry.register("slow", slow_tx, 1).await;

        assert_eq!(registry.broadcast("z", 1, &note("first"), false).await, 2);
        // "slow" never drains, so the second message finds its queue full.
        assert_eq!(registry.broadcast("z", 1, &note("second"), false).await, 1);

        assert_eq!(registry.game_of("slow").await, None);
        assert_eq!(registry.game_of("a").await, Some(1));
        assert_eq!(a_rx.try_recv().unwrap(), note("first"));
        assert_eq!(a_rx.try_recv().unwrap(), note("second"));
        assert_eq!(slow_rx.try_recv().unwrap(), note("first"));
        assert!(slow_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reregister_replaces_previous_connection() {
        let registry = ConnectionRegistry::new();
        let (old_tx, mut old_rx) = outbox();
        let (new_tx, mut new_rx) = outbox();
        assert_eq!(registry.register("a", old_tx, 1).await, None);
        assert_eq!(registry.register("a", new_tx, 2).await, Some(1));
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.game_of("a").await, Some(2));

        registry.broadcast("z", 2, &note("x"), false).await;
        assert!(old_rx.try_recv().is_err());
        assert_eq!(new_rx.try_recv().unwrap(), note("x"));
    }

    #[tokio::test]
    async fn test_remove_from_ignores_other_games() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = outbox();
        registry.register("a", tx, 2).await;

        assert!(!registry.remove_from("a", 1).await);
        assert_eq!(registry.game_of("a").await, Some(2));
        assert!(registry.remove_from("a", 2).await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_outbox_only_drops_that_socket() {
        let registry = ConnectionRegistry::new();
        let (shared_tx, _shared_rx) = outbox();
        let (other_tx, _other_rx) = outbox();
        registry.register("a", shared_tx.clone(), 1).await;
        registry.register("b", other_tx, 1).await;

        let gone = registry.remove_outbox(&shared_tx).await;
        assert_eq!(gone, vec!["a".to_string()]);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.game_of("b").await, Some(1));
    }
}
