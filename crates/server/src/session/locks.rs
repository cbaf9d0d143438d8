use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = Arc<StdMutex<HashMap<i64, Arc<Mutex<()>>>>>;

/// One async mutex per game id. Commands for the same game run one at a
/// time from load to fan-out; different games never wait on each other.
/// An entry lives only while someone holds or waits on it.
#[derive(Default)]
pub struct GameLocks {
    table: LockTable,
}

/// Exclusive hold on one game. Dropping it releases the game and forgets
/// the lock if nobody else is waiting.
pub struct GameGuard {
    game_id: i64,
    table: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, game_id: i64) -> GameGuard {
        let lock = self
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(game_id)
            .or_default()
            .clone();
        GameGuard {
            game_id,
            table: self.table.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of games with a live lock entry.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for GameGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters clone the Arc under this same table lock, so a count of
        // one means the table holds the only reference.
        if table.get(&self.game_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            table.remove(&self.game_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_game_is_exclusive() {
        let locks = GameLocks::new();
        let held = locks.lock(1).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.lock(1)).await;
        assert!(waiting.is_err());
        drop(held);
        let _again = locks.lock(1).await;
    }

    #[tokio::test]
    async fn test_different_games_do_not_block() {
        let locks = GameLocks::new();
        let _one = locks.lock(1).await;
        let two = tokio::time::timeout(Duration::from_millis(50), locks.lock(2)).await;
        assert!(two.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_forgotten() {
        let locks = GameLocks::new();
        for game_id in 0..1000 {
            let _guard = locks.lock(game_id).await;
        }
        assert_eq!(locks.len(), 0);

        let held = locks.lock(5).await;
        assert_eq!(locks.len(), 1);
        drop(held);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_entry_survives_while_a_waiter_queues() {
        let locks = Arc::new(GameLocks::new());
        let held = locks.lock(1).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };
        // Let the waiter reach the mutex before the holder lets go.
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
