//! Redis-backed transactional store
//!
//! Implements the transactional contract with WATCH/MULTI/EXEC. WATCH state
//! is scoped to a Redis connection, so every transaction runs on a dedicated
//! connection of its own; plain reads go through a shared connection
//! manager. An EXEC answered with nil means a watched key changed and maps
//! to a clean conflict, not an error.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::Result;
use crate::store::{KvTransaction, KvWrite, TxnKvStore};

/// Fast store handle backed by Redis
pub struct RedisKvStore {
    client: redis::Client,
    reader: ConnectionManager,
}

impl RedisKvStore {
    /// Connects to the Redis instance at `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let reader = ConnectionManager::new(client.clone()).await?;
        debug!(url, "connected statistics fast store");
        Ok(Self { client, reader })
    }
}

#[async_trait]
impl TxnKvStore for RedisKvStore {
    async fn begin(&self) -> Result<Box<dyn KvTransaction>> {
        // Dedicated connection: WATCH on a pooled connection would leak
        // watches between unrelated transactions.
        let conn = self.client.get_async_connection().await?;
        Ok(Box::new(RedisTransaction { conn }))
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>> {
        let mut reader = self.reader.clone();
        Ok(reader.get(key).await?)
    }
}

struct RedisTransaction {
    conn: redis::aio::Connection,
}

#[async_trait]
impl KvTransaction for RedisTransaction {
    async fn watch(&mut self, key: &str) -> Result<()> {
        redis::cmd("WATCH")
            .arg(key)
            .query_async::<_, ()>(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.conn.get(key).await?)
    }

    async fn unwatch(&mut self) -> Result<()> {
        redis::cmd("UNWATCH")
            .query_async::<_, ()>(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn commit(&mut self, writes: Vec<KvWrite>) -> Result<bool> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for write in &writes {
            match write {
                KvWrite::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                KvWrite::Delete { key } => {
                    pipe.del(key).ignore();
                }
            }
        }
        // EXEC returns nil when a watched key changed; the redis crate
        // surfaces that as None.
        let response: Option<redis::Value> = pipe.query_async(&mut self.conn).await?;
        Ok(response.is_some())
    }
}
