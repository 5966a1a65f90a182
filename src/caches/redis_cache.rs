//! Redis-backed key-value cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};

use super::key_value_cache::{CacheError, KeyValueCache, Result, ScanCursor, ScanPage};

/// Default Redis URL when none is configured.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default bound on establishing a connection, handshake included.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Default bound on a single command round-trip.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 500;

/// Reconnect attempts after the first one fails.
const CONNECT_RETRIES: usize = 1;

/// Upper bound on the delay between reconnect attempts, in milliseconds.
const MAX_RETRY_DELAY_MS: u64 = 500;

/// A Redis implementation of `KeyValueCache`.
///
/// Holds a [`ConnectionManager`], which multiplexes one connection across
/// concurrent callers and reconnects after failures. Enumeration uses
/// `SCAN ... MATCH ... COUNT`, never `KEYS`.
///
/// Connecting and every command are bounded by timeouts, so a server that
/// accepts connections but never answers surfaces as a connection error.
#[derive(Clone)]
pub struct RedisKeyValueCache {
    conn: ConnectionManager,
}

impl RedisKeyValueCache {
    /// Connect to the Redis server at `url`.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(response_timeout)
            .set_number_of_retries(CONNECT_RETRIES)
            .set_max_delay(MAX_RETRY_DELAY_MS);
        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
        || err.is_io_error()
    {
        CacheError::Connection(err.to_string())
    } else if err.kind() == redis::ErrorKind::TypeError {
        CacheError::Encoding(err.to_string())
    } else {
        CacheError::Command(err.to_string())
    }
}

#[async_trait]
impl KeyValueCache for RedisKeyValueCache {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(map_redis_error)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        conn.del::<_, usize>(keys).await.map_err(map_redis_error)
    }

    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        let position = match cursor {
            ScanCursor::Start => "0",
            ScanCursor::Continue(position) => position.as_str(),
            ScanCursor::Done => {
                return Ok(ScanPage {
                    keys: Vec::new(),
                    cursor: ScanCursor::Done,
                });
            }
        };

        let mut conn = self.conn.clone();
        let (next, keys): (String, Vec<String>) = redis::cmd("SCAN")
            .arg(position)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count.max(1))
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        // Redis signals the end of an enumeration by returning cursor 0.
        let cursor = if next == "0" {
            ScanCursor::Done
        } else {
            ScanCursor::Continue(next)
        };

        Ok(ScanPage { keys, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Accept connections and hold them open without ever replying.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("redis://{}", addr)
    }

    #[tokio::test]
    async fn test_connect_to_silent_server_times_out() {
        let url = silent_server().await;

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            RedisKeyValueCache::connect(
                &url,
                Duration::from_millis(200),
                Duration::from_millis(200),
            ),
        )
        .await
        .expect("connect was not bounded by its timeout");

        assert!(matches!(result, Err(CacheError::Connection(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = RedisKeyValueCache::connect(
            "not-a-url",
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .await;
        assert!(result.is_err());
    }
}
