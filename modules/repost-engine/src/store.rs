use anyhow::Result;
use async_trait::async_trait;

use upstash_client::UpstashClient;

/// Key-value operations the cache and analytics layers are built on.
///
/// The production implementation talks to Upstash Redis over REST; tests
/// use the in-memory store from [`crate::testing`]. Implementations are
/// shared behind an `Arc` and must be safe to call concurrently.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value` with an expiry of `ttl_secs` seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Increment an integer counter, returning the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Add a member to a set. Returns 1 if the member was new, 0 otherwise.
    async fn sadd(&self, key: &str, member: &str) -> Result<i64>;

    /// Store the union of `keys` under `dest`, returning its cardinality.
    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<i64>;

    /// Cardinality of a set. Missing keys count as empty.
    async fn scard(&self, key: &str) -> Result<i64>;

    /// Prepend a value to a list, returning the new list length.
    async fn lpush(&self, key: &str, value: &str) -> Result<i64>;

    /// Inclusive range of list elements, newest first for lpush'd lists.
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Trim a list to the inclusive range, discarding the rest.
    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()>;
}

/// Store backed by the Upstash Redis REST API.
pub struct UpstashStore {
    client: UpstashClient,
}

impl UpstashStore {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: UpstashClient::new(base_url, token),
        }
    }
}

#[async_trait]
impl KeyValueStore for UpstashStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.client.get(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        Ok(self.client.set_ex(key, value, ttl_secs).await?)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        Ok(self.client.incr(key).await?)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<i64> {
        Ok(self.client.sadd(key, member).await?)
    }

    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<i64> {
        Ok(self.client.sunionstore(dest, keys).await?)
    }

    async fn scard(&self, key: &str) -> Result<i64> {
        Ok(self.client.scard(key).await?)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64> {
        Ok(self.client.lpush(key, value).await?)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        Ok(self.client.lrange(key, start, stop).await?)
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        Ok(self.client.ltrim(key, start, stop).await?)
    }
}

/// Store used when no Upstash credentials are configured. Reads come back
/// empty and writes vanish, so caching and analytics degrade to off while
/// the rest of the service keeps working.
pub struct NoopStore;

#[async_trait]
impl KeyValueStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Ok(())
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        Ok(0)
    }

    async fn sadd(&self, _key: &str, _member: &str) -> Result<i64> {
        Ok(0)
    }

    async fn sunionstore(&self, _dest: &str, _keys: &[String]) -> Result<i64> {
        Ok(0)
    }

    async fn scard(&self, _key: &str) -> Result<i64> {
        Ok(0)
    }

    async fn lpush(&self, _key: &str, _value: &str) -> Result<i64> {
        Ok(0)
    }

    async fn lrange(&self, _key: &str, _start: i64, _stop: i64) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn ltrim(&self, _key: &str, _start: i64, _stop: i64) -> Result<()> {
        Ok(())
    }
}
