pub mod error;

pub use error::{Result, UpstashError};

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Response envelope for every Upstash REST command.
#[derive(Debug, Deserialize)]
struct CommandResponse {
    result: Value,
}

/// Client for the Upstash Redis REST API. Each call sends a single Redis
/// command as a JSON array to `POST {base_url}/` with bearer auth.
pub struct UpstashClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl UpstashClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Send one Redis command. Arguments are passed verbatim; numeric
    /// arguments must already be formatted as strings.
    async fn command(&self, cmd: &[&str]) -> Result<Value> {
        debug!(command = cmd.first().copied().unwrap_or(""), "Upstash command");

        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&cmd)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(UpstashError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: CommandResponse = serde_json::from_str(&resp.text().await?)?;
        Ok(envelope.result)
    }

    fn expect_int(value: Value) -> Result<i64> {
        value
            .as_i64()
            .ok_or_else(|| UpstashError::UnexpectedResponse(value.to_string()))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.command(&["GET", key]).await?;
        match result {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(UpstashError::UnexpectedResponse(other.to_string())),
        }
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let ttl = ttl_secs.to_string();
        self.command(&["SET", key, value, "EX", &ttl]).await?;
        Ok(())
    }

    pub async fn incr(&self, key: &str) -> Result<i64> {
        let result = self.command(&["INCR", key]).await?;
        Self::expect_int(result)
    }

    pub async fn sadd(&self, key: &str, member: &str) -> Result<i64> {
        let result = self.command(&["SADD", key, member]).await?;
        Self::expect_int(result)
    }

    /// Store the union of `keys` under `dest`. Returns the cardinality of
    /// the resulting set.
    pub async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<i64> {
        let mut cmd = vec!["SUNIONSTORE", dest];
        cmd.extend(keys.iter().map(String::as_str));
        let result = self.command(&cmd).await?;
        Self::expect_int(result)
    }

    pub async fn scard(&self, key: &str) -> Result<i64> {
        let result = self.command(&["SCARD", key]).await?;
        Self::expect_int(result)
    }

    pub async fn lpush(&self, key: &str, value: &str) -> Result<i64> {
        let result = self.command(&["LPUSH", key, value]).await?;
        Self::expect_int(result)
    }

    pub async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let start = start.to_string();
        let stop = stop.to_string();
        let result = self.command(&["LRANGE", key, &start, &stop]).await?;
        match result {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(UpstashError::UnexpectedResponse(other.to_string())),
                })
                .collect(),
            other => Err(UpstashError::UnexpectedResponse(other.to_string())),
        }
    }

    pub async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        let start = start.to_string();
        let stop = stop.to_string();
        self.command(&["LTRIM", key, &start, &stop]).await?;
        Ok(())
    }
}
