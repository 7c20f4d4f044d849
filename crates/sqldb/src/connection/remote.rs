//! Remote transport: SQL text is posted to an HTTP endpoint that runs it.
//!
//! The request is a form with `api_key` and `sql`. The endpoint answers with a JSON
//! envelope:
//!
//! ```json
//! {"status": "success", "data": [{"Id": 1}]}
//! {"status": "error", "message": "no such table: users"}
//! ```

use std::time::Duration;

use serde::Deserialize;
use sqldb_config::{BackendKind, DatabaseConfig};
use tracing::{debug, trace};
use ureq::Agent;

use super::Connection;
use crate::{
    dialect::{EmbeddedQuote, Quote, ServerQuote},
    error::{DbError, Result},
    row::Row,
    value::Value,
};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("sqldb/{}", env!("CARGO_PKG_VERSION"))),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an agent that hands back non-2xx responses instead of failing on them.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder()
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

pub struct RemoteConnection {
    endpoint: String,
    api_key: String,
    backend: BackendKind,
    client: ClientConfig,
    agent: Option<Agent>,
}

impl RemoteConnection {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            endpoint: config.host.trim().to_string(),
            api_key: config.pass.clone(),
            backend: config.backend,
            client: ClientConfig {
                timeout: config.timeout(),
                ..Default::default()
            },
            agent: None,
        }
    }

    fn post(&self, sql: &str) -> Result<Option<serde_json::Value>> {
        let agent = self
            .agent
            .as_ref()
            .ok_or_else(|| DbError::Connection("connection is not open".into()))?;

        let mut response = agent
            .post(&self.endpoint)
            .send_form([("api_key", self.api_key.as_str()), ("sql", sql)])
            .map_err(|e| DbError::Remote(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DbError::Remote(format!("Response not 200, but {status}")));
        }

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| DbError::Remote(e.to_string()))?;
        trace!("remote response: {body}");

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|_| DbError::Remote(format!("Response not JSON, but {body}")))?;

        if envelope.status != "success" {
            return Err(DbError::Remote(
                envelope
                    .message
                    .unwrap_or_else(|| format!("remote status `{}`", envelope.status)),
            ));
        }

        Ok(envelope.data)
    }
}

fn rows_from_json(data: Option<serde_json::Value>) -> Vec<Row> {
    let to_row = |object: serde_json::Map<String, serde_json::Value>| {
        object
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect::<Row>()
    };

    match data {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(object) => Some(to_row(object)),
                _ => None,
            })
            .collect(),
        Some(serde_json::Value::Object(object)) => vec![to_row(object)],
        _ => Vec::new(),
    }
}

impl Quote for RemoteConnection {
    fn quote(&self, value: &Value) -> String {
        match self.backend {
            BackendKind::Server => ServerQuote.quote(value),
            BackendKind::Embedded => EmbeddedQuote.quote(value),
        }
    }
}

impl Connection for RemoteConnection {
    fn open(&mut self) -> Result<()> {
        if self.agent.is_none() {
            debug!("using remote endpoint {}", self.endpoint);
            self.agent = Some(self.client.build());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.agent = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.agent.is_some()
    }

    /// The endpoint may report an affected row count as `data`; anything else counts as 0.
    fn execute(&mut self, sql: &str) -> Result<u64> {
        let data = self.post(sql)?;
        Ok(data.and_then(|d| d.as_u64()).unwrap_or(0))
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        Ok(rows_from_json(self.post(sql)?))
    }

    fn begin(&mut self) -> Result<()> {
        Err(DbError::Unsupported(
            "transactions over the remote transport".into(),
        ))
    }

    fn commit(&mut self) -> Result<()> {
        self.begin()
    }

    fn rollback(&mut self) -> Result<()> {
        self.begin()
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(None)
    }
}
