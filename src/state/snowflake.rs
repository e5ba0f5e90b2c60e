// Snowflake SQL API source
// Submits statements over the v2 REST endpoint and collects every result partition
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::source::{Cell, DataSourceError, SourceResult, Table, TabularSource};
use crate::config::{SnowflakeConfig, TokenType};

const STATEMENTS_PATH: &str = "/api/v2/statements";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct SnowflakeSource {
    client: Client,
    base_url: String,
    warehouse: String,
    database: String,
    role: Option<String>,
    token: String,
    token_type: TokenType,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    database: &'a str,
    schema: &'a str,
    warehouse: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    code: Option<String>,
    message: Option<String>,
    statement_handle: Option<String>,
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    row_type: Vec<RowType>,
    #[serde(default)]
    partition_info: Vec<PartitionInfo>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionInfo {
    row_count: u64,
}

#[derive(Debug, Deserialize)]
struct PartitionResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

impl SnowflakeSource {
    /// Build a client for the configured account. The token must already be
    /// resolved; config validation rejects a Snowflake source without one.
    pub fn new(config: &SnowflakeConfig, timeout: Duration) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bharatverse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, timeout, client)
    }

    pub(crate) fn with_client(config: &SnowflakeConfig, timeout: Duration, client: Client) -> SourceResult<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DataSourceError::Auth("no Snowflake token configured".to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            warehouse: config.warehouse.clone(),
            database: config.database.clone(),
            role: config.role.clone(),
            token,
            token_type: config.token_type,
            timeout,
        })
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("X-Snowflake-Authorization-Token-Type", self.token_type.header_value())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn submit(&self, schema: &str, sql: &str) -> SourceResult<StatementResponse> {
        let url = format!("{}{}", self.base_url, STATEMENTS_PATH);
        let body = StatementRequest {
            statement: sql,
            timeout: self.timeout.as_secs().max(1),
            database: &self.database,
            schema,
            warehouse: &self.warehouse,
            role: self.role.as_deref(),
        };

        let response = self
            .authorize(self.client.post(&url))
            .query(&[("requestId", Uuid::new_v4().to_string())])
            .json(&body)
            .send()
            .map_err(unreachable_or_http)?;

        let mut statement = read_statement(response)?;
        let deadline = Instant::now() + self.timeout;

        // 202 means the statement is still running
        while statement.result_set_meta_data.is_none() {
            let handle = statement.statement_handle.clone().ok_or_else(|| DataSourceError::Query {
                code: statement.code.clone().unwrap_or_default(),
                message: "response carried neither results nor a statement handle".to_string(),
            })?;

            if Instant::now() >= deadline {
                return Err(DataSourceError::Unreachable(format!(
                    "statement {} did not finish within {:?}",
                    handle, self.timeout
                )));
            }

            thread::sleep(POLL_INTERVAL);
            log::debug!("polling Snowflake statement {}", handle);

            let response = self
                .authorize(self.client.get(format!("{}/{}", url, handle)))
                .send()
                .map_err(unreachable_or_http)?;
            statement = read_statement(response)?;
        }

        Ok(statement)
    }

    fn fetch_partition(&self, handle: &str, partition: usize) -> SourceResult<Vec<Vec<Option<String>>>> {
        let url = format!("{}{}/{}", self.base_url, STATEMENTS_PATH, handle);
        let response = self
            .authorize(self.client.get(url))
            .query(&[("partition", partition.to_string())])
            .send()
            .map_err(unreachable_or_http)?;

        let response = check_status(response)?;
        let partition: PartitionResponse = response.json()?;
        Ok(partition.data)
    }
}

impl TabularSource for SnowflakeSource {
    fn query(&self, schema: &str, sql: &str) -> SourceResult<Table> {
        let mut statement = self.submit(schema, sql)?;
        let meta = statement
            .result_set_meta_data
            .take()
            .ok_or_else(|| DataSourceError::Query {
                code: statement.code.clone().unwrap_or_default(),
                message: "missing result metadata".to_string(),
            })?;

        let mut data = std::mem::take(&mut statement.data);
        if meta.partition_info.len() > 1 {
            let handle = statement.statement_handle.as_deref().ok_or_else(|| DataSourceError::Query {
                code: statement.code.clone().unwrap_or_default(),
                message: format!(
                    "{} result partitions but no statement handle",
                    meta.partition_info.len()
                ),
            })?;
            for partition in 1..meta.partition_info.len() {
                data.extend(self.fetch_partition(handle, partition)?);
            }
        }

        // Partial tables are never returned
        let expected: u64 = meta.partition_info.iter().map(|p| p.row_count).sum();
        if !meta.partition_info.is_empty() && expected != data.len() as u64 {
            log::error!(
                "snowflake {}: expected {} rows across partitions, got {}",
                schema,
                expected,
                data.len()
            );
            return Err(DataSourceError::IncompleteResult {
                expected,
                received: data.len() as u64,
            });
        }

        log::debug!("snowflake {}: {} rows", schema, data.len());
        decode_table(&meta, data)
    }

    fn name(&self) -> &str {
        "snowflake"
    }
}

fn unreachable_or_http(err: reqwest::Error) -> DataSourceError {
    if err.is_connect() {
        DataSourceError::Unreachable(err.to_string())
    } else {
        DataSourceError::Http(err)
    }
}

fn check_status(response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Option<StatementResponse> = response.json().ok();
    let code = body
        .as_ref()
        .and_then(|b| b.code.clone())
        .unwrap_or_else(|| status.as_u16().to_string());
    let message = body
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DataSourceError::Auth(message)),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            Err(DataSourceError::Unreachable(format!("{} ({})", message, code)))
        }
        _ => Err(DataSourceError::Query { code, message }),
    }
}

fn read_statement(response: Response) -> SourceResult<StatementResponse> {
    let response = check_status(response)?;
    Ok(response.json()?)
}

/// Convert the JSON result set into a Table. Snowflake sends every value as a
/// string; `rowType` says which ones are numeric.
fn decode_table(meta: &ResultSetMetaData, data: Vec<Vec<Option<String>>>) -> SourceResult<Table> {
    let columns: Vec<String> = meta.row_type.iter().map(|c| c.name.clone()).collect();
    let mut rows = Vec::with_capacity(data.len());

    for (row_idx, raw) in data.into_iter().enumerate() {
        if raw.len() != columns.len() {
            return Err(DataSourceError::Decode {
                column: "*".to_string(),
                row: row_idx,
                reason: format!("expected {} values, got {}", columns.len(), raw.len()),
            });
        }

        let mut cells = Vec::with_capacity(raw.len());
        for (value, column) in raw.into_iter().zip(&meta.row_type) {
            cells.push(decode_cell(value, &column.kind));
        }
        rows.push(cells);
    }

    Ok(Table::new(columns, rows))
}

fn decode_cell(value: Option<String>, kind: &str) -> Cell {
    let Some(text) = value else {
        return Cell::Null;
    };

    match kind.to_ascii_lowercase().as_str() {
        "fixed" => match text.parse::<i64>() {
            Ok(i) => Cell::Integer(i),
            Err(_) => text.parse::<f64>().map(Cell::Real).unwrap_or(Cell::Text(text)),
        },
        "real" => text.parse::<f64>().map(Cell::Real).unwrap_or(Cell::Text(text)),
        _ => Cell::Text(text),
    }
}
