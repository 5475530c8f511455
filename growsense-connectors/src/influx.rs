//! InfluxDB Store - Flux Queries over the v2 HTTP API
//!
//! ## Overview
//!
//! Ships a [`QueryDescriptor`] to InfluxDB as Flux and decodes the CSV
//! answer into result batches, one per Flux table.
//!
//! ## Request
//!
//! ```text
//! POST {url}/api/v2/query?org={org}
//! Authorization: Token {token}
//! Content-Type: application/json
//! Accept: application/csv
//!
//! {"query": "<flux>", "type": "flux", "dialect": {"header": true, "annotations": [], ...}}
//! ```
//!
//! ## Response
//!
//! ```text
//! ,result,table,_start,_stop,_time,_value,_field,_measurement
//! ,_result,0,2024-05-05T00:00:00Z,2024-05-15T00:00:00Z,2024-05-10T10:00:00Z,21.5,temperature,studio-dht22
//! ,_result,1,2024-05-05T00:00:00Z,2024-05-15T00:00:00Z,2024-05-10T10:00:00Z,55,humidity,studio-dht22
//! ```
//!
//! Only `_time`, `_field`, `_value` and `_measurement` are kept. A new header
//! line or a change of the `result`/`table` columns starts a new batch.
//!
//! ## Failure Policy
//!
//! No retries. A transport error, a non-2xx status or an error row in the
//! answer fails the query, and the cycle with it.

use std::io::Read;
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use growsense_core::{QueryDescriptor, RawRow};

use crate::{AuthMethod, Batches, QueryStats, Store, StoreConfig, StoreError, StoreResult};

/// InfluxDB v2 store client using the blocking `ureq` agent
pub struct InfluxStore {
    config: StoreConfig,
    agent: ureq::Agent,
    stats: Mutex<QueryStats>,
}

impl InfluxStore {
    /// Create a client; fails on invalid configuration
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Mutex::new(QueryStats::default()),
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn query_url(&self) -> String {
        format!("{}/api/v2/query", self.config.url)
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self
            .agent
            .post(&self.query_url())
            .query("org", &self.config.org);

        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Token(token) => {
                request = request.set("Authorization", &format!("Token {}", token));
            }
            AuthMethod::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                request = request.set("Authorization", &format!("Basic {}", credentials));
            }
        }

        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/csv")
    }

    fn execute(&self, query: &QueryDescriptor) -> StoreResult<Batches> {
        let body = request_body(&query.to_flux())?;

        match self.build_request().send_string(&body) {
            Ok(response) => parse_csv(response.into_reader()),
            Err(ureq::Error::Status(code, response)) => {
                let message = error_message(response.into_string().unwrap_or_default());
                if code == 401 || code == 403 {
                    Err(StoreError::Auth(message))
                } else {
                    Err(StoreError::Server { status: code, message })
                }
            }
            Err(ureq::Error::Transport(e)) => Err(StoreError::Request(e.to_string())),
        }
    }
}

impl Store for InfluxStore {
    fn source(&self) -> &str {
        &self.config.bucket
    }

    fn query(&self, query: &QueryDescriptor) -> StoreResult<Batches> {
        let outcome = self.execute(query);
        match &outcome {
            Ok(batches) => log::debug!(
                "influx answered {} batches for {}",
                batches.len(),
                query.measurement
            ),
            Err(err) => log::warn!("influx query failed: {}", err),
        }
        if let Ok(mut stats) = self.stats.lock() {
            stats.record(&outcome);
        }
        outcome
    }

    fn stats(&self) -> QueryStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// JSON body for `/api/v2/query`
fn request_body(flux: &str) -> StoreResult<String> {
    let body = serde_json::json!({
        "query": flux,
        "type": "flux",
        "dialect": {
            "header": true,
            "annotations": [],
            "delimiter": ",",
            "commentPrefix": "#",
            "dateTimeFormat": "RFC3339",
        },
    });
    serde_json::to_string(&body).map_err(|e| StoreError::Parse(e.to_string()))
}

/// Pull `message` out of an InfluxDB JSON error body, or keep the text
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body)
}

/// Column positions within the current header
struct Columns {
    time: usize,
    field: usize,
    value: usize,
    measurement: Option<usize>,
    result: Option<usize>,
    table: Option<usize>,
}

impl Columns {
    fn from_header(record: &csv::StringRecord) -> StoreResult<Self> {
        let find = |name: &str| record.iter().position(|c| c == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| StoreError::Parse(format!("missing column {}", name)))
        };
        Ok(Self {
            time: require("_time")?,
            field: require("_field")?,
            value: require("_value")?,
            measurement: find("_measurement"),
            result: find("result"),
            table: find("table"),
        })
    }

    fn table_key(&self, record: &csv::StringRecord) -> (String, String) {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i)).unwrap_or_default().to_string()
        };
        (get(self.result), get(self.table))
    }
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().any(|c| c == "_time") && record.iter().any(|c| c == "_value")
}

/// `,error,reference`: the header of the table InfluxDB sends instead of
/// results when a query fails. Matched by position; a data row holds the
/// result name and table id there, never these literals.
fn is_error_header(record: &csv::StringRecord) -> bool {
    record.len() == 3
        && record.get(0) == Some("")
        && record.get(1) == Some("error")
        && record.get(2) == Some("reference")
}

/// Decode an InfluxDB CSV answer into batches
pub fn parse_csv<R: Read>(reader: R) -> StoreResult<Batches> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut batches: Batches = Vec::new();
    let mut columns: Option<Columns> = None;
    let mut current_key: Option<(String, String)> = None;
    let mut in_error_table = false;

    for record in rdr.records() {
        let record = record.map_err(|e| StoreError::Parse(e.to_string()))?;

        if in_error_table {
            let message = record.get(1).unwrap_or_default();
            return Err(StoreError::Query(message.to_string()));
        }
        if is_error_header(&record) {
            in_error_table = true;
            continue;
        }
        if is_header(&record) {
            columns = Some(Columns::from_header(&record)?);
            current_key = None;
            continue;
        }

        let cols = columns
            .as_ref()
            .ok_or_else(|| StoreError::Parse("data row before header".into()))?;

        let key = cols.table_key(&record);
        if current_key.as_ref() != Some(&key) {
            batches.push(Vec::new());
            current_key = Some(key);
        }

        let cell = |idx: usize| record.get(idx).unwrap_or_default();
        let raw_value = cell(cols.value);
        let value = raw_value.trim().parse::<f64>().map_err(|_| {
            StoreError::Parse(format!("non-numeric _value {:?} for {}", raw_value, cell(cols.field)))
        })?;

        let mut row = RawRow::new(cell(cols.time), cell(cols.field), value);
        if let Some(m) = cols.measurement {
            row = row.with_measurement(cell(m));
        }
        if let Some(batch) = batches.last_mut() {
            batch.push(row);
        }
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use growsense_core::{build, resolve, SensorProfile};
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    /// Read one HTTP request (head and body), returning the head
    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return String::from_utf8_lossy(&buf).into_owned();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                let body_len = head
                    .lines()
                    .find_map(|l| {
                        let l = l.to_ascii_lowercase();
                        l.strip_prefix("content-length:").and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return head;
                }
            }
        }
    }

    /// Serve one canned response; yields the base URL and the request head
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });
        (url, rx)
    }

    fn query() -> QueryDescriptor {
        build(SensorProfile::Environmental, resolve(15, 5).window, "grow-room")
    }

    fn store(url: &str) -> InfluxStore {
        InfluxStore::new(StoreConfig::new(url, "home", "grow-room").token("t0ken").timeout_secs(5)).unwrap()
    }

    #[test]
    fn ok_answer_is_parsed_and_request_is_authenticated() {
        let (url, head) = serve_once(
            "200 OK",
            ",result,table,_time,_value,_field\r\n,_result,0,2024-05-10T10:00:00Z,21.5,temperatura\r\n",
        );
        let store = store(&url);

        let batches = store.query(&query()).unwrap();
        assert_eq!(batches[0][0].field, "temperatura");

        let head = head.recv().unwrap();
        assert!(head.starts_with("POST /api/v2/query?org=home "));
        assert!(head.contains("Authorization: Token t0ken"));
        assert_eq!(store.stats().queries_ok, 1);
    }

    #[test]
    fn unauthorized_maps_to_auth() {
        let (url, _head) = serve_once(
            "401 Unauthorized",
            r#"{"code":"unauthorized","message":"unauthorized access"}"#,
        );
        let store = store(&url);

        let err = store.query(&query()).unwrap_err();
        assert!(matches!(err, StoreError::Auth(ref m) if m == "unauthorized access"));
        assert_eq!(store.stats().queries_failed, 1);
    }

    #[test]
    fn forbidden_maps_to_auth() {
        let (url, _head) = serve_once("403 Forbidden", "read access denied");
        let err = store(&url).query(&query()).unwrap_err();
        assert!(matches!(err, StoreError::Auth(ref m) if m == "read access denied"));
    }

    #[test]
    fn other_status_maps_to_server() {
        let (url, _head) = serve_once("500 Internal Server Error", r#"{"message":"internal error"}"#);
        let err = store(&url).query(&query()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Server { status: 500, ref message } if message == "internal error"
        ));
    }

    #[test]
    fn refused_connection_maps_to_request() {
        let url = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let store = store(&url);

        assert!(matches!(store.query(&query()), Err(StoreError::Request(_))));
        assert!(store.stats().last_error.is_some());
    }

    const ANSWER: &str = "\
,result,table,_start,_stop,_time,_value,_field,_measurement\r
,_result,0,2024-05-05T00:00:00Z,2024-05-15T00:00:00Z,2024-05-10T10:00:00Z,21.5,temperature,studio-dht22\r
,_result,0,2024-05-05T00:00:00Z,2024-05-15T00:00:00Z,2024-05-10T11:00:00Z,22,temperature,studio-dht22\r
,_result,1,2024-05-05T00:00:00Z,2024-05-15T00:00:00Z,2024-05-10T10:00:00Z,55.25,humidity,studio-dht22\r
\r
";

    #[test]
    fn splits_tables_into_batches() {
        let batches = parse_csv(ANSWER.as_bytes()).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][1].value, 22.0);
        assert_eq!(batches[1][0].field, "humidity");
        assert_eq!(batches[1][0].measurement.as_deref(), Some("studio-dht22"));
        assert_eq!(batches[1][0].time, "2024-05-10T10:00:00Z");
    }

    #[test]
    fn repeated_header_starts_new_schema() {
        let answer = "\
,result,table,_time,_value,_field\n\
,_result,0,2024-05-10T10:00:00Z,1.5,accel_x\n\
\n\
,result,table,_time,_field,_value,_measurement\n\
,_result,0,2024-05-10T10:00:00Z,accel_y,2.5,mpu6050\n";
        let batches = parse_csv(answer.as_bytes()).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].measurement, None);
        assert_eq!(batches[1][0].field, "accel_y");
        assert_eq!(batches[1][0].value, 2.5);
    }

    #[test]
    fn empty_answer_is_no_batches() {
        assert!(parse_csv("".as_bytes()).unwrap().is_empty());
        assert!(parse_csv("\r\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn annotations_are_ignored() {
        let answer = "\
#datatype,string,long,dateTime:RFC3339,double,string\n\
#group,false,false,false,false,true\n\
,result,table,_time,_value,_field\n\
,_result,0,2024-05-10T10:00:00Z,7,gyro_z\n";
        let batches = parse_csv(answer.as_bytes()).unwrap();
        assert_eq!(batches[0][0].value, 7.0);
    }

    #[test]
    fn error_table_fails_query() {
        let answer = ",error,reference\n,bucket grow-room not found,\n";
        let err = parse_csv(answer.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Query(ref m) if m.contains("not found")));
    }

    #[test]
    fn error_valued_tag_is_data() {
        let answer = "\
,result,table,_time,_value,_field,status\n\
,_result,0,2024-05-10T10:00:00Z,21.5,temperature,error\n\
,_result,0,2024-05-10T11:00:00Z,22.0,temperature,ok\n";
        let batches = parse_csv(answer.as_bytes()).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][1].value, 22.0);
    }

    #[test]
    fn error_table_after_results_fails_query() {
        let answer = "\
,result,table,_time,_value,_field\n\
,_result,0,2024-05-10T10:00:00Z,21.5,temperature\n\
\n\
,error,reference\n\
,panic: runtime error,897\n";
        let err = parse_csv(answer.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Query(ref m) if m == "panic: runtime error"));
    }

    #[test]
    fn non_numeric_value_fails() {
        let answer = ",result,table,_time,_value,_field\n,_result,0,2024-05-10T10:00:00Z,warm,temperature\n";
        assert!(matches!(parse_csv(answer.as_bytes()), Err(StoreError::Parse(_))));
    }

    #[test]
    fn body_carries_flux() {
        let body: serde_json::Value = serde_json::from_str(&request_body("from(bucket: \"b\")").unwrap()).unwrap();
        assert_eq!(body["type"], "flux");
        assert_eq!(body["query"], "from(bucket: \"b\")");
        assert_eq!(body["dialect"]["header"], true);
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"code":"unauthorized","message":"unauthorized access"}"#.into()),
            "unauthorized access"
        );
        assert_eq!(error_message("plain text".into()), "plain text");
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(InfluxStore::new(StoreConfig::new("not-a-url", "o", "b")).is_err());

        let store = InfluxStore::new(StoreConfig::new("http://localhost:8086/", "o", "grow-room")).unwrap();
        assert_eq!(store.source(), "grow-room");
        assert_eq!(store.query_url(), "http://localhost:8086/api/v2/query");
    }
}
