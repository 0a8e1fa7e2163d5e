//! ArubaOS 8 REST client.
//!
//! Session flow:
//! - POST /api/login with form credentials, reply carries the UIDARUBA token
//! - GET /configuration/showcommand?command=...&UIDARUBA=<token>
//! - POST /api/logout when done

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ControllerKind, SnapshotSource, SourceError};
use crate::config::ControllerSettings;
use crate::snapshot::{ApDatabase, ApRecord};

const SHOW_COMMAND_PATH: &str = "configuration/showcommand";
const AP_DATABASE_COMMAND: &str = "show ap database long";
const AP_DATABASE_KEY: &str = "AP Database";
const DOWN_APS_COMMAND: &str = "show ap database long sort-by ap-name status down";
const BSS_TABLE_COMMAND: &str = "show ap bss-table";
const BSS_TABLE_KEY: &str = "Aruba AP BSS Table";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssEntry {
    #[serde(default)]
    pub bss: String,
    #[serde(default)]
    pub ess: String,
    #[serde(rename = "ap name", default)]
    pub ap_name: String,
}

/// One row of `show ap lldp neighbors`: the switch port an AP uplink is patched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpNeighbor {
    #[serde(rename = "Interface", default)]
    pub interface: String,
    #[serde(rename = "Neighbor", default)]
    pub neighbor: String,
    #[serde(rename = "Port", default)]
    pub port: String,
    #[serde(rename = "Mgmt. Address", default)]
    pub mgmt_address: String,
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(rename = "_global_result")]
    global_result: GlobalResult,
}

#[derive(Deserialize)]
struct GlobalResult {
    #[serde(rename = "UIDARUBA")]
    uid: Option<String>,
    status_str: Option<String>,
}

#[derive(Debug)]
pub struct ControllerClient {
    kind: ControllerKind,
    base_url: String,
    http: Client,
    username: String,
    password: String,
    token: Option<String>,
}

impl ControllerClient {
    /// Client for `kind` reachable at `base_url` (e.g. `https://mc1:4343/v1`).
    /// No request is made until the first command.
    pub fn new(
        kind: ControllerKind,
        base_url: &str,
        settings: &ControllerSettings,
    ) -> Result<Self, SourceError> {
        Url::parse(base_url).map_err(|e| SourceError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .user_agent(concat!("apdiff/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| SourceError::Http {
                endpoint: base_url.to_string(),
                source: e,
            })?;

        Ok(ControllerClient {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            username: settings.username.clone(),
            password: settings.password.clone(),
            token: None,
        })
    }

    pub fn supports_bss_table(&self) -> bool {
        self.kind.supports_bss_table()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn login(&mut self) -> Result<(), SourceError> {
        let endpoint = self.endpoint("api/login");
        tracing::debug!(%endpoint, user = %self.username, "logging in");

        let reply: LoginReply = self
            .http
            .post(&endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&[("username", &self.username), ("password", &self.password)])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| SourceError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        match reply.global_result.uid {
            Some(token) if !token.is_empty() => {
                self.token = Some(token);
                Ok(())
            }
            _ => Err(SourceError::Auth(
                reply
                    .global_result
                    .status_str
                    .unwrap_or_else(|| "controller returned no session token".to_string()),
            )),
        }
    }

    fn ensure_login(&mut self) -> Result<String, SourceError> {
        if self.token.is_none() {
            self.login()?;
        }
        self.token
            .clone()
            .ok_or_else(|| SourceError::Auth("controller returned no session token".to_string()))
    }

    /// Run a CLI show command through the REST gateway and return the JSON reply.
    pub fn show_command(&mut self, command: &str) -> Result<Value, SourceError> {
        let token = self.ensure_login()?;
        let endpoint = self.endpoint(SHOW_COMMAND_PATH);
        tracing::debug!(%endpoint, command, "running show command");

        self.http
            .get(&endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .query(&[("command", command), ("UIDARUBA", token.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| SourceError::Http { endpoint, source: e })
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, SourceError> {
        serde_json::from_value(value).map_err(|e| SourceError::UnexpectedPayload {
            endpoint: self.endpoint(SHOW_COMMAND_PATH),
            reason: e.to_string(),
        })
    }

    /// APs the controller currently reports as down, sorted by name.
    /// Needs no stored snapshot.
    pub fn read_down_aps(&mut self) -> Result<Vec<ApRecord>, SourceError> {
        let reply = self.show_command(DOWN_APS_COMMAND)?;
        // an empty table can come back without the collection key
        if reply.get(AP_DATABASE_KEY).is_none() {
            return Ok(Vec::new());
        }

        let database: ApDatabase = self.decode(reply)?;
        tracing::info!(source = %self.base_url, down = database.records.len(), "fetched down APs");
        Ok(database.records)
    }

    /// LLDP neighbors seen on the uplinks of `ap_name`.
    pub fn read_lldp_neighbors(&mut self, ap_name: &str) -> Result<Vec<LldpNeighbor>, SourceError> {
        let command = format!("show ap lldp neighbors ap-name {ap_name}");
        let reply = self.show_command(&command)?;

        // the table title varies between releases; take the first non-meta table
        let table = match reply.as_object().and_then(|fields| {
            fields
                .iter()
                .find(|(key, value)| !key.starts_with('_') && value.is_array())
                .map(|(_, value)| value.clone())
        }) {
            Some(table) => table,
            None => return Ok(Vec::new()),
        };

        self.decode(table)
    }

    /// AP name, BSSID and ESSID for every BSS the controller serves.
    pub fn read_bss_table(&mut self) -> Result<Vec<BssEntry>, SourceError> {
        if !self.supports_bss_table() {
            return Err(SourceError::Unsupported {
                operation: "bss table",
                kind: self.kind.label(),
            });
        }

        let mut reply = self.show_command(BSS_TABLE_COMMAND)?;
        let table = match reply.get_mut(BSS_TABLE_KEY) {
            Some(table) => table.take(),
            None => return Ok(Vec::new()),
        };

        self.decode(table)
    }

    pub fn logout(&mut self) -> Result<(), SourceError> {
        if self.token.take().is_none() {
            return Ok(());
        }

        let endpoint = self.endpoint("api/logout");
        tracing::debug!(%endpoint, "logging out");
        self.http
            .post(&endpoint)
            .send()
            .and_then(|r| r.error_for_status())
            .map(|_| ())
            .map_err(|e| SourceError::Http { endpoint, source: e })
    }
}

impl SnapshotSource for ControllerClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn fetch_ap_database(&mut self) -> Result<Vec<ApRecord>, SourceError> {
        let reply = self.show_command(AP_DATABASE_COMMAND)?;
        let database: ApDatabase = self.decode(reply)?;

        tracing::info!(source = %self.base_url, aps = database.records.len(), "fetched AP database");
        Ok(database.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn settings() -> ControllerSettings {
        ControllerSettings {
            username: "admin".into(),
            password: "hunter2".into(),
            verify_tls: false,
            timeout: Duration::from_secs(5),
        }
    }

    fn mock_login<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
        let token = token.to_string();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1/api/login")
                .body_contains("username=admin")
                .body_contains("password=hunter2");
            then.status(200).json_body(json!({
                "_global_result": {
                    "status": "0",
                    "status_str": "You've logged in successfully.",
                    "UIDARUBA": token
                }
            }));
        })
    }

    #[test]
    fn fetches_ap_database_with_session_token() {
        let server = MockServer::start();
        let login = mock_login(&server, "tok-123");
        let show = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/configuration/showcommand")
                .query_param("command", "show ap database long")
                .query_param("UIDARUBA", "tok-123");
            then.status(200).json_body(json!({
                "AP Database": [
                    {"Name": "AP1", "Status": "Up 10d:3h:14m:20s", "Group": "default", "IP Address": "10.1.1.1"},
                    {"Name": "AP2", "Status": "Down", "Group": "default", "IP Address": "10.1.1.2"}
                ],
                "_meta": ["Name", "Group", "IP Address", "Status"]
            }));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        let records = client.fetch_ap_database().unwrap();

        login.assert();
        show.assert();
        assert_eq!(
            records,
            vec![
                ApRecord::new("AP1", "Up 10d:3h:14m:20s"),
                ApRecord::new("AP2", "Down"),
            ]
        );
    }

    #[test]
    fn login_without_token_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/api/login");
            then.status(200).json_body(json!({
                "_global_result": {"status": "1", "status_str": "Authentication failed"}
            }));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        let err = client.fetch_ap_database().unwrap_err();
        assert!(matches!(err, SourceError::Auth(ref msg) if msg == "Authentication failed"));
    }

    #[test]
    fn http_failure_is_reported_as_http_error() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        server.mock(|when, then| {
            when.method(GET).path("/v1/configuration/showcommand");
            then.status(500);
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        assert!(matches!(
            client.fetch_ap_database(),
            Err(SourceError::Http { .. })
        ));
    }

    #[test]
    fn payload_without_ap_database_is_unexpected() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        server.mock(|when, then| {
            when.method(GET).path("/v1/configuration/showcommand");
            then.status(200).json_body(json!({"_data": ["nothing here"]}));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        assert!(matches!(
            client.fetch_ap_database(),
            Err(SourceError::UnexpectedPayload { .. })
        ));
    }

    #[test]
    fn bss_table_on_named_controller() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        let show = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/configuration/showcommand")
                .query_param("command", "show ap bss-table");
            then.status(200).json_body(json!({
                "Aruba AP BSS Table": [
                    {"bss": "aa:bb:cc:00:00:01", "ess": "corp", "ap name": "AP1", "phy": "a-VHT"},
                    {"bss": "aa:bb:cc:00:00:02", "ess": "guest", "ap name": "AP1", "phy": "g-HT"}
                ]
            }));
        });

        let kind = ControllerKind::Controller { name: "mc1".into() };
        let mut client = ControllerClient::new(kind, &server.url("/v1"), &settings()).unwrap();
        let table = client.read_bss_table().unwrap();

        show.assert();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].ess, "guest");
        assert_eq!(table[1].ap_name, "AP1");
    }

    #[test]
    fn bss_table_unsupported_on_conductor() {
        let server = MockServer::start();
        let login = mock_login(&server, "tok");

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        assert!(matches!(
            client.read_bss_table(),
            Err(SourceError::Unsupported { .. })
        ));
        login.assert_hits(0);
    }

    #[test]
    fn down_aps_use_filtered_command() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        let show = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/configuration/showcommand")
                .query_param("command", "show ap database long sort-by ap-name status down")
                .query_param("UIDARUBA", "tok");
            then.status(200).json_body(json!({
                "AP Database": [
                    {"Name": "AP4", "Status": "Down", "Group": "default"},
                    {"Name": "AP9", "Status": "Down", "Group": "lab"}
                ],
                "_meta": ["Name", "Group", "Status"]
            }));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        let down = client.read_down_aps().unwrap();

        show.assert();
        assert_eq!(
            down,
            vec![ApRecord::new("AP4", "Down"), ApRecord::new("AP9", "Down")]
        );
    }

    #[test]
    fn no_down_aps_without_table() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        server.mock(|when, then| {
            when.method(GET).path("/v1/configuration/showcommand");
            then.status(200).json_body(json!({"_meta": ["Name", "Status"]}));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        assert!(client.read_down_aps().unwrap().is_empty());
    }

    #[test]
    fn lldp_neighbors_for_named_ap() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        let show = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/configuration/showcommand")
                .query_param("command", "show ap lldp neighbors ap-name AP4")
                .query_param("UIDARUBA", "tok");
            then.status(200).json_body(json!({
                "AP neighbor list": [
                    {
                        "AP": "AP4",
                        "Interface": "eth0",
                        "Neighbor": "sw-floor2",
                        "Chassis Name/ID": "sw-floor2",
                        "Port": "Gi1/0/14",
                        "Capabilities": "B:R",
                        "Mgmt. Address": "10.0.0.2"
                    }
                ],
                "_meta": ["AP", "Interface", "Neighbor", "Port"]
            }));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1"), &settings()).unwrap();
        let neighbors = client.read_lldp_neighbors("AP4").unwrap();

        show.assert();
        assert_eq!(
            neighbors,
            vec![LldpNeighbor {
                interface: "eth0".into(),
                neighbor: "sw-floor2".into(),
                port: "Gi1/0/14".into(),
                mgmt_address: "10.0.0.2".into(),
            }]
        );
    }

    #[test]
    fn logout_after_login_only() {
        let server = MockServer::start();
        mock_login(&server, "tok");
        let logout = server.mock(|when, then| {
            when.method(POST).path("/v1/api/logout");
            then.status(200).json_body(json!({"_global_result": {"status": "0"}}));
        });

        let mut client =
            ControllerClient::new(ControllerKind::Conductor, &server.url("/v1/"), &settings()).unwrap();
        client.logout().unwrap();
        logout.assert_hits(0);

        client.login().unwrap();
        client.logout().unwrap();
        logout.assert_hits(1);
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ControllerClient::new(ControllerKind::Conductor, "not a url", &settings()),
            Err(SourceError::InvalidUrl { .. })
        ));
    }
}
