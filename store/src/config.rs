use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Default location of the config, next to the ProxiFyre executable.
pub const CONFIG_FILE: &str = "app-config.json";

pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:10808";

/// Log levels ProxiFyre understands. Load does not validate against this
/// list; it only constrains what an editor should offer.
pub const LOG_LEVELS: [&str; 5] = ["Error", "Warning", "Info", "Debug", "All"];

/// Root of `app-config.json` as ProxiFyre reads it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "logLevel", default)]
    pub log_level: Option<String>,
    // a literal `"proxies": null` loads the same as a missing field
    #[serde(default)]
    pub proxies: Option<Vec<ProxyEntry>>,
}

/// One routing rule. Only `proxies[0]` is ever edited; extra entries in a
/// loaded file are dropped on the next save.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyEntry {
    #[serde(rename = "appNames", default)]
    pub app_names: Vec<String>,
    #[serde(rename = "socks5ProxyEndpoint", default)]
    pub socks5_proxy_endpoint: Option<String>,
    #[serde(rename = "supportedProtocols", default)]
    pub supported_protocols: Vec<String>,
}

/// The three protocol choices an editor offers. The persisted form is a raw
/// string list; this is its normalized in-memory shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolChoice {
    Tcp,
    Udp,
    TcpUdp,
}

impl ProtocolChoice {
    /// Normalizes a persisted protocol list. Empty and two-element lists
    /// collapse to `TcpUdp`; otherwise the first element wins if recognized.
    pub fn from_list(list: &[String]) -> Self {
        match list {
            [] | [_, _] => ProtocolChoice::TcpUdp,
            [first, ..] => match first.as_str() {
                "TCP" => ProtocolChoice::Tcp,
                "UDP" => ProtocolChoice::Udp,
                _ => ProtocolChoice::TcpUdp,
            },
        }
    }

    /// Expands the choice back to the persisted list form.
    pub fn to_list(self) -> Vec<String> {
        match self {
            ProtocolChoice::Tcp => vec!["TCP".into()],
            ProtocolChoice::Udp => vec!["UDP".into()],
            ProtocolChoice::TcpUdp => vec!["TCP".into(), "UDP".into()],
        }
    }
}

impl fmt::Display for ProtocolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolChoice::Tcp => "TCP",
            ProtocolChoice::Udp => "UDP",
            ProtocolChoice::TcpUdp => "TCP+UDP",
        };
        f.write_str(s)
    }
}

impl FromStr for ProtocolChoice {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<Self> {
        match s {
            "TCP" => Ok(ProtocolChoice::Tcp),
            "UDP" => Ok(ProtocolChoice::Udp),
            "TCP+UDP" => Ok(ProtocolChoice::TcpUdp),
            other => Err(Error::Format(format!(
                "protocols must be TCP, UDP or TCP+UDP, got {other:?}"
            ))),
        }
    }
}

/// The editable state a front-end binds to its controls: one log level, one
/// endpoint, one protocol choice, the ordered app list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub log_level: String,
    pub endpoint: String,
    pub protocol: ProtocolChoice,
    pub app_names: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            log_level: "Error".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            protocol: ProtocolChoice::TcpUdp,
            app_names: Vec::new(),
        }
    }
}

impl ProxySettings {
    /// Reads and normalizes the config at `path`. Fails with [`Error::Io`]
    /// if the file is unreadable, [`Error::Parse`] on malformed JSON and
    /// [`Error::Schema`] when `proxies[0]` is missing.
    pub fn load(path: &Path) -> error::Result<Self> {
        let json = fs::read_to_string(path)?;
        let doc = serde_json::from_str::<ConfigDocument>(&json)?;

        let Some(entry) = doc.proxies.unwrap_or_default().into_iter().next() else {
            return Err(Error::Schema(format!(
                "{} has no proxies[0] entry",
                path.display()
            )));
        };

        let endpoint = match entry.socks5_proxy_endpoint {
            Some(ep) if !ep.trim().is_empty() => ep,
            _ => DEFAULT_ENDPOINT.into(),
        };

        let settings = Self {
            log_level: doc.log_level.unwrap_or_else(|| "Error".into()),
            endpoint,
            protocol: ProtocolChoice::from_list(&entry.supported_protocols),
            app_names: entry.app_names,
        };
        debug!(
            "loaded {} with {} app name(s)",
            path.display(),
            settings.app_names.len()
        );
        Ok(settings)
    }

    /// Serializes the editable state and overwrites `path` wholesale. The
    /// write happens only after serialization succeeds, so a failed save
    /// leaves the prior file intact.
    pub fn save(&self, path: &Path) -> error::Result<()> {
        let doc = self.to_document();
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(path, json)?;
        debug!("saved {}", path.display());
        Ok(())
    }

    /// Expands the editable state back to the wire shape, applying the
    /// endpoint default and always writing exactly one proxy entry.
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            log_level: Some(self.log_level.clone()),
            proxies: Some(vec![ProxyEntry {
                app_names: self.app_names.clone(),
                socks5_proxy_endpoint: Some(effective_endpoint(&self.endpoint)),
                supported_protocols: self.protocol.to_list(),
            }]),
        }
    }
}

/// Trims an endpoint as entered and substitutes the default when empty.
pub fn effective_endpoint(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_ENDPOINT.into()
    } else {
        trimmed.into()
    }
}

/// Pure JSON syntax check of the file at `path`. No schema validation and no
/// state is touched.
pub fn validate_syntax(path: &Path) -> error::Result<()> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str::<serde_json::Value>(&json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(json: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, json).unwrap();
        (dir, path)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn protocol_list_normalization() {
        assert_eq!(ProtocolChoice::from_list(&[]), ProtocolChoice::TcpUdp);
        assert_eq!(
            ProtocolChoice::from_list(&strings(&["TCP", "UDP"])),
            ProtocolChoice::TcpUdp
        );
        assert_eq!(
            ProtocolChoice::from_list(&strings(&["UDP", "TCP"])),
            ProtocolChoice::TcpUdp
        );
        assert_eq!(
            ProtocolChoice::from_list(&strings(&["TCP"])),
            ProtocolChoice::Tcp
        );
        assert_eq!(
            ProtocolChoice::from_list(&strings(&["UDP"])),
            ProtocolChoice::Udp
        );
        assert_eq!(
            ProtocolChoice::from_list(&strings(&["QUIC"])),
            ProtocolChoice::TcpUdp
        );
    }

    #[test]
    fn tcp_udp_expands_in_order() {
        assert_eq!(ProtocolChoice::TcpUdp.to_list(), strings(&["TCP", "UDP"]));
        assert_eq!(ProtocolChoice::Udp.to_list(), strings(&["UDP"]));
    }

    #[test]
    fn load_applies_defaults() {
        let (_dir, path) = write_config(r#"{ "proxies": [ { "appNames": ["a.exe"] } ] }"#);
        let settings = ProxySettings::load(&path).unwrap();
        assert_eq!(settings.log_level, "Error");
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.protocol, ProtocolChoice::TcpUdp);
        assert_eq!(settings.app_names, strings(&["a.exe"]));
    }

    #[test]
    fn load_defaults_whitespace_endpoint() {
        let (_dir, path) =
            write_config(r#"{ "proxies": [ { "socks5ProxyEndpoint": "   " } ] }"#);
        let settings = ProxySettings::load(&path).unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn load_keeps_unknown_log_level() {
        let (_dir, path) =
            write_config(r#"{ "logLevel": "Verbose", "proxies": [ {} ] }"#);
        let settings = ProxySettings::load(&path).unwrap();
        assert_eq!(settings.log_level, "Verbose");
    }

    #[test]
    fn load_rejects_missing_proxies() {
        let (_dir, path) = write_config(r#"{ "logLevel": "Error" }"#);
        assert!(matches!(
            ProxySettings::load(&path).unwrap_err(),
            Error::Schema(_)
        ));

        let (_dir, path) = write_config(r#"{ "proxies": [] }"#);
        assert!(matches!(
            ProxySettings::load(&path).unwrap_err(),
            Error::Schema(_)
        ));

        let (_dir, path) = write_config(r#"{ "proxies": null }"#);
        assert!(matches!(
            ProxySettings::load(&path).unwrap_err(),
            Error::Schema(_)
        ));
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProxySettings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn load_reports_garbage_as_parse() {
        let (_dir, path) = write_config("not json at all");
        assert!(matches!(
            ProxySettings::load(&path).unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn save_defaults_blank_endpoint() {
        let settings = ProxySettings {
            endpoint: "  ".into(),
            ..ProxySettings::default()
        };
        let doc = settings.to_document();
        let proxies = doc.proxies.unwrap();
        assert_eq!(
            proxies[0].socks5_proxy_endpoint.as_deref(),
            Some(DEFAULT_ENDPOINT)
        );
    }

    #[test]
    fn save_drops_extra_proxy_entries() {
        let (_dir, path) = write_config(
            r#"{
                "proxies": [
                    { "appNames": ["kept.exe"] },
                    { "appNames": ["lost.exe"] }
                ]
            }"#,
        );
        let settings = ProxySettings::load(&path).unwrap();
        settings.save(&path).unwrap();

        let doc: ConfigDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let proxies = doc.proxies.unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].app_names, strings(&["kept.exe"]));
    }

    #[test]
    fn validate_syntax_is_schema_blind() {
        let (_dir, path) = write_config("{}");
        validate_syntax(&path).unwrap();
    }

    #[test]
    fn validate_syntax_rejects_truncated_json() {
        let (_dir, path) = write_config(r#"{"a":}"#);
        assert!(matches!(
            validate_syntax(&path).unwrap_err(),
            Error::Parse(_)
        ));
    }
}
