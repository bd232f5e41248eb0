//! `mcp_servers.json` loading
//!
//! The file uses the layout shared by most MCP clients:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "bash": { "transport": "streamable-http", "url": "http://localhost:8080/mcp" },
//!     "files": { "command": "mcp-files", "args": ["--root", "."], "env": { "TOKEN": "${FILES_TOKEN}" } }
//!   },
//!   "duplicatePolicy": "overwrite"
//! }
//! ```
//!
//! Server entries keep the order they appear in the file.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::tools::MergePolicy;

/// Default file name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "mcp_servers.json";

/// Remote transport flavors accepted in the `transport` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemoteTransport {
    #[default]
    #[serde(rename = "streamable-http", alias = "streamable_http", alias = "streamableHttp")]
    StreamableHttp,
    #[serde(rename = "http")]
    Http,
}

/// A server reached over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteServer {
    pub url: String,
    #[serde(default)]
    pub transport: RemoteTransport,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Bearer token sent as `Authorization`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

/// A server spawned as a child process speaking MCP over stdio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdioServer {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// One entry under `mcpServers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerEntry {
    Remote(RemoteServer),
    Stdio(StdioServer),
}

impl ServerEntry {
    /// A streamable HTTP entry for `url`
    pub fn remote(url: impl Into<String>) -> Self {
        ServerEntry::Remote(RemoteServer {
            url: url.into(),
            transport: RemoteTransport::StreamableHttp,
            headers: HashMap::new(),
            auth: None,
        })
    }

    /// Short human-readable target, used in log lines
    pub fn target(&self) -> String {
        match self {
            ServerEntry::Remote(r) => r.url.clone(),
            ServerEntry::Stdio(s) if s.args.is_empty() => s.command.clone(),
            ServerEntry::Stdio(s) => format!("{} {}", s.command, s.args.join(" ")),
        }
    }

    fn expand_env(&mut self) {
        match self {
            ServerEntry::Remote(r) => {
                for value in r.headers.values_mut() {
                    *value = expand_env_vars(value);
                }
                if let Some(auth) = r.auth.as_mut() {
                    *auth = expand_env_vars(auth);
                }
            }
            ServerEntry::Stdio(s) => {
                for value in s.env.values_mut() {
                    *value = expand_env_vars(value);
                }
            }
        }
    }
}

/// Parsed `mcp_servers.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct McpConfig {
    #[serde(rename = "mcpServers", default, deserialize_with = "ordered_servers")]
    pub servers: Vec<(String, ServerEntry)>,

    #[serde(rename = "duplicatePolicy", default)]
    pub duplicate_policy: MergePolicy,
}

impl McpConfig {
    /// A config with a single streamable HTTP server
    pub fn single(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            servers: vec![(name.into(), ServerEntry::remote(url))],
            duplicate_policy: MergePolicy::default(),
        }
    }

    /// Parse JSON text
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        serde_json::from_str::<Self>(content)
            .map(Self::expanded)
            .map_err(|e| e.to_string())
    }

    /// Parse YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, String> {
        serde_yaml::from_str::<Self>(content)
            .map(Self::expanded)
            .map_err(|e| e.to_string())
    }

    /// Load from a file; `.yaml`/`.yml` files are parsed as YAML, everything else as JSON
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(vec![path.to_path_buf()]));
        }
        let content = fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Resolve and load the config file
    ///
    /// An explicit path wins; otherwise `./mcp_servers.json`, then
    /// `<config dir>/mcpshell/mcp_servers.json`.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = default_config_paths();
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Err(ConfigError::NotFound(candidates)),
        }
    }

    pub fn server_names(&self) -> Vec<&str> {
        self.servers.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    fn expanded(mut self) -> Self {
        for (_, entry) in self.servers.iter_mut() {
            entry.expand_env();
        }
        self
    }
}

/// Candidate locations for `mcp_servers.json`, in lookup order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("mcpshell").join(CONFIG_FILE_NAME));
    }
    paths
}

/// Replace `${VAR}` references with values from the environment
///
/// Unset variables expand to the empty string. A `${` without a closing
/// brace is left as-is.
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                out.push_str(&std::env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn ordered_servers<'de, D>(deserializer: D) -> Result<Vec<(String, ServerEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedServers;

    impl<'de> Visitor<'de> for OrderedServers {
        type Value = Vec<(String, ServerEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of server name to server entry")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut servers: Vec<(String, ServerEntry)> = Vec::new();
            while let Some((name, entry)) = map.next_entry::<String, ServerEntry>()? {
                match servers.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = entry,
                    None => servers.push((name, entry)),
                }
            }
            Ok(servers)
        }
    }

    deserializer.deserialize_map(OrderedServers)
}
