use std::fmt::Debug;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use serde_derive::{Deserialize, Serialize};

/// Program used to obtain the Kerberos ticket when none is configured.
pub const DEFAULT_KINIT_PROGRAM: &str = "kinit";
/// Largest token accepted from the peer by default: 16 MiB.
pub const DEFAULT_MAX_TOKEN_LEN: u32 = 0x0100_0000;
/// Largest number of CONTINUE rounds after the initial step by default.
pub const DEFAULT_MAX_ROUNDS: u32 = 64;

bitflags! {
    /// Flags passed to the engine when a context is created.
    ///
    /// Values match the Cyrus SASL `sasl_client_new` flags.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ClientFlags: u32 {
        const SUCCESS_DATA = 0x0004;
        const NEED_PROXY = 0x0008;
        const NEED_HTTP = 0x0010;
    }
}

/// Upper bounds applied while exchanging tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeLimits {
    /// Maximum length of a received token in bytes.
    pub max_token_len: u32,
    /// Maximum number of receive-step-send rounds after the initial send.
    pub max_rounds: u32,
}

impl HandshakeLimits {
    /// No limits besides what the 4-byte length prefix can express.
    pub fn unbounded() -> Self {
        Self {
            max_token_len: u32::MAX,
            max_rounds: u32::MAX,
        }
    }
}

impl Default for HandshakeLimits {
    fn default() -> Self {
        Self {
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Immutable authenticator configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Service part of the broker principal, e.g. `kafka`.
    pub service_name: String,
    /// Keytab holding the long-term key of `principal`.
    pub keytab: PathBuf,
    /// Client principal, e.g. `client@EXAMPLE.COM`.
    pub principal: String,
    #[serde(default = "default_kinit_program")]
    pub kinit_program: PathBuf,
    #[serde(default)]
    pub flags: ClientFlags,
    #[serde(default)]
    pub limits: HandshakeLimits,
}

fn default_kinit_program() -> PathBuf {
    PathBuf::from(DEFAULT_KINIT_PROGRAM)
}

impl AuthConfig {
    pub fn new(service_name: impl Into<String>, keytab: impl Into<PathBuf>, principal: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            keytab: keytab.into(),
            principal: principal.into(),
            kinit_program: default_kinit_program(),
            flags: ClientFlags::empty(),
            limits: HandshakeLimits::default(),
        }
    }

    pub fn with_kinit_program(mut self, program: impl AsRef<Path>) -> Self {
        self.kinit_program = program.as_ref().to_path_buf();
        self
    }

    pub fn with_flags(mut self, flags: ClientFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_limits(mut self, limits: HandshakeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Service principal of the broker at `host`: `<service>/<host>`.
    pub fn service_principal(&self, host: &str) -> String {
        format!("{}/{}", self.service_name, host)
    }
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("service_name", &self.service_name)
            .field("principal", &self.principal)
            .field("keytab", &self.keytab)
            .finish_non_exhaustive()
    }
}

/// Returns the host part of a `host:port` target address.
///
/// Everything before the first `:` is kept. An address without a port is returned as is.
pub fn service_host(target_address: &str) -> &str {
    target_address
        .split_once(':')
        .map_or(target_address, |(host, _port)| host)
}
