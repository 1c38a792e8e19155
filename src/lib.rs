//! Client-side SASL/GSSAPI authentication for message-broker connections.
//!
//! [Authenticator::authorize] obtains a Kerberos ticket from a keytab with `kinit`, then runs
//! the GSSAPI token exchange over an already established connection. Tokens are framed with
//! a 4-byte big-endian length prefix (see [framing]).
//!
//! The security mechanism itself is pluggable through [SecurityMechanism]. With the
//! `cyrus-sasl` feature, [cyrus::CyrusSasl] drives the system `libsasl2`.
//!
//! ```no_run
//! # #[cfg(feature = "cyrus-sasl")]
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::net::TcpStream;
//!
//! use gssapi_sasl::cyrus::CyrusSasl;
//! use gssapi_sasl::{AuthConfig, Authenticator};
//!
//! let broker = "broker-1.example.com:9092";
//! let mut stream = TcpStream::connect(broker)?;
//!
//! let config = AuthConfig::new("kafka", "/etc/security/client.keytab", "client@EXAMPLE.COM");
//! let authenticator = Authenticator::new(config, CyrusSasl::new());
//! authenticator.authorize(&mut stream, broker)?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod config;
pub mod credentials;
#[cfg(feature = "cyrus-sasl")]
pub mod cyrus;
pub mod engine;
mod error;
pub mod framing;
mod handshake;
mod token;

pub use config::{AuthConfig, ClientFlags, HandshakeLimits};
pub use credentials::{CommandRunner, ProcessRunner};
pub use engine::{SecurityContext, SecurityMechanism, Step, StepStatus};
pub use error::{AuthPhase, CredentialError, Error, Result};
pub use handshake::Authenticator;
pub use token::Token;
