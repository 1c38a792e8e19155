//! Kerberos ticket acquisition before the SASL exchange.
//!
//! Tickets are obtained by running `kinit` non-interactively against the configured keytab.
//! The resulting ticket lands in the ambient credential cache, which is process-wide:
//! concurrent handshakes for different principals must run in separate processes
//! (or with separate `KRB5CCNAME` caches) to avoid overwriting each other's tickets.

use std::ffi::OsString;
use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use lazy_static::lazy_static;

use crate::config::AuthConfig;
use crate::error::CredentialError;

lazy_static! {
    // Serializes writers of the ambient credential cache within this process.
    static ref CREDENTIAL_CACHE_LOCK: Mutex<()> = Mutex::new(());
}

/// Runs an external program to completion.
///
/// Abstracted so the ticket acquisition can be substituted without real Kerberos tooling.
pub trait CommandRunner: Debug {
    /// Returns the exit code, or `None` if the process was terminated without one (e.g. by a signal).
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Option<i32>>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Option<i32>> {
        (**self).run(program, args)
    }
}

/// [CommandRunner] spawning a real child process.
///
/// The child gets a null stdin so it can never prompt. Its output is not inspected.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Option<i32>> {
        let status = Command::new(program).args(args).stdin(Stdio::null()).status()?;

        Ok(status.code())
    }
}

/// Builds `-S <service>/<host> -k -t <keytab> <principal>`.
pub fn kinit_args(config: &AuthConfig, service_host: &str) -> Vec<OsString> {
    vec![
        "-S".into(),
        config.service_principal(service_host).into(),
        "-k".into(),
        "-t".into(),
        config.keytab.clone().into_os_string(),
        config.principal.clone().into(),
    ]
}

/// Obtains a ticket for `config.principal` usable against `<service>/<service_host>`.
///
/// Blocks until the program exits. No retry is attempted.
#[instrument(level = "debug", skip(runner))]
pub fn prepare_credentials<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &AuthConfig,
    service_host: &str,
) -> Result<(), CredentialError> {
    let program = &config.kinit_program;
    let args = kinit_args(config, service_host);

    let _guard = CREDENTIAL_CACHE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let program_name = || program.display().to_string();

    match runner.run(program, &args) {
        Ok(Some(0)) => {
            debug!(principal = %config.principal, "Kerberos ticket acquired");

            Ok(())
        }
        Ok(Some(code)) => Err(CredentialError::ExitCode {
            program: program_name(),
            code,
        }),
        Ok(None) => Err(CredentialError::Terminated {
            program: program_name(),
        }),
        Err(source) => Err(CredentialError::Spawn {
            program: program_name(),
            source,
        }),
    }
}
