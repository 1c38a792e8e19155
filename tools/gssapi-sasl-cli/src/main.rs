#![doc = include_str!("../README.md")]

mod cli;
mod logging;

use std::net::TcpStream;
use std::process::ExitCode;

use gssapi_sasl::cyrus::CyrusSasl;
use gssapi_sasl::{AuthConfig, Authenticator, HandshakeLimits};

use crate::cli::GssapiSasl;

fn run(flags: GssapiSasl) -> Result<(), Box<dyn std::error::Error>> {
    let GssapiSasl {
        broker,
        service,
        keytab,
        principal,
        kinit,
        max_rounds,
    } = flags;

    let mut config = AuthConfig::new(service, keytab, principal);
    if let Some(kinit) = kinit {
        config = config.with_kinit_program(kinit);
    }
    if let Some(max_rounds) = max_rounds {
        config = config.with_limits(HandshakeLimits {
            max_rounds,
            ..HandshakeLimits::default()
        });
    }

    let mut stream = TcpStream::connect(&broker)?;
    tracing::info!(%broker, "Connected");

    Authenticator::new(config, CyrusSasl::new()).authorize(&mut stream, &broker)?;

    Ok(())
}

fn main() -> ExitCode {
    logging::init_logging();

    let flags = match GssapiSasl::from_env() {
        Ok(flags) => flags,
        Err(err) => err.exit(),
    };

    match run(flags) {
        Ok(()) => {
            println!("authenticated");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
