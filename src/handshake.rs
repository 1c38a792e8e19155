use std::io::{Read, Write};

use crate::config::{service_host, AuthConfig, HandshakeLimits};
use crate::credentials::{prepare_credentials, CommandRunner, ProcessRunner};
use crate::engine::{SecurityContext, SecurityMechanism, Step, StepStatus, GSSAPI_MECHANISM};
use crate::framing::{recv_token, send_token};
use crate::{Error, Result};

/// Progress of one handshake. Never goes back to `NotStarted`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum HandshakeState {
    NotStarted,
    InProgress,
    Succeeded,
    Failed,
}

/// SASL/GSSAPI client authenticator for a broker connection.
///
/// Every [authorize](Authenticator::authorize) call acquires a Kerberos ticket, creates a fresh
/// security context and exchanges tokens until the mechanism reports success or failure.
/// The call blocks the current thread for the whole exchange and applies no timeout:
/// close the connection from another thread to abort it.
#[derive(Debug)]
pub struct Authenticator<M, R = ProcessRunner> {
    config: AuthConfig,
    mechanism: M,
    runner: R,
}

impl<M: SecurityMechanism> Authenticator<M> {
    pub fn new(config: AuthConfig, mechanism: M) -> Self {
        Self::with_runner(config, mechanism, ProcessRunner::new())
    }
}

impl<M, R> Authenticator<M, R>
where
    M: SecurityMechanism,
    R: CommandRunner,
{
    pub fn with_runner(config: AuthConfig, mechanism: M, runner: R) -> Self {
        Self {
            config,
            mechanism,
            runner,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticates the client over `stream`, an established connection to `target_address`.
    ///
    /// `target_address` is `host:port`; the host names the service principal. The stream is
    /// only borrowed: on success the caller continues with the broker protocol on it.
    #[instrument(level = "debug", skip(self, stream), fields(service = %self.config.service_name))]
    pub fn authorize<S>(&self, stream: &mut S, target_address: &str) -> Result<()>
    where
        S: Read + Write + ?Sized,
    {
        let host = service_host(target_address);

        prepare_credentials(&self.runner, &self.config, host)?;

        self.mechanism
            .initialize()
            .map_err(|code| Error::EngineInit { code })?;

        let context = self
            .mechanism
            .new_context(&self.config.service_name, host, GSSAPI_MECHANISM, self.config.flags)
            .map_err(|code| Error::ContextCreation { code })?;

        // The context is disposed when `handshake` goes out of scope, whatever the outcome.
        let mut handshake = Handshake::new(context, self.config.limits);

        handshake.run(stream)
    }
}

struct Handshake<C> {
    context: C,
    state: HandshakeState,
    limits: HandshakeLimits,
    rounds: u32,
}

impl<C: SecurityContext> Handshake<C> {
    fn new(context: C, limits: HandshakeLimits) -> Self {
        Self {
            context,
            state: HandshakeState::NotStarted,
            limits,
            rounds: 0,
        }
    }

    fn run<S: Read + Write + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        self.state = HandshakeState::InProgress;

        let result = self.exchange(stream);

        self.state = if result.is_ok() {
            HandshakeState::Succeeded
        } else {
            HandshakeState::Failed
        };
        debug!(state = ?self.state, rounds = self.rounds, "Handshake finished");

        result
    }

    #[instrument(level = "trace", fields(state = ?self.state), skip_all)]
    fn exchange<S: Read + Write + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        let mut step = self.context.step(None);

        loop {
            let Step { token, status } = step;
            trace!(round = self.rounds, ?status, len = token.len(), "Engine step");

            if let StepStatus::Failed(code) = status {
                return Err(Error::HandshakeFailed { code });
            }

            send_token(stream, &token)?;

            if status == StepStatus::Complete {
                return Ok(());
            }

            if self.rounds >= self.limits.max_rounds {
                return Err(Error::TooManyRounds {
                    max: self.limits.max_rounds,
                });
            }

            let input = recv_token(stream, self.limits.max_token_len)?;
            self.rounds += 1;

            step = self.context.step(Some(input.as_bytes()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::Token;

    struct ScriptedContext {
        steps: VecDeque<(Token, StepStatus)>,
        inputs: Vec<Option<Vec<u8>>>,
    }

    impl SecurityContext for ScriptedContext {
        fn step(&mut self, input: Option<&[u8]>) -> Step {
            self.inputs.push(input.map(<[u8]>::to_vec));
            let (token, status) = self.steps.pop_front().expect("unexpected engine step");

            Step::new(token, status)
        }
    }

    fn step(token: &[u8], status: StepStatus) -> (Token, StepStatus) {
        (Token::from(token), status)
    }

    fn scripted(steps: Vec<(Token, StepStatus)>) -> ScriptedContext {
        ScriptedContext {
            steps: steps.into(),
            inputs: Vec::new(),
        }
    }

    /// Reads from a prepared buffer and records everything written.
    struct Duplex {
        incoming: std::io::Cursor<Vec<u8>>,
        outgoing: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.incoming.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.outgoing.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn duplex<T: AsRef<[u8]>>(incoming: &[T]) -> Duplex {
        let mut wire = Vec::new();
        for token in incoming {
            send_token(&mut wire, token.as_ref()).unwrap();
        }

        Duplex {
            incoming: std::io::Cursor::new(wire),
            outgoing: Vec::new(),
        }
    }

    #[test]
    fn state_moves_to_succeeded() {
        let mut handshake = Handshake::new(
            scripted(vec![step(b"hello", StepStatus::ContinueNeeded), step(b"", StepStatus::Complete)]),
            HandshakeLimits::default(),
        );
        let mut stream = duplex(&[b"challenge"]);
        assert_eq!(handshake.state, HandshakeState::NotStarted);

        handshake.run(&mut stream).unwrap();

        assert_eq!(handshake.state, HandshakeState::Succeeded);
        assert_eq!(handshake.rounds, 1);
        assert_eq!(handshake.context.inputs, vec![None, Some(b"challenge".to_vec())]);
        let mut expected = vec![0, 0, 0, 5];
        expected.extend_from_slice(b"hello");
        expected.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(stream.outgoing, expected);
    }

    #[test]
    fn state_moves_to_failed() {
        let mut handshake = Handshake::new(
            scripted(vec![step(b"", StepStatus::Failed(-1))]),
            HandshakeLimits::default(),
        );
        let mut stream = duplex::<&[u8]>(&[]);

        let err = handshake.run(&mut stream).unwrap_err();

        assert!(matches!(err, Error::HandshakeFailed { code: -1 }));
        assert_eq!(handshake.state, HandshakeState::Failed);
        assert!(stream.outgoing.is_empty());
    }

    #[test]
    fn rounds_are_bounded() {
        let limits = HandshakeLimits {
            max_rounds: 2,
            ..HandshakeLimits::default()
        };
        let mut handshake = Handshake::new(
            scripted(vec![
                step(b"a", StepStatus::ContinueNeeded),
                step(b"b", StepStatus::ContinueNeeded),
                step(b"c", StepStatus::ContinueNeeded),
            ]),
            limits,
        );
        let mut stream = duplex(&[b"1", b"2", b"3"]);

        let err = handshake.run(&mut stream).unwrap_err();

        assert!(matches!(err, Error::TooManyRounds { max: 2 }));
        assert_eq!(handshake.rounds, 2);
    }
}
