#![allow(dead_code)]

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use gssapi_sasl::framing::send_token;
use gssapi_sasl::{ClientFlags, CommandRunner, SecurityContext, SecurityMechanism, Step, StepStatus, Token};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// What the fake engine observed.
#[derive(Debug, Default)]
pub struct EngineEvents {
    pub initialized: AtomicUsize,
    pub created: AtomicUsize,
    pub released: AtomicUsize,
    pub targets: Mutex<Vec<(String, String, String)>>,
    pub inputs: Mutex<Vec<Option<Vec<u8>>>>,
}

impl EngineEvents {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<Option<Vec<u8>>> {
        self.inputs.lock().unwrap().clone()
    }
}

/// Engine replaying a fixed list of steps for every new context.
#[derive(Debug)]
pub struct FakeMechanism {
    pub script: Vec<(Vec<u8>, StepStatus)>,
    pub init_code: i32,
    pub context_code: i32,
    pub events: Arc<EngineEvents>,
}

impl FakeMechanism {
    pub fn new(script: Vec<(Vec<u8>, StepStatus)>) -> Self {
        Self {
            script,
            init_code: 0,
            context_code: 0,
            events: Arc::new(EngineEvents::default()),
        }
    }

    /// `continues` CONTINUE steps followed by a final OK step.
    pub fn with_continues(continues: usize) -> Self {
        let mut script: Vec<_> = (0..continues)
            .map(|i| (format!("client-{i}").into_bytes(), StepStatus::ContinueNeeded))
            .collect();
        script.push((b"client-final".to_vec(), StepStatus::Complete));

        Self::new(script)
    }
}

impl SecurityMechanism for FakeMechanism {
    type Context = FakeContext;

    fn initialize(&self) -> Result<(), i32> {
        self.events.initialized.fetch_add(1, Ordering::SeqCst);

        if self.init_code == 0 {
            Ok(())
        } else {
            Err(self.init_code)
        }
    }

    fn new_context(&self, service: &str, host: &str, mechanism: &str, _flags: ClientFlags) -> Result<FakeContext, i32> {
        if self.context_code != 0 {
            return Err(self.context_code);
        }

        self.events.created.fetch_add(1, Ordering::SeqCst);
        self.events
            .targets
            .lock()
            .unwrap()
            .push((service.to_owned(), host.to_owned(), mechanism.to_owned()));

        Ok(FakeContext {
            steps: self.script.clone().into(),
            events: Arc::clone(&self.events),
        })
    }
}

pub struct FakeContext {
    steps: VecDeque<(Vec<u8>, StepStatus)>,
    events: Arc<EngineEvents>,
}

impl SecurityContext for FakeContext {
    fn step(&mut self, input: Option<&[u8]>) -> Step {
        self.events.inputs.lock().unwrap().push(input.map(<[u8]>::to_vec));

        match self.steps.pop_front() {
            Some((token, status)) => Step::new(token, status),
            None => Step::new(Token::empty(), StepStatus::Failed(-6)),
        }
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.events.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Ticket acquisition stub returning a fixed exit code.
#[derive(Debug, Default)]
pub struct FakeRunner {
    pub exit_code: Option<i32>,
    pub calls: Mutex<Vec<Vec<OsString>>>,
}

impl FakeRunner {
    pub fn succeeding() -> Self {
        Self {
            exit_code: Some(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, _program: &Path, args: &[OsString]) -> io::Result<Option<i32>> {
        self.calls.lock().unwrap().push(args.to_vec());

        Ok(self.exit_code)
    }
}

/// In-memory connection: replays framed server tokens and records client writes.
///
/// Reads past the prepared data return EOF, like a peer that closed its end.
#[derive(Debug, Default)]
pub struct ScriptedStream {
    incoming: Cursor<Vec<u8>>,
    pub outgoing: Vec<u8>,
    pub reads: usize,
    pub writes: usize,
    /// Index of the write call that fails with `BrokenPipe`.
    pub fail_write_at: Option<usize>,
}

impl ScriptedStream {
    pub fn with_server_tokens<T: AsRef<[u8]>>(tokens: &[T]) -> Self {
        let mut wire = Vec::new();
        for token in tokens {
            send_token(&mut wire, token.as_ref()).unwrap();
        }

        Self {
            incoming: Cursor::new(wire),
            ..Self::default()
        }
    }

    pub fn io_calls(&self) -> usize {
        self.reads + self.writes
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;

        self.incoming.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_write_at == Some(self.writes) {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.writes += 1;

        self.outgoing.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Splits a client byte stream into its framed tokens.
pub fn frames(mut wire: &[u8]) -> Vec<Vec<u8>> {
    let mut tokens = Vec::new();

    while !wire.is_empty() {
        let token = gssapi_sasl::framing::recv_token(&mut wire, u32::MAX).unwrap();
        tokens.push(token.as_bytes().to_vec());
    }

    tokens
}
