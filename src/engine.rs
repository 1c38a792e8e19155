//! Contract of the security context engine driving the token exchange.
//!
//! The engine produces and consumes opaque tokens and tracks the mechanism state.
//! Handshake code never inspects token bytes: it only looks at the [StepStatus]
//! returned together with every output token.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::config::ClientFlags;
use crate::token::Token;

/// SASL mechanism name used for every context. No other mechanism is negotiated.
pub const GSSAPI_MECHANISM: &str = "GSSAPI";

/// Cyrus SASL result codes.
///
/// Only used to give engine status codes a readable name in diagnostics.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum SaslCode {
    Interact = 2,
    Continue = 1,
    Ok = 0,
    Fail = -1,
    NoMem = -2,
    BufOver = -3,
    NoMech = -4,
    BadProt = -5,
    NotDone = -6,
    BadParam = -7,
    TryAgain = -8,
    BadMac = -9,
    BadServ = -10,
    WrongMech = -11,
    NotInit = -12,
    BadAuth = -13,
    NoAuthz = -14,
    TooWeak = -15,
    Encrypt = -16,
    Trans = -17,
    Expired = -18,
    Disabled = -19,
    NoUser = -20,
    PwLock = -21,
    NoChange = -22,
    BadVers = -23,
    Unavail = -24,
    NoVerify = -26,
    WeakPass = -27,
    NoUserPass = -28,
    NeedOldPasswd = -29,
    ConstraintViolat = -30,
    BadBinding = -32,
}

impl SaslCode {
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_i32(code)
    }
}

/// Status reported by the engine after every step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The mechanism finished successfully.
    Complete,
    /// The peer has to answer before the next step.
    ContinueNeeded,
    /// Terminal failure with the raw engine code.
    Failed(i32),
}

impl StepStatus {
    /// Maps a Cyrus-style status code: `0` is OK, `1` is CONTINUE, anything else is terminal.
    ///
    /// `SASL_INTERACT` is a failure too: the exchange never prompts.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => StepStatus::Complete,
            1 => StepStatus::ContinueNeeded,
            code => StepStatus::Failed(code),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            StepStatus::Complete => 0,
            StepStatus::ContinueNeeded => 1,
            StepStatus::Failed(code) => code,
        }
    }
}

/// Output of one engine step.
#[derive(Debug)]
pub struct Step {
    pub token: Token,
    pub status: StepStatus,
}

impl Step {
    pub fn new(token: impl Into<Token>, status: StepStatus) -> Self {
        Self {
            token: token.into(),
            status,
        }
    }
}

/// Factory side of the engine: library state and context creation.
pub trait SecurityMechanism {
    type Context: SecurityContext;

    /// Initializes the engine's process-wide state.
    ///
    /// Called at the start of every handshake. The underlying library must be initialized
    /// only once per process, so implementations cache the first outcome.
    /// Errors carry the raw engine code.
    fn initialize(&self) -> Result<(), i32>;

    /// Creates a fresh context for `service/host` bound to `mechanism`.
    fn new_context(
        &self,
        service: &str,
        host: &str,
        mechanism: &str,
        flags: ClientFlags,
    ) -> Result<Self::Context, i32>;
}

/// One authentication attempt.
///
/// Dropping the context disposes of it. The handshake owns the context for exactly
/// one call and drops it on every exit path.
pub trait SecurityContext {
    /// Runs one step. `None` is the client-initiated first step.
    fn step(&mut self, input: Option<&[u8]>) -> Step;
}

impl<T: SecurityMechanism + ?Sized> SecurityMechanism for &T {
    type Context = T::Context;

    fn initialize(&self) -> Result<(), i32> {
        (**self).initialize()
    }

    fn new_context(
        &self,
        service: &str,
        host: &str,
        mechanism: &str,
        flags: ClientFlags,
    ) -> Result<Self::Context, i32> {
        (**self).new_context(service, host, mechanism, flags)
    }
}
