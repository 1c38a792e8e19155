//! [SecurityMechanism] backed by the system Cyrus SASL library.

use std::ffi::{c_char, c_uint, CStr, CString};
use std::ptr;
use std::sync::OnceLock;

use sasl2_sys::{
    sasl_client_init, sasl_client_new, sasl_client_start, sasl_client_step, sasl_conn_t, sasl_dispose,
    sasl_errdetail, SASL_BADPARAM, SASL_BUFOVER, SASL_OK,
};

use crate::config::ClientFlags;
use crate::engine::{SecurityContext, SecurityMechanism, Step, StepStatus};
use crate::Token;

// `sasl_client_init` result. The library keeps global state and is initialized once per process.
static CLIENT_INIT: OnceLock<i32> = OnceLock::new();

/// Cyrus SASL client. Tickets are taken from the ambient Kerberos credential cache.
#[derive(Debug, Default, Copy, Clone)]
pub struct CyrusSasl;

impl CyrusSasl {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityMechanism for CyrusSasl {
    type Context = CyrusContext;

    fn initialize(&self) -> Result<(), i32> {
        // SAFETY: no callbacks are registered, a null pointer is allowed.
        let code = *CLIENT_INIT.get_or_init(|| unsafe { sasl_client_init(ptr::null()) });

        if code == SASL_OK {
            Ok(())
        } else {
            Err(code)
        }
    }

    fn new_context(
        &self,
        service: &str,
        host: &str,
        mechanism: &str,
        flags: ClientFlags,
    ) -> Result<Self::Context, i32> {
        let service = CString::new(service).map_err(|_| SASL_BADPARAM)?;
        let host = CString::new(host).map_err(|_| SASL_BADPARAM)?;
        let mechanism = CString::new(mechanism).map_err(|_| SASL_BADPARAM)?;

        let mut conn: *mut sasl_conn_t = ptr::null_mut();
        // SAFETY: all strings are valid NUL-terminated C strings living until the call returns;
        // `conn` is a valid out pointer.
        let code = unsafe {
            sasl_client_new(
                service.as_ptr(),
                host.as_ptr(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
                flags.bits(),
                &mut conn,
            )
        };

        // Owning the handle first so a partially created connection is disposed too.
        let context = CyrusContext { conn, mechanism };

        if code != SASL_OK {
            return Err(code);
        }

        Ok(context)
    }
}

/// Cyrus SASL client connection. Disposed with `sasl_dispose` on drop.
pub struct CyrusContext {
    conn: *mut sasl_conn_t,
    mechanism: CString,
}

impl CyrusContext {
    fn error_detail(&self) -> String {
        // SAFETY: `conn` is a live connection; the returned string is owned by it.
        let detail = unsafe { sasl_errdetail(self.conn) };

        if detail.is_null() {
            String::new()
        } else {
            // SAFETY: non-null result of `sasl_errdetail` is a NUL-terminated string.
            unsafe { CStr::from_ptr(detail) }.to_string_lossy().into_owned()
        }
    }
}

impl SecurityContext for CyrusContext {
    fn step(&mut self, input: Option<&[u8]>) -> Step {
        let mut out: *const c_char = ptr::null();
        let mut out_len: c_uint = 0;

        let code = match input {
            // SAFETY: `conn` is live, `mechanism` is a C string, out pointers are valid.
            // No interaction is supported, so `prompt_need` is null.
            None => unsafe {
                sasl_client_start(
                    self.conn,
                    self.mechanism.as_ptr(),
                    ptr::null_mut(),
                    &mut out,
                    &mut out_len,
                    ptr::null_mut(),
                )
            },
            Some(input) => {
                let Ok(input_len) = c_uint::try_from(input.len()) else {
                    return Step::new(Token::empty(), StepStatus::Failed(SASL_BUFOVER));
                };

                // SAFETY: `input` is valid for `input_len` bytes for the duration of the call.
                unsafe {
                    sasl_client_step(
                        self.conn,
                        input.as_ptr().cast(),
                        input_len,
                        ptr::null_mut(),
                        &mut out,
                        &mut out_len,
                    )
                }
            }
        };

        let status = StepStatus::from_code(code);
        if let StepStatus::Failed(code) = status {
            debug!(code, detail = %self.error_detail(), "SASL step failed");
        }

        let token = if out.is_null() || out_len == 0 {
            Token::empty()
        } else {
            // SAFETY: the library returned `out_len` readable bytes at `out`, owned by `conn`
            // and valid until the next call on it. They are copied right away.
            Token::from(unsafe { std::slice::from_raw_parts(out.cast::<u8>(), out_len as usize) })
        };

        Step::new(token, status)
    }
}

impl Drop for CyrusContext {
    fn drop(&mut self) {
        if !self.conn.is_null() {
            // SAFETY: `conn` was created by `sasl_client_new` and is disposed exactly once.
            unsafe { sasl_dispose(&mut self.conn) };
        }
    }
}
