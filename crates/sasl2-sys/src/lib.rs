#![warn(missing_docs)]
#![allow(non_camel_case_types)]
#![doc = include_str!("../README.md")]

#[cfg(target_os = "windows")]
compile_error!("The sasl2-sys crate links the Cyrus SASL library and is meant for Linux/MacOS.");

use std::ffi::{c_char, c_int, c_uint, c_ulong, c_void};

/// Successful result.
pub const SASL_OK: c_int = 0;
/// Another step is needed in authentication.
pub const SASL_CONTINUE: c_int = 1;
/// Needs user interaction.
pub const SASL_INTERACT: c_int = 2;
/// Generic failure.
pub const SASL_FAIL: c_int = -1;
/// Overflowed buffer.
pub const SASL_BUFOVER: c_int = -3;
/// Invalid parameter supplied.
pub const SASL_BADPARAM: c_int = -7;
/// SASL library not initialized.
pub const SASL_NOTINIT: c_int = -12;

/// `sasl_client_new` flag: the protocol supports server-last success data.
pub const SASL_SUCCESS_DATA: c_uint = 0x0004;
/// `sasl_client_new` flag: require a mechanism allowing proxy authorization.
pub const SASL_NEED_PROXY: c_uint = 0x0008;
/// `sasl_client_new` flag: require a mechanism usable over HTTP.
pub const SASL_NEED_HTTP: c_uint = 0x0010;

/// Opaque SASL connection context.
///
/// https://www.cyrusimap.org/sasl/sasl/reference/manpages/library/sasl_client_new.html
#[repr(C)]
pub struct sasl_conn_t {
    _private: [u8; 0],
}

/// Callback descriptor (`sasl_callback_t`).
#[repr(C)]
pub struct sasl_callback_t {
    /// Callback identifier (`SASL_CB_*`).
    pub id: c_ulong,
    /// Callback function.
    pub proc_: Option<unsafe extern "C" fn() -> c_int>,
    /// Context passed back to the callback.
    pub context: *mut c_void,
}

/// Interaction request (`sasl_interact_t`).
#[repr(C)]
pub struct sasl_interact_t {
    /// Interaction identifier (`SASL_CB_*`).
    pub id: c_ulong,
    /// Presented to the user.
    pub challenge: *const c_char,
    /// Presented to the user.
    pub prompt: *const c_char,
    /// Default result string.
    pub defresult: *const c_char,
    /// Set to the user's answer.
    pub result: *const c_void,
    /// Length of `result`.
    pub len: c_uint,
}

extern "C" {
    /// Initializes the client side of the library. Must be called once per process.
    pub fn sasl_client_init(callbacks: *const sasl_callback_t) -> c_int;

    /// Creates a client connection context.
    pub fn sasl_client_new(
        service: *const c_char,
        server_fqdn: *const c_char,
        iplocalport: *const c_char,
        ipremoteport: *const c_char,
        prompt_supp: *const sasl_callback_t,
        flags: c_uint,
        pconn: *mut *mut sasl_conn_t,
    ) -> c_int;

    /// Selects a mechanism from `mechlist` and produces the initial client token.
    ///
    /// `clientout` points into memory owned by `conn` and must not be freed.
    pub fn sasl_client_start(
        conn: *mut sasl_conn_t,
        mechlist: *const c_char,
        prompt_need: *mut *mut sasl_interact_t,
        clientout: *mut *const c_char,
        clientoutlen: *mut c_uint,
        mech: *mut *const c_char,
    ) -> c_int;

    /// Consumes a server token and produces the next client token.
    ///
    /// `clientout` points into memory owned by `conn` and must not be freed.
    pub fn sasl_client_step(
        conn: *mut sasl_conn_t,
        serverin: *const c_char,
        serverinlen: c_uint,
        prompt_need: *mut *mut sasl_interact_t,
        clientout: *mut *const c_char,
        clientoutlen: *mut c_uint,
    ) -> c_int;

    /// Disposes of a connection context and sets `*pconn` to null.
    pub fn sasl_dispose(pconn: *mut *mut sasl_conn_t);

    /// Returns a description of the last error on `conn`.
    pub fn sasl_errdetail(conn: *mut sasl_conn_t) -> *const c_char;
}
