//! Length-prefixed token framing.
//!
//! Every token travels as a 4-byte big-endian length followed by exactly that many
//! bytes. Token bytes are written verbatim.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{Error, Result, Token};

/// Size of the length prefix preceding every token.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Writes `token` with its length prefix.
///
/// The prefix and the payload are two sequential writes. A failure on either one is
/// reported as [Error::ConnectionClosed]; the payload is not written if the prefix failed.
pub fn send_token<W: Write + ?Sized>(stream: &mut W, token: &[u8]) -> Result<()> {
    let len = u32::try_from(token.len()).map_err(|_| Error::TokenTooLarge {
        len: token.len(),
        max: u32::MAX,
    })?;

    stream.write_u32::<BigEndian>(len).map_err(Error::ConnectionClosed)?;
    stream.write_all(token).map_err(Error::ConnectionClosed)?;
    stream.flush().map_err(Error::ConnectionClosed)?;

    trace!(len, "Token sent");

    Ok(())
}

/// Reads one length-prefixed token.
///
/// Exactly `4 + len` bytes are consumed. A short read on either part fails the call;
/// nothing is buffered across calls. Tokens longer than `max_len` are rejected before
/// their payload is read.
pub fn recv_token<R: Read + ?Sized>(stream: &mut R, max_len: u32) -> Result<Token> {
    let len = stream.read_u32::<BigEndian>().map_err(Error::ConnectionClosed)?;

    if len > max_len {
        return Err(Error::TokenTooLarge {
            len: len as usize,
            max: max_len,
        });
    }

    let mut buf = Vec::new();
    stream
        .take(u64::from(len))
        .read_to_end(&mut buf)
        .map_err(Error::ConnectionClosed)?;

    if buf.len() != len as usize {
        return Err(Error::ConnectionClosed(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("token truncated: expected {} bytes, got {}", len, buf.len()),
        )));
    }

    trace!(len, "Token received");

    Ok(Token::new(buf))
}
