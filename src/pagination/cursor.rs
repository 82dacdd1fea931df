//! Opaque cursor tokens.
//!
//! A token is the standard (padded) base64 encoding of the identifier's UTF-8
//! bytes. Tokens carry no session state and stay valid across restarts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use super::CursorPaginationParams;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("cursor does not decode to UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode an identifier into a cursor token
pub fn encode_cursor(osm_id: &str) -> String {
    STANDARD.encode(osm_id.as_bytes())
}

/// Decode a cursor token back into the identifier it was built from
pub fn decode_cursor(token: &str) -> Result<String, CursorError> {
    let bytes = STANDARD.decode(token)?;
    Ok(String::from_utf8(bytes)?)
}

/// Keyset position carried by the pagination params, if any
pub fn cursor_id(params: &CursorPaginationParams) -> Result<Option<String>, CursorError> {
    params.cursor.as_deref().map(decode_cursor).transpose()
}
