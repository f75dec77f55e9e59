//! Result tokens.
//!
//! The intake form forwards an estimate to the results page as a
//! base64-encoded JSON document in the `d` query parameter.  The
//! results page decodes it with the browser's `atob`, which only reads
//! the standard alphabet, so that is what we emit.  Callers placing
//! the token in a URL must percent-encode it.

use crate::error::TokenError;
use crate::models::CalculationResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode_result_token(result: &CalculationResult) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(result)?;
    Ok(STANDARD.encode(bytes))
}

pub fn decode_result_token(token: &str) -> Result<CalculationResult, TokenError> {
    let bytes = STANDARD.decode(token.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}
