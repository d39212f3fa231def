use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use laser_tank_core::Level;
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "tank";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const TRANSFER_HEADER: &str = "tank:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(level: &Level) -> Result<String, TransferError> {
    let json = serde_json::to_vec(level).map_err(TransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a level from a transfer string.
pub(crate) fn decode(value: &str) -> Result<Level, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::EmptyPayload)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}

/// Errors that can occur while encoding or decoding level transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The encoded level did not contain a version segment.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The encoded level did not include the payload segment.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse level payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The level could not be serialised.
    #[error("could not serialise level: {0}")]
    Serialize(#[source] serde_json::Error),
}
