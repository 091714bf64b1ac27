use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridchase_core::{GridSize, LevelState};
use serde::{Deserialize, Serialize};

const TRANSFER_DOMAIN: &str = "gridchase";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded payload.
pub(crate) const TRANSFER_HEADER: &str = "gridchase:v1";
/// Delimiter used to separate the prefix and payload.
const FIELD_DELIMITER: char = ':';

/// Level in progress together with the grid it was played on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LevelTransfer {
    /// Number of columns of the grid the level was captured on.
    pub(crate) columns: u32,
    /// Number of rows of the grid the level was captured on.
    pub(crate) rows: u32,
    /// Captured level state.
    pub(crate) state: LevelState,
}

impl LevelTransfer {
    pub(crate) fn new(grid: GridSize, state: LevelState) -> Self {
        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            state,
        }
    }

    pub(crate) fn grid(&self) -> GridSize {
        GridSize::new(self.columns, self.rows)
    }

    /// Encodes the level into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LevelTransferError> {
        let json = serde_json::to_vec(self).map_err(LevelTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a level from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LevelTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LevelTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LevelTransferError::InvalidEncoding)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;
        if decoded.columns == 0 || decoded.rows == 0 {
            return Err(LevelTransferError::InvalidDimensions {
                columns: decoded.columns,
                rows: decoded.rows,
            });
        }

        Ok(decoded)
    }
}

/// Errors that can occur while encoding or decoding level transfer strings.
#[derive(Debug)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The payload segment was missing.
    MissingPayload,
    /// The string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The payload described a grid without cells.
    InvalidDimensions {
        /// Decoded column count.
        columns: u32,
        /// Decoded row count.
        rows: u32,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LevelTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "level string was empty"),
            Self::MissingPrefix => write!(f, "level string is missing the prefix"),
            Self::MissingVersion => write!(f, "level string is missing the version"),
            Self::MissingPayload => write!(f, "level string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "level prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "level version '{version}' is not supported")
            }
            Self::InvalidDimensions { columns, rows } => {
                write!(f, "level grid {columns}x{rows} has no cells")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode level payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse level payload: {error}")
            }
        }
    }
}

impl Error for LevelTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
