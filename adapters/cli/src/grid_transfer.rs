#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use waveform_core::CollapsedGridData;

const TRANSFER_DOMAIN: &str = "wave";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const TRANSFER_HEADER: &str = "wave:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a collapsed grid into a single-line string suitable for
/// clipboard transfer between players.
#[must_use]
pub(crate) fn encode(data: &CollapsedGridData) -> String {
    let payload = SerializablePayload {
        flattened_collapse_values: data.flattened_collapse_values.clone(),
        level_id: data.level_id,
        level_name: data.level_name.clone(),
    };
    let json = serde_json::to_vec(&payload).expect("grid payload serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        data.width, data.height
    )
}

/// Decodes a collapsed grid from its string representation.
pub(crate) fn decode(value: &str) -> Result<CollapsedGridData, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let decoded: SerializablePayload =
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

    let expected = width as usize * height as usize;
    let actual = decoded.flattened_collapse_values.len();
    if actual != expected {
        return Err(TransferError::WrongValueCount { expected, actual });
    }

    Ok(CollapsedGridData {
        width,
        height,
        flattened_collapse_values: decoded.flattened_collapse_values,
        level_id: decoded.level_id,
        level_name: decoded.level_name,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializablePayload {
    flattened_collapse_values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level_name: Option<String>,
}

/// Errors that can occur while decoding grid transfer strings.
#[derive(Debug)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The payload value count disagrees with the declared dimensions.
    WrongValueCount {
        /// Length implied by the declared dimensions.
        expected: usize,
        /// Length actually present in the payload.
        actual: usize,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "clipboard payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingDimensions => write!(f, "transfer string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "transfer prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
            Self::WrongValueCount { expected, actual } => write!(
                f,
                "transfer payload holds {actual} values but its dimensions imply {expected}"
            ),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(TransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(width: u32, height: u32, values: Vec<f32>) -> CollapsedGridData {
        CollapsedGridData {
            width,
            height,
            flattened_collapse_values: values,
            level_id: None,
            level_name: None,
        }
    }

    #[test]
    fn round_trip_plain_grid() {
        let grid = snapshot(3, 2, vec![0.0, 0.25, 0.5, 0.75, 1.0, 0.5]);
        let encoded = encode(&grid);
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:3x2:")));

        let decoded = decode(&encoded).expect("transfer decodes");
        assert_eq!(decoded, grid);
    }

    #[test]
    fn round_trip_grid_with_metadata() {
        let mut grid = snapshot(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
        grid.level_id = Some(11);
        grid.level_name = Some("Checker".to_owned());

        let decoded = decode(&encode(&grid)).expect("transfer decodes");
        assert_eq!(decoded, grid);
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        match decode("maze:v1:2x2:AAAA") {
            Err(TransferError::InvalidPrefix(prefix)) => assert_eq!(prefix, "maze"),
            other => panic!("unexpected decode outcome: {other:?}"),
        }
    }

    #[test]
    fn zero_dimension_is_rejected() {
        match decode("wave:v1:0x2:AAAA") {
            Err(TransferError::InvalidDimensions(_)) => {}
            other => panic!("unexpected decode outcome: {other:?}"),
        }
    }

    #[test]
    fn value_count_must_match_dimensions() {
        let grid = snapshot(2, 2, vec![0.0, 1.0, 0.5, 0.25]);
        let encoded = encode(&grid);
        let tampered = encoded.replace(":2x2:", ":3x2:");
        match decode(&tampered) {
            Err(TransferError::WrongValueCount {
                expected: 6,
                actual: 4,
            }) => {}
            other => panic!("unexpected decode outcome: {other:?}"),
        }
    }

    #[test]
    fn empty_string_is_rejected() {
        match decode("   ") {
            Err(TransferError::EmptyPayload) => {}
            other => panic!("unexpected decode outcome: {other:?}"),
        }
    }
}
