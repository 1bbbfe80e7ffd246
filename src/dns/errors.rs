//! Error types for record validation, zone mutation and zone synchronization

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::dns::record_type::RecordType;

/// Rejected attempts to build or modify a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The field is not meaningful for the record's type
    FieldRejected {
        record_type: RecordType,
        field: String,
    },
    /// The field exists for the type but the value has the wrong kind
    FieldTypeMismatch {
        record_type: RecordType,
        field: String,
        expected: &'static str,
    },
    /// The type is stored in a specialised shape, not the generic `Record`
    ShapeMismatch(RecordType),
    /// A type name outside the supported set
    UnknownRecordType(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::FieldRejected { record_type, field } => {
                write!(f, "Field \"{}\" is not allowed for {} records", field, record_type)
            }
            RecordError::FieldTypeMismatch {
                record_type,
                field,
                expected,
            } => write!(
                f,
                "Field \"{}\" of {} records expects a {} value",
                field, record_type, expected
            ),
            RecordError::ShapeMismatch(record_type) => {
                write!(f, "{} records are not stored in the generic record shape", record_type)
            }
            RecordError::UnknownRecordType(name) => write!(f, "Unknown record type: {}", name),
        }
    }
}

impl Error for RecordError {}

/// Zone operation error with enough context to build a message for the user
#[derive(Debug)]
pub enum ZoneError {
    /// Record construction or field validation failed
    Record(RecordError),
    /// A CNAME and another record would share an owner name
    CnameConflict {
        name: String,
        record_type: RecordType,
    },
    /// The zone already carries an SOA record
    SoaExists,
    /// No record with the given handle exists in the zone
    RecordNotFound { record_type: RecordType },
    /// The API answered 404 for the zone
    ZoneNotFound { zone_name: String },
    /// The API refused the submitted zone
    FailedToSave { zone_name: String, detail: String },
    /// Any other non-success answer from the API
    Api {
        status: u16,
        title: String,
        detail: String,
    },
    /// The request never produced an HTTP answer
    Transport(reqwest::Error),
    /// The zone JSON could not be decoded or encoded
    Decode(serde_json::Error),
    /// Polling gave up before the token changed
    SaveTimedOut {
        zone_name: String,
        polls: u32,
        elapsed: Duration,
    },
    /// The caller cancelled polling before the token changed
    SaveCancelled { zone_name: String, polls: u32 },
}

impl ZoneError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ZoneError::ZoneNotFound { .. } | ZoneError::RecordNotFound { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ZoneError::CnameConflict { .. } | ZoneError::SoaExists)
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::Record(e) => write!(f, "Invalid record: {}", e),
            ZoneError::CnameConflict { name, record_type } => {
                if *record_type == RecordType::Cname {
                    write!(f, "existing record(s) conflict with CNAME {}", name)
                } else {
                    write!(f, "{} record {} conflicts with existing CNAME", record_type, name)
                }
            }
            ZoneError::SoaExists => write!(f, "zone already has an SOA record"),
            ZoneError::RecordNotFound { record_type } => {
                write!(f, "{} record not found", record_type)
            }
            ZoneError::ZoneNotFound { zone_name } => write!(f, "Zone not found: {}", zone_name),
            ZoneError::FailedToSave { zone_name, detail } => {
                write!(f, "Unable to save zone {} ({})", zone_name, detail)
            }
            ZoneError::Api { status, title, detail } => {
                write!(f, "API error {}: {} {}", status, title, detail)
            }
            ZoneError::Transport(e) => write!(f, "Transport error: {}", e),
            ZoneError::Decode(e) => write!(f, "Invalid zone JSON: {}", e),
            ZoneError::SaveTimedOut {
                zone_name,
                polls,
                elapsed,
            } => write!(
                f,
                "Zone {} was submitted but did not update after {} polls ({:?})",
                zone_name, polls, elapsed
            ),
            ZoneError::SaveCancelled { zone_name, polls } => write!(
                f,
                "Save of zone {} cancelled after {} polls",
                zone_name, polls
            ),
        }
    }
}

impl Error for ZoneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ZoneError::Record(e) => Some(e),
            ZoneError::Transport(e) => Some(e),
            ZoneError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for ZoneError {
    fn from(err: RecordError) -> Self {
        ZoneError::Record(err)
    }
}

impl From<reqwest::Error> for ZoneError {
    fn from(err: reqwest::Error) -> Self {
        ZoneError::Transport(err)
    }
}

impl From<serde_json::Error> for ZoneError {
    fn from(err: serde_json::Error) -> Self {
        ZoneError::Decode(err)
    }
}

/// Result type alias for zone operations
pub type ZoneResult<T> = Result<T, ZoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cname_conflict_display() {
        let error = ZoneError::CnameConflict {
            name: "www".to_string(),
            record_type: RecordType::Cname,
        };
        assert_eq!(error.to_string(), "existing record(s) conflict with CNAME www");

        let error = ZoneError::CnameConflict {
            name: "www".to_string(),
            record_type: RecordType::Mx,
        };
        assert!(error.to_string().contains("MX record www"));
        assert!(error.is_conflict());
    }

    #[test]
    fn test_record_error_display() {
        let error = RecordError::FieldRejected {
            record_type: RecordType::A,
            field: "priority".to_string(),
        };
        assert_eq!(error.to_string(), "Field \"priority\" is not allowed for A records");
    }

    #[test]
    fn test_classification() {
        let error = ZoneError::ZoneNotFound {
            zone_name: "missing.example.com.".to_string(),
        };
        assert!(error.is_not_found());
        assert!(!error.is_conflict());

        let wrapped: ZoneError = RecordError::UnknownRecordType("CAA".to_string()).into();
        assert!(wrapped.source().is_some());
    }
}
