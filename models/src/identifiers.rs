// models/src/identifiers.rs

use core::str::FromStr;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

macro_rules! record_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Big-endian bytes, used as the sled key.
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
                Uuid::from_slice(bytes)
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidIdentifier(format!("{:x?}", bytes)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidIdentifier(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

record_identifier!(
    /// Identity of a stored doctor.
    DoctorId
);

record_identifier!(
    /// Identity of a stored prescription.
    PrescriptionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_identifier_from_str() {
        let id = DoctorId::new();
        let parsed = DoctorId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_reject_malformed_identifier() {
        let err = PrescriptionId::from_str("not-an-id").unwrap_err();
        assert_eq!(err, ValidationError::InvalidIdentifier("not-an-id".to_string()));
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = PrescriptionId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn should_restore_from_key_bytes() {
        let id = DoctorId::new();
        assert_eq!(DoctorId::from_slice(id.as_bytes()).unwrap(), id);
        assert!(DoctorId::from_slice(&[1, 2, 3]).is_err());
    }
}
