use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Online/offline state of a watched service.
///
/// On the wire the status is an integer code (`0` = online, `1` = offline);
/// those values are stable and must not be renumbered. For display it is the
/// lowercase word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    Online,
    Offline,
}

impl ServiceStatus {
    /// Stable integer code used in JSON payloads
    pub const fn code(self) -> u8 {
        match self {
            ServiceStatus::Online => 0,
            ServiceStatus::Offline => 1,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ServiceStatus::Online),
            1 => Some(ServiceStatus::Offline),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Online => "online",
            ServiceStatus::Offline => "offline",
        }
    }

    pub fn is_online(self) -> bool {
        self == ServiceStatus::Online
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ServiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = ServiceStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a status code (0 = online, 1 = offline)")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(ServiceStatus::from_code)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_u64(CodeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_are_stable() {
        assert_eq!(serde_json::to_string(&ServiceStatus::Online).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ServiceStatus::Offline).unwrap(), "1");
    }

    #[test]
    fn test_display_is_lowercase_word() {
        assert_eq!(ServiceStatus::Online.to_string(), "online");
        assert_eq!(ServiceStatus::Offline.to_string(), "offline");
        assert_eq!(format!("[{:<7}]", ServiceStatus::Online), "[online ]");
    }

    #[test]
    fn test_deserialize_from_code() {
        let s: ServiceStatus = serde_json::from_str("1").unwrap();
        assert_eq!(s, ServiceStatus::Offline);
        assert!(serde_json::from_str::<ServiceStatus>("2").is_err());
        assert!(serde_json::from_str::<ServiceStatus>("-1").is_err());
        assert!(serde_json::from_str::<ServiceStatus>("\"online\"").is_err());
    }
}
