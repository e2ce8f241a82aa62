//! Type-safe record identifiers.
//!
//! Each record kind gets its own newtype wrapper around [`uuid::Uuid`]
//! (v4) so that, for example, a webreport id cannot be passed where a
//! transaction id is expected. [`CustomerId`] is the exception: customer
//! identity is assigned by an external system, so it wraps an opaque
//! non-empty string instead of a server-generated UUID.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_uuid_id {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random id (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an id from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl utoipa::PartialSchema for $name {
            fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
                utoipa::openapi::schema::ObjectBuilder::new()
                    .schema_type(utoipa::openapi::schema::SchemaType::Type(
                        utoipa::openapi::schema::Type::String,
                    ))
                    .format(Some(utoipa::openapi::schema::SchemaFormat::KnownFormat(
                        utoipa::openapi::schema::KnownFormat::Uuid,
                    )))
                    .into()
            }
        }

        impl utoipa::ToSchema for $name {
            fn name() -> std::borrow::Cow<'static, str> {
                std::borrow::Cow::Borrowed(stringify!($name))
            }
        }
    };
}

define_uuid_id! {
    /// Unique identifier for a [`super::Webreport`].
    ///
    /// Generated once at submission time and immutable thereafter.
    WebreportId
}

define_uuid_id! {
    /// Unique identifier for a [`super::BankStatement`].
    StatementId
}

define_uuid_id! {
    /// Unique identifier for a [`super::MatchingResult`].
    ///
    /// Used as the idempotency key for settlement: at most one
    /// [`super::Transaction`] may ever reference a given `MatchId`.
    MatchId
}

define_uuid_id! {
    /// Unique identifier for a [`super::Transaction`].
    TransactionId
}

/// Externally-assigned customer identifier.
///
/// Customers are not created by this service; their ids arrive on inbound
/// payloads as opaque strings (e.g. `"CUST-0042"`). Wrapped in a newtype
/// so they cannot be confused with free-form text fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a `CustomerId` from the given string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl utoipa::PartialSchema for CustomerId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        <String as utoipa::PartialSchema>::schema()
    }
}

impl utoipa::ToSchema for CustomerId {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("CustomerId")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = WebreportId::new();
        let b = WebreportId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = MatchId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36); // UUID string length
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_round_trip() {
        let id = TransactionId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: TransactionId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, deserialized);
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = StatementId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = WebreportId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }

    #[test]
    fn customer_id_preserves_external_form() {
        let id = CustomerId::from("CUST-0042");
        assert_eq!(id.as_str(), "CUST-0042");
        assert_eq!(format!("{id}"), "CUST-0042");
    }

    #[test]
    fn customer_id_serde_is_transparent() {
        let id = CustomerId::from("CUST-7");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"CUST-7\"");
    }
}
