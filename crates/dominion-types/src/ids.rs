//! Type-safe identifier wrappers.
//!
//! Entities created at runtime (kingdoms, advisors, characters, faction
//! events) carry UUID v7 identifiers. Narrative content (events and chains)
//! is authored by hand and referenced by stable string keys such as
//! `noble_rebellion`, so those identifiers wrap a [`String`] instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around an authored string key.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing key.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a kingdom (the aggregate root).
    KingdomId
}

define_id! {
    /// Unique identifier for a hired advisor.
    AdvisorId
}

define_id! {
    /// Unique identifier for a character at court.
    CharacterId
}

define_id! {
    /// Unique identifier for a generated faction unrest or rebellion event.
    FactionEventId
}

define_key! {
    /// Identifier of a narrative event (e.g. `noble_rebellion_1`).
    EventId
}

define_key! {
    /// Identifier shared by every event in one chain.
    ChainId
}

impl ChainId {
    /// Generate a fresh chain identifier for an ad-hoc chain.
    ///
    /// Authored chains use their catalog key instead; generated ids only
    /// need to be unique.
    pub fn generate() -> Self {
        Self(format!("chain_{}", Uuid::now_v7().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let kingdom = KingdomId::new();
        let advisor = AdvisorId::new();
        assert_ne!(kingdom.into_inner(), Uuid::nil());
        assert_ne!(advisor.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = KingdomId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<KingdomId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let id = EventId::from("noble_rebellion_1");
        assert_eq!(
            serde_json::to_string(&id).ok().as_deref(),
            Some("\"noble_rebellion_1\"")
        );
    }

    #[test]
    fn generated_chain_ids_are_unique() {
        let a = ChainId::generate();
        let b = ChainId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("chain_"));
    }
}
