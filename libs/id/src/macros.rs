//! Code generation for the two id families.

/// Splits `{prefix}_{rest}` and checks the prefix.
#[doc(hidden)]
pub fn split_prefixed<'a>(s: &'a str, expected: &'static str) -> Result<&'a str, crate::IdError> {
    if s.is_empty() {
        return Err(crate::IdError::Empty);
    }

    let Some((prefix, rest)) = s.split_once('_') else {
        return Err(crate::IdError::MissingSeparator);
    };

    if prefix != expected {
        return Err(crate::IdError::InvalidPrefix {
            expected,
            actual: prefix.to_string(),
        });
    }

    Ok(rest)
}

/// Implements `Display`, `FromStr` and string-based serde for an ID type
/// that already has `PREFIX`, `parse()` and a displayable inner value.
macro_rules! impl_id_string_forms {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Defines an engine-generated, ULID-backed ID.
///
/// ```ignore
/// define_engine_id!(JobId, "job");
///
/// let id = JobId::new();
/// let parsed: JobId = id.to_string().parse()?;
/// ```
macro_rules! define_engine_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Ulid);

        impl $name {
            /// Family prefix used in the text form.
            pub const PREFIX: &'static str = $prefix;

            /// Fresh, time-ordered id.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Ulid::new())
            }

            /// Wraps an existing ULID.
            #[must_use]
            pub const fn from_ulid(ulid: $crate::Ulid) -> Self {
                Self(ulid)
            }

            #[must_use]
            pub const fn ulid(&self) -> $crate::Ulid {
                self.0
            }

            /// Reads `{prefix}_{ulid}`.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                let rest = $crate::macros::split_prefixed(s, Self::PREFIX)?;
                rest.parse::<$crate::Ulid>()
                    .map(Self)
                    .map_err(|e| $crate::IdError::InvalidUlid(e.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl_id_string_forms!($name);
    };
}

/// Defines a host-assigned numeric ID.
///
/// The host owns the numbering; the engine only compares, hashes and
/// persists these values.
macro_rules! define_host_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Family prefix used in the text form.
            pub const PREFIX: &'static str = $prefix;

            /// Wraps a host-assigned number.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw number.
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Reads `{prefix}_{number}`.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                let rest = $crate::macros::split_prefixed(s, Self::PREFIX)?;
                rest.parse::<u64>()
                    .map(Self)
                    .map_err(|e| $crate::IdError::InvalidNumber(e.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl_id_string_forms!($name);
    };
}
