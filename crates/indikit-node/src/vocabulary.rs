//! Wire vocabulary: the closed sets of words INDI allows in vector
//! attributes, with conversions to and from their wire spelling.
//!
//! Outbound code holds the enums and emits [`as_str`] spellings, so an
//! invalid word is unrepresentable. Inbound words come from the network
//! and parse with [`FromStr`], which fails on anything unknown; callers
//! log and drop rather than crash.
//!
//! [`as_str`]: State::as_str

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// INDI protocol version advertised in `getProperties` requests.
pub const INDI_VERSION: &str = "1.7";

/// A word outside one of the closed vocabulary sets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct VocabularyError {
    kind: &'static str,
    value: String,
}

impl VocabularyError {
    fn new(kind: &'static str, value: &str) -> VocabularyError {
        VocabularyError {
            kind,
            value: value.to_owned(),
        }
    }
}

macro_rules! vocabulary {
    ($(#[$doc:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = VocabularyError;

            fn from_str(text: &str) -> Result<$name, VocabularyError> {
                match text {
                    $($text => Ok($name::$variant),)+
                    _ => Err(VocabularyError::new($kind, text)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(
    /// Operational state shown for a vector: `Idle`, `Ok`, `Busy` or
    /// `Alert`.
    State, "state", {
        Idle => "Idle",
        Ok => "Ok",
        Busy => "Busy",
        Alert => "Alert",
    }
);

vocabulary!(
    /// Client-side permission of a vector.
    Perm, "permission", {
        ReadOnly => "ro",
        WriteOnly => "wo",
        ReadWrite => "rw",
    }
);

vocabulary!(
    /// Mutual-exclusion rule of a switch vector.
    Rule, "rule", {
        OneOfMany => "OneOfMany",
        AtMostOne => "AtMostOne",
        AnyOfMany => "AnyOfMany",
    }
);

vocabulary!(
    /// Position of a switch or toggle.
    OnOff, "switch position", {
        On => "On",
        Off => "Off",
    }
);

vocabulary!(
    /// BLOB forwarding policy a client requests with `enableBLOB`.
    BlobPolicy, "BLOB policy", {
        Never => "Never",
        Also => "Also",
        Only => "Only",
    }
);

vocabulary!(
    /// Telemetry-stream forwarding policy, the streaming counterpart of
    /// [`BlobPolicy`].
    StreamPolicy, "stream policy", {
        Never => "Never",
        Also => "Also",
        Only => "Only",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_spellings_round_trip() {
        assert_eq!(State::Alert.as_str(), "Alert");
        assert_eq!("Alert".parse::<State>().unwrap(), State::Alert);
        assert_eq!(Perm::ReadWrite.as_str(), "rw");
        assert_eq!("wo".parse::<Perm>().unwrap(), Perm::WriteOnly);
        assert_eq!("OneOfMany".parse::<Rule>().unwrap(), Rule::OneOfMany);
        assert_eq!(OnOff::Off.as_str(), "Off");
        assert_eq!("Only".parse::<BlobPolicy>().unwrap(), BlobPolicy::Only);
        assert_eq!("Also".parse::<StreamPolicy>().unwrap(), StreamPolicy::Also);
    }

    #[test]
    fn unknown_words_are_rejected() {
        let err = "Excellent".parse::<State>().unwrap_err();
        assert_eq!(err.to_string(), "unknown state `Excellent`");
        assert!("RO".parse::<Perm>().is_err());
        assert!("on".parse::<OnOff>().is_err());
    }
}
