// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `Error` struct and the `ErrorKind` enum, which are
//! used to represent errors that can occur in the library.

/// A macro for defining the `ErrorKind` enum, the `Display` implementation for
/// it, and the constructors for the `Error` struct.
macro_rules! ErrorKind {
    ($(
        ($kind:ident, $ctor:ident)
    ),*) => {
        /// The kind of error that occurred.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub(crate) enum ErrorKind {
            $(
                $kind,
            )*
        }

        impl std::fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$kind => write!(f, "{}", stringify!($kind)),
                    )*
                }
            }
        }

        /// Constructors for [`Error`].
        impl Error {
            $(
                #[doc = concat!(
                    "Creates a new [`Error`] with the `",
                    stringify!($kind),
                    "` kind and the given description."
                )]
                pub(crate) fn $ctor(desc: impl Into<String>) -> crate::Error {
                    Self {
                        kind: ErrorKind::$kind,
                        desc: desc.into(),
                    }
                }
            )*
        }
    };
}

ErrorKind!(
    (DataUnavailable, data_unavailable),
    (InvalidConfig, invalid_config),
    (InvalidInput, invalid_input),
    (InvalidRecord, invalid_record),
    (InvalidTopology, invalid_topology),
    (PanelNotFound, panel_not_found)
);

/// An error that can occur while validating records, building a
/// [DistributionGraph][crate::DistributionGraph] or evaluating capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    desc: String,
}

impl Error {
    /// Returns true if the error is the soft "unavailable" signal raised when
    /// project or service data is missing.
    ///
    /// Such errors are meant to be surfaced as-is by the caller, instead of
    /// aborting the analysis.
    pub fn is_data_unavailable(&self) -> bool {
        self.kind == ErrorKind::DataUnavailable
    }

    /// Returns the description of the error, without the kind prefix.
    pub fn description(&self) -> &str {
        &self.desc
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.desc)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::invalid_input("Voltage must be positive, got 0.");
        assert_eq!(
            err.to_string(),
            "InvalidInput: Voltage must be positive, got 0."
        );
        assert_eq!(err.description(), "Voltage must be positive, got 0.");
        assert!(!err.is_data_unavailable());

        let err = Error::data_unavailable("Project data unavailable.");
        assert!(err.is_data_unavailable());
        assert_eq!(err.to_string(), "DataUnavailable: Project data unavailable.");
    }
}
