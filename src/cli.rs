// This is free and unencumbered software released into the public domain.

//! CLI helpers (error reporting, verbosity handling).
//!
//! This module must compile even when the crate feature `cli` is disabled,
//! because the library is built in non-CLI configurations.

#[cfg(feature = "cli")]
use crate::shared::BridgeError;

#[cfg(feature = "cli")]
use asimov_module::SysexitsError::{self, *};

#[cfg(feature = "cli")]
use clientele::StandardOptions;

#[cfg(feature = "cli")]
pub fn handle_error(err: &BridgeError, flags: &StandardOptions) -> SysexitsError {
    #[cfg(feature = "tracing")]
    {
        use asimov_module::tracing::{debug, error};

        error!(target: "asimov_camerax_bridge", %err, code = err.code(), "bridge host failed");

        if flags.debug || flags.verbose >= 2 {
            debug!(target: "asimov_camerax_bridge", ?err, "detailed error");
        }
    }

    report_error(err, flags);
    map_error_to_sysexit(err)
}

#[cfg(feature = "cli")]
pub fn info_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("INFO: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::info!(target: "asimov_camerax_bridge", "{msg}");
}

#[cfg(feature = "cli")]
pub fn warn_user_with_error(flags: &StandardOptions, msg: &str, error: &dyn std::error::Error) {
    if flags.debug || flags.verbose >= 2 {
        eprintln!("WARN: {msg}: {error}");
    } else if flags.verbose >= 1 {
        eprintln!("WARN: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::warn!(target: "asimov_camerax_bridge", error = %error, "{msg}");
}

#[cfg(feature = "cli")]
fn report_error(err: &BridgeError, flags: &StandardOptions) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{}", error_line(err));

    if flags.debug || flags.verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {}", cause);
            source = cause.source();
        }
    }
}

/// The user-facing line for `err`, tagged with its wire code.
#[cfg(feature = "cli")]
pub fn error_line(err: &BridgeError) -> String {
    format!("ERROR: [{}] {err}", err.code())
}

#[cfg(feature = "cli")]
pub fn map_error_to_sysexit(err: &BridgeError) -> SysexitsError {
    use BridgeError::*;
    match err {
        NotFound(_) | WrongKind { .. } | IdentifierInUse(_) | AlreadyRegistered(_) => EX_DATAERR,
        InvalidArgument(_) => EX_USAGE,
        Codec(_) => EX_DATAERR,
        NotReady(_) => EX_UNAVAILABLE,
        ChannelFull | Closed => EX_IOERR,
        Unregistered(_) | Native { .. } | Other(_) => EX_SOFTWARE,
    }
}

// When `cli` is disabled, keep the module linkable without exposing CLI-only types.
#[cfg(not(feature = "cli"))]
#[inline]
pub fn info_user(_msg: &str) {}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn bad_input_maps_to_data_errors() {
        assert!(matches!(map_error_to_sysexit(&BridgeError::NotFound(1)), EX_DATAERR));
        let codec = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(matches!(map_error_to_sysexit(&BridgeError::from(codec)), EX_DATAERR));
    }

    #[test]
    fn error_lines_carry_the_wire_code() {
        assert_eq!(
            error_line(&BridgeError::NotFound(3)),
            "ERROR: [not-found] no instance registered for identifier 3"
        );
        assert_eq!(
            error_line(&BridgeError::Closed),
            "ERROR: [channel-closed] message channel closed"
        );
    }

    #[test]
    fn transport_failures_map_to_io_errors() {
        assert!(matches!(map_error_to_sysexit(&BridgeError::Closed), EX_IOERR));
        assert!(matches!(map_error_to_sysexit(&BridgeError::ChannelFull), EX_IOERR));
    }
}
