//! Exit codes for the ah-core CLI.
//!
//! Exit codes let scripts branch on the outcome without parsing output.
//!
//! Ranges:
//! - 0-9: operational outcomes (not errors)
//! - 10-19: user/environment errors, fixable by the caller
//! - 20-29: internal and I/O errors

/// Stable process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ------------------------------------------------------------------
    // Operational outcomes (0-9)
    // ------------------------------------------------------------------
    /// Analysis ran; no flood windows.
    Clean = 0,

    /// Input contained no records.
    NoData = 1,

    /// Analysis ran and found at least one flood window.
    FloodsDetected = 2,

    // ------------------------------------------------------------------
    // User / environment errors (10-19)
    // ------------------------------------------------------------------
    /// Invalid arguments.
    ArgsError = 10,

    /// Config file missing, unparseable or invalid.
    ConfigError = 11,

    /// Input records could not be read as JSON.
    InputError = 12,

    // ------------------------------------------------------------------
    // Internal errors (20-29)
    // ------------------------------------------------------------------
    /// Internal error (bug).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes that mean the command did its job.
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Stable name for JSON error payloads.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoData => "OK_NO_DATA",
            ExitCode::FloodsDetected => "OK_FLOODS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a library error.
    pub fn from_error(err: &ah_common::Error) -> ExitCode {
        use ah_common::ErrorCategory;
        match err {
            ah_common::Error::Io(_) => ExitCode::IoError,
            ah_common::Error::Json(_) => ExitCode::InputError,
            ah_common::Error::InvalidDuration(_)
            | ah_common::Error::InvalidTimestamp(_)
            | ah_common::Error::InvalidRange { .. }
            | ah_common::Error::UnknownPreset(_) => ExitCode::ArgsError,
            other => match other.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Input => ExitCode::InputError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::FloodsDetected.is_success());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(!ExitCode::ConfigError.is_internal_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn display_includes_name_and_code() {
        assert_eq!(ExitCode::FloodsDetected.to_string(), "OK_FLOODS (2)");
        assert_eq!(i32::from(ExitCode::InputError), 12);
    }

    #[test]
    fn error_mapping() {
        let io = ah_common::Error::Io(std::io::Error::other("boom"));
        assert_eq!(ExitCode::from_error(&io), ExitCode::IoError);
        assert_eq!(
            ExitCode::from_error(&ah_common::Error::Config("bad".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from_error(&ah_common::Error::InvalidInput("x".into())),
            ExitCode::InputError
        );
        assert_eq!(
            ExitCode::from_error(&ah_common::Error::UnknownPreset("loud".into())),
            ExitCode::ArgsError
        );
    }
}
