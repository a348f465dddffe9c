//! Exit code constants for brownfield commands.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid arguments or configuration |
//! | 3 | `STATE_NOT_FOUND` | No state file for the project |
//! | 4 | `INVALID_STATE` | State file corrupted or from an unsupported schema |
//! | 5 | `PHASE_BLOCKED` | Phase transition or workflow prerequisite refused |
//! | 6 | `CHECKPOINT_UNAVAILABLE` | Checkpoint missing, corrupted or task unknown |
//! | 7 | `GATE_FAILED` | A readiness gate failed |
//! | 8 | `REGRESSION_BASELINE_MISSING` | Regression check without a baseline |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants, or [`as_i32()`](Self::as_i32) to get the numeric
/// value for `std::process::exit()`.
///
/// ```rust
/// use brownfield_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::PHASE_BLOCKED.as_i32(), 5);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// No state file exists yet
    pub const STATE_NOT_FOUND: ExitCode = ExitCode(3);

    /// State file could not be parsed or has an unsupported schema
    pub const INVALID_STATE: ExitCode = ExitCode(4);

    /// A phase transition or workflow prerequisite was refused
    pub const PHASE_BLOCKED: ExitCode = ExitCode(5);

    /// Checkpoint missing or corrupted
    pub const CHECKPOINT_UNAVAILABLE: ExitCode = ExitCode(6);

    /// A readiness gate failed
    pub const GATE_FAILED: ExitCode = ExitCode(7);

    /// Regression detection requested without baseline metrics
    pub const REGRESSION_BASELINE_MISSING: ExitCode = ExitCode(8);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
