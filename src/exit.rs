// src/exit.rs
//! Standardized process exit codes for `moth`.
//!
//! Only a fatal run error is non-zero for `moth run`; degraded analysis still exits 0.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MothExit {
    /// Operation completed successfully (possibly with warnings).
    Success = 0,
    /// Fatal error: root missing, artifacts could not be written.
    Error = 1,
    /// `moth verify` found a checksum or digest mismatch.
    VerifyFailed = 2,
}

impl MothExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for MothExit {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn report(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<anyhow::Result<()>> for MothExit {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(e) => {
                eprintln!("Error: {e}");
                Self::Error
            }
        }
    }
}
