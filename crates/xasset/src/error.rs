use thiserror::Error;

use crate::asset::ExportStatus;
use crate::memory::Address;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read {len} bytes of process memory at {address}: {message}")]
    ReadFault {
        address: Address,
        len: usize,
        message: String,
    },

    #[error("{title}: no signature matched the module image (unsupported game version)")]
    GameNotSupported { title: String },

    #[error("{title}: sentinel check failed, expected {expected:?} but found {found:?}")]
    ValidationFailed {
        title: String,
        expected: String,
        found: String,
    },

    #[error("{pool}: element size {actual} does not match expected header size {expected}")]
    LayoutMismatch {
        pool: String,
        expected: u32,
        actual: u32,
    },

    #[error("{asset}: header at {address} no longer names this asset (found {found:?})")]
    MemoryChanged {
        asset: String,
        address: Address,
        found: String,
    },

    #[error("{asset}: failed to decode payload: {message}")]
    DecodeError { asset: String, message: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Session is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn read_fault(address: Address, len: usize, message: impl Into<String>) -> Self {
        Error::ReadFault {
            address,
            len,
            message: message.into(),
        }
    }

    /// Errors that end the whole session rather than a single pool or asset
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_)
                | Error::ProcessOpenFailed(_)
                | Error::GameNotSupported { .. }
                | Error::ValidationFailed { .. }
                | Error::InvalidState { .. }
                | Error::ThreadPool(_)
        )
    }

    /// Status recorded for an export attempt that failed with this error
    pub fn export_status(&self) -> ExportStatus {
        match self {
            Error::MemoryChanged { .. } => ExportStatus::MemoryChanged,
            Error::DecodeError { .. } => ExportStatus::DecodeError,
            Error::Io(_) | Error::Json(_) => ExportStatus::IoError,
            _ => ExportStatus::ReadFault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fatal_classification() {
        let fatal = Error::GameNotSupported {
            title: "Modern Warfare".to_string(),
        };
        assert!(fatal.is_session_fatal());

        let per_pool = Error::LayoutMismatch {
            pool: "rawfile".to_string(),
            expected: 24,
            actual: 32,
        };
        assert!(!per_pool.is_session_fatal());
    }

    #[test]
    fn test_export_status_mapping() {
        let changed = Error::MemoryChanged {
            asset: "a.gsc".to_string(),
            address: Address::new(0x1000),
            found: "b.gsc".to_string(),
        };
        assert_eq!(changed.export_status(), ExportStatus::MemoryChanged);

        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.export_status(), ExportStatus::IoError);

        let fault = Error::read_fault(Address::new(0x10), 4, "unmapped");
        assert_eq!(fault.export_status(), ExportStatus::ReadFault);
    }

    #[test]
    fn test_read_fault_message_has_address() {
        let fault = Error::read_fault(Address::new(0x7FF6_0000_1000), 8, "unmapped");
        assert!(fault.to_string().contains("0x7FF600001000"));
    }
}
