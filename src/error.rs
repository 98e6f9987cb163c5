// Error types
//
// TopologyError covers input rejected at the map boundary; CaptureError
// covers everything that can go wrong talking to a capture collaborator.

use thiserror::Error;

/// Errors raised by the topology engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The input could not be parsed as an IPv4 or IPv6 address
    #[error("invalid address {input:?}")]
    InvalidAddress { input: String },
}

/// Errors raised by capture collaborators
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture source cannot run on this platform or configuration
    #[error("capture unavailable: {0}")]
    Unavailable(String),

    /// `set_capture_device` was given a name that is not in the device list
    #[error("capture device cannot be found: {0}")]
    DeviceNotFound(String),

    #[error("no capture device selected")]
    NoDeviceSelected,

    #[error("capture is already running")]
    AlreadyRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed replay or device file content
    #[error("parse error: {0}")]
    Parse(String),

    #[error("resolution failed for {address}: {message}")]
    Resolution { address: String, message: String },
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Parse(err.to_string())
    }
}
