//! Structured errors raised by the stdio host binding itself.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool parameters (e.g., empty client id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The client id was never registered.
    #[error("UNKNOWN_CLIENT: {0}")]
    UnknownClient(String),

    /// Tool output could not be serialized.
    #[error("OUTPUT_ERROR: {0}")]
    Output(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::UnknownClient(msg) => (-32030, msg.clone()),
            HostError::Output(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_codes() {
        let err: McpError = HostError::UnknownClient("tab-9".into()).into();
        assert_eq!(err.code.0, -32030);
        assert_eq!(err.message, "tab-9");
    }
}
