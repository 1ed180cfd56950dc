use std::io;
use thiserror::Error;
use crate::channel::Request;

/// DDC/CI protocol errors found while decoding a monitor's reply.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum ErrorCode {
    /// Expected matching offset from DDC/CI
    #[error("invalid offset returned from DDC/CI")]
    InvalidOffset,
    /// DDC/CI invalid packet length
    #[error("invalid DDC/CI length")]
    InvalidLength,
    /// Checksum mismatch
    #[error("DDC/CI checksum mismatch")]
    InvalidChecksum,
    /// Expected opcode mismatch
    #[error("DDC/CI VCP opcode mismatch")]
    InvalidOpcode,
    /// Expected data mismatch
    #[error("invalid DDC/CI data")]
    InvalidData,
    /// The reply's result code flagged the VCP feature as unsupported
    #[error("VCP code reported as unsupported")]
    UnsupportedVcp,
    /// The display answered with a null message
    #[error("DDC/CI null message")]
    NullMessage,
    /// Custom unspecified error
    #[error("{0}")]
    Invalid(String),
}

/// A failure reported by a [`DdcHost`](crate::DdcHost) before it has been
/// classified by the channel layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The monitor replied, but the reply was rejected or flagged an error.
    #[error("DDC/CI reply error: {0}")]
    Reply(#[from] ErrorCode),
    /// Nothing usable came back within the reply window.
    #[error("no reply: {0}")]
    NoReply(String),
    /// The handle or the device behind it is gone.
    #[error("device disconnected: {0}")]
    Disconnected(String),
}

const ENODEV: i32 = 19;

impl Fault {
    /// Classify an I/O error from an i2c-dev transfer.
    ///
    /// A missing device node or adapter means the monitor's bus is gone;
    /// anything else (NAK, EIO, EREMOTEIO) is treated as the display not
    /// answering.
    pub fn from_io(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(ENODEV) {
            Fault::Disconnected(e.to_string())
        } else {
            Fault::NoReply(e.to_string())
        }
    }
}

/// Every failure the crate reports.
#[derive(Debug, Error)]
pub enum Error {
    /// No displays were found or the display topology walk failed.
    #[error("display enumeration failed: {0}")]
    Enumeration(String),
    /// A selector matched no monitor.
    #[error("no monitor matches {0}")]
    NotFound(String),
    /// An operation was issued on a released handle.
    #[error("monitor handle used after release")]
    UseAfterRelease,
    /// The hardware does not implement the requested feature.
    #[error("{0} is not supported by the monitor")]
    Unsupported(Request),
    /// The monitor did not answer in time.
    #[error("{request} timed out: {reason}")]
    Timeout {
        /// The transaction that went unanswered.
        request: Request,
        /// What the transport reported.
        reason: String,
    },
    /// The monitor's reply was malformed.
    #[error("{request} failed: {code}")]
    Protocol {
        /// The transaction whose reply was rejected.
        request: Request,
        /// What was wrong with it.
        code: ErrorCode,
    },
    /// The handle was invalidated mid-operation.
    #[error("monitor lost: {0}")]
    DeviceLost(String),
    /// A capabilities string could not be parsed.
    #[error("malformed capabilities string at offset {offset}: {reason}")]
    MalformedCapabilities {
        /// Byte offset into the raw string.
        offset: usize,
        /// What was found there.
        reason: String,
    },
}

/// The kind of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    Enumeration,
    NotFound,
    UseAfterRelease,
    Unsupported,
    Timeout,
    Protocol,
    DeviceLost,
    MalformedCapabilities,
}

impl Error {
    /// The error's kind.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::Enumeration(..) => ErrorKind::Enumeration,
            Error::NotFound(..) => ErrorKind::NotFound,
            Error::UseAfterRelease => ErrorKind::UseAfterRelease,
            Error::Unsupported(..) => ErrorKind::Unsupported,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::DeviceLost(..) => ErrorKind::DeviceLost,
            Error::MalformedCapabilities { .. } => ErrorKind::MalformedCapabilities,
        }
    }

    /// Whether the failure concerns the handle as a whole rather than a
    /// single transaction.
    pub fn is_systemic(&self) -> bool {
        matches!(self.kind(), ErrorKind::DeviceLost | ErrorKind::UseAfterRelease)
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        let kind = match e.kind() {
            ErrorKind::Enumeration | ErrorKind::NotFound | ErrorKind::DeviceLost => io::ErrorKind::NotFound,
            ErrorKind::UseAfterRelease => io::ErrorKind::Other,
            ErrorKind::Unsupported => io::ErrorKind::Unsupported,
            ErrorKind::Timeout => io::ErrorKind::TimedOut,
            ErrorKind::Protocol | ErrorKind::MalformedCapabilities => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_split_into_disconnect_and_silence() {
        assert!(matches!(
            Fault::from_io(io::Error::from_raw_os_error(ENODEV)),
            Fault::Disconnected(..)
        ));
        assert!(matches!(
            Fault::from_io(io::Error::new(io::ErrorKind::NotFound, "gone")),
            Fault::Disconnected(..)
        ));
        // ENXIO: nobody acknowledged the DDC/CI address
        assert!(matches!(
            Fault::from_io(io::Error::from_raw_os_error(6)),
            Fault::NoReply(..)
        ));
    }

    #[test]
    fn kinds_and_io_conversion() {
        let e = Error::Unsupported(Request::GetVcp(0xd6));
        assert_eq!(e.kind(), ErrorKind::Unsupported);
        assert!(!e.is_systemic());
        assert_eq!(e.to_string(), "get VCP 0xd6 is not supported by the monitor");
        assert_eq!(io::Error::from(e).kind(), io::ErrorKind::Unsupported);

        let e = Error::DeviceLost("unplugged".into());
        assert!(e.is_systemic());
        assert_eq!(io::Error::from(e).kind(), io::ErrorKind::NotFound);

        let e = Error::Timeout { request: Request::Capabilities, reason: "EIO".into() };
        assert_eq!(io::Error::from(e).kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn error_code_converts_into_reply_fault() {
        let fault: Fault = ErrorCode::InvalidChecksum.into();
        assert_eq!(fault, Fault::Reply(ErrorCode::InvalidChecksum));
        assert_eq!(fault.to_string(), "DDC/CI reply error: DDC/CI checksum mismatch");
    }
}
