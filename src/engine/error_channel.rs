//! Error reporting across the boundary.
//!
//! Failures reach the host two ways. The result-handle generation embeds an
//! error string in the handle; the id generation returns a status code and
//! keeps the message in a per-thread last-error slot. Both are translated
//! through the same code table in [`ErrorKind`], so a host sees one taxonomy
//! whichever generation produced the failure.

use crate::common::{Error, ErrorKind, Result, error::STATUS_OK};
use std::cell::RefCell;

/// An error flattened to a status code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedError {
    /// Native status code, if the producer attached one
    pub code: Option<i32>,
    pub message: String,
}

impl EmbeddedError {
    pub fn from_error(error: &Error) -> Self {
        Self {
            code: Some(error.kind().code()),
            message: error.to_string(),
        }
    }

    /// A bare message with no status code.
    pub fn opaque(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.code
            .and_then(ErrorKind::from_code)
            .unwrap_or(ErrorKind::Unknown)
    }

    /// Rebuild the typed error. Opaque messages become `Unknown` verbatim.
    pub fn to_error(&self) -> Error {
        match self.code {
            Some(code) if code != STATUS_OK => Error::from_native(code, self.message.clone()),
            _ => Error::Other(self.message.clone()),
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<EmbeddedError>> = const { RefCell::new(None) };
}

/// Per-thread last-error channel.
pub struct ErrorChannel;

impl ErrorChannel {
    /// Remember `error` as this thread's last error.
    pub fn record(error: &Error) {
        log::debug!("boundary error ({}): {}", error.kind(), error);
        let embedded = EmbeddedError::from_error(error);
        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(embedded));
    }

    pub fn clear() {
        LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
    }

    pub fn last() -> Option<EmbeddedError> {
        LAST_ERROR.with(|slot| slot.borrow().clone())
    }

    /// Status code of the last error, [`STATUS_OK`] when there is none.
    pub fn last_code() -> i32 {
        Self::last()
            .map(|e| e.kind().code())
            .unwrap_or(STATUS_OK)
    }

    /// Record the error of a failed call and pass the value of a good one.
    ///
    /// A successful call clears the slot, so the channel always describes
    /// the most recent call on this thread.
    pub fn capture<T>(result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                Self::clear();
                Some(value)
            },
            Err(e) => {
                Self::record(&e);
                None
            },
        }
    }

    /// Translate a status code and message from either ABI generation.
    #[inline]
    pub fn translate(code: i32, message: impl Into<String>) -> Error {
        Error::from_native(code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_and_clears() {
        let failed: Option<()> =
            ErrorChannel::capture(Err(Error::InvalidState("closed".to_string())));
        assert!(failed.is_none());
        assert_eq!(ErrorChannel::last_code(), -6);
        assert!(ErrorChannel::last().unwrap().message.contains("closed"));

        assert_eq!(ErrorChannel::capture(Ok(5)), Some(5));
        assert_eq!(ErrorChannel::last_code(), STATUS_OK);
        assert!(ErrorChannel::last().is_none());
    }

    #[test]
    fn test_last_error_is_per_thread() {
        ErrorChannel::record(&Error::ParseError("bad".to_string()));
        let other = std::thread::spawn(ErrorChannel::last_code).join().unwrap();
        assert_eq!(other, STATUS_OK);
        assert_eq!(ErrorChannel::last_code(), -2);
        ErrorChannel::clear();
    }

    #[test]
    fn test_embedded_round_trip() {
        let original = Error::ResourceNotFound("BIN0003.png".to_string());
        let embedded = EmbeddedError::from_error(&original);
        assert_eq!(embedded.kind(), ErrorKind::NotFound);
        let rebuilt = embedded.to_error();
        assert_eq!(rebuilt.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_opaque_message_is_unknown_verbatim() {
        let embedded = EmbeddedError::opaque("engine exploded: 0xdead");
        assert_eq!(embedded.kind(), ErrorKind::Unknown);
        match embedded.to_error() {
            Error::Other(message) => assert_eq!(message, "engine exploded: 0xdead"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_translate_both_generations() {
        assert_eq!(ErrorChannel::translate(-1, "x").kind(), ErrorKind::FileNotFound);
        assert_eq!(ErrorChannel::translate(2, "x").kind(), ErrorKind::ParseError);
        assert_eq!(ErrorChannel::translate(-42, "x").kind(), ErrorKind::Unknown);
    }
}
