//! Error types for typeflow.

use crate::classify::ClassifyError;
use crate::element::PadDirection;
use thiserror::Error;

/// Result type alias using typeflow's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid pad linking or pad misuse.
///
/// These are programmer errors in pipeline construction, not runtime
/// negotiation failures, and they are always fatal.
#[derive(Error, Debug)]
pub enum LinkError {
    /// One of the pads already has a peer; links are single-use.
    #[error("pad {pad} is already linked")]
    AlreadyLinked {
        /// Name of the pad that already has a peer.
        pad: String,
    },

    /// Both pads share a direction; a link is exactly one src to one sink.
    #[error("pads {a} and {b} have the same direction")]
    SameDirection {
        /// First pad name.
        a: String,
        /// Second pad name.
        b: String,
    },

    /// The operation requires a linked pad.
    #[error("pad {pad} is not linked")]
    NotLinked {
        /// Name of the unlinked pad.
        pad: String,
    },

    /// The operation is only valid on pads of the other direction.
    #[error("{op} is only valid on {expected} pads (pad {pad})")]
    WrongDirection {
        /// The attempted operation.
        op: &'static str,
        /// The direction the operation requires.
        expected: PadDirection,
        /// Name of the offending pad.
        pad: String,
    },
}

/// Main error type for typeflow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid pad linking.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A role-restricted element refused to provide a pad of this direction.
    #[error("element {element} provides no {direction} pads")]
    PadRequestRejected {
        /// Name of the refusing element.
        element: String,
        /// The requested direction.
        direction: PadDirection,
    },

    /// A caps payload was required but missing or of the wrong shape.
    #[error("caps payload error: {0}")]
    CapsType(String),

    /// A strict-policy element rejected the offered caps.
    #[error("caps negotiation failed in {element}: cannot accept {offered}")]
    Negotiation {
        /// Name of the rejecting element.
        element: String,
        /// Label of the offered caps (or a description of the failure).
        offered: String,
    },

    /// A control event nobody handles.
    #[error("unhandled event: {name}")]
    UnhandledEvent {
        /// Name of the unknown event.
        name: String,
    },

    /// No detector matched and no classifier fallback is configured.
    #[error("no detector matched and no classifier is configured")]
    DetectionExhausted,

    /// The classifier endpoint could not be reached.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The classifier answered, but the answer could not be interpreted.
    #[error("classifier returned a malformed response: {0}")]
    ClassifierMalformed(String),

    /// A declared source location cannot be read.
    #[error("resource not readable: {uri}")]
    MissingResource {
        /// The URI that could not be read.
        uri: String,
    },

    /// A buffer arrived on an element with no buffer handler.
    #[error("element {element} received a buffer but has no handler")]
    UnexpectedBuffer {
        /// Name of the element.
        element: String,
    },

    /// An element was re-entered while it was already executing.
    #[error("element {element} re-entered during dispatch")]
    Reentrant {
        /// Name of the element.
        element: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClassifyError> for Error {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Unavailable(msg) => Error::ClassifierUnavailable(msg),
            ClassifyError::Malformed(msg) => Error::ClassifierMalformed(msg),
        }
    }
}
