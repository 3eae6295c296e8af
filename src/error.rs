//! Error types for the tone engine.
//!
//! Both note-level errors are local and recoverable: the caller asked for a
//! note that does not exist, or asked to stop a note that is not sounding.

use thiserror::Error;

use crate::graph::NodeId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ToneError>;

/// Errors surfaced by the tone lifecycle manager.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToneError {
    /// The note name is not in the frequency table. Nothing was allocated.
    #[error("unknown note: {note:?}")]
    UnknownNote { note: String },

    /// `stop_note` was called for a note with no live voice.
    #[error("no active voice for note {note:?}")]
    NoActiveVoice { note: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ToneError {
    /// True for conditions a caller can simply ignore and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ToneError::UnknownNote { .. } | ToneError::NoActiveVoice { .. })
    }
}

/// Errors from audio graph manipulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0:?} does not exist in the graph")]
    UnknownNode(NodeId),

    #[error("the destination node has no outputs")]
    DestinationHasNoOutput,

    #[error("the destination node cannot be removed")]
    CannotRemoveDestination,

    #[error("connecting {from:?} -> {to:?} would create a cycle")]
    Cycle { from: NodeId, to: NodeId },

    #[error("node {0:?} is not of the requested kind")]
    WrongKind(NodeId),

    #[error("oscillator {0:?} has already been started")]
    AlreadyStarted(NodeId),

    #[error("oscillator {0:?} must be started before it can be stopped")]
    NotStarted(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_errors_are_recoverable() {
        let unknown = ToneError::UnknownNote {
            note: "H#9".to_string(),
        };
        let idle = ToneError::NoActiveVoice {
            note: "A".to_string(),
        };

        assert!(unknown.is_recoverable());
        assert!(idle.is_recoverable());
        assert!(!ToneError::from(GraphError::DestinationHasNoOutput).is_recoverable());
    }

    #[test]
    fn messages_name_the_note() {
        let err = ToneError::UnknownNote {
            note: "Q".to_string(),
        };
        assert_eq!(err.to_string(), "unknown note: \"Q\"");
    }
}
