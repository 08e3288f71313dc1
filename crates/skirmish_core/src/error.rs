//! Error types for the skirmish simulation.
//!
//! Two layers: [`GameError`] for programmatic misuse of the API, and
//! [`CommandRejection`] for player commands that the world refuses. A
//! rejection is routine gameplay and never aborts a tick.

use thiserror::Error;

use crate::components::EntityId;
use crate::mines::MineState;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for simulation API misuse.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A mine was asked to move backwards through its lifecycle.
    #[error("Illegal mine transition for mine {mine}: {from:?} -> {to:?}")]
    IllegalMineTransition {
        /// The mine entity.
        mine: EntityId,
        /// State the mine was in.
        from: MineState,
        /// State that was requested.
        to: MineState,
    },

    /// Config or scenario text failed to parse.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// What was being parsed (config, scenario, world seed).
        what: &'static str,
        /// Parser message, including the location.
        message: String,
    },

    /// Config values that parse but cannot drive a simulation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Why a player command was not applied.
///
/// Rejections are reported back through the tick's event report and are
/// never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, serde::Serialize, serde::Deserialize)]
pub enum CommandRejection {
    /// The ledger balance does not cover the cost.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Cost of the request.
        required: u32,
        /// Balance at the time of the request.
        available: u32,
    },

    /// The footprint overlaps a structure or pile, or leaves the map.
    #[error("Invalid placement")]
    InvalidPlacement,

    /// The command references an entity that does not exist or cannot do this.
    #[error("Invalid target")]
    InvalidTarget,

    /// The actor already has an outstanding order of this kind.
    #[error("An order is already pending")]
    AlreadyPending,
}
