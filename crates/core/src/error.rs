use thiserror::Error;

use crate::types::SymbolId;

/// Configuration problems detected when building a deck or starting a session.
///
/// Returned to the caller; the session that rejected the configuration is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("symbol set is empty")]
    EmptySymbols,

    #[error("pairing factor must be at least {min}, got {actual}")]
    PairingFactorTooSmall { min: usize, actual: usize },

    #[error("sessions are played in pairs, got pairing factor {0}")]
    UnsupportedPairingFactor(usize),

    #[error("symbol {0} appears more than once in the symbol set")]
    DuplicateSymbol(SymbolId),

    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
