use thiserror::Error;

use seavoice_core::error::{CoreError, TransportError};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("exchange was superseded by a newer request")]
    Superseded,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("utterance is blank")]
    BlankUtterance,

    #[error(transparent)]
    Core(#[from] CoreError),
}
