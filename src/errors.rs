use std::collections::TryReserveError;

use thiserror::Error;

use crate::HandleId;

pub type Result<T> = std::result::Result<T, StreamLinesError>;

#[derive(Error, Debug)]
pub enum StreamLinesError {
    #[error("invalid handle {0}, max supported is {1}")]
    InvalidHandle(HandleId, usize),
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
}
