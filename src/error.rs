// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Form input rejected before any network call.
    #[error("Invalid transaction: {0}")]
    Validation(String),
    /// The persistence API refused a write; carries its user-facing message.
    #[error("{0}")]
    Persistence(String),
    #[error("Transaction {0} not found")]
    NotFound(i64),
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
