//! Error types for the waste bank ledger
//!
//! This module defines all error types that can occur while crediting deposits,
//! paying out cash, redeeming rewards and reconciling redemptions with the
//! remote order-processing service.
//!
//! # Error Categories
//!
//! - **Balance Errors**: Insufficient points or cash, invalid amounts
//! - **Lookup Errors**: Unknown rewards or redemption records
//! - **Deposit Errors**: Malformed QR payloads, codes that were already claimed
//! - **Arithmetic Errors**: Overflow, underflow in balance calculations
//! - **Remote Errors**: Transport failures and server rejections
//! - **Storage Errors**: Snapshot file could not be read or written

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the waste bank
///
/// Every variant carries enough context to be shown to the user as-is.
/// Only `Storage` is fatal for the CLI; everything else is recoverable and
/// leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WasteBankError {
    /// Point balance is below the reward cost
    ///
    /// Raised before any mutation happens.
    #[error(
        "Insufficient points for user {user}: available {available}, requested {requested}"
    )]
    InsufficientBalance {
        /// User ID
        user: String,
        /// Points currently available
        available: u64,
        /// Reward cost in points
        requested: u64,
    },

    /// Cash balance is below the requested withdrawal
    #[error("Insufficient funds for user {user}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// User ID
        user: String,
        /// Cash balance
        available: Decimal,
        /// Requested withdrawal amount
        requested: Decimal,
    },

    /// Withdrawal amount is zero or negative
    #[error("Invalid amount '{amount}' for user {user}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// User ID
        user: String,
    },

    /// Reward cannot be redeemed (zero point cost)
    #[error("Reward {reward} is not redeemable: {reason}")]
    InvalidReward {
        /// Reward ID
        reward: String,
        /// Why the reward was rejected
        reason: String,
    },

    /// Reward ID is not in the catalog
    #[error("Reward {reward} not found")]
    RewardNotFound {
        /// Reward ID that was not found
        reward: String,
    },

    /// Redemption record does not exist
    #[error("Redemption {id} not found")]
    RedemptionNotFound {
        /// Redemption ID
        id: String,
    },

    /// Deposit QR payload could not be parsed or failed validation
    #[error("Invalid deposit payload: {message}")]
    InvalidPayload {
        /// Description of the problem
        message: String,
    },

    /// Deposit code was already claimed
    ///
    /// Deposit QR codes are single-use; a second scan is ignored.
    #[error("Deposit code {code} was already claimed by user {user}")]
    DuplicateDeposit {
        /// Deposit code
        code: String,
        /// User that claimed it first
        user: String,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for user {user}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// User ID
        user: String,
    },

    /// Arithmetic underflow would occur
    #[error("Arithmetic underflow in {operation} for user {user}")]
    ArithmeticUnderflow {
        /// Operation that would underflow
        operation: String,
        /// User ID
        user: String,
    },

    /// Remote call did not resolve
    ///
    /// Network error, timeout, non-2xx status or an undecodable body.
    /// The affected records stay pending.
    #[error("Remote call to {endpoint} did not resolve: {message}")]
    Transport {
        /// Endpoint path that was called
        endpoint: String,
        /// Description of the failure
        message: String,
    },

    /// Remote service answered but refused the redemption
    #[error("Redemption {id} was rejected by the server")]
    ServerRejection {
        /// Redemption ID
        id: String,
    },

    /// Snapshot could not be loaded or saved
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },
}

impl From<std::io::Error> for WasteBankError {
    fn from(error: std::io::Error) -> Self {
        WasteBankError::Storage {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for WasteBankError {
    fn from(error: serde_json::Error) -> Self {
        WasteBankError::Storage {
            message: format!("JSON error: {}", error),
        }
    }
}

// Helper functions for creating common errors

impl WasteBankError {
    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user: &str, available: u64, requested: u64) -> Self {
        WasteBankError::InsufficientBalance {
            user: user.to_string(),
            available,
            requested,
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(user: &str, available: Decimal, requested: Decimal) -> Self {
        WasteBankError::InsufficientFunds {
            user: user.to_string(),
            available,
            requested,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, user: &str) -> Self {
        WasteBankError::InvalidAmount {
            amount,
            user: user.to_string(),
        }
    }

    /// Create an InvalidReward error
    pub fn invalid_reward(reward: &str, reason: &str) -> Self {
        WasteBankError::InvalidReward {
            reward: reward.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a RewardNotFound error
    pub fn reward_not_found(reward: &str) -> Self {
        WasteBankError::RewardNotFound {
            reward: reward.to_string(),
        }
    }

    /// Create a RedemptionNotFound error
    pub fn redemption_not_found(id: &str) -> Self {
        WasteBankError::RedemptionNotFound { id: id.to_string() }
    }

    /// Create an InvalidPayload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        WasteBankError::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a DuplicateDeposit error
    pub fn duplicate_deposit(code: &str, user: &str) -> Self {
        WasteBankError::DuplicateDeposit {
            code: code.to_string(),
            user: user.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user: &str) -> Self {
        WasteBankError::ArithmeticOverflow {
            operation: operation.to_string(),
            user: user.to_string(),
        }
    }

    /// Create an ArithmeticUnderflow error
    pub fn arithmetic_underflow(operation: &str, user: &str) -> Self {
        WasteBankError::ArithmeticUnderflow {
            operation: operation.to_string(),
            user: user.to_string(),
        }
    }

    /// Create a Transport error
    pub fn transport(endpoint: &str, message: impl Into<String>) -> Self {
        WasteBankError::Transport {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// Create a ServerRejection error
    pub fn server_rejection(id: &str) -> Self {
        WasteBankError::ServerRejection { id: id.to_string() }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        WasteBankError::Storage {
            message: message.into(),
        }
    }

    /// Whether the error means "try again later" rather than a hard failure
    pub fn is_transport(&self) -> bool {
        matches!(self, WasteBankError::Transport { .. })
    }
}
