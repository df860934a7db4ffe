//! Money for the Space Fund game: what missions cost, what investments
//! cost, what successful missions pay, and where the balance lives.
//!
//! # Architecture
//!
//! - [`pricing`] -- Base mission cost, vehicle price table, and rewards.
//! - [`investment`] -- Investment deltas, their cost, and applying them to
//!   produce a modified mission.
//! - [`treasury`] -- The [`Treasury`]: the session balance plus an
//!   append-only journal of every debit and credit.
//!
//! Everything in [`pricing`] and [`investment`] is a pure function of its
//! inputs. Mission attributes arrive as `f64` from the prediction service;
//! they are converted to [`Decimal`] at the boundary and every amount of
//! money after that point is exact.
//!
//! # Usage
//!
//! ```
//! use spacefund_economy::pricing::base_cost;
//! use spacefund_types::{LaunchVehicle, MissionSpec, MissionType, TargetType};
//! use rust_decimal::Decimal;
//!
//! let spec = MissionSpec {
//!     payload_tons: 10.0,
//!     mission_type: MissionType::Exploration,
//!     target_type: TargetType::Moon,
//!     launch_vehicle: LaunchVehicle::Starship,
//!     distance_ly: 5.0,
//!     duration_years: 2.0,
//!     science_pts: 60.0,
//!     crew_size: 1,
//!     fuel_tons: 100.0,
//! };
//! assert_eq!(base_cost(&spec).ok(), Some(Decimal::from(23_500)));
//! ```
//!
//! [`Decimal`]: rust_decimal::Decimal

pub mod investment;
pub mod pricing;
pub mod treasury;

pub use investment::{InvestmentDeltas, apply_investment, investment_cost};
pub use pricing::{base_cost, reward_for, vehicle_price};
pub use treasury::{EntryKind, Treasury, TreasuryEntry};

use rust_decimal::Decimal;

/// Errors that can occur during economy operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// The balance cannot cover the requested debit.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount the action costs.
        required: Decimal,
        /// Balance at the time of the attempt.
        available: Decimal,
    },

    /// A mission attribute cannot be priced (NaN or infinite).
    #[error("invalid mission attribute {field}: {value}")]
    InvalidAttribute {
        /// Name of the offending field.
        field: &'static str,
        /// The value as received.
        value: String,
    },

    /// A monetary amount exceeded the representable range.
    #[error("arithmetic overflow in {context}")]
    Overflow {
        /// Which computation overflowed.
        context: &'static str,
    },

    /// A debit or credit was requested for a negative amount.
    #[error("negative amount: {amount}")]
    NegativeAmount {
        /// The rejected amount.
        amount: Decimal,
    },
}
