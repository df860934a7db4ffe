//! Mission pricing.
//!
//! The base cost of a mission is a fixed linear weighting of its payload,
//! distance, duration, fuel, and crew. It is what accepting the mission
//! costs, and twice this amount is paid out when a successful mission is
//! acknowledged.

use rust_decimal::prelude::FromPrimitive as _;
use rust_decimal::{Decimal, RoundingStrategy};
use spacefund_types::{LaunchVehicle, MissionSpec};

use crate::EconomyError;

/// Cost per ton of payload.
pub const PAYLOAD_WEIGHT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
/// Cost per light-year of distance.
pub const DISTANCE_WEIGHT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
/// Cost per year of duration.
pub const DURATION_WEIGHT: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);
/// Cost per ton of fuel.
pub const FUEL_WEIGHT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
/// Cost per crew member.
pub const CREW_WEIGHT: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// Multiplier applied to the base cost when a success is acknowledged.
pub const REWARD_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Compute the base cost of a mission, rounded to a whole currency unit.
///
/// ```text
/// payload * 1000 + distance * 100 + duration * 5000 + fuel * 10 + crew * 2000
/// ```
///
/// # Errors
///
/// Returns [`EconomyError::InvalidAttribute`] if an attribute is not finite
/// and [`EconomyError::Overflow`] if the sum leaves the [`Decimal`] range.
pub fn base_cost(spec: &MissionSpec) -> Result<Decimal, EconomyError> {
    let terms = [
        weighted("payload_tons", spec.payload_tons, PAYLOAD_WEIGHT)?,
        weighted("distance_ly", spec.distance_ly, DISTANCE_WEIGHT)?,
        weighted("duration_years", spec.duration_years, DURATION_WEIGHT)?,
        weighted("fuel_tons", spec.fuel_tons, FUEL_WEIGHT)?,
        Decimal::from(spec.crew_size)
            .checked_mul(CREW_WEIGHT)
            .ok_or(EconomyError::Overflow {
                context: "crew cost",
            })?,
    ];
    sum(&terms, "base cost").map(round_currency)
}

/// Flat price of switching to `vehicle`.
pub const fn vehicle_price(vehicle: LaunchVehicle) -> Decimal {
    match vehicle {
        LaunchVehicle::Starship => Decimal::from_parts(50_000, 0, 0, false, 0),
        LaunchVehicle::FalconHeavy => Decimal::from_parts(30_000, 0, 0, false, 0),
        LaunchVehicle::Sls => Decimal::from_parts(70_000, 0, 0, false, 0),
        LaunchVehicle::Ariane6 => Decimal::from_parts(40_000, 0, 0, false, 0),
    }
}

/// Surcharge for flying on `chosen` instead of `current`. Zero when unchanged.
pub const fn vehicle_surcharge(current: LaunchVehicle, chosen: LaunchVehicle) -> Decimal {
    if current as u8 == chosen as u8 {
        Decimal::ZERO
    } else {
        vehicle_price(chosen)
    }
}

/// Payout for acknowledging a successful mission: twice its base cost.
///
/// # Errors
///
/// Propagates any error from [`base_cost`].
pub fn reward_for(spec: &MissionSpec) -> Result<Decimal, EconomyError> {
    base_cost(spec)?
        .checked_mul(REWARD_MULTIPLIER)
        .ok_or(EconomyError::Overflow { context: "reward" })
}

/// Convert an attribute to [`Decimal`] and multiply by its weight.
pub(crate) fn weighted(
    field: &'static str,
    value: f64,
    weight: Decimal,
) -> Result<Decimal, EconomyError> {
    to_decimal(field, value)?
        .checked_mul(weight)
        .ok_or(EconomyError::Overflow { context: field })
}

/// Convert a finite `f64` attribute to [`Decimal`].
pub(crate) fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, EconomyError> {
    Decimal::from_f64(value).ok_or_else(|| EconomyError::InvalidAttribute {
        field,
        value: value.to_string(),
    })
}

/// Checked sum of a slice of amounts.
pub(crate) fn sum(terms: &[Decimal], context: &'static str) -> Result<Decimal, EconomyError> {
    terms.iter().try_fold(Decimal::ZERO, |acc, term| {
        acc.checked_add(*term).ok_or(EconomyError::Overflow { context })
    })
}

/// Round to a whole currency unit, halves away from zero.
pub(crate) fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
