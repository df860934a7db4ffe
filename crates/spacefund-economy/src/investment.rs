//! Investments: paid changes to an offered mission's parameters.
//!
//! A player may shorten distance, duration, and payload, add science,
//! crew, and fuel, and switch launch vehicle. Every change costs money on
//! top of the mission's base cost. Confirming the investment launches a
//! derived mission carrying the new parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spacefund_types::{LaunchVehicle, Mission, MissionSpec};

use crate::EconomyError;
use crate::pricing::{
    self, CREW_WEIGHT, DISTANCE_WEIGHT, DURATION_WEIGHT, FUEL_WEIGHT, PAYLOAD_WEIGHT,
};

/// Smallest value a reduced attribute may reach.
pub const ATTRIBUTE_FLOOR: f64 = 0.1;

/// Cost per science point added.
pub const SCIENCE_WEIGHT: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Requested parameter changes, as entered in the investment dialog.
///
/// Raw input may be negative, NaN, or larger than the attribute it
/// reduces. [`InvestmentDeltas::clamped_for`] normalizes it before pricing
/// or applying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDeltas {
    /// Light-years taken off the distance.
    pub distance_reduction: f64,
    /// Years taken off the duration.
    pub duration_reduction: f64,
    /// Tons taken off the payload.
    pub payload_reduction: f64,
    /// Science points added.
    pub science_addition: f64,
    /// Crew members added.
    pub crew_addition: u32,
    /// Tons of fuel added.
    pub fuel_addition: f64,
}

impl InvestmentDeltas {
    /// No changes at all.
    pub const NONE: Self = Self {
        distance_reduction: 0.0,
        duration_reduction: 0.0,
        payload_reduction: 0.0,
        science_addition: 0.0,
        crew_addition: 0,
        fuel_addition: 0.0,
    };

    /// Normalize raw input against the mission it applies to.
    ///
    /// Negative and non-finite values become zero. Reductions are capped so
    /// the reduced attribute stays at or above [`ATTRIBUTE_FLOOR`].
    #[must_use]
    pub fn clamped_for(&self, spec: &MissionSpec) -> Self {
        Self {
            distance_reduction: cap_reduction(self.distance_reduction, spec.distance_ly),
            duration_reduction: cap_reduction(self.duration_reduction, spec.duration_years),
            payload_reduction: cap_reduction(self.payload_reduction, spec.payload_tons),
            science_addition: non_negative(self.science_addition),
            crew_addition: self.crew_addition,
            fuel_addition: non_negative(self.fuel_addition),
        }
    }
}

/// Total price of launching `spec` with `deltas` on `vehicle`.
///
/// Always includes the base cost, so zero deltas on the same vehicle cost
/// exactly [`pricing::base_cost`]. Deltas are clamped with
/// [`InvestmentDeltas::clamped_for`] first; the result is rounded to a
/// whole currency unit.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidAttribute`] for non-finite mission
/// attributes and [`EconomyError::Overflow`] if the total is out of range.
pub fn investment_cost(
    spec: &MissionSpec,
    deltas: &InvestmentDeltas,
    vehicle: LaunchVehicle,
) -> Result<Decimal, EconomyError> {
    let d = deltas.clamped_for(spec);
    let base = pricing::base_cost(spec)?;
    let terms = [
        pricing::weighted("distance_reduction", d.distance_reduction, DISTANCE_WEIGHT)?,
        pricing::weighted("duration_reduction", d.duration_reduction, DURATION_WEIGHT)?,
        pricing::weighted("payload_reduction", d.payload_reduction, PAYLOAD_WEIGHT)?,
        pricing::weighted("science_addition", d.science_addition, SCIENCE_WEIGHT)?,
        Decimal::from(d.crew_addition)
            .checked_mul(CREW_WEIGHT)
            .ok_or(EconomyError::Overflow {
                context: "crew addition",
            })?,
        pricing::weighted("fuel_addition", d.fuel_addition, FUEL_WEIGHT)?,
        pricing::vehicle_surcharge(spec.launch_vehicle, vehicle),
    ];
    let extra = pricing::round_currency(pricing::sum(&terms, "investment")?);
    base.checked_add(extra).ok_or(EconomyError::Overflow {
        context: "investment total",
    })
}

/// Produce the mission that flies after an investment is confirmed.
///
/// Reductions are subtracted and floored at [`ATTRIBUTE_FLOOR`], additions
/// are summed, and the vehicle is replaced. The result carries the same id
/// and no success prediction; the caller requests a fresh one.
pub fn apply_investment(
    mission: &Mission,
    deltas: &InvestmentDeltas,
    vehicle: LaunchVehicle,
) -> Mission {
    let old = &mission.spec;
    let d = deltas.clamped_for(old);
    let spec = MissionSpec {
        payload_tons: reduce(old.payload_tons, d.payload_reduction),
        mission_type: old.mission_type,
        target_type: old.target_type,
        launch_vehicle: vehicle,
        distance_ly: reduce(old.distance_ly, d.distance_reduction),
        duration_years: reduce(old.duration_years, d.duration_reduction),
        science_pts: old.science_pts + d.science_addition,
        crew_size: old.crew_size.saturating_add(d.crew_addition),
        fuel_tons: old.fuel_tons + d.fuel_addition,
    };
    mission.with_spec(spec)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn cap_reduction(requested: f64, attribute: f64) -> f64 {
    let room = non_negative(attribute - ATTRIBUTE_FLOOR);
    non_negative(requested).min(room)
}

fn reduce(attribute: f64, reduction: f64) -> f64 {
    (attribute - reduction).max(ATTRIBUTE_FLOOR)
}

#[cfg(test)]
mod tests {
    use spacefund_types::{Difficulty, MissionId, MissionType, TargetType};

    use super::*;
    use crate::pricing::base_cost;

    fn spec() -> MissionSpec {
        MissionSpec {
            payload_tons: 10.0,
            mission_type: MissionType::Colonization,
            target_type: TargetType::Exoplanet,
            launch_vehicle: LaunchVehicle::Starship,
            distance_ly: 5.0,
            duration_years: 2.0,
            science_pts: 60.0,
            crew_size: 1,
            fuel_tons: 100.0,
        }
    }

    fn mission() -> Mission {
        Mission::offered(MissionId(1), spec(), Difficulty::Normal)
    }

    #[test]
    fn zero_deltas_cost_the_base_cost() {
        let s = spec();
        assert_eq!(
            investment_cost(&s, &InvestmentDeltas::NONE, s.launch_vehicle),
            base_cost(&s)
        );
    }

    #[test]
    fn every_delta_is_priced() {
        let s = spec();
        let deltas = InvestmentDeltas {
            distance_reduction: 1.0,
            duration_reduction: 1.0,
            payload_reduction: 1.0,
            science_addition: 10.0,
            crew_addition: 2,
            fuel_addition: 50.0,
        };
        // 23,500 + 100 + 5000 + 1000 + 2000 + 4000 + 500 = 36,100
        assert_eq!(
            investment_cost(&s, &deltas, LaunchVehicle::Starship),
            Ok(Decimal::from(36_100))
        );
    }

    #[test]
    fn switching_vehicle_adds_surcharge() {
        let s = spec();
        let cost = investment_cost(&s, &InvestmentDeltas::NONE, LaunchVehicle::FalconHeavy);
        assert_eq!(cost, Ok(Decimal::from(23_500 + 30_000)));
    }

    #[test]
    fn negative_input_is_ignored() {
        let s = spec();
        let deltas = InvestmentDeltas {
            distance_reduction: -50.0,
            science_addition: f64::NAN,
            fuel_addition: -1.0,
            ..InvestmentDeltas::NONE
        };
        assert_eq!(
            investment_cost(&s, &deltas, s.launch_vehicle),
            base_cost(&s)
        );
        let applied = apply_investment(&mission(), &deltas, s.launch_vehicle);
        assert!((applied.spec.distance_ly - 5.0).abs() < f64::EPSILON);
        assert!((applied.spec.science_pts - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn oversized_reduction_hits_the_floor() {
        let deltas = InvestmentDeltas {
            distance_reduction: 1_000.0,
            duration_reduction: 2.0,
            payload_reduction: 9.95,
            ..InvestmentDeltas::NONE
        };
        let applied = apply_investment(&mission(), &deltas, LaunchVehicle::Starship);
        assert!(applied.spec.distance_ly >= ATTRIBUTE_FLOOR);
        assert!(applied.spec.duration_years >= ATTRIBUTE_FLOOR);
        assert!(applied.spec.payload_tons >= ATTRIBUTE_FLOOR);
        assert!((applied.spec.distance_ly - ATTRIBUTE_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn oversized_reduction_is_charged_only_up_to_the_floor() {
        let s = spec();
        let huge = InvestmentDeltas {
            distance_reduction: 1_000.0,
            ..InvestmentDeltas::NONE
        };
        let capped = InvestmentDeltas {
            distance_reduction: 4.9,
            ..InvestmentDeltas::NONE
        };
        assert_eq!(
            investment_cost(&s, &huge, s.launch_vehicle),
            investment_cost(&s, &capped, s.launch_vehicle)
        );
    }

    #[test]
    fn additions_are_summed_and_vehicle_replaced() {
        let deltas = InvestmentDeltas {
            science_addition: 15.0,
            crew_addition: 3,
            fuel_addition: 250.0,
            ..InvestmentDeltas::NONE
        };
        let mut original = mission();
        original.success_probability = Some(40.0);
        let applied = apply_investment(&original, &deltas, LaunchVehicle::Ariane6);

        assert_eq!(applied.id, original.id);
        assert_eq!(applied.spec.crew_size, 4);
        assert!((applied.spec.science_pts - 75.0).abs() < f64::EPSILON);
        assert!((applied.spec.fuel_tons - 350.0).abs() < f64::EPSILON);
        assert_eq!(applied.spec.launch_vehicle, LaunchVehicle::Ariane6);
        assert_eq!(applied.success_probability, None);
    }
}
