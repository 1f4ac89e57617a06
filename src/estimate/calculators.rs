//! Core estimate calculation.
//!
//! Pure functions for pricing math - no database access, no clock, no logging.
//! Every price shown to a customer comes from [`estimate`].

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::errors::{EstimateError, ReferenceDataError, ValidationError};
use super::models::{MovingSeason, OptionalService, OrderRequest};
use super::reference::ReferenceData;

/// Price per kilometer of (truncated) distance
pub const DEFAULT_PRICE_PER_KM: u64 = 100;

/// Multiplier applied to distance and truck fees for each season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonalMultipliers {
    #[serde(with = "rust_decimal::serde::str")]
    pub peak_spring: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub peak_september: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub standard: Decimal,
}

impl SeasonalMultipliers {
    pub fn for_season(&self, season: MovingSeason) -> Decimal {
        match season {
            MovingSeason::PeakSpring => self.peak_spring,
            MovingSeason::PeakSeptember => self.peak_september,
            MovingSeason::Standard => self.standard,
        }
    }
}

impl Default for SeasonalMultipliers {
    fn default() -> Self {
        Self {
            peak_spring: dec!(1.5),
            peak_september: dec!(1.2),
            standard: dec!(1.0),
        }
    }
}

/// Engine constants that vary by deployment rather than by request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    pub price_per_km: u64,
    pub multipliers: SeasonalMultipliers,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_km: DEFAULT_PRICE_PER_KM,
            multipliers: SeasonalMultipliers::default(),
        }
    }
}

/// Fee charged for one selected optional service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceFee {
    pub service: OptionalService,
    pub fee: u64,
}

/// Every intermediate value of an estimate, for display next to the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub season: MovingSeason,
    pub total_boxes: u32,
    pub distance_km: u64,
    pub distance_fee: u64,
    pub truck_fee: u64,
    /// distance_fee + truck_fee
    pub subtotal: u64,
    pub seasonal_multiplier: Decimal,
    /// floor(seasonal_multiplier * subtotal)
    pub seasonal_subtotal: u64,
    pub services: Vec<ServiceFee>,
    pub optional_service_fee: u64,
    pub total: u64,
}

/// Truncate a distance to whole kilometers. Fractions are always dropped,
/// never rounded up.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use moving_estimate::estimate::floor_km;
///
/// assert_eq!(floor_km(dec!(120.7)), Some(120));
/// assert_eq!(floor_km(dec!(120)), Some(120));
/// assert_eq!(floor_km(dec!(-0.5)), None);
/// ```
pub fn floor_km(distance: Decimal) -> Option<u64> {
    if distance.is_sign_negative() && !distance.is_zero() {
        return None;
    }
    distance.floor().to_u64()
}

/// Apply a seasonal multiplier: multiply first, then drop the fraction.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use moving_estimate::estimate::apply_multiplier;
///
/// assert_eq!(apply_multiplier(42000, dec!(1.5)), Some(63000));
/// assert_eq!(apply_multiplier(333, dec!(1.5)), Some(499));
/// ```
pub fn apply_multiplier(subtotal: u64, multiplier: Decimal) -> Option<u64> {
    Decimal::from(subtotal)
        .checked_mul(multiplier)?
        .floor()
        .to_u64()
}

/// Sum of item counts weighted by their box equivalents.
pub fn total_boxes<R: ReferenceData + ?Sized>(
    request: &OrderRequest,
    reference: &R,
) -> Result<u32, EstimateError> {
    let mut total: u32 = 0;
    for (package, count) in request.items.iter() {
        let factor = reference
            .box_equivalent(package)
            .ok_or(ReferenceDataError::MissingBoxFactor(package))?;
        total = count
            .checked_mul(factor)
            .and_then(|boxes| total.checked_add(boxes))
            .ok_or(ValidationError::Overflow("box total"))?;
    }
    Ok(total)
}

/// Compute the full estimate for a validated request.
///
/// Fails without a partial result when a lookup has no value or an amount
/// overflows.
pub fn estimate<R: ReferenceData + ?Sized>(
    request: &OrderRequest,
    reference: &R,
    config: &PricingConfig,
) -> Result<PriceBreakdown, EstimateError> {
    let seasonal_multiplier = config.multipliers.for_season(request.season);

    let total_boxes = total_boxes(request, reference)?;

    let distance = reference
        .distance_km(request.origin, request.destination)
        .ok_or(ReferenceDataError::MissingDistance {
            from: request.origin,
            to: request.destination,
        })?;
    let distance_km = floor_km(distance).ok_or(ReferenceDataError::NegativeDistance {
        from: request.origin,
        to: request.destination,
    })?;
    let distance_fee = distance_km
        .checked_mul(config.price_per_km)
        .ok_or(ValidationError::Overflow("distance fee"))?;

    let truck_fee = reference
        .truck_price(total_boxes)
        .ok_or(ReferenceDataError::MissingTruckPrice { total_boxes })?;

    let subtotal = distance_fee
        .checked_add(truck_fee)
        .ok_or(ValidationError::Overflow("subtotal"))?;
    let seasonal_subtotal = apply_multiplier(subtotal, seasonal_multiplier)
        .ok_or(ValidationError::Overflow("seasonal subtotal"))?;

    let mut services = Vec::with_capacity(request.services.len());
    let mut optional_service_fee: u64 = 0;
    for &service in &request.services {
        let fee = reference
            .optional_service_fee(service)
            .ok_or(ReferenceDataError::MissingServiceFee(service))?;
        optional_service_fee = optional_service_fee
            .checked_add(fee)
            .ok_or(ValidationError::Overflow("optional service fee"))?;
        services.push(ServiceFee { service, fee });
    }

    let total = seasonal_subtotal
        .checked_add(optional_service_fee)
        .ok_or(ValidationError::Overflow("total"))?;

    Ok(PriceBreakdown {
        season: request.season,
        total_boxes,
        distance_km,
        distance_fee,
        truck_fee,
        subtotal,
        seasonal_multiplier,
        seasonal_subtotal,
        services,
        optional_service_fee,
        total,
    })
}
