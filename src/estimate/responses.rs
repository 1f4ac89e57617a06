//! Response DTOs for estimate API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{PriceBreakdown, ServiceFee};
use super::errors::ValidationError;
use super::models::MovingSeason;

/// Response for an estimate
#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub season: MovingSeason,
    pub season_label: &'static str,
    pub total_boxes: u32,
    pub distance_km: u64,
    pub distance_fee: u64,
    pub truck_fee: u64,
    pub subtotal: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub seasonal_multiplier: Decimal,
    pub seasonal_subtotal: u64,
    pub services: Vec<ServiceFee>,
    pub optional_service_fee: u64,
    pub total: u64,
}

impl From<PriceBreakdown> for BreakdownResponse {
    fn from(b: PriceBreakdown) -> Self {
        Self {
            season: b.season,
            season_label: b.season.label(),
            total_boxes: b.total_boxes,
            distance_km: b.distance_km,
            distance_fee: b.distance_fee,
            truck_fee: b.truck_fee,
            subtotal: b.subtotal,
            seasonal_multiplier: b.seasonal_multiplier,
            seasonal_subtotal: b.seasonal_subtotal,
            services: b.services,
            optional_service_fee: b.optional_service_fee,
            total: b.total,
        }
    }
}

/// Response for a confirmed order
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub breakdown: BreakdownResponse,
}

/// Generic estimate error response
#[derive(Debug, Serialize)]
pub struct EstimateErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl EstimateErrorResponse {
    pub fn validation(errors: &[ValidationError]) -> Self {
        Self {
            error_type: "validation_error".to_string(),
            message: "Invalid estimate request".to_string(),
            details: errors.iter().map(ToString::to_string).collect(),
        }
    }
}
