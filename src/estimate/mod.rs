//! Moving estimate module.
//!
//! The pricing engine lives in [`calculators`] and is pure; everything else
//! feeds it validated requests and reference data, or exposes it over HTTP.

pub mod calculators;
pub mod errors;
pub mod models;
pub mod queries;
pub mod reference;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    apply_multiplier, estimate, floor_km, PriceBreakdown, PricingConfig, SeasonalMultipliers,
    ServiceFee,
};
pub use errors::{EstimateError, ReferenceDataError, ValidationError};
pub use models::{
    ItemCounts, MovingSeason, OptionalService, OrderRequest, PackageType, Prefecture, PrefectureId,
};
pub use reference::{ReferenceData, ReferenceTables, TruckTiers};
pub use routes::router;
