//! Estimate error types.

use super::models::{OptionalService, PackageType, PrefectureId};

/// Input that should have been rejected before reaching the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("Unknown prefecture {0}")]
    UnknownPrefecture(i32),

    #[error("Unknown moving month category '{0}'")]
    UnknownSeason(String),

    #[error("Invalid calendar month {0}")]
    InvalidMonth(u32),

    #[error("{0} is required")]
    Blank(&'static str),

    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0} overflowed")]
    Overflow(&'static str),
}

/// A reference table lookup had no usable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("No distance found between prefectures {from} and {to}")]
    MissingDistance { from: PrefectureId, to: PrefectureId },

    #[error("Negative distance between prefectures {from} and {to}")]
    NegativeDistance { from: PrefectureId, to: PrefectureId },

    #[error("No box equivalent configured for package type {0}")]
    MissingBoxFactor(PackageType),

    #[error("No truck price for {total_boxes} boxes")]
    MissingTruckPrice { total_boxes: u32 },

    #[error("No fee configured for optional service {0}")]
    MissingServiceFee(OptionalService),

    #[error("Invalid truck tiers: {0}")]
    InvalidTruckTiers(String),

    #[error("Invalid reference value: {0}")]
    InvalidValue(String),
}

/// Failure of a single estimate computation. No partial breakdown survives it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ReferenceData(#[from] ReferenceDataError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReferenceDataError::MissingDistance {
            from: PrefectureId(13),
            to: PrefectureId(27),
        };
        assert!(err.to_string().contains("13"));
        assert!(err.to_string().contains("27"));

        let err = ValidationError::NegativeCount {
            field: "bed",
            value: -2,
        };
        assert_eq!(err.to_string(), "bed must not be negative (got -2)");

        let err: EstimateError = ValidationError::UnknownSeason("7".to_string()).into();
        assert!(err.to_string().contains("'7'"));
    }
}
