//! Domain and database models for moving estimates.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization.
//! The domain types are what the pricing engine consumes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::errors::ValidationError;

/// Prefecture identifier as stored in the `prefecture` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefectureId(pub i32);

impl fmt::Display for PrefectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moving-month category. Each season carries its own price multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingSeason {
    /// March and April
    PeakSpring,
    /// September
    PeakSeptember,
    /// May to August, October to February
    Standard,
}

impl MovingSeason {
    pub const ALL: [MovingSeason; 3] = [
        MovingSeason::PeakSpring,
        MovingSeason::PeakSeptember,
        MovingSeason::Standard,
    ];

    /// Season for a calendar month (1 = January).
    pub fn from_month(month: u32) -> Result<Self, ValidationError> {
        match month {
            3 | 4 => Ok(MovingSeason::PeakSpring),
            9 => Ok(MovingSeason::PeakSeptember),
            1 | 2 | 5..=8 | 10..=12 => Ok(MovingSeason::Standard),
            other => Err(ValidationError::InvalidMonth(other)),
        }
    }

    /// Form code used by the order form (`"0"`, `"1"`, `"2"`).
    pub fn code(&self) -> &'static str {
        match self {
            MovingSeason::PeakSpring => "0",
            MovingSeason::PeakSeptember => "1",
            MovingSeason::Standard => "2",
        }
    }

    /// Human-readable month range shown next to the breakdown.
    pub fn label(&self) -> &'static str {
        match self {
            MovingSeason::PeakSpring => "March-April",
            MovingSeason::PeakSeptember => "September",
            MovingSeason::Standard => "May-August, October-February",
        }
    }
}

impl FromStr for MovingSeason {
    type Err = ValidationError;

    /// Accepts either the numeric form code or the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "peak_spring" => Ok(MovingSeason::PeakSpring),
            "1" | "peak_september" => Ok(MovingSeason::PeakSeptember),
            "2" | "standard" => Ok(MovingSeason::Standard),
            other => Err(ValidationError::UnknownSeason(other.to_string())),
        }
    }
}

/// Kinds of cargo, each converted to standard boxes by reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    Box,
    Bed,
    Bicycle,
    WashingMachine,
}

impl PackageType {
    pub const ALL: [PackageType; 4] = [
        PackageType::Box,
        PackageType::Bed,
        PackageType::Bicycle,
        PackageType::WashingMachine,
    ];

    /// Primary key in the `package_content` table
    pub fn id(&self) -> i32 {
        match self {
            PackageType::Box => 1,
            PackageType::Bed => 2,
            PackageType::Bicycle => 3,
            PackageType::WashingMachine => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageType::Box => "box",
            PackageType::Bed => "bed",
            PackageType::Bicycle => "bicycle",
            PackageType::WashingMachine => "washing_machine",
        };
        f.write_str(name)
    }
}

/// Services priced independently of the seasonal multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalService {
    WashingMachineInstallation,
}

impl OptionalService {
    pub const ALL: [OptionalService; 1] = [OptionalService::WashingMachineInstallation];

    /// Primary key in the `optional_service` table
    pub fn id(&self) -> i32 {
        match self {
            OptionalService::WashingMachineInstallation => 1,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for OptionalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionalService::WashingMachineInstallation => f.write_str("washing_machine_installation"),
        }
    }
}

/// Item counts per package type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub boxes: u32,
    pub beds: u32,
    pub bicycles: u32,
    pub washing_machines: u32,
}

impl ItemCounts {
    pub fn count(&self, package: PackageType) -> u32 {
        match package {
            PackageType::Box => self.boxes,
            PackageType::Bed => self.beds,
            PackageType::Bicycle => self.bicycles,
            PackageType::WashingMachine => self.washing_machines,
        }
    }

    /// (package type, count) pairs in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (PackageType, u32)> + '_ {
        PackageType::ALL.into_iter().map(|p| (p, self.count(p)))
    }
}

/// A validated estimate request. Built through [`OrderRequest::new`] or the
/// request DTO mapping, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub origin: PrefectureId,
    pub destination: PrefectureId,
    pub season: MovingSeason,
    pub items: ItemCounts,
    pub services: BTreeSet<OptionalService>,
}

impl OrderRequest {
    pub fn new(
        origin: PrefectureId,
        destination: PrefectureId,
        season: MovingSeason,
        items: ItemCounts,
    ) -> Self {
        Self {
            origin,
            destination,
            season,
            items,
            services: BTreeSet::new(),
        }
    }

    pub fn with_service(mut self, service: OptionalService) -> Self {
        self.services.insert(service);
        self
    }
}

/// Customer contact details captured with a confirmed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub tel: String,
    pub email: String,
    pub old_address: String,
    pub new_address: String,
}

/// Prefecture from the `prefecture` table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prefecture {
    pub prefecture_id: i32,
    pub prefecture_name: String,
}

/// Row from `prefecture_distance`
#[derive(Debug, Clone, FromRow)]
pub struct DistanceRow {
    pub from_prefecture_id: i32,
    pub to_prefecture_id: i32,
    pub distance: Decimal,
}

/// Row from `package_content`
#[derive(Debug, Clone, FromRow)]
pub struct PackageContentRow {
    pub package_id: i32,
    pub box_count: i64,
}

/// Row from `truck_capacity`
#[derive(Debug, Clone, FromRow)]
pub struct TruckCapacityRow {
    pub max_box: i64,
    pub price: i64,
}

/// Row from `optional_service`
#[derive(Debug, Clone, FromRow)]
pub struct OptionalServiceRow {
    pub service_id: i32,
    pub price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_from_code_and_name() {
        assert_eq!("0".parse::<MovingSeason>().unwrap(), MovingSeason::PeakSpring);
        assert_eq!("1".parse::<MovingSeason>().unwrap(), MovingSeason::PeakSeptember);
        assert_eq!("2".parse::<MovingSeason>().unwrap(), MovingSeason::Standard);
        assert_eq!(
            "peak_september".parse::<MovingSeason>().unwrap(),
            MovingSeason::PeakSeptember
        );
    }

    #[test]
    fn test_unknown_season_is_rejected() {
        for code in ["3", "", "summer", "-1"] {
            let err = code.parse::<MovingSeason>().unwrap_err();
            assert!(matches!(err, ValidationError::UnknownSeason(_)));
        }
    }

    #[test]
    fn test_season_codes_round_trip() {
        for season in MovingSeason::ALL {
            assert_eq!(season.code().parse::<MovingSeason>().unwrap(), season);
        }
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(MovingSeason::from_month(3).unwrap(), MovingSeason::PeakSpring);
        assert_eq!(MovingSeason::from_month(4).unwrap(), MovingSeason::PeakSpring);
        assert_eq!(MovingSeason::from_month(9).unwrap(), MovingSeason::PeakSeptember);
        for month in [1, 2, 5, 6, 7, 8, 10, 11, 12] {
            assert_eq!(MovingSeason::from_month(month).unwrap(), MovingSeason::Standard);
        }
        assert!(MovingSeason::from_month(0).is_err());
        assert!(MovingSeason::from_month(13).is_err());
    }

    #[test]
    fn test_package_ids_are_unique() {
        for package in PackageType::ALL {
            assert_eq!(PackageType::from_id(package.id()), Some(package));
        }
        assert_eq!(PackageType::from_id(99), None);
    }

    #[test]
    fn test_item_counts_iter() {
        let items = ItemCounts {
            boxes: 10,
            beds: 1,
            bicycles: 2,
            washing_machines: 0,
        };
        let pairs: Vec<_> = items.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (PackageType::Box, 10),
                (PackageType::Bed, 1),
                (PackageType::Bicycle, 2),
                (PackageType::WashingMachine, 0),
            ]
        );
    }
}
