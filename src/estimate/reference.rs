//! Reference data consumed by the pricing engine.
//!
//! The engine only sees the [`ReferenceData`] trait. Production code loads the
//! tables from Postgres into an immutable [`ReferenceTables`] snapshot which is
//! shared behind an `Arc` and cached (see `crate::cache`).

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::errors::ReferenceDataError;
use super::models::{
    DistanceRow, OptionalService, OptionalServiceRow, PackageContentRow, PackageType,
    PrefectureId, TruckCapacityRow,
};

/// Read-only pricing lookups. `None` means the table has no entry for the key.
pub trait ReferenceData {
    /// Distance in kilometers between two prefectures
    fn distance_km(&self, from: PrefectureId, to: PrefectureId) -> Option<Decimal>;

    /// How many standard boxes one unit of the package counts as
    fn box_equivalent(&self, package: PackageType) -> Option<u32>;

    /// Flat truck price for the given box-equivalent total
    fn truck_price(&self, total_boxes: u32) -> Option<u64>;

    fn optional_service_fee(&self, service: OptionalService) -> Option<u64>;
}

/// Two truck classes split at a single box-count threshold.
///
/// `0..=threshold` boxes pay `standard_price`, anything above pays
/// `large_price`. Construction rejects a large price below the standard one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruckTiers {
    threshold: u32,
    standard_price: u64,
    large_price: u64,
}

impl TruckTiers {
    pub fn new(
        threshold: u32,
        standard_price: u64,
        large_price: u64,
    ) -> Result<Self, ReferenceDataError> {
        if large_price < standard_price {
            return Err(ReferenceDataError::InvalidTruckTiers(format!(
                "price above {} boxes ({}) is lower than at or below it ({})",
                threshold, large_price, standard_price
            )));
        }
        Ok(Self {
            threshold,
            standard_price,
            large_price,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn price_for(&self, total_boxes: u32) -> u64 {
        if total_boxes <= self.threshold {
            self.standard_price
        } else {
            self.large_price
        }
    }

    /// Build from `truck_capacity` rows. The smallest `max_box` is the
    /// threshold; the largest row's price applies above it.
    pub fn from_rows(rows: &[TruckCapacityRow]) -> Result<Self, ReferenceDataError> {
        if rows.len() != 2 {
            return Err(ReferenceDataError::InvalidTruckTiers(format!(
                "expected 2 truck classes, found {}",
                rows.len()
            )));
        }

        let mut sorted: Vec<&TruckCapacityRow> = rows.iter().collect();
        sorted.sort_by_key(|r| r.max_box);
        let (small, large) = (sorted[0], sorted[1]);

        let threshold = u32::try_from(small.max_box).map_err(|_| {
            ReferenceDataError::InvalidTruckTiers(format!("invalid max_box {}", small.max_box))
        })?;

        Self::new(
            threshold,
            non_negative(small.price, "truck price")?,
            non_negative(large.price, "truck price")?,
        )
    }
}

/// In-memory snapshot of every reference table.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    distances: HashMap<(PrefectureId, PrefectureId), Decimal>,
    box_factors: HashMap<PackageType, u32>,
    truck_tiers: TruckTiers,
    service_fees: HashMap<OptionalService, u64>,
}

impl ReferenceTables {
    pub fn new(truck_tiers: TruckTiers) -> Self {
        Self {
            distances: HashMap::new(),
            box_factors: HashMap::new(),
            truck_tiers,
            service_fees: HashMap::new(),
        }
    }

    pub fn with_distance(mut self, from: PrefectureId, to: PrefectureId, km: Decimal) -> Self {
        self.distances.insert((from, to), km);
        self
    }

    pub fn with_box_factor(mut self, package: PackageType, boxes: u32) -> Self {
        self.box_factors.insert(package, boxes);
        self
    }

    pub fn with_service_fee(mut self, service: OptionalService, fee: u64) -> Self {
        self.service_fees.insert(service, fee);
        self
    }

    /// Assemble a snapshot from database rows.
    ///
    /// Rows with ids that do not map to a known package type or service are
    /// skipped; negative prices or factors are rejected.
    pub fn from_rows(
        distances: Vec<DistanceRow>,
        packages: Vec<PackageContentRow>,
        trucks: Vec<TruckCapacityRow>,
        services: Vec<OptionalServiceRow>,
    ) -> Result<Self, ReferenceDataError> {
        let mut tables = Self::new(TruckTiers::from_rows(&trucks)?);

        for row in distances {
            tables.distances.insert(
                (PrefectureId(row.from_prefecture_id), PrefectureId(row.to_prefecture_id)),
                row.distance,
            );
        }

        for row in packages {
            if let Some(package) = PackageType::from_id(row.package_id) {
                let boxes = u32::try_from(row.box_count).map_err(|_| {
                    ReferenceDataError::InvalidValue(format!(
                        "box count {} for package {}",
                        row.box_count, package
                    ))
                })?;
                tables.box_factors.insert(package, boxes);
            }
        }

        for row in services {
            if let Some(service) = OptionalService::from_id(row.service_id) {
                tables
                    .service_fees
                    .insert(service, non_negative(row.price, "service fee")?);
            }
        }

        Ok(tables)
    }
}

impl ReferenceData for ReferenceTables {
    fn distance_km(&self, from: PrefectureId, to: PrefectureId) -> Option<Decimal> {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
    }

    fn box_equivalent(&self, package: PackageType) -> Option<u32> {
        self.box_factors.get(&package).copied()
    }

    fn truck_price(&self, total_boxes: u32) -> Option<u64> {
        Some(self.truck_tiers.price_for(total_boxes))
    }

    fn optional_service_fee(&self, service: OptionalService) -> Option<u64> {
        self.service_fees.get(&service).copied()
    }
}

/// Tables matching the worked examples: 120.7 km between prefectures 1 and 2,
/// one box per item, 80-box threshold at 30000/50000, installation fee 5000.
#[cfg(test)]
pub(crate) fn sample_tables() -> ReferenceTables {
    use rust_decimal_macros::dec;

    let mut tables = ReferenceTables::new(TruckTiers::new(80, 30000, 50000).unwrap())
        .with_distance(PrefectureId(1), PrefectureId(2), dec!(120.7))
        .with_distance(PrefectureId(1), PrefectureId(1), dec!(0))
        .with_service_fee(OptionalService::WashingMachineInstallation, 5000);
    for package in PackageType::ALL {
        tables = tables.with_box_factor(package, 1);
    }
    tables
}

fn non_negative(value: i64, what: &str) -> Result<u64, ReferenceDataError> {
    u64::try_from(value)
        .map_err(|_| ReferenceDataError::InvalidValue(format!("negative {} {}", what, value)))
}
