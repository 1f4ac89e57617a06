//! Estimate service functions with database access.
//!
//! These functions load reference data through the cache and run the pricing
//! engine. Both the estimate endpoint and order registration go through
//! [`estimate_move`], so the two can never disagree on a price.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{self, PriceBreakdown, PricingConfig};
use super::errors::{EstimateError, ValidationError};
use super::models::{CustomerContact, OrderRequest, Prefecture};
use super::queries;
use super::reference::ReferenceTables;

/// Result of a confirmed order
#[derive(Debug, Clone)]
pub struct RegisteredOrder {
    pub order_id: Uuid,
    pub breakdown: PriceBreakdown,
}

/// Read every reference table and assemble a snapshot.
pub async fn load_reference_tables(pool: &PgPool) -> Result<ReferenceTables, AppError> {
    let distances = queries::get_distances(pool).await?;
    let packages = queries::get_package_contents(pool).await?;
    let trucks = queries::get_truck_capacities(pool).await?;
    let services = queries::get_optional_services(pool).await?;

    debug!(
        "Loaded reference data: {} distances, {} packages, {} trucks, {} services",
        distances.len(),
        packages.len(),
        trucks.len(),
        services.len()
    );

    Ok(ReferenceTables::from_rows(distances, packages, trucks, services)?)
}

pub async fn load_prefectures(pool: &PgPool) -> Result<Vec<Prefecture>, AppError> {
    queries::get_all_prefectures(pool).await
}

/// Current reference snapshot, from cache or freshly loaded.
pub async fn reference_snapshot(
    pool: &PgPool,
    cache: &AppCache,
) -> Result<Arc<ReferenceTables>, AppError> {
    if let Some(cached) = cache.get_reference().await {
        debug!("Cache HIT for reference data");
        return Ok(cached);
    }

    debug!("Cache MISS for reference data");
    let tables = Arc::new(load_reference_tables(pool).await?);
    cache.put_reference(tables.clone()).await;
    Ok(tables)
}

/// Prefecture list, from cache or freshly loaded.
pub async fn prefectures(pool: &PgPool, cache: &AppCache) -> Result<Arc<Vec<Prefecture>>, AppError> {
    if let Some(cached) = cache.get_prefectures().await {
        return Ok(cached);
    }

    let prefectures = Arc::new(load_prefectures(pool).await?);
    cache.put_prefectures(prefectures.clone()).await;
    Ok(prefectures)
}

/// Reject origin or destination ids that are not in the prefecture list.
pub fn check_prefectures(
    prefectures: &[Prefecture],
    request: &OrderRequest,
) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = [request.origin, request.destination]
        .into_iter()
        .filter(|id| !prefectures.iter().any(|p| p.prefecture_id == id.0))
        .map(|id| ValidationError::UnknownPrefecture(id.0))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Estimate a move against the current reference snapshot.
///
/// Unknown prefecture ids are a validation failure; a missing distance between
/// two known prefectures is a reference data defect.
pub async fn estimate_move(
    pool: &PgPool,
    cache: &AppCache,
    config: &PricingConfig,
    request: &OrderRequest,
) -> Result<PriceBreakdown, AppError> {
    check_prefectures(&prefectures(pool, cache).await?, request)?;
    let tables = reference_snapshot(pool, cache).await?;

    match calculators::estimate(request, tables.as_ref(), config) {
        Ok(breakdown) => {
            debug!(
                "Estimated {} -> {} ({:?}): total {}",
                request.origin, request.destination, request.season, breakdown.total
            );
            Ok(breakdown)
        }
        Err(EstimateError::ReferenceData(e)) => {
            error!(
                "Reference data defect estimating {} -> {}: {}",
                request.origin, request.destination, e
            );
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Price a confirmed order and store it in a single transaction.
///
/// Writes the customer row, one row per selected optional service and one row
/// per package type.
pub async fn register_order(
    pool: &PgPool,
    cache: &AppCache,
    config: &PricingConfig,
    contact: &CustomerContact,
    request: &OrderRequest,
) -> Result<RegisteredOrder, AppError> {
    let breakdown = estimate_move(pool, cache, config, request).await?;
    let order_id = Uuid::new_v4();

    let mut tx = pool.begin().await?;
    queries::insert_customer(&mut *tx, order_id, contact, request, &breakdown).await?;
    queries::insert_customer_option_services(&mut *tx, order_id, request).await?;
    queries::insert_customer_packages(&mut *tx, order_id, request).await?;
    tx.commit().await?;

    info!("Registered order {} (total {})", order_id, breakdown.total);

    Ok(RegisteredOrder {
        order_id,
        breakdown,
    })
}
