//! Database queries for the estimate workflow.
//!
//! Reference tables are read in full and turned into a snapshot; orders are
//! written inside a caller-owned transaction.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::PriceBreakdown;
use super::models::{
    CustomerContact, DistanceRow, OptionalServiceRow, OrderRequest, PackageContentRow,
    Prefecture, TruckCapacityRow,
};

/// Get all prefectures ordered by id
pub async fn get_all_prefectures(pool: &PgPool) -> Result<Vec<Prefecture>, AppError> {
    let prefectures = sqlx::query_as::<_, Prefecture>(
        r#"
        SELECT prefecture_id, prefecture_name
        FROM prefecture
        ORDER BY prefecture_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(prefectures)
}

/// Get every prefecture-to-prefecture distance
pub async fn get_distances(pool: &PgPool) -> Result<Vec<DistanceRow>, AppError> {
    let rows = sqlx::query_as::<_, DistanceRow>(
        r#"
        SELECT from_prefecture_id, to_prefecture_id, distance
        FROM prefecture_distance
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get box equivalents per package type
pub async fn get_package_contents(pool: &PgPool) -> Result<Vec<PackageContentRow>, AppError> {
    let rows = sqlx::query_as::<_, PackageContentRow>(
        r#"
        SELECT package_id, box_count
        FROM package_content
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get truck classes
pub async fn get_truck_capacities(pool: &PgPool) -> Result<Vec<TruckCapacityRow>, AppError> {
    let rows = sqlx::query_as::<_, TruckCapacityRow>(
        r#"
        SELECT max_box, price
        FROM truck_capacity
        ORDER BY max_box
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get optional service fees
pub async fn get_optional_services(pool: &PgPool) -> Result<Vec<OptionalServiceRow>, AppError> {
    let rows = sqlx::query_as::<_, OptionalServiceRow>(
        r#"
        SELECT service_id, price
        FROM optional_service
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert the customer row for a confirmed order
pub async fn insert_customer(
    conn: &mut PgConnection,
    customer_id: Uuid,
    contact: &CustomerContact,
    request: &OrderRequest,
    breakdown: &PriceBreakdown,
) -> Result<(), AppError> {
    let total = i64::try_from(breakdown.total)
        .map_err(|_| AppError::Internal(format!("total {} out of range", breakdown.total)))?;

    sqlx::query(
        r#"
        INSERT INTO customer (
            customer_id, old_prefecture_id, new_prefecture_id,
            customer_name, tel, email, old_address, new_address,
            moving_season, price, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(customer_id)
    .bind(request.origin.0)
    .bind(request.destination.0)
    .bind(&contact.name)
    .bind(&contact.tel)
    .bind(&contact.email)
    .bind(&contact.old_address)
    .bind(&contact.new_address)
    .bind(request.season.code())
    .bind(total)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert one row per selected optional service
pub async fn insert_customer_option_services(
    conn: &mut PgConnection,
    customer_id: Uuid,
    request: &OrderRequest,
) -> Result<(), AppError> {
    for service in &request.services {
        sqlx::query(
            r#"
            INSERT INTO customer_option_service (customer_id, service_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(customer_id)
        .bind(service.id())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Insert one row per package type, including zero counts
pub async fn insert_customer_packages(
    conn: &mut PgConnection,
    customer_id: Uuid,
    request: &OrderRequest,
) -> Result<(), AppError> {
    for (package, count) in request.items.iter() {
        sqlx::query(
            r#"
            INSERT INTO customer_package (customer_id, package_id, package_number)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(customer_id)
        .bind(package.id())
        .bind(i64::from(count))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
