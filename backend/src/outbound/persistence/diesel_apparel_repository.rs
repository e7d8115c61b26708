//! PostgreSQL-backed `ApparelRepository` implementation.
//!
//! Owner listings use the Diesel query builder. Proximity search runs raw
//! SQL against the PostGIS `location` column generated from the stored
//! longitude and latitude.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double};
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ApparelPersistenceError, ApparelRepository};
use crate::domain::{
    Apparel, ApparelDetails, ApparelId, GeoPoint, ImageUrl, NearbySearch, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, pool_error_message};
use super::models::{ApparelRow, NewApparelRow};
use super::pool::{DbPool, PoolError};
use super::schema::apparel;

const NEARBY_SQL: &str = "\
SELECT id, user_id, apparel_type, condition, size, description, image_url,
    longitude, latitude, created_at
FROM apparel
WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
ORDER BY ST_Distance(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography),
    created_at DESC,
    id DESC
LIMIT $4";

/// Diesel-backed implementation of the `ApparelRepository` port.
#[derive(Clone)]
pub struct DieselApparelRepository {
    pool: DbPool,
}

impl DieselApparelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApparelPersistenceError {
    ApparelPersistenceError::connection(pool_error_message(error))
}

fn map_error(error: diesel::result::Error) -> ApparelPersistenceError {
    map_diesel_error(
        error,
        ApparelPersistenceError::query,
        ApparelPersistenceError::connection,
    )
}

fn row_to_apparel(row: ApparelRow) -> Result<Apparel, ApparelPersistenceError> {
    let id = row.id;
    let corrupt = |detail: String| {
        warn!(apparel_id = %id, %detail, "stored apparel row failed validation");
        ApparelPersistenceError::query("stored apparel record is invalid")
    };
    let details = ApparelDetails::try_from_parts(
        &row.apparel_type,
        &row.condition,
        &row.size,
        &row.description,
    )
    .map_err(|err| corrupt(err.to_string()))?;
    let location =
        GeoPoint::new(row.longitude, row.latitude).map_err(|err| corrupt(err.to_string()))?;

    Ok(Apparel {
        id: ApparelId::from_uuid(row.id),
        owner: UserId::from_uuid(row.user_id),
        details,
        image_url: ImageUrl::new(row.image_url),
        location,
        created_at: row.created_at,
    })
}

fn rows_to_apparel(rows: Vec<ApparelRow>) -> Result<Vec<Apparel>, ApparelPersistenceError> {
    rows.into_iter().map(row_to_apparel).collect()
}

#[async_trait]
impl ApparelRepository for DieselApparelRepository {
    async fn insert(&self, record: &Apparel) -> Result<(), ApparelPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewApparelRow {
            id: *record.id.as_uuid(),
            user_id: *record.owner.as_uuid(),
            apparel_type: record.details.apparel_type(),
            condition: record.details.condition().as_str(),
            size: record.details.size(),
            description: record.details.description(),
            image_url: record.image_url.as_str(),
            longitude: record.location.longitude(),
            latitude: record.location.latitude(),
            created_at: record.created_at,
        };

        diesel::insert_into(apparel::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Apparel>, ApparelPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ApparelRow> = apparel::table
            .filter(apparel::user_id.eq(owner.as_uuid()))
            .order((apparel::created_at.desc(), apparel::id.desc()))
            .select(ApparelRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows_to_apparel(rows)
    }

    async fn find_nearby(
        &self,
        search: &NearbySearch,
    ) -> Result<Vec<Apparel>, ApparelPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(search.limit()).unwrap_or(i64::MAX);

        let rows: Vec<ApparelRow> = diesel::sql_query(NEARBY_SQL)
            .bind::<Double, _>(search.center.longitude())
            .bind::<Double, _>(search.center.latitude())
            .bind::<Double, _>(search.radius.metres())
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows_to_apparel(rows)
    }
}
