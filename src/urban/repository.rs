use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::Database;
use crate::error::AppError;
use crate::urban::model::{
    SeedlingItemInput, SeedlingRequest, SeedlingRequestFilters, SeedlingRequestInput,
    SeedlingRequestRow, UrbanGreening, UrbanGreeningFilters, UrbanGreeningInput, UrbanGreeningRow,
    UrbanOverview,
};

const REQUEST_COLUMNS: &str = "id, date_received, requester_name, address, items, notes, \
     created_by, updated_by, created_at, updated_at";

const GREENING_COLUMNS: &str = "id, date, establishment_name, project_type, items, notes, \
     created_by, created_at, updated_at";

pub(crate) fn validate_items(items: &[SeedlingItemInput]) -> Result<(), AppError> {
    for item in items {
        if item.name.trim().is_empty() {
            return Err(AppError::input_validation("item name must not be empty"));
        }
        if item.quantity <= 0 {
            return Err(AppError::input_validation("item quantity must be positive"));
        }
    }
    Ok(())
}

pub struct UrbanRepository<'a> {
    db: &'a Database,
}

impl<'a> UrbanRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // Seedling request operations

    pub async fn list_requests(
        &self,
        filters: Option<&SeedlingRequestFilters>,
    ) -> Result<Vec<SeedlingRequest>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM seedling_requests WHERE 1=1"
        ));

        if let Some(filters) = filters {
            if let Some(requester_name) = &filters.requester_name {
                query.push(" AND requester_name ILIKE ");
                query.push_bind(format!("%{}%", requester_name));
            }
            if let Some(start_date) = filters.start_date {
                query.push(" AND date_received >= ");
                query.push_bind(start_date);
            }
            if let Some(end_date) = filters.end_date {
                query.push(" AND date_received <= ");
                query.push_bind(end_date);
            }
        }

        query.push(" ORDER BY date_received DESC");

        let rows = query
            .build_query_as::<SeedlingRequestRow>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.into_iter().map(SeedlingRequest::from).collect())
    }

    pub async fn find_request(&self, id: Uuid) -> Result<Option<SeedlingRequest>, AppError> {
        let row = sqlx::query_as::<_, SeedlingRequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM seedling_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(SeedlingRequest::from))
    }

    pub async fn create_request(
        &self,
        input: &SeedlingRequestInput,
        user_id: Uuid,
    ) -> Result<SeedlingRequest, AppError> {
        validate_items(&input.items)?;

        let row = sqlx::query_as::<_, SeedlingRequestRow>(&format!(
            "INSERT INTO seedling_requests \
                (date_received, requester_name, address, items, notes, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(input.date_received)
        .bind(&input.requester_name)
        .bind(&input.address)
        .bind(Json(&input.items))
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(SeedlingRequest::from(row))
    }

    pub async fn update_request(
        &self,
        id: Uuid,
        input: &SeedlingRequestInput,
        user_id: Uuid,
    ) -> Result<SeedlingRequest, AppError> {
        validate_items(&input.items)?;

        sqlx::query_as::<_, SeedlingRequestRow>(&format!(
            "UPDATE seedling_requests SET date_received = $2, requester_name = $3, \
                address = $4, items = $5, notes = $6, updated_by = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(input.date_received)
        .bind(&input.requester_name)
        .bind(&input.address)
        .bind(Json(&input.items))
        .bind(&input.notes)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?
        .map(SeedlingRequest::from)
        .ok_or_else(|| AppError::not_found("Seedling request not found"))
    }

    pub async fn delete_request(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM seedling_requests WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Urban greening operations

    pub async fn list_greenings(
        &self,
        filters: Option<&UrbanGreeningFilters>,
    ) -> Result<Vec<UrbanGreening>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {GREENING_COLUMNS} FROM urban_greening WHERE 1=1"
        ));

        if let Some(filters) = filters {
            if let Some(establishment_name) = &filters.establishment_name {
                query.push(" AND establishment_name ILIKE ");
                query.push_bind(format!("%{}%", establishment_name));
            }
            if let Some(project_type) = &filters.project_type {
                query.push(" AND project_type = ");
                query.push_bind(project_type.clone());
            }
            if let Some(start_date) = filters.start_date {
                query.push(" AND date >= ");
                query.push_bind(start_date);
            }
            if let Some(end_date) = filters.end_date {
                query.push(" AND date <= ");
                query.push_bind(end_date);
            }
        }

        query.push(" ORDER BY date DESC");

        let rows = query
            .build_query_as::<UrbanGreeningRow>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.into_iter().map(UrbanGreening::from).collect())
    }

    pub async fn find_greening(&self, id: Uuid) -> Result<Option<UrbanGreening>, AppError> {
        let row = sqlx::query_as::<_, UrbanGreeningRow>(&format!(
            "SELECT {GREENING_COLUMNS} FROM urban_greening WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(UrbanGreening::from))
    }

    pub async fn create_greening(
        &self,
        input: &UrbanGreeningInput,
        user_id: Uuid,
    ) -> Result<UrbanGreening, AppError> {
        validate_items(&input.items)?;

        let row = sqlx::query_as::<_, UrbanGreeningRow>(&format!(
            "INSERT INTO urban_greening \
                (date, establishment_name, project_type, items, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {GREENING_COLUMNS}"
        ))
        .bind(input.date)
        .bind(&input.establishment_name)
        .bind(&input.project_type)
        .bind(Json(&input.items))
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(UrbanGreening::from(row))
    }

    pub async fn update_greening(
        &self,
        id: Uuid,
        input: &UrbanGreeningInput,
    ) -> Result<UrbanGreening, AppError> {
        validate_items(&input.items)?;

        sqlx::query_as::<_, UrbanGreeningRow>(&format!(
            "UPDATE urban_greening SET date = $2, establishment_name = $3, project_type = $4, \
                items = $5, notes = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {GREENING_COLUMNS}"
        ))
        .bind(id)
        .bind(input.date)
        .bind(&input.establishment_name)
        .bind(&input.project_type)
        .bind(Json(&input.items))
        .bind(&input.notes)
        .fetch_optional(self.db.pool())
        .await?
        .map(UrbanGreening::from)
        .ok_or_else(|| AppError::not_found("Urban greening record not found"))
    }

    pub async fn delete_greening(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM urban_greening WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn overview(&self) -> Result<UrbanOverview, AppError> {
        let seedling_request_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM seedling_requests")
                .fetch_one(self.db.pool())
                .await?;

        let urban_greening_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urban_greening")
            .fetch_one(self.db.pool())
            .await?;

        let total_seedlings_requested: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM((item->>'quantity')::int), 0)::bigint \
             FROM seedling_requests, jsonb_array_elements(items) AS item",
        )
        .fetch_one(self.db.pool())
        .await?;

        Ok(UrbanOverview {
            seedling_request_count,
            urban_greening_count,
            total_seedlings_requested,
        })
    }
}
