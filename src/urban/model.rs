use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One line of an itemized seedling/plant list.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct SeedlingItem {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct SeedlingItemInput {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SeedlingRequest {
    pub id: Uuid,
    pub date_received: NaiveDate,
    pub requester_name: String,
    pub address: Option<String>,
    pub items: Vec<SeedlingItem>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for `seedling_requests`; the JSONB column needs the `Json`
/// wrapper before it becomes the domain struct.
#[derive(Debug, FromRow)]
pub struct SeedlingRequestRow {
    pub id: Uuid,
    pub date_received: NaiveDate,
    pub requester_name: String,
    pub address: Option<String>,
    pub items: Json<Vec<SeedlingItem>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SeedlingRequestRow> for SeedlingRequest {
    fn from(row: SeedlingRequestRow) -> Self {
        Self {
            id: row.id,
            date_received: row.date_received,
            requester_name: row.requester_name,
            address: row.address,
            items: row.items.0,
            notes: row.notes,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Planting record for ornamental plants, trees or seeds.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UrbanGreening {
    pub id: Uuid,
    pub date: NaiveDate,
    pub establishment_name: String,
    pub project_type: String,
    pub items: Vec<SeedlingItem>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct UrbanGreeningRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub establishment_name: String,
    pub project_type: String,
    pub items: Json<Vec<SeedlingItem>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UrbanGreeningRow> for UrbanGreening {
    fn from(row: UrbanGreeningRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            establishment_name: row.establishment_name,
            project_type: row.project_type,
            items: row.items.0,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UrbanOverview {
    pub seedling_request_count: i64,
    pub urban_greening_count: i64,
    pub total_seedlings_requested: i64,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct SeedlingRequestInput {
    pub date_received: NaiveDate,
    pub requester_name: String,
    pub address: Option<String>,
    pub items: Vec<SeedlingItemInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct SeedlingRequestFilters {
    pub requester_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct UrbanGreeningInput {
    pub date: NaiveDate,
    pub establishment_name: String,
    pub project_type: String,
    pub items: Vec<SeedlingItemInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct UrbanGreeningFilters {
    pub establishment_name: Option<String>,
    pub project_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
