use async_graphql::{ComplexObject, Context, ErrorExtensions, InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::Database;
use crate::emission::repository::EmissionRepository;

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct Vehicle {
    pub id: Uuid,
    /// Unique business key.
    pub plate_number: String,
    pub driver_name: String,
    pub contact_number: Option<String>,
    pub engine_type: String,
    pub office_name: String,
    pub vehicle_type: String,
    pub wheels: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Vehicle {
    /// Most recent emission test, if the vehicle has been tested at all.
    async fn latest_test(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<EmissionTest>> {
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .latest_test(self.id)
            .await
            .map_err(|e| e.extend())
    }

    /// Append-only log of driver changes, newest first.
    async fn driver_history(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<DriverHistoryEntry>> {
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .driver_history(self.id)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct DriverHistoryEntry {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_name: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct EmissionTest {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub test_date: NaiveDate,
    pub quarter: i32,
    pub year: i32,
    pub result: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl EmissionTest {
    async fn vehicle(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vehicle>> {
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .find_vehicle(self.vehicle_id)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTestSchedule {
    pub id: Uuid,
    pub assigned_personnel: String,
    pub conducted_on: NaiveDate,
    pub location: String,
    pub quarter: i32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vehicle with its latest test folded in, for the dashboard grid.
#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: Uuid,
    pub plate_number: String,
    pub driver_name: String,
    pub contact_number: Option<String>,
    pub engine_type: String,
    pub office_name: String,
    pub vehicle_type: String,
    pub wheels: i32,
    pub latest_test_date: Option<NaiveDate>,
    pub latest_test_quarter: Option<i32>,
    pub latest_test_year: Option<i32>,
    pub latest_test_result: Option<bool>,
}

/// Per-office testing aggregate for one year and quarter.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct OfficeCompliance {
    pub id: String,
    pub name: String,
    pub code: String,
    pub vehicle_count: i64,
    pub tested_count: i64,
    pub passed_count: i64,
    pub compliance_rate: i32,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub plate_number: String,
    pub driver_name: String,
    pub contact_number: Option<String>,
    pub engine_type: String,
    pub office_name: String,
    pub vehicle_type: String,
    pub wheels: i32,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilters {
    pub plate_number: Option<String>,
    pub driver_name: Option<String>,
    pub office_name: Option<String>,
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTestInput {
    pub vehicle_id: Uuid,
    pub test_date: NaiveDate,
    pub quarter: i32,
    pub year: i32,
    pub result: bool,
}

#[derive(Debug, Clone, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTestFilters {
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub vehicle_id: Option<Uuid>,
    pub result: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTestScheduleInput {
    pub assigned_personnel: String,
    pub conducted_on: NaiveDate,
    pub location: String,
    pub quarter: i32,
    pub year: i32,
}
