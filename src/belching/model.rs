use async_graphql::{ComplexObject, Context, Enum, ErrorExtensions, InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::belching::repository::BelchingRepository;
use crate::database::Database;

/// Enforcement state of a smoke-belching record. Stored in Postgres as the
/// `record_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum, sqlx::Type)]
#[sqlx(type_name = "record_status")]
pub enum RecordStatus {
    #[sqlx(rename = "new")]
    #[serde(rename = "new")]
    New,
    #[sqlx(rename = "apprehended")]
    #[serde(rename = "apprehended")]
    Apprehended,
    #[sqlx(rename = "no offense")]
    #[serde(rename = "no offense")]
    NoOffense,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingFee {
    pub id: i32,
    pub amount: Decimal,
    pub category: String,
    /// Ordinal offense level the fee applies to.
    pub level: i32,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct BelchingRecord {
    pub id: i32,
    pub plate_number: String,
    pub vehicle_type: Option<String>,
    pub operator: Option<String>,
    pub operator_address: Option<String>,
    pub record_address: Option<String>,
    pub record_status: RecordStatus,
    pub license_valid_until: Option<NaiveDate>,
    pub offense_level: i32,
    pub last_date_apprehended: Option<NaiveDate>,
    /// Order-number reference into orders of payment.
    pub order_of_payment: Option<String>,
    pub violation_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl BelchingRecord {
    async fn violations(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<BelchingViolation>> {
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_violations(Some(self.id))
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingViolation {
    pub id: i32,
    pub record_id: i32,
    pub operator_offense: Option<String>,
    pub date_of_apprehension: NaiveDate,
    pub place: Option<String>,
    pub driver_name: String,
    pub driver_offense: Option<String>,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingRecordHistoryEntry {
    pub id: i32,
    pub record_id: i32,
    pub event_type: String,
    pub date: NaiveDate,
    pub details: Option<String>,
    pub or_no: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct OrderOfPayment {
    pub id: i32,
    pub order_no: String,
    pub plate_no: String,
    pub operator: String,
    pub amount: Decimal,
    pub date_issued: NaiveDate,
    /// Free-text payment state; new orders default to "unpaid".
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One apprehended driver with every violation filed under that name.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct DriverSearchResult {
    pub driver_name: String,
    pub apprehension_count: i32,
    pub violations: Vec<BelchingViolation>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingFeeInput {
    pub amount: Decimal,
    pub category: String,
    pub level: i32,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingRecordInput {
    pub plate_number: String,
    pub vehicle_type: Option<String>,
    pub operator: Option<String>,
    pub operator_address: Option<String>,
    pub record_address: Option<String>,
    pub record_status: RecordStatus,
    pub license_valid_until: Option<NaiveDate>,
    pub offense_level: i32,
    pub last_date_apprehended: Option<NaiveDate>,
    pub order_of_payment: Option<String>,
    pub violation_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingViolationInput {
    pub record_id: i32,
    pub operator_offense: Option<String>,
    pub date_of_apprehension: NaiveDate,
    pub place: Option<String>,
    pub driver_name: String,
    pub driver_offense: Option<String>,
    pub paid: bool,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct BelchingRecordHistoryInput {
    pub record_id: i32,
    pub event_type: String,
    pub date: NaiveDate,
    pub details: Option<String>,
    pub or_no: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct OrderOfPaymentInput {
    pub order_no: String,
    pub plate_no: String,
    pub operator: String,
    pub amount: Decimal,
    pub date_issued: NaiveDate,
    pub status: String,
}
