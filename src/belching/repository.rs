use rust_decimal::Decimal;

use crate::belching::model::{
    BelchingFee, BelchingFeeInput, BelchingRecord, BelchingRecordHistoryEntry,
    BelchingRecordHistoryInput, BelchingRecordInput, BelchingViolation, BelchingViolationInput,
    DriverSearchResult, OrderOfPayment, OrderOfPaymentInput,
};
use crate::database::Database;
use crate::error::AppError;

const FEE_COLUMNS: &str = "id, amount, category, level, effective_date, created_at, updated_at";

const RECORD_COLUMNS: &str = "id, plate_number, vehicle_type, operator, operator_address, \
     record_address, record_status, license_valid_until, offense_level, last_date_apprehended, \
     order_of_payment, violation_summary, created_at, updated_at";

const VIOLATION_COLUMNS: &str = "id, record_id, operator_offense, date_of_apprehension, place, \
     driver_name, driver_offense, paid";

const HISTORY_COLUMNS: &str = "id, record_id, event_type, date, details, or_no, status";

const ORDER_COLUMNS: &str =
    "id, order_no, plate_no, operator, amount, date_issued, status, created_at, updated_at";

pub(crate) fn validate_amount(amount: Decimal) -> Result<(), AppError> {
    if amount < Decimal::ZERO {
        Err(AppError::input_validation("amount must be non-negative"))
    } else {
        Ok(())
    }
}

/// Groups violations per driver, preserving the name order of the first
/// search step.
fn group_by_driver(
    names: Vec<String>,
    violations: Vec<BelchingViolation>,
) -> Vec<DriverSearchResult> {
    let mut grouped: Vec<DriverSearchResult> = names
        .into_iter()
        .map(|driver_name| DriverSearchResult {
            driver_name,
            apprehension_count: 0,
            violations: Vec::new(),
        })
        .collect();

    for violation in violations {
        if let Some(entry) = grouped
            .iter_mut()
            .find(|g| g.driver_name == violation.driver_name)
        {
            entry.violations.push(violation);
        }
    }

    for entry in &mut grouped {
        entry.apprehension_count = entry.violations.len() as i32;
    }

    grouped
}

pub struct BelchingRepository<'a> {
    db: &'a Database,
}

impl<'a> BelchingRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // Fee operations

    pub async fn list_fees(&self) -> Result<Vec<BelchingFee>, AppError> {
        let fees = sqlx::query_as::<_, BelchingFee>(&format!(
            "SELECT {FEE_COLUMNS} FROM belching_fees ORDER BY id"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(fees)
    }

    pub async fn find_fee(&self, id: i32) -> Result<Option<BelchingFee>, AppError> {
        let fee = sqlx::query_as::<_, BelchingFee>(&format!(
            "SELECT {FEE_COLUMNS} FROM belching_fees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(fee)
    }

    pub async fn create_fee(&self, input: &BelchingFeeInput) -> Result<BelchingFee, AppError> {
        validate_amount(input.amount)?;

        let fee = sqlx::query_as::<_, BelchingFee>(&format!(
            "INSERT INTO belching_fees (amount, category, level, effective_date) \
             VALUES ($1, $2, $3, $4) RETURNING {FEE_COLUMNS}"
        ))
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.level)
        .bind(input.effective_date)
        .fetch_one(self.db.pool())
        .await?;
        Ok(fee)
    }

    pub async fn update_fee(
        &self,
        id: i32,
        input: &BelchingFeeInput,
    ) -> Result<BelchingFee, AppError> {
        validate_amount(input.amount)?;

        sqlx::query_as::<_, BelchingFee>(&format!(
            "UPDATE belching_fees SET amount = $2, category = $3, level = $4, \
                effective_date = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {FEE_COLUMNS}"
        ))
        .bind(id)
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.level)
        .bind(input.effective_date)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Belching fee not found"))
    }

    pub async fn delete_fee(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM belching_fees WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Record operations

    pub async fn list_records(&self) -> Result<Vec<BelchingRecord>, AppError> {
        // Rows with a blank plate number are legacy imports; skip them.
        let records = sqlx::query_as::<_, BelchingRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM belching_records \
             WHERE btrim(plate_number) <> '' ORDER BY id"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(records)
    }

    pub async fn find_record(&self, id: i32) -> Result<Option<BelchingRecord>, AppError> {
        let record = sqlx::query_as::<_, BelchingRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM belching_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(record)
    }

    pub async fn create_record(
        &self,
        input: &BelchingRecordInput,
    ) -> Result<BelchingRecord, AppError> {
        let record = sqlx::query_as::<_, BelchingRecord>(&format!(
            "INSERT INTO belching_records \
                (plate_number, vehicle_type, operator, operator_address, record_address, \
                 record_status, license_valid_until, offense_level, last_date_apprehended, \
                 order_of_payment, violation_summary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(&input.plate_number)
        .bind(&input.vehicle_type)
        .bind(&input.operator)
        .bind(&input.operator_address)
        .bind(&input.record_address)
        .bind(input.record_status)
        .bind(input.license_valid_until)
        .bind(input.offense_level)
        .bind(input.last_date_apprehended)
        .bind(&input.order_of_payment)
        .bind(&input.violation_summary)
        .fetch_one(self.db.pool())
        .await?;
        Ok(record)
    }

    pub async fn update_record(
        &self,
        id: i32,
        input: &BelchingRecordInput,
    ) -> Result<BelchingRecord, AppError> {
        sqlx::query_as::<_, BelchingRecord>(&format!(
            "UPDATE belching_records SET plate_number = $2, vehicle_type = $3, operator = $4, \
                operator_address = $5, record_address = $6, record_status = $7, \
                license_valid_until = $8, offense_level = $9, last_date_apprehended = $10, \
                order_of_payment = $11, violation_summary = $12, updated_at = NOW() \
             WHERE id = $1 RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.plate_number)
        .bind(&input.vehicle_type)
        .bind(&input.operator)
        .bind(&input.operator_address)
        .bind(&input.record_address)
        .bind(input.record_status)
        .bind(input.license_valid_until)
        .bind(input.offense_level)
        .bind(input.last_date_apprehended)
        .bind(&input.order_of_payment)
        .bind(&input.violation_summary)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Belching record not found"))
    }

    pub async fn delete_record(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM belching_records WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Violation operations

    pub async fn list_violations(
        &self,
        record_id: Option<i32>,
    ) -> Result<Vec<BelchingViolation>, AppError> {
        let violations = match record_id {
            Some(record_id) => {
                sqlx::query_as::<_, BelchingViolation>(&format!(
                    "SELECT {VIOLATION_COLUMNS} FROM belching_violations \
                     WHERE record_id = $1 ORDER BY id"
                ))
                .bind(record_id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, BelchingViolation>(&format!(
                    "SELECT {VIOLATION_COLUMNS} FROM belching_violations ORDER BY id"
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };
        Ok(violations)
    }

    pub async fn find_violation(&self, id: i32) -> Result<Option<BelchingViolation>, AppError> {
        let violation = sqlx::query_as::<_, BelchingViolation>(&format!(
            "SELECT {VIOLATION_COLUMNS} FROM belching_violations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(violation)
    }

    pub async fn create_violation(
        &self,
        input: &BelchingViolationInput,
    ) -> Result<BelchingViolation, AppError> {
        if self.find_record(input.record_id).await?.is_none() {
            return Err(AppError::not_found("Belching record not found"));
        }

        let violation = sqlx::query_as::<_, BelchingViolation>(&format!(
            "INSERT INTO belching_violations \
                (record_id, operator_offense, date_of_apprehension, place, driver_name, \
                 driver_offense, paid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {VIOLATION_COLUMNS}"
        ))
        .bind(input.record_id)
        .bind(&input.operator_offense)
        .bind(input.date_of_apprehension)
        .bind(&input.place)
        .bind(&input.driver_name)
        .bind(&input.driver_offense)
        .bind(input.paid)
        .fetch_one(self.db.pool())
        .await?;
        Ok(violation)
    }

    pub async fn update_violation(
        &self,
        id: i32,
        input: &BelchingViolationInput,
    ) -> Result<BelchingViolation, AppError> {
        sqlx::query_as::<_, BelchingViolation>(&format!(
            "UPDATE belching_violations SET record_id = $2, operator_offense = $3, \
                date_of_apprehension = $4, place = $5, driver_name = $6, driver_offense = $7, \
                paid = $8 \
             WHERE id = $1 RETURNING {VIOLATION_COLUMNS}"
        ))
        .bind(id)
        .bind(input.record_id)
        .bind(&input.operator_offense)
        .bind(input.date_of_apprehension)
        .bind(&input.place)
        .bind(&input.driver_name)
        .bind(&input.driver_offense)
        .bind(input.paid)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Belching violation not found"))
    }

    pub async fn delete_violation(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM belching_violations WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Record history operations

    pub async fn list_history(
        &self,
        record_id: Option<i32>,
    ) -> Result<Vec<BelchingRecordHistoryEntry>, AppError> {
        let entries = match record_id {
            Some(record_id) => {
                sqlx::query_as::<_, BelchingRecordHistoryEntry>(&format!(
                    "SELECT {HISTORY_COLUMNS} FROM belching_record_history \
                     WHERE record_id = $1 ORDER BY id"
                ))
                .bind(record_id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, BelchingRecordHistoryEntry>(&format!(
                    "SELECT {HISTORY_COLUMNS} FROM belching_record_history ORDER BY id"
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };
        Ok(entries)
    }

    pub async fn find_history(
        &self,
        id: i32,
    ) -> Result<Option<BelchingRecordHistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, BelchingRecordHistoryEntry>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM belching_record_history WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(entry)
    }

    pub async fn create_history(
        &self,
        input: &BelchingRecordHistoryInput,
    ) -> Result<BelchingRecordHistoryEntry, AppError> {
        if self.find_record(input.record_id).await?.is_none() {
            return Err(AppError::not_found("Belching record not found"));
        }

        let entry = sqlx::query_as::<_, BelchingRecordHistoryEntry>(&format!(
            "INSERT INTO belching_record_history \
                (record_id, event_type, date, details, or_no, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {HISTORY_COLUMNS}"
        ))
        .bind(input.record_id)
        .bind(&input.event_type)
        .bind(input.date)
        .bind(&input.details)
        .bind(&input.or_no)
        .bind(&input.status)
        .fetch_one(self.db.pool())
        .await?;
        Ok(entry)
    }

    pub async fn update_history(
        &self,
        id: i32,
        input: &BelchingRecordHistoryInput,
    ) -> Result<BelchingRecordHistoryEntry, AppError> {
        sqlx::query_as::<_, BelchingRecordHistoryEntry>(&format!(
            "UPDATE belching_record_history SET record_id = $2, event_type = $3, date = $4, \
                details = $5, or_no = $6, status = $7 \
             WHERE id = $1 RETURNING {HISTORY_COLUMNS}"
        ))
        .bind(id)
        .bind(input.record_id)
        .bind(&input.event_type)
        .bind(input.date)
        .bind(&input.details)
        .bind(&input.or_no)
        .bind(&input.status)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Belching record history entry not found"))
    }

    pub async fn delete_history(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM belching_record_history WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Order of payment operations

    pub async fn list_orders(&self) -> Result<Vec<OrderOfPayment>, AppError> {
        let orders = sqlx::query_as::<_, OrderOfPayment>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders_of_payment ORDER BY id"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(orders)
    }

    pub async fn find_order(&self, id: i32) -> Result<Option<OrderOfPayment>, AppError> {
        let order = sqlx::query_as::<_, OrderOfPayment>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders_of_payment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(order)
    }

    pub async fn create_order(
        &self,
        input: &OrderOfPaymentInput,
    ) -> Result<OrderOfPayment, AppError> {
        validate_amount(input.amount)?;

        let order = sqlx::query_as::<_, OrderOfPayment>(&format!(
            "INSERT INTO orders_of_payment \
                (order_no, plate_no, operator, amount, date_issued, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&input.order_no)
        .bind(&input.plate_no)
        .bind(&input.operator)
        .bind(input.amount)
        .bind(input.date_issued)
        .bind(&input.status)
        .fetch_one(self.db.pool())
        .await?;
        Ok(order)
    }

    pub async fn update_order(
        &self,
        id: i32,
        input: &OrderOfPaymentInput,
    ) -> Result<OrderOfPayment, AppError> {
        validate_amount(input.amount)?;

        sqlx::query_as::<_, OrderOfPayment>(&format!(
            "UPDATE orders_of_payment SET order_no = $2, plate_no = $3, operator = $4, \
                amount = $5, date_issued = $6, status = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.order_no)
        .bind(&input.plate_no)
        .bind(&input.operator)
        .bind(input.amount)
        .bind(input.date_issued)
        .bind(&input.status)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Order of payment not found"))
    }

    pub async fn delete_order(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders_of_payment WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Driver search

    /// Grouped search over apprehended drivers. Two statements by necessity:
    /// the grouping key set comes first, then every violation for those
    /// drivers in one fetch.
    pub async fn search_drivers(&self, term: &str) -> Result<Vec<DriverSearchResult>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT driver_name FROM belching_violations \
             WHERE driver_name ILIKE $1 ORDER BY driver_name",
        )
        .bind(format!("%{}%", term))
        .fetch_all(self.db.pool())
        .await?;

        if names.is_empty() {
            return Ok(Vec::new());
        }

        let violations = sqlx::query_as::<_, BelchingViolation>(&format!(
            "SELECT {VIOLATION_COLUMNS} FROM belching_violations \
             WHERE driver_name = ANY($1) ORDER BY date_of_apprehension DESC"
        ))
        .bind(&names)
        .fetch_all(self.db.pool())
        .await?;

        Ok(group_by_driver(names, violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn violation(id: i32, driver_name: &str) -> BelchingViolation {
        BelchingViolation {
            id,
            record_id: 1,
            operator_offense: None,
            date_of_apprehension: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            place: None,
            driver_name: driver_name.to_string(),
            driver_offense: None,
            paid: false,
        }
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amount(Decimal::new(-1, 0)).is_err());
        assert!(validate_amount(Decimal::ZERO).is_ok());
        assert!(validate_amount(Decimal::new(500, 0)).is_ok());
    }

    #[test]
    fn driver_grouping_preserves_name_order_and_counts() {
        let names = vec!["Ana Cruz".to_string(), "Ben Reyes".to_string()];
        let violations = vec![
            violation(1, "Ben Reyes"),
            violation(2, "Ana Cruz"),
            violation(3, "Ben Reyes"),
        ];

        let grouped = group_by_driver(names, violations);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].driver_name, "Ana Cruz");
        assert_eq!(grouped[0].apprehension_count, 1);
        assert_eq!(grouped[1].driver_name, "Ben Reyes");
        assert_eq!(grouped[1].apprehension_count, 2);
        assert_eq!(grouped[1].violations.len(), 2);
    }
}
