use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::Database;
use crate::emission::model::{
    DriverHistoryEntry, EmissionTest, EmissionTestFilters, EmissionTestInput,
    EmissionTestSchedule, EmissionTestScheduleInput, OfficeCompliance, Vehicle, VehicleFilters,
    VehicleInput, VehicleSummary,
};
use crate::error::AppError;

const VEHICLE_COLUMNS: &str = "id, plate_number, driver_name, contact_number, engine_type, \
     office_name, vehicle_type, wheels, created_at, updated_at";

const TEST_COLUMNS: &str = "id, vehicle_id, test_date, quarter, year, result, created_by, \
     created_at, updated_at";

const SCHEDULE_COLUMNS: &str =
    "id, assigned_personnel, conducted_on, location, quarter, year, created_at, updated_at";

pub(crate) fn validate_quarter(quarter: i32) -> Result<(), AppError> {
    if (1..=4).contains(&quarter) {
        Ok(())
    } else {
        Err(AppError::input_validation("quarter must be between 1 and 4"))
    }
}

/// Office code from the initials of the office name.
pub(crate) fn office_code(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[derive(Debug, FromRow)]
struct OfficeComplianceRow {
    name: String,
    vehicle_count: i64,
    tested_count: i64,
    passed_count: i64,
}

pub struct EmissionRepository<'a> {
    db: &'a Database,
}

impl<'a> EmissionRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // Vehicle operations

    pub async fn list_vehicles(
        &self,
        filters: Option<&VehicleFilters>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE 1=1"));

        if let Some(filters) = filters {
            if let Some(plate_number) = &filters.plate_number {
                query.push(" AND plate_number ILIKE ");
                query.push_bind(format!("%{}%", plate_number));
            }
            if let Some(driver_name) = &filters.driver_name {
                query.push(" AND driver_name ILIKE ");
                query.push_bind(format!("%{}%", driver_name));
            }
            if let Some(office_name) = &filters.office_name {
                query.push(" AND office_name ILIKE ");
                query.push_bind(format!("%{}%", office_name));
            }
            if let Some(vehicle_type) = &filters.vehicle_type {
                query.push(" AND vehicle_type ILIKE ");
                query.push_bind(format!("%{}%", vehicle_type));
            }
        }

        query.push(" ORDER BY created_at DESC");

        let vehicles = query
            .build_query_as::<Vehicle>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(vehicles)
    }

    pub async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(vehicle)
    }

    /// Creates the vehicle and the first entry of its driver log atomically.
    pub async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, AppError> {
        let input = input.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
                        "INSERT INTO vehicles (plate_number, driver_name, contact_number, \
                            engine_type, office_name, vehicle_type, wheels) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {VEHICLE_COLUMNS}"
                    ))
                    .bind(&input.plate_number)
                    .bind(&input.driver_name)
                    .bind(&input.contact_number)
                    .bind(&input.engine_type)
                    .bind(&input.office_name)
                    .bind(&input.vehicle_type)
                    .bind(input.wheels)
                    .fetch_one(&mut **tx)
                    .await?;

                    sqlx::query(
                        "INSERT INTO vehicle_driver_history (vehicle_id, driver_name) \
                         VALUES ($1, $2)",
                    )
                    .bind(vehicle.id)
                    .bind(&vehicle.driver_name)
                    .execute(&mut **tx)
                    .await?;

                    Ok(vehicle)
                })
            })
            .await
    }

    /// Full-replace update. A driver change appends to the history log in the
    /// same transaction.
    pub async fn update_vehicle(
        &self,
        id: Uuid,
        input: &VehicleInput,
    ) -> Result<Vehicle, AppError> {
        let input = input.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let existing = sqlx::query_as::<_, Vehicle>(&format!(
                        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
                    ))
                    .bind(id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or_else(|| AppError::not_found("Vehicle not found"))?;

                    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
                        "UPDATE vehicles SET plate_number = $2, driver_name = $3, \
                            contact_number = $4, engine_type = $5, office_name = $6, \
                            vehicle_type = $7, wheels = $8, updated_at = NOW() \
                         WHERE id = $1 RETURNING {VEHICLE_COLUMNS}"
                    ))
                    .bind(id)
                    .bind(&input.plate_number)
                    .bind(&input.driver_name)
                    .bind(&input.contact_number)
                    .bind(&input.engine_type)
                    .bind(&input.office_name)
                    .bind(&input.vehicle_type)
                    .bind(input.wheels)
                    .fetch_one(&mut **tx)
                    .await?;

                    if existing.driver_name != vehicle.driver_name {
                        sqlx::query(
                            "INSERT INTO vehicle_driver_history (vehicle_id, driver_name) \
                             VALUES ($1, $2)",
                        )
                        .bind(vehicle.id)
                        .bind(&vehicle.driver_name)
                        .execute(&mut **tx)
                        .await?;
                    }

                    Ok(vehicle)
                })
            })
            .await
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn driver_history(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<DriverHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, DriverHistoryEntry>(
            "SELECT id, vehicle_id, driver_name, changed_at \
             FROM vehicle_driver_history WHERE vehicle_id = $1 ORDER BY changed_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(entries)
    }

    pub async fn vehicle_summaries(
        &self,
        filters: Option<&VehicleFilters>,
    ) -> Result<Vec<VehicleSummary>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT v.id, v.plate_number, v.driver_name, v.contact_number, v.engine_type, \
                    v.office_name, v.vehicle_type, v.wheels, \
                    t.test_date AS latest_test_date, t.quarter AS latest_test_quarter, \
                    t.year AS latest_test_year, t.result AS latest_test_result \
             FROM vehicles v \
             LEFT JOIN LATERAL ( \
                SELECT test_date, quarter, year, result FROM emission_tests \
                WHERE vehicle_id = v.id \
                ORDER BY year DESC, quarter DESC, test_date DESC LIMIT 1 \
             ) t ON TRUE \
             WHERE 1=1",
        );

        if let Some(filters) = filters {
            if let Some(plate_number) = &filters.plate_number {
                query.push(" AND v.plate_number ILIKE ");
                query.push_bind(format!("%{}%", plate_number));
            }
            if let Some(driver_name) = &filters.driver_name {
                query.push(" AND v.driver_name ILIKE ");
                query.push_bind(format!("%{}%", driver_name));
            }
            if let Some(office_name) = &filters.office_name {
                query.push(" AND v.office_name ILIKE ");
                query.push_bind(format!("%{}%", office_name));
            }
            if let Some(vehicle_type) = &filters.vehicle_type {
                query.push(" AND v.vehicle_type ILIKE ");
                query.push_bind(format!("%{}%", vehicle_type));
            }
        }

        query.push(" ORDER BY v.created_at DESC");

        let summaries = query
            .build_query_as::<VehicleSummary>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(summaries)
    }

    // Emission test operations

    pub async fn list_tests(
        &self,
        filters: Option<&EmissionTestFilters>,
    ) -> Result<Vec<EmissionTest>, AppError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TEST_COLUMNS} FROM emission_tests WHERE 1=1"));

        if let Some(filters) = filters {
            if let Some(year) = filters.year {
                query.push(" AND year = ");
                query.push_bind(year);
            }
            if let Some(quarter) = filters.quarter {
                query.push(" AND quarter = ");
                query.push_bind(quarter);
            }
            if let Some(vehicle_id) = filters.vehicle_id {
                query.push(" AND vehicle_id = ");
                query.push_bind(vehicle_id);
            }
            if let Some(result) = filters.result {
                query.push(" AND result = ");
                query.push_bind(result);
            }
        }

        query.push(" ORDER BY year DESC, quarter DESC, test_date DESC");

        let tests = query
            .build_query_as::<EmissionTest>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(tests)
    }

    pub async fn find_test(&self, id: Uuid) -> Result<Option<EmissionTest>, AppError> {
        let test = sqlx::query_as::<_, EmissionTest>(&format!(
            "SELECT {TEST_COLUMNS} FROM emission_tests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(test)
    }

    pub async fn latest_test(&self, vehicle_id: Uuid) -> Result<Option<EmissionTest>, AppError> {
        let test = sqlx::query_as::<_, EmissionTest>(&format!(
            "SELECT {TEST_COLUMNS} FROM emission_tests WHERE vehicle_id = $1 \
             ORDER BY year DESC, quarter DESC, test_date DESC LIMIT 1"
        ))
        .bind(vehicle_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(test)
    }

    pub async fn create_test(
        &self,
        input: &EmissionTestInput,
        created_by: Option<Uuid>,
    ) -> Result<EmissionTest, AppError> {
        validate_quarter(input.quarter)?;

        if self.find_vehicle(input.vehicle_id).await?.is_none() {
            return Err(AppError::not_found("Vehicle not found"));
        }

        let test = sqlx::query_as::<_, EmissionTest>(&format!(
            "INSERT INTO emission_tests (vehicle_id, test_date, quarter, year, result, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TEST_COLUMNS}"
        ))
        .bind(input.vehicle_id)
        .bind(input.test_date)
        .bind(input.quarter)
        .bind(input.year)
        .bind(input.result)
        .bind(created_by)
        .fetch_one(self.db.pool())
        .await?;
        Ok(test)
    }

    pub async fn update_test(
        &self,
        id: Uuid,
        input: &EmissionTestInput,
    ) -> Result<EmissionTest, AppError> {
        validate_quarter(input.quarter)?;

        if self.find_vehicle(input.vehicle_id).await?.is_none() {
            return Err(AppError::not_found("Vehicle not found"));
        }

        sqlx::query_as::<_, EmissionTest>(&format!(
            "UPDATE emission_tests SET vehicle_id = $2, test_date = $3, quarter = $4, \
                year = $5, result = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {TEST_COLUMNS}"
        ))
        .bind(id)
        .bind(input.vehicle_id)
        .bind(input.test_date)
        .bind(input.quarter)
        .bind(input.year)
        .bind(input.result)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Emission test not found"))
    }

    pub async fn delete_test(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM emission_tests WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Schedule operations

    pub async fn list_schedules(
        &self,
        year: Option<i32>,
        quarter: Option<i32>,
    ) -> Result<Vec<EmissionTestSchedule>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {SCHEDULE_COLUMNS} FROM emission_test_schedules WHERE 1=1"
        ));

        if let Some(year) = year {
            query.push(" AND year = ");
            query.push_bind(year);
        }
        if let Some(quarter) = quarter {
            query.push(" AND quarter = ");
            query.push_bind(quarter);
        }

        query.push(" ORDER BY year DESC, quarter DESC, conducted_on ASC");

        let schedules = query
            .build_query_as::<EmissionTestSchedule>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(schedules)
    }

    pub async fn find_schedule(&self, id: Uuid) -> Result<Option<EmissionTestSchedule>, AppError> {
        let schedule = sqlx::query_as::<_, EmissionTestSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM emission_test_schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(schedule)
    }

    pub async fn create_schedule(
        &self,
        input: &EmissionTestScheduleInput,
    ) -> Result<EmissionTestSchedule, AppError> {
        validate_quarter(input.quarter)?;

        let schedule = sqlx::query_as::<_, EmissionTestSchedule>(&format!(
            "INSERT INTO emission_test_schedules \
                (assigned_personnel, conducted_on, location, quarter, year) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(&input.assigned_personnel)
        .bind(input.conducted_on)
        .bind(&input.location)
        .bind(input.quarter)
        .bind(input.year)
        .fetch_one(self.db.pool())
        .await?;
        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        id: Uuid,
        input: &EmissionTestScheduleInput,
    ) -> Result<EmissionTestSchedule, AppError> {
        validate_quarter(input.quarter)?;

        sqlx::query_as::<_, EmissionTestSchedule>(&format!(
            "UPDATE emission_test_schedules SET assigned_personnel = $2, conducted_on = $3, \
                location = $4, quarter = $5, year = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.assigned_personnel)
        .bind(input.conducted_on)
        .bind(&input.location)
        .bind(input.quarter)
        .bind(input.year)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Emission test schedule not found"))
    }

    pub async fn delete_schedule(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM emission_test_schedules WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Office compliance

    pub async fn office_compliance(
        &self,
        year: i32,
        quarter: i32,
        search_term: Option<&str>,
    ) -> Result<Vec<OfficeCompliance>, AppError> {
        validate_quarter(quarter)?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT v.office_name AS name, \
                    COUNT(DISTINCT v.id) AS vehicle_count, \
                    COUNT(DISTINCT et.vehicle_id) AS tested_count, \
                    COUNT(DISTINCT et.vehicle_id) FILTER (WHERE et.result) AS passed_count \
             FROM vehicles v \
             LEFT JOIN emission_tests et ON et.vehicle_id = v.id AND et.year = ",
        );
        query.push_bind(year);
        query.push(" AND et.quarter = ");
        query.push_bind(quarter);
        if let Some(term) = search_term {
            query.push(" WHERE v.office_name ILIKE ");
            query.push_bind(format!("%{}%", term));
        }
        query.push(" GROUP BY v.office_name ORDER BY v.office_name");

        let rows = query
            .build_query_as::<OfficeComplianceRow>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(OfficeCompliance::from).collect())
    }
}

impl From<OfficeComplianceRow> for OfficeCompliance {
    fn from(row: OfficeComplianceRow) -> Self {
        let code = office_code(&row.name);
        let compliance_rate = if row.vehicle_count > 0 {
            ((row.passed_count as f64 / row.vehicle_count as f64) * 100.0).round() as i32
        } else {
            0
        };
        Self {
            id: code.to_lowercase(),
            name: row.name,
            code,
            vehicle_count: row.vehicle_count,
            tested_count: row.tested_count,
            passed_count: row.passed_count,
            compliance_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_bounds() {
        assert!(validate_quarter(1).is_ok());
        assert!(validate_quarter(4).is_ok());
        assert!(validate_quarter(0).is_err());
        assert!(validate_quarter(5).is_err());
    }

    #[test]
    fn office_code_takes_initials() {
        assert_eq!(office_code("City Engineering Office"), "CEO");
        assert_eq!(office_code("Treasury"), "T");
        assert_eq!(office_code(""), "");
    }

    #[test]
    fn compliance_rate_rounds_against_vehicle_count() {
        let row = OfficeComplianceRow {
            name: "City Health Office".to_string(),
            vehicle_count: 3,
            tested_count: 2,
            passed_count: 2,
        };
        let compliance = OfficeCompliance::from(row);
        assert_eq!(compliance.code, "CHO");
        assert_eq!(compliance.id, "cho");
        assert_eq!(compliance.compliance_rate, 67);
    }

    #[test]
    fn compliance_rate_is_zero_without_vehicles() {
        let row = OfficeComplianceRow {
            name: "Empty Office".to_string(),
            vehicle_count: 0,
            tested_count: 0,
            passed_count: 0,
        };
        assert_eq!(OfficeCompliance::from(row).compliance_rate, 0);
    }
}
