use async_graphql::{Context, ErrorExtensions, Object};
use uuid::Uuid;

use crate::database::Database;
use crate::emission::model::{
    EmissionTest, EmissionTestFilters, EmissionTestInput, EmissionTestSchedule,
    EmissionTestScheduleInput, OfficeCompliance, Vehicle, VehicleFilters, VehicleInput,
    VehicleSummary,
};
use crate::emission::repository::EmissionRepository;
use crate::error::AppError;
use crate::graphql::context::{guard, Policy};
use crate::users::model::Role;

#[derive(Default)]
pub struct EmissionQuery;

#[Object]
impl EmissionQuery {
    async fn vehicles(
        &self,
        ctx: &Context<'_>,
        filters: Option<VehicleFilters>,
    ) -> async_graphql::Result<Vec<Vehicle>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .list_vehicles(filters.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    async fn vehicle(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<Vehicle> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .find_vehicle(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Vehicle not found").extend())
    }

    async fn vehicle_summaries(
        &self,
        ctx: &Context<'_>,
        filters: Option<VehicleFilters>,
    ) -> async_graphql::Result<Vec<VehicleSummary>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .vehicle_summaries(filters.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    async fn emission_tests(
        &self,
        ctx: &Context<'_>,
        filters: Option<EmissionTestFilters>,
    ) -> async_graphql::Result<Vec<EmissionTest>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .list_tests(filters.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    async fn emission_test(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<EmissionTest> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .find_test(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Emission test not found").extend())
    }

    async fn emission_test_schedules(
        &self,
        ctx: &Context<'_>,
        year: Option<i32>,
        quarter: Option<i32>,
    ) -> async_graphql::Result<Vec<EmissionTestSchedule>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .list_schedules(year, quarter)
            .await
            .map_err(|e| e.extend())
    }

    async fn emission_test_schedule(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<EmissionTestSchedule> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .find_schedule(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Emission test schedule not found").extend())
    }

    async fn office_compliance(
        &self,
        ctx: &Context<'_>,
        year: i32,
        quarter: i32,
        search_term: Option<String>,
    ) -> async_graphql::Result<Vec<OfficeCompliance>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .office_compliance(year, quarter, search_term.as_deref())
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct EmissionMutation;

#[Object]
impl EmissionMutation {
    async fn create_vehicle(
        &self,
        ctx: &Context<'_>,
        input: VehicleInput,
    ) -> async_graphql::Result<Vehicle> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .create_vehicle(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_vehicle(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: VehicleInput,
    ) -> async_graphql::Result<Vehicle> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .update_vehicle(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_vehicle(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .delete_vehicle(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_emission_test(
        &self,
        ctx: &Context<'_>,
        input: EmissionTestInput,
    ) -> async_graphql::Result<EmissionTest> {
        let current = guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .create_test(&input, Some(current.id))
            .await
            .map_err(|e| e.extend())
    }

    async fn update_emission_test(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: EmissionTestInput,
    ) -> async_graphql::Result<EmissionTest> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .update_test(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_emission_test(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .delete_test(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_emission_test_schedule(
        &self,
        ctx: &Context<'_>,
        input: EmissionTestScheduleInput,
    ) -> async_graphql::Result<EmissionTestSchedule> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .create_schedule(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_emission_test_schedule(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: EmissionTestScheduleInput,
    ) -> async_graphql::Result<EmissionTestSchedule> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .update_schedule(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_emission_test_schedule(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::GovernmentEmission))?;
        let db = ctx.data::<Database>()?;
        EmissionRepository::new(db)
            .delete_schedule(id)
            .await
            .map_err(|e| e.extend())
    }
}
