use async_graphql::{Context, ErrorExtensions, Object};

use crate::belching::model::{
    BelchingFee, BelchingFeeInput, BelchingRecord, BelchingRecordHistoryEntry,
    BelchingRecordHistoryInput, BelchingRecordInput, BelchingViolation, BelchingViolationInput,
    DriverSearchResult, OrderOfPayment, OrderOfPaymentInput,
};
use crate::belching::repository::BelchingRepository;
use crate::database::Database;
use crate::error::AppError;
use crate::graphql::context::{guard, Policy};
use crate::users::model::Role;

#[derive(Default)]
pub struct BelchingQuery;

#[Object]
impl BelchingQuery {
    async fn belching_fees(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<BelchingFee>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_fees()
            .await
            .map_err(|e| e.extend())
    }

    async fn belching_fee(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<BelchingFee> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .find_fee(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Belching fee not found").extend())
    }

    async fn belching_records(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<BelchingRecord>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_records()
            .await
            .map_err(|e| e.extend())
    }

    async fn belching_record(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<BelchingRecord> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .find_record(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Belching record not found").extend())
    }

    async fn belching_violations(
        &self,
        ctx: &Context<'_>,
        record_id: Option<i32>,
    ) -> async_graphql::Result<Vec<BelchingViolation>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_violations(record_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn belching_violation(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<BelchingViolation> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .find_violation(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Belching violation not found").extend())
    }

    async fn belching_record_history(
        &self,
        ctx: &Context<'_>,
        record_id: Option<i32>,
    ) -> async_graphql::Result<Vec<BelchingRecordHistoryEntry>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_history(record_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn belching_record_history_entry(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<BelchingRecordHistoryEntry> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .find_history(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Belching record history entry not found").extend())
    }

    async fn orders_of_payment(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<OrderOfPayment>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .list_orders()
            .await
            .map_err(|e| e.extend())
    }

    async fn order_of_payment(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<OrderOfPayment> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .find_order(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Order of payment not found").extend())
    }

    /// Apprehended drivers matching `query`, grouped with their violations.
    async fn search_drivers(
        &self,
        ctx: &Context<'_>,
        query: String,
    ) -> async_graphql::Result<Vec<DriverSearchResult>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .search_drivers(&query)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct BelchingMutation;

#[Object]
impl BelchingMutation {
    async fn create_belching_fee(
        &self,
        ctx: &Context<'_>,
        input: BelchingFeeInput,
    ) -> async_graphql::Result<BelchingFee> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .create_fee(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_belching_fee(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: BelchingFeeInput,
    ) -> async_graphql::Result<BelchingFee> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .update_fee(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_belching_fee(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .delete_fee(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_belching_record(
        &self,
        ctx: &Context<'_>,
        input: BelchingRecordInput,
    ) -> async_graphql::Result<BelchingRecord> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .create_record(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_belching_record(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: BelchingRecordInput,
    ) -> async_graphql::Result<BelchingRecord> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .update_record(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_belching_record(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .delete_record(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_belching_violation(
        &self,
        ctx: &Context<'_>,
        input: BelchingViolationInput,
    ) -> async_graphql::Result<BelchingViolation> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .create_violation(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_belching_violation(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: BelchingViolationInput,
    ) -> async_graphql::Result<BelchingViolation> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .update_violation(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_belching_violation(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .delete_violation(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_belching_record_history(
        &self,
        ctx: &Context<'_>,
        input: BelchingRecordHistoryInput,
    ) -> async_graphql::Result<BelchingRecordHistoryEntry> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .create_history(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_belching_record_history(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: BelchingRecordHistoryInput,
    ) -> async_graphql::Result<BelchingRecordHistoryEntry> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .update_history(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_belching_record_history(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .delete_history(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_order_of_payment(
        &self,
        ctx: &Context<'_>,
        input: OrderOfPaymentInput,
    ) -> async_graphql::Result<OrderOfPayment> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .create_order(&input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_order_of_payment(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: OrderOfPaymentInput,
    ) -> async_graphql::Result<OrderOfPayment> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .update_order(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_order_of_payment(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::AirQuality))?;
        let db = ctx.data::<Database>()?;
        BelchingRepository::new(db)
            .delete_order(id)
            .await
            .map_err(|e| e.extend())
    }
}
