use async_graphql::{Context, ErrorExtensions, Object};
use uuid::Uuid;

use crate::database::Database;
use crate::error::AppError;
use crate::graphql::context::{guard, Policy};
use crate::urban::model::{
    SeedlingRequest, SeedlingRequestFilters, SeedlingRequestInput, UrbanGreening,
    UrbanGreeningFilters, UrbanGreeningInput, UrbanOverview,
};
use crate::urban::repository::UrbanRepository;
use crate::users::model::Role;

#[derive(Default)]
pub struct UrbanQuery;

#[Object]
impl UrbanQuery {
    async fn seedling_requests(
        &self,
        ctx: &Context<'_>,
        filters: Option<SeedlingRequestFilters>,
    ) -> async_graphql::Result<Vec<SeedlingRequest>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .list_requests(filters.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    async fn seedling_request(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<SeedlingRequest> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .find_request(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Seedling request not found").extend())
    }

    async fn urban_greenings(
        &self,
        ctx: &Context<'_>,
        filters: Option<UrbanGreeningFilters>,
    ) -> async_graphql::Result<Vec<UrbanGreening>> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .list_greenings(filters.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    async fn urban_greening(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<UrbanGreening> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .find_greening(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("Urban greening record not found").extend())
    }

    async fn urban_overview(&self, ctx: &Context<'_>) -> async_graphql::Result<UrbanOverview> {
        guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .overview()
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UrbanMutation;

#[Object]
impl UrbanMutation {
    async fn create_seedling_request(
        &self,
        ctx: &Context<'_>,
        input: SeedlingRequestInput,
    ) -> async_graphql::Result<SeedlingRequest> {
        let current = guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .create_request(&input, current.id)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_seedling_request(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: SeedlingRequestInput,
    ) -> async_graphql::Result<SeedlingRequest> {
        let current = guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .update_request(id, &input, current.id)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_seedling_request(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .delete_request(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_urban_greening(
        &self,
        ctx: &Context<'_>,
        input: UrbanGreeningInput,
    ) -> async_graphql::Result<UrbanGreening> {
        let current = guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .create_greening(&input, current.id)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_urban_greening(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UrbanGreeningInput,
    ) -> async_graphql::Result<UrbanGreening> {
        guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .update_greening(id, &input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_urban_greening(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Role(Role::TreeManagement))?;
        let db = ctx.data::<Database>()?;
        UrbanRepository::new(db)
            .delete_greening(id)
            .await
            .map_err(|e| e.extend())
    }
}
