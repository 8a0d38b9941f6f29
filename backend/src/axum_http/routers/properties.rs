use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::properties::PropertyRepository,
        value_objects::properties::{
            CreatePropertyModel, SearchPropertiesQuery, UpdatePropertyModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::properties::PropertyPostgres,
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::properties::PropertyUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let property_repository = PropertyPostgres::new(Arc::clone(&db_pool));
    let usecase = PropertyUseCase::new(Arc::new(property_repository));

    Router::new()
        .route("/", get(search_properties).post(create_property))
        .route("/mine", get(list_owner_properties))
        .route(
            "/:property_id",
            get(get_property)
                .patch(update_property)
                .delete(deactivate_property),
        )
        .with_state(Arc::new(usecase))
}

pub async fn search_properties<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    Query(query): Query<SearchPropertiesQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    let properties = usecase
        .search_properties(query)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(properties))
}

pub async fn create_property<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    AuthUser { user_id, role, .. }: AuthUser,
    Json(create_property_model): Json<CreatePropertyModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    info!(%user_id, "properties: create request received");
    let property = usecase
        .create_property(user_id, role, create_property_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn list_owner_properties<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    let properties = usecase
        .list_owner_properties(user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(properties))
}

pub async fn get_property<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    viewer: Option<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    let property = usecase
        .get_property(viewer.map(|viewer| viewer.user_id), property_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(property))
}

pub async fn update_property<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
    Json(update_property_model): Json<UpdatePropertyModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    let property = usecase
        .update_property(user_id, property_id, update_property_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(property))
}

pub async fn deactivate_property<P>(
    State(usecase): State<Arc<PropertyUseCase<P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    P: PropertyRepository + Send + Sync + 'static,
{
    info!(%user_id, %property_id, "properties: deactivate request received");
    let property = usecase
        .deactivate_property(user_id, property_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(property))
}
