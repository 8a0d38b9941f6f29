use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use crates::{
    domain::{
        repositories::contact_messages::ContactMessageRepository,
        value_objects::contact::ContactFormModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::contact_messages::ContactMessagePostgres,
    },
};

use crate::{axum_http::error_responses::AppError, usecases::contact::ContactUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let contact_repository = ContactMessagePostgres::new(Arc::clone(&db_pool));
    router(Arc::new(ContactUseCase::new(Arc::new(contact_repository))))
}

pub fn router<C>(usecase: Arc<ContactUseCase<C>>) -> Router
where
    C: ContactMessageRepository + Send + Sync + 'static,
{
    Router::new().route("/", post(submit)).with_state(usecase)
}

pub async fn submit<C>(
    State(usecase): State<Arc<ContactUseCase<C>>>,
    Json(form): Json<ContactFormModel>,
) -> Result<impl IntoResponse, AppError>
where
    C: ContactMessageRepository + Send + Sync + 'static,
{
    let submitted = usecase
        .submit(form)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(submitted)))
}
