mod doorbell;
mod lights;

use std::sync::Arc;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use log::error;

use crate::device::Registry;
use crate::node_red::NodeRedClient;
use crate::pushover::PushoverClient;
use crate::{Error, MatterController};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub controller: Arc<MatterController>,
    pub pushover: PushoverClient,
    pub node_red: NodeRedClient,
}

pub struct ServiceError(Error, uuid::Uuid);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response<Body> {
        error!("ServiceError[{}]: {}", self.1, self.0);

        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl From<Error> for ServiceError {
    fn from(value: Error) -> Self {
        ServiceError(value, uuid::Uuid::new_v4())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ON", post(lights::turn_on))
        .route("/OFF", post(lights::turn_off))
        .route("/DOORBELL", post(doorbell::ring))
        .with_state(state)
}
