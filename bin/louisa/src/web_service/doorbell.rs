use axum::extract::State;
use log::info;

use super::{AppState, ServiceError};
use crate::device::DOORBELL_CHIME;
use crate::Error;

pub async fn ring(State(service): State<AppState>) -> Result<&'static str, ServiceError> {
    info!("doorbell is ringing...");

    service.pushover.send("Someone is at the door");

    let chime = service
        .registry
        .get(DOORBELL_CHIME)
        .ok_or_else(|| Error::UnknownDevice(DOORBELL_CHIME.to_string()))?
        .clone();
    service.controller.turn_on(chime).await?;

    Ok("OK")
}
