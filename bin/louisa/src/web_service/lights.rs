use axum::extract::State;
use log::{error, info};
use tokio::task;

use super::{AppState, ServiceError};
use crate::controller::Action;
use crate::Error;

pub async fn turn_on(
    State(service): State<AppState>,
    room: String,
) -> Result<&'static str, ServiceError> {
    switch(service, room, Action::On).await
}

pub async fn turn_off(
    State(service): State<AppState>,
    room: String,
) -> Result<&'static str, ServiceError> {
    switch(service, room, Action::Off).await
}

async fn switch(
    service: AppState,
    room: String,
    action: Action,
) -> Result<&'static str, ServiceError> {
    info!("lights {:?} in room {}...", action, room);

    let device = service
        .registry
        .get(&room)
        .ok_or_else(|| Error::UnknownDevice(room.clone()))?
        .clone();

    match action {
        Action::On => service.controller.turn_on(device).await?,
        Action::Off => service.controller.turn_off(device).await?,
    }

    // the hub is notified off the request path
    task::spawn(async move {
        let result = match action {
            Action::On => service.node_red.turn_on(&room).await,
            Action::Off => service.node_red.turn_off(&room).await,
        };

        if let Err(err) = result {
            error!("unable to notify node-red about {room}: {err}");
        }
    });

    Ok("OK")
}
