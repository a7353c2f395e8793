use std::sync::Arc;

use chipp_http::{HttpClient, NoInterceptor};
use log::debug;

use crate::Result;

/// Forwards switch events to the secondary automation hub.
#[derive(Clone)]
pub struct NodeRedClient {
    base_url: String,
    client: Arc<HttpClient<NoInterceptor>>,
}

impl NodeRedClient {
    pub fn new(base_url: &str) -> Result<NodeRedClient> {
        Ok(NodeRedClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Arc::new(HttpClient::new(base_url)?),
        })
    }

    pub async fn turn_on(&self, room: &str) -> Result<()> {
        self.switch(room, true).await
    }

    pub async fn turn_off(&self, room: &str) -> Result<()> {
        self.switch(room, false).await
    }

    async fn switch(&self, room: &str, on: bool) -> Result<()> {
        let url = format!("{}/{}?on={}", self.base_url, room, on);
        let request = self.client.new_request_with_url(url)?;

        // the hub's reply carries nothing useful
        self.client.perform_request(request, |_, _| Ok(())).await?;

        debug!("node-red notified: {room} on={on}");

        Ok(())
    }
}
