use chipp_http::{HttpClient, HttpMethod, NoInterceptor};
use log::{debug, error};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct Message {
    token: String,
    user: String,
    message: String,
    // high priority = 1; emergency priority = 2
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
}

/// Queues push notifications and delivers them from a background worker so
/// the webhook path never waits on Pushover.
#[derive(Clone, Debug)]
pub struct PushoverClient {
    queue: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl PushoverClient {
    pub fn new(user: String, token: String) -> Result<PushoverClient> {
        if user.is_empty() {
            return Err(Error::MissingEnv("PUSHOVER_USER"));
        }

        if token.is_empty() {
            return Err(Error::MissingEnv("PUSHOVER_LOXONE_APP_TOKEN"));
        }

        let (queue, messages) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        task::spawn(process_queue(user, token, messages, cancel.clone()));

        Ok(PushoverClient { queue, cancel })
    }

    /// Fire and forget; delivery failures only show up in the log.
    pub fn send(&self, message: &str) {
        if self.queue.send(message.to_string()).is_err() {
            error!("push notification queue is closed");
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}

async fn process_queue(
    user: String,
    token: String,
    mut messages: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let client = HttpClient::new("https://api.pushover.net/1").unwrap();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("pushover worker terminating");
                return;
            }
            message = messages.recv() => match message {
                Some(message) => {
                    if let Err(err) = deliver(&client, &user, &token, &message).await {
                        error!("unable to deliver push notification {message:?}: {err}");
                    }
                }
                None => return,
            }
        }
    }
}

async fn deliver(
    client: &HttpClient<NoInterceptor>,
    user: &str,
    token: &str,
    message: &str,
) -> Result<()> {
    let body = Message {
        token: token.to_string(),
        user: user.to_string(),
        message: message.to_string(),
        priority: None,
        title: None,
        ttl: None,
    };

    let mut request = client.new_request(["messages.json"]);
    request.set_method(HttpMethod::Post);
    request.set_json_body(&body);

    client
        .perform_request(request, |req, res| {
            if res.status_code == 200 {
                Ok(())
            } else {
                Err((req, res).into())
            }
        })
        .await?;

    debug!("pushover message sent successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body() {
        let message = Message {
            token: "token".to_string(),
            user: "user".to_string(),
            message: "Someone is at the door".to_string(),
            priority: None,
            title: None,
            ttl: None,
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({
                "token": "token",
                "user": "user",
                "message": "Someone is at the door",
            })
        );
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let error = PushoverClient::new(String::new(), "token".to_string()).unwrap_err();
        assert!(matches!(error, Error::MissingEnv("PUSHOVER_USER")));
    }
}
