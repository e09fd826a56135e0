use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

use crate::domain::{Domain, RequestResult, TransportError};

/// Performs one request against a target and reports what came back.
/// Implementations never fail; every problem is folded into the result.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, target: &Domain) -> RequestResult;
}

/// GETs the target URL through the shared client and drains the body so the
/// connection can be reused.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, target: &Domain) -> RequestResult {
        let response = match self.client.get(target.url()).send().await {
            Ok(response) => response,
            Err(err) => return RequestResult::Transport(TransportError::from_reqwest(&err)),
        };
        let status = response.status().as_u16();
        match drain_response_body(response).await {
            Ok(_) => RequestResult::Status(status),
            Err(err) => RequestResult::Transport(TransportError::from_reqwest(&err)),
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
