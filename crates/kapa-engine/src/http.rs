//! Kapacitor HTTP client
//!
//! Every call is a single request/response; there is no retry here. A
//! non-2xx answer becomes [`KapaError::Engine`] carrying the HTTP status and
//! the message from Kapacitor's `{"error": ...}` body.

use async_trait::async_trait;
use kapa_core::{KapaError, KapacitorConfig, Result, TASKS_PATH};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::engine::TaskEngine;
use crate::wire::{
    CreateTaskOptions, ErrorBody, Link, ListTasksOptions, RemoteTask, TaskList, UpdateTaskOptions,
};

/// Task engine backed by a live Kapacitor instance
#[derive(Debug, Clone)]
pub struct HttpTaskEngine {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
    page_size: usize,
}

impl HttpTaskEngine {
    /// Build a client from connection settings
    pub fn new(config: &KapacitorConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| KapaError::Engine(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            page_size: config.page_size,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, href: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, href);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| KapaError::Engine(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => error.error,
            Err(_) => body.trim().to_string(),
        };
        debug!("Kapacitor answered {}: {}", status, message);

        Err(KapaError::Engine(format!("{}: {}", status, message)))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| KapaError::Engine(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl TaskEngine for HttpTaskEngine {
    #[instrument(skip(self, opts), fields(id = %opts.id))]
    async fn create_task(&self, opts: &CreateTaskOptions) -> Result<RemoteTask> {
        let response = self
            .send(self.request(Method::POST, TASKS_PATH).json(opts))
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, opts), fields(href = %link.href))]
    async fn update_task(&self, link: &Link, opts: &UpdateTaskOptions) -> Result<RemoteTask> {
        let response = self
            .send(self.request(Method::PATCH, &link.href).json(opts))
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self), fields(href = %link.href))]
    async fn delete_task(&self, link: &Link) -> Result<()> {
        self.send(self.request(Method::DELETE, &link.href)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(href = %link.href))]
    async fn task(&self, link: &Link) -> Result<RemoteTask> {
        let builder = self
            .request(Method::GET, &link.href)
            .query(&[("dot-view", "attributes"), ("script-format", "formatted")]);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, opts))]
    async fn list_tasks(&self, opts: &ListTasksOptions) -> Result<Vec<RemoteTask>> {
        let page_size = if opts.limit > 0 { opts.limit } else { self.page_size };
        let mut page_opts = ListTasksOptions {
            limit: page_size,
            ..opts.clone()
        };
        let mut tasks = Vec::new();

        loop {
            let builder = self
                .request(Method::GET, TASKS_PATH)
                .query(&page_opts.query_pairs());
            let page: TaskList = Self::decode(self.send(builder).await?).await?;
            let fetched = page.tasks.len();
            tasks.extend(page.tasks);

            if fetched < page_size {
                break;
            }
            page_opts.offset += fetched;
        }

        debug!("Listed {} tasks", tasks.len());
        Ok(tasks)
    }
}
