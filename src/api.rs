//! Backend client for the `/tasks` REST surface.
//!
//! Every call is a single request/response. Nothing is cached and nothing is
//! retried; the caller decides what to do with the outcome.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::task::{NewTask, Task, TaskId};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered {0}")]
    Status(StatusCode),
    #[error("malformed task list: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} cannot be used as a base url")]
    BaseUrl(Url),
}

impl ApiError {
    /// True when the request never got an HTTP answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// A transport error without touching the network.
    #[cfg(test)]
    pub(crate) fn offline() -> Self {
        match reqwest::Client::new().get("not a url").build() {
            Err(err) => Self::Transport(err),
            Ok(_) => unreachable!("relative urls never build"),
        }
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError>;
    async fn complete_task(&self, id: TaskId) -> Result<(), ApiError>;
    async fn update_task(&self, task: &Task) -> Result<(), ApiError>;
}

/// `TaskApi` over HTTP with reqwest.
pub struct HttpTaskApi {
    tasks_url: Url,
    client: reqwest::Client,
}

impl HttpTaskApi {
    pub fn new(base_url: &Url) -> Result<Self, ApiError> {
        Ok(Self {
            tasks_url: tasks_endpoint(base_url)?,
            client: reqwest::Client::new(),
        })
    }

    fn task_url(&self, id: TaskId, suffix: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.tasks_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::BaseUrl(self.tasks_url.clone()))?;
            segments.push(&id.to_string());
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}

fn tasks_endpoint(base_url: &Url) -> Result<Url, ApiError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::BaseUrl(base_url.clone()))?
        .pop_if_empty()
        .push("tasks");
    Ok(url)
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        warn!(%status, url = %response.url(), "backend rejected request");
        Err(ApiError::Status(status))
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[instrument(skip(self))]
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self
            .client
            .get(self.tasks_url.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        ensure_success(&response)?;
        let body = response.text().await?;
        let tasks: Vec<Task> = serde_json::from_str(&body)?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(name = %task.name))]
    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.tasks_url.clone())
            .json(task)
            .send()
            .await?;
        ensure_success(&response)
    }

    #[instrument(skip(self))]
    async fn complete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.task_url(id, Some("complete"))?)
            .send()
            .await?;
        ensure_success(&response)
    }

    #[instrument(skip(self, task), fields(id = task.id))]
    async fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.task_url(task.id, None)?)
            .json(task)
            .send()
            .await?;
        ensure_success(&response)
    }
}
