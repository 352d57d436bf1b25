use tracing::{error, info};

use crate::api::{ApiError, TaskApi};
use crate::task::{NewTask, Task, TaskId};

/// Backend calls the shell asks the runtime to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    FetchTasks,
    Create(NewTask),
    Complete(TaskId),
    Update(Task),
}

/// Outcome of a `Request`, fed back into the shell in arrival order.
#[derive(Debug)]
pub enum Response {
    Fetched(Result<Vec<Task>, ApiError>),
    Created(Result<(), ApiError>),
    Completed(TaskId, Result<(), ApiError>),
    Updated(TaskId, Result<(), ApiError>),
}

pub async fn execute(api: &dyn TaskApi, request: Request) -> Response {
    let response = match request {
        Request::FetchTasks => Response::Fetched(api.list_tasks().await),
        Request::Create(task) => Response::Created(api.create_task(&task).await),
        Request::Complete(id) => Response::Completed(id, api.complete_task(id).await),
        Request::Update(task) => Response::Updated(task.id, api.update_task(&task).await),
    };
    log_outcome(&response);
    response
}

fn log_outcome(response: &Response) {
    match response {
        Response::Fetched(Ok(tasks)) => info!(count = tasks.len(), "task list loaded"),
        Response::Fetched(Err(err)) => error!(%err, "error fetching tasks"),
        Response::Created(Ok(())) => info!("task created"),
        Response::Created(Err(err)) => error!(%err, "error adding task"),
        Response::Completed(id, Ok(())) => info!(id, "task completed"),
        Response::Completed(id, Err(err)) => error!(id, %err, "error completing task"),
        Response::Updated(id, Ok(())) => info!(id, "task updated"),
        Response::Updated(id, Err(err)) => error!(id, %err, "error updating task"),
    }
}
