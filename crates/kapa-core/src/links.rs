//! Relative references to Kapacitor task resources

/// Collection path for the task API
pub const TASKS_PATH: &str = "/kapacitor/v1/tasks";

/// Name of the httpOut node every generated script ends in
pub const HTTP_ENDPOINT: &str = "output";

/// Link to a task given its ID
pub fn task_href(id: &str) -> String {
    format!("{}/{}", TASKS_PATH, id)
}

/// Link to a task's httpOut node given its ID
pub fn output_href(id: &str) -> String {
    format!("{}/{}/{}", TASKS_PATH, id, HTTP_ENDPOINT)
}
