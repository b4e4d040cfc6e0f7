//! Task lifecycle manager
//!
//! All state lives in Kapacitor. The manager only sequences calls to the
//! engine and the script translators, and keeps nothing between calls, so
//! one instance can serve concurrent requests. Calls for the same task are
//! not serialized here.

use kapa_core::{
    managed_id, output_href, task_href, AlertRule, IdGenerator, KapaError, KapacitorConfig,
    Result, Task, TaskStatus, TaskType, TickScript, UuidGenerator,
};
use kapa_engine::{
    CreateTaskOptions, HttpTaskEngine, Link, ListTasksOptions, RemoteTask, TaskEngine,
    UpdateTaskOptions,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::reversal::Reversal;
use crate::script::{Reverser, Ticker};
use crate::update::{AbortPhase, UpdateOutcome};

/// Manages Chronograf alert rules as Kapacitor tasks
pub struct TaskManager<E: TaskEngine> {
    engine: E,
    ids: Box<dyn IdGenerator>,
    ticker: Box<dyn Ticker>,
    reverser: Box<dyn Reverser>,
}

impl TaskManager<HttpTaskEngine> {
    /// Create a manager talking to the configured Kapacitor
    pub fn connect(
        config: &KapacitorConfig,
        ticker: impl Ticker + 'static,
        reverser: impl Reverser + 'static,
    ) -> Result<Self> {
        let engine = HttpTaskEngine::new(config)?;
        info!("Using Kapacitor at {}", engine.base_url());
        Ok(Self::with_engine(engine, ticker, reverser))
    }
}

impl<E: TaskEngine> TaskManager<E> {
    /// Create a manager with a custom engine
    pub fn with_engine(
        engine: E,
        ticker: impl Ticker + 'static,
        reverser: impl Reverser + 'static,
    ) -> Self {
        Self {
            engine,
            ids: Box::new(UuidGenerator),
            ticker: Box::new(ticker),
            reverser: Box::new(reverser),
        }
    }

    /// Replace the source of task ID tokens
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Link to a task given its ID
    pub fn href(&self, id: &str) -> String {
        task_href(id)
    }

    /// Link to a task's httpOut node given its ID
    pub fn href_output(&self, id: &str) -> String {
        output_href(id)
    }

    /// Render a rule and deploy it as a new, enabled task
    ///
    /// Nothing reaches the engine unless the ID and script were produced.
    pub async fn create(&self, mut rule: AlertRule) -> Result<Task> {
        let token = self.ids.generate()?;
        let id = managed_id(&token)?;
        let script = self.ticker.generate(&rule)?;
        let task_type = TaskType::for_query(&rule.query);

        info!("Creating {} task {} for rule '{}'", task_type, id, rule.name);

        rule.id = id.clone();
        let created = self
            .engine
            .create_task(&CreateTaskOptions {
                id: id.clone(),
                task_type,
                dbrps: vec![rule.query.dbrp()],
                script: script.as_str().to_string(),
                status: TaskStatus::Enabled,
            })
            .await?;

        Ok(Task {
            href_output: output_href(&id),
            id,
            href: created.link.href,
            rule: Some(rule),
            tick_script: script,
        })
    }

    /// Remove the task at `href`
    pub async fn delete(&self, href: &str) -> Result<()> {
        info!("Deleting task {}", href);
        self.engine.delete_task(&Link::new(href)).await
    }

    /// Start the task at `href`
    pub async fn enable(&self, href: &str) -> Result<Task> {
        self.set_status(href, TaskStatus::Enabled).await
    }

    /// Stop the task at `href`
    pub async fn disable(&self, href: &str) -> Result<Task> {
        self.set_status(href, TaskStatus::Disabled).await
    }

    async fn set_status(&self, href: &str, status: TaskStatus) -> Result<Task> {
        debug!("Setting task {} {}", href, status);

        let task = self
            .engine
            .update_task(&Link::new(href), &UpdateTaskOptions::status(status))
            .await?;

        Ok(Task {
            href_output: output_href(&task.id),
            id: task.id,
            href: task.link.href,
            rule: None,
            tick_script: TickScript::from(task.script),
        })
    }

    /// Replace the task's script with one rendered from `rule`
    ///
    /// Returns the engine error of whichever phase failed. If only the final
    /// enable fails, the new script is in place but the task stays disabled;
    /// use [`update_phased`](Self::update_phased) to tell the cases apart.
    pub async fn update(&self, href: &str, rule: AlertRule) -> Result<Task> {
        self.update_phased(href, rule).await.into_result()
    }

    /// Disable the task while applying the new script and bindings, then
    /// enable it again
    ///
    /// No step is retried.
    pub async fn update_phased(&self, href: &str, rule: AlertRule) -> UpdateOutcome {
        let script = match self.ticker.generate(&rule) {
            Ok(script) => script,
            Err(error) => {
                return UpdateOutcome::NotApplied {
                    phase: AbortPhase::Translate,
                    error,
                }
            }
        };

        let opts = UpdateTaskOptions {
            task_type: Some(TaskType::for_query(&rule.query)),
            dbrps: Some(vec![rule.query.dbrp()]),
            script: Some(script.as_str().to_string()),
            status: Some(TaskStatus::Disabled),
        };

        info!("Applying new script to task {}", href);
        let applied = match self.engine.update_task(&Link::new(href), &opts).await {
            Ok(task) => task,
            Err(error) => {
                return UpdateOutcome::NotApplied {
                    phase: AbortPhase::Apply,
                    error,
                }
            }
        };

        let task = Task {
            href_output: output_href(&applied.id),
            id: applied.id,
            href: applied.link.href,
            rule: Some(rule),
            tick_script: script,
        };

        match self.enable(href).await {
            Ok(_) => {
                info!("Task {} updated and enabled", task.id);
                UpdateOutcome::Completed(task)
            }
            Err(error) => {
                warn!(
                    "Task {} has its new script but is left disabled: {}",
                    task.id, error
                );
                UpdateOutcome::LeftDisabled { task, error }
            }
        }
    }

    /// Read a task back as a rule
    ///
    /// A failed fetch is [`KapaError::TaskNotFound`]; a script that does not
    /// reverse is not an error and yields [`Reversal::Unparsed`].
    pub async fn get(&self, id: &str) -> Result<Reversal> {
        let task = self.engine.task(&Link::task(id)).await.map_err(|e| {
            debug!("Fetching task {} failed: {}", id, e);
            KapaError::TaskNotFound(id.to_string())
        })?;

        Ok(self.reverse(task))
    }

    /// Read every task on the engine back as a rule, keyed by task ID
    ///
    /// Each task degrades on its own; one bad script does not affect others.
    pub async fn all(&self) -> Result<HashMap<String, Reversal>> {
        let tasks = self.engine.list_tasks(&ListTasksOptions::default()).await?;

        let rules: HashMap<_, _> = tasks
            .into_iter()
            .map(|task| (task.id.clone(), self.reverse(task)))
            .collect();

        let degraded = rules.values().filter(|r| r.is_degraded()).count();
        debug!("Read {} tasks, {} degraded", rules.len(), degraded);
        Ok(rules)
    }

    /// Status label of the task at `href`
    pub async fn status(&self, href: &str) -> Result<String> {
        let task = self.engine.task(&Link::new(href)).await?;
        Ok(task.status)
    }

    /// Status label of every task, keyed by task ID
    ///
    /// Only IDs and statuses are requested, not scripts.
    pub async fn all_status(&self) -> Result<HashMap<String, String>> {
        let tasks = self
            .engine
            .list_tasks(&ListTasksOptions::fields(["status"]))
            .await?;

        Ok(tasks
            .into_iter()
            .map(|task| (task.id, task.status))
            .collect())
    }

    fn reverse(&self, task: RemoteTask) -> Reversal {
        let script = TickScript::from(task.script);
        match self.reverser.reverse(&script) {
            Ok(rule) => Reversal::reversed(rule, &task.id, script),
            Err(e) => {
                warn!("Keeping task {} as raw TICKscript: {}", task.id, e);
                Reversal::Unparsed {
                    id: task.id,
                    script,
                }
            }
        }
    }
}
