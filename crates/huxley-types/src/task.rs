use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, TaskId};

/// Caller-supplied context accompanying a task.
///
/// The timestamp is the evaluation clock: the pipeline has no hidden time
/// dependence, so two submissions with the same context evaluate identically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskContext {
    pub session_id: SessionId,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// The caller demands a human sign-off before execution.
    pub human_oversight_required: bool,
    /// A human review process is in place for this task.
    pub human_review: bool,
    /// A human stays in the loop for decisions the task produces.
    pub human_in_loop: bool,
    /// The task has been administratively blocked.
    pub blocked: bool,
    /// The caller flagged contradictory requirements.
    pub conflicting_requirements: bool,
    /// Safeguards the caller attests to; these feed mitigating factors.
    pub encryption: bool,
    pub fairness_training: bool,
    pub disclaimer: bool,
}

impl TaskContext {
    pub fn new(session_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            session_id: SessionId(session_id.into()),
            user_id: None,
            timestamp,
            human_oversight_required: false,
            human_review: false,
            human_in_loop: false,
            blocked: false,
            conflicting_requirements: false,
            encryption: false,
            fairness_training: false,
            disclaimer: false,
        }
    }

    /// Number of context fields carrying information beyond the defaults.
    pub fn richness(&self) -> usize {
        let flags = [
            self.human_oversight_required,
            self.human_review,
            self.human_in_loop,
            self.blocked,
            self.conflicting_requirements,
            self.encryption,
            self.fairness_training,
            self.disclaimer,
        ];
        flags.iter().filter(|f| **f).count() + usize::from(self.user_id.is_some())
    }
}

/// A task or query submitted for evaluation. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub task_type: String,
    pub domain: String,
    /// 1–10, 10 highest.
    pub priority: u8,
    pub inputs: Vec<serde_json::Value>,
    pub outputs: Vec<serde_json::Value>,
    pub context: TaskContext,
}

impl Task {
    pub fn builder(description: impl Into<String>, context: TaskContext) -> TaskBuilder {
        TaskBuilder::new(description, context)
    }

    /// Whitespace word count of the description, floored at one so the
    /// downstream complexity proxy never degenerates to zero.
    pub fn word_count(&self) -> usize {
        self.description.split_whitespace().count().max(1)
    }
}

/// Builder for [`Task`].
pub struct TaskBuilder {
    description: String,
    task_type: String,
    domain: String,
    priority: u8,
    inputs: Vec<serde_json::Value>,
    outputs: Vec<serde_json::Value>,
    context: TaskContext,
}

impl TaskBuilder {
    pub fn new(description: impl Into<String>, context: TaskContext) -> Self {
        Self {
            description: description.into(),
            task_type: "general".into(),
            domain: "general".into(),
            priority: 5,
            inputs: Vec::new(),
            outputs: Vec::new(),
            context,
        }
    }

    pub fn task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }

    pub fn input(mut self, input: serde_json::Value) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: Vec<serde_json::Value>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn output(mut self, output: serde_json::Value) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn outputs(mut self, outputs: Vec<serde_json::Value>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn build(self) -> Task {
        Task {
            id: TaskId::new(),
            description: self.description,
            task_type: self.task_type,
            domain: self.domain,
            priority: self.priority,
            inputs: self.inputs,
            outputs: self.outputs,
            context: self.context,
        }
    }
}
