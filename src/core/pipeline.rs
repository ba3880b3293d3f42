//! Pipeline document model and loader.
//!
//! A pipeline is a YAML document with a top-level `tasks:` list in the format
//! understood by bashful. The raw serde schema mirrors the document; it is
//! converted into the typed [`Task`] model, where absent fields get their
//! defaults and a task body becomes a [`TaskBody`] variant.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::{io, template};

/// Name used for tasks and subtasks that do not declare one.
pub const ANONYMOUS: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub body: TaskBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum TaskBody {
    Command(String),
    ParallelGroup(Vec<Subtask>),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtask {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub for_each: Vec<String>,
}

impl Subtask {
    pub fn is_template(&self) -> bool {
        !self.for_each.is_empty()
    }
}

// Raw document schema

#[derive(Debug, Deserialize)]
struct RawPipeline {
    #[serde(default)]
    tasks: Option<Vec<RawTask>>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Option<serde_yml::Value>,
    #[serde(default)]
    cmd: Option<String>,
    #[serde(default, rename = "parallel-tasks")]
    parallel_tasks: Option<Vec<RawSubtask>>,
}

#[derive(Debug, Deserialize)]
struct RawSubtask {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cmd: Option<String>,
    #[serde(default, rename = "for-each")]
    for_each: Option<Vec<serde_yml::Value>>,
}

/// Parse pipeline source text.
pub fn parse(source: &str) -> Result<Pipeline> {
    parse_with_origin(source, None)
}

/// Read and parse a pipeline file.
pub fn load(path: &Path) -> Result<Pipeline> {
    let source = io::read_file(path, "read pipeline")?;
    parse_with_origin(&source, Some(path.display().to_string()))
}

fn parse_with_origin(source: &str, origin: Option<String>) -> Result<Pipeline> {
    let raw: RawPipeline = serde_yml::from_str(source)
        .map_err(|e| Error::pipeline_malformed(e.to_string(), origin.clone()))?;

    let raw_tasks = raw.tasks.ok_or_else(|| {
        Error::pipeline_malformed("missing top-level 'tasks' list", origin.clone())
            .with_hint("A pipeline needs a top-level 'tasks:' list")
    })?;

    let tasks = raw_tasks
        .into_iter()
        .enumerate()
        .map(|(index, raw)| convert_task(index, raw, origin.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Pipeline { tasks })
}

fn convert_task(index: usize, raw: RawTask, origin: Option<&str>) -> Result<Task> {
    let name = raw.name.unwrap_or_else(|| ANONYMOUS.to_string());
    let tags = convert_tags(index, raw.tags, origin)?;

    let command = non_blank(raw.cmd);
    let group = raw.parallel_tasks.filter(|group| !group.is_empty());

    let body = match (command, group) {
        (Some(cmd), group) => {
            if group.is_some() {
                log_status!(
                    "pipeline",
                    "Task '{}' declares both 'cmd' and 'parallel-tasks'; ignoring 'parallel-tasks'",
                    name
                );
            }
            TaskBody::Command(cmd)
        }
        (None, Some(group)) => TaskBody::ParallelGroup(
            group
                .into_iter()
                .enumerate()
                .map(|(sub_index, raw)| convert_subtask(index, sub_index, raw, origin))
                .collect::<Result<Vec<_>>>()?,
        ),
        (None, None) => TaskBody::Empty,
    };

    Ok(Task { name, tags, body })
}

fn convert_subtask(
    task_index: usize,
    index: usize,
    raw: RawSubtask,
    origin: Option<&str>,
) -> Result<Subtask> {
    let for_each = raw
        .for_each
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            scalar_text(&item).ok_or_else(|| {
                Error::pipeline_malformed(
                    format!(
                        "tasks[{}].parallel-tasks[{}].for-each: items must be scalars",
                        task_index, index
                    ),
                    origin.map(str::to_string),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let name = raw.name.unwrap_or_else(|| ANONYMOUS.to_string());
    let command = non_blank(raw.cmd);

    if let Some(cmd) = &command {
        if !for_each.is_empty() && !template::is_present(cmd) {
            log_status!(
                "pipeline",
                "Subtask '{}' has 'for-each' but its cmd has no {}; it will run {} times unchanged",
                name,
                template::PLACEHOLDER,
                for_each.len()
            );
        }
    }

    Ok(Subtask {
        name,
        command,
        for_each,
    })
}

/// A single scalar is one tag; a list holds one tag per scalar item.
fn convert_tags(
    task_index: usize,
    raw: Option<serde_yml::Value>,
    origin: Option<&str>,
) -> Result<Vec<String>> {
    let malformed = || {
        Error::pipeline_malformed(
            format!("tasks[{}].tags: tags must be scalars", task_index),
            origin.map(str::to_string),
        )
    };

    match raw {
        None | Some(serde_yml::Value::Null) => Ok(Vec::new()),
        Some(serde_yml::Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| malformed()))
            .collect(),
        Some(value) => {
            let tag = scalar_text(&value).ok_or_else(|| malformed())?;
            Ok(if tag.is_empty() { Vec::new() } else { vec![tag] })
        }
    }
}

fn scalar_text(value: &serde_yml::Value) -> Option<String> {
    match value {
        serde_yml::Value::String(s) => Some(s.clone()),
        serde_yml::Value::Number(n) => Some(n.to_string()),
        serde_yml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
