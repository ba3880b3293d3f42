//! Linearizes a pipeline into a sequential bash script.
//!
//! Parallel groups are flattened in declaration order and `for-each`
//! templates are expanded item by item, so the emitted schedule is always
//! document order, then subtask order, then item order.

use serde::Serialize;

use super::tags::TagFilter;
use crate::pipeline::{Subtask, Task, TaskBody};
use crate::utils::template;

pub const PREAMBLE: &str = "#!/usr/bin/env bash\n\nset -eou pipefail\n\n";

/// One labeled command in the compiled schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub label: String,
    pub command: String,
}

impl Step {
    fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

pub fn compile(tasks: &[Task], include: &TagFilter) -> Vec<Step> {
    let mut steps = Vec::new();

    for task in tasks {
        if !include.includes(&task.tags) {
            continue;
        }

        match &task.body {
            TaskBody::Command(command) => steps.push(Step::new(&task.name, command)),
            TaskBody::ParallelGroup(subtasks) => {
                for subtask in subtasks {
                    push_subtask(&mut steps, &task.name, subtask);
                }
            }
            TaskBody::Empty => {}
        }
    }

    steps
}

fn push_subtask(steps: &mut Vec<Step>, task_name: &str, subtask: &Subtask) {
    let Some(command) = &subtask.command else {
        return;
    };

    if !subtask.is_template() {
        steps.push(Step::new(
            format!("{} :: {}", task_name, subtask.name),
            command,
        ));
        return;
    }

    for item in &subtask.for_each {
        steps.push(Step::new(
            format!("{} :: {}", task_name, template::expand(&subtask.name, item)),
            template::expand(command, item),
        ));
    }
}

pub fn render(steps: &[Step]) -> String {
    let mut script = String::from(PREAMBLE);

    for step in steps {
        script.push_str(&format!("echo \"====== {} ======\"\n", step.label));
        script.push_str(&step.command);
        script.push_str("\n\n");
    }

    script
}
