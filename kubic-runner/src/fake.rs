//! Scripted runner for tests
//!
//! Records every invocation instead of spawning it and answers with
//! pre-programmed outputs, so command handlers can be exercised without
//! docker, kubectl or git installed.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use crate::runner::{Invocation, ToolOutput, ToolRunner};

/// In-memory [`ToolRunner`]
///
/// Outputs are queued per program and consumed in order. When a program has
/// no queued output the invocation succeeds with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    invocations: Mutex<Vec<Invocation>>,
    responses: Mutex<HashMap<String, VecDeque<ToolOutput>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next output returned for `program`
    pub fn respond(&self, program: &str, output: ToolOutput) {
        self.responses
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(output);
    }

    /// All invocations so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Invocations of one program, in order
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|inv| inv.program == program)
            .collect()
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&invocation.program)
            .and_then(VecDeque::pop_front);

        Ok(scripted.unwrap_or_else(|| ToolOutput::ok("")))
    }
}
