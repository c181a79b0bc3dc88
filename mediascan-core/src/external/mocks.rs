// mediascan-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled for unit tests or when the "test-mocks"
// feature is enabled (the crate's own dev-dependency turns it on for the
// integration tests).

use super::{ToolInvoker, ToolOutput};
use crate::error::{CoreError, CoreResult, command_start_error};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

/// One scripted result, consumed in order.
#[derive(Debug, Clone)]
enum MockResponse {
    Output(ToolOutput),
    StartError(String),
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub silent: bool,
}

/// Mock implementation of [`ToolInvoker`] returning scripted responses.
///
/// Responses are handed out first-in first-out. Once the script runs dry
/// every further call fails, which makes an unexpected extra invocation (for
/// example a retry that should not have happened) visible in tests.
#[derive(Debug, Default)]
pub struct MockToolInvoker {
    responses: RefCell<VecDeque<MockResponse>>,
    received_calls: RefCell<Vec<MockCall>>,
}

impl MockToolInvoker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Queues a completed run with the given exit code and captured text.
    pub fn push_output(&self, exit_code: i32, output: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(MockResponse::Output(ToolOutput::new(exit_code, output)));
        self
    }

    /// Queues a run that was killed by the timeout.
    pub fn push_timeout(&self, partial_output: &str) -> &Self {
        self.responses.borrow_mut().push_back(MockResponse::Output(ToolOutput {
            exit_code: -1,
            output: partial_output.to_string(),
            timed_out: true,
        }));
        self
    }

    /// Queues a failure to start the process.
    pub fn push_start_error(&self, message: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(MockResponse::StartError(message.to_string()));
        self
    }

    pub fn get_received_calls(&self) -> Vec<MockCall> {
        self.received_calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received_calls.borrow().len()
    }
}

impl ToolInvoker for MockToolInvoker {
    fn execute(&self, command: &Path, args: &[String], silent: bool) -> CoreResult<ToolOutput> {
        self.received_calls.borrow_mut().push(MockCall {
            command: command.to_path_buf(),
            args: args.to_vec(),
            silent,
        });

        match self.responses.borrow_mut().pop_front() {
            Some(MockResponse::Output(output)) => {
                log::info!("MockToolInvoker: returning exit code {}", output.exit_code);
                Ok(output)
            }
            Some(MockResponse::StartError(message)) => Err(command_start_error(
                command.display().to_string(),
                io::Error::other(message),
            )),
            None => {
                log::error!("MockToolInvoker: no scripted response left for {:?}", args);
                Err(CoreError::ToolFailed(
                    "MockToolInvoker: unexpected invocation".to_string(),
                ))
            }
        }
    }
}
