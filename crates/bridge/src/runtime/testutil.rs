//! Shared in-memory fakes for runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use tb_assistant::types::{ContentBlock, MessageRole, RunStatus, TextValue, ThreadMessage};
use tb_assistant::AssistantBackend;
use tb_domain::config::AssistantConfig;
use tb_domain::error::{Error, Result};
use tb_records::{InboundMessageRecord, RecordSink};

use crate::transport::ChatTransport;

/// Assistant config tuned for tests: 1ms polls, no deadline.
pub fn fast_assistant_config() -> AssistantConfig {
    AssistantConfig {
        assistant_id: "asst_test".into(),
        poll_interval_ms: 1,
        ..AssistantConfig::default()
    }
}

pub fn assistant_msg(id: &str, created_at: i64, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.into(),
        role: MessageRole::Assistant,
        created_at,
        content: vec![ContentBlock::Text {
            text: TextValue { value: text.into() },
        }],
    }
}

pub fn user_msg(id: &str, created_at: i64, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.into(),
        role: MessageRole::User,
        created_at,
        content: vec![ContentBlock::Text {
            text: TextValue { value: text.into() },
        }],
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScriptedBackend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Assistant backend fake driven by a scripted status sequence.
///
/// Each `run_status` call pops the next status; once the script runs out
/// the run reports `InProgress` forever, which lets deadline tests stall
/// it deliberately.
pub struct ScriptedBackend {
    statuses: Mutex<VecDeque<RunStatus>>,
    messages: Mutex<Vec<ThreadMessage>>,
    appended: Mutex<Vec<(String, String)>>,
    created: AtomicUsize,
    polls: AtomicUsize,
    fail_on_start: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            messages: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            fail_on_start: false,
        }
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        *self.statuses.lock() = statuses.into_iter().collect();
        self
    }

    pub fn with_messages(self, messages: impl IntoIterator<Item = ThreadMessage>) -> Self {
        *self.messages.lock() = messages.into_iter().collect();
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_on_start = true;
        self
    }

    pub fn appended(&self) -> Vec<(String, String)> {
        self.appended.lock().clone()
    }

    pub fn status_polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn threads_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantBackend for ScriptedBackend {
    async fn create_conversation(&self) -> Result<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("ctx{n}"))
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        self.appended
            .lock()
            .push((thread_id.to_owned(), text.to_owned()));
        Ok(())
    }

    async fn start_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<String> {
        if self.fail_on_start {
            return Err(Error::Backend("run refused".into()));
        }
        Ok("run1".into())
    }

    async fn run_status(&self, _thread_id: &str, _run_id: &str) -> Result<RunStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .pop_front()
            .unwrap_or(RunStatus::InProgress))
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>> {
        Ok(self.messages.lock().clone())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RecordingSink / RecordingTransport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Record sink fake that captures appends and answers membership from a
/// fixed list.
pub struct RecordingSink {
    pub appends: Mutex<Vec<InboundMessageRecord>>,
    pub members: Vec<String>,
    pub fail_appends: bool,
    pub fail_lookups: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            appends: Mutex::new(Vec::new()),
            members: Vec::new(),
            fail_appends: false,
            fail_lookups: false,
        }
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn append_message(&self, record: InboundMessageRecord) -> Result<()> {
        if self.fail_appends {
            return Err(Error::Records("append refused".into()));
        }
        self.appends.lock().push(record);
        Ok(())
    }

    async fn member_exists(&self, phone_number: &str) -> Result<bool> {
        if self.fail_lookups {
            return Err(Error::Records("lookup refused".into()));
        }
        Ok(self.members.iter().any(|m| m == phone_number))
    }
}

/// Transport fake that records every send.
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_sends: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn reply(&self, recipient: &str, text: &str) -> Result<()> {
        if self.fail_sends {
            return Err(Error::Connector("send refused".into()));
        }
        self.sent
            .lock()
            .push((recipient.to_owned(), text.to_owned()));
        Ok(())
    }
}
