//! One turn of the natural-language shell.
//!
//! ```text
//! input ─► SystemPrompt + awareness ─► Provider ─► Reply::parse
//!                                                    │
//!                     Text ◄─────────────────────────┤
//!                                                    ▼
//!                                 Sanitizer ─► Executor ─► ExecutionReport
//! ```

use crate::prompt::SystemPrompt;
use crate::stream::collect_reply;
use promptsh_config::AppConfig;
use promptsh_core::error::{AwarenessError, Error};
use promptsh_core::provider::{Provider, ProviderRequest};
use promptsh_core::reply::Reply;
use promptsh_security::{AuditEvent, AuditLogger, AuditOutcome, Sanitizer, SegmentVerdict};
use promptsh_tools::{AwarenessRegistry, ExecutionReport, Executor, ShellSession};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered in prose; nothing ran.
    Conversation(String),
    /// The model asked for commands; `commands` is what survived sanitizing.
    Executed {
        commands: Vec<String>,
        report: ExecutionReport,
    },
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversation(text) => f.write_str(text),
            Self::Executed { report, .. } => write!(f, "{report}"),
        }
    }
}

/// Ties the generator, sanitizer and executor together.
pub struct ShellAgent {
    provider: Arc<dyn Provider>,
    model: String,
    stream: bool,
    temperature: Option<f32>,
    sanitizer: Sanitizer,
    executor: Executor,
    /// Awareness file; `None` uses the built-in registry
    awareness_path: Option<PathBuf>,
    audit: Option<Arc<AuditLogger>>,
}

impl ShellAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            stream: true,
            temperature: None,
            sanitizer: Sanitizer::default(),
            executor: Executor::new(),
            awareness_path: None,
            audit: None,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let mut agent = Self::new(provider, &config.model)
            .with_streaming(config.stream)
            .with_sanitizer(Sanitizer::from_config(&config.shell))
            .with_executor(Executor::from_config(&config.shell))
            .with_awareness_path(config.awareness_path());
        agent.temperature = config.ollama.temperature;
        if config.audit.enabled {
            agent = agent.with_audit(Arc::new(AuditLogger::tracing()));
        }
        agent
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        if let Some(audit) = &self.audit {
            self.executor = self.executor.with_audit(audit.clone());
        }
        self
    }

    pub fn with_awareness_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.awareness_path = Some(path.into());
        self
    }

    /// Record rejections and executed steps to `audit`.
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.executor = self.executor.with_audit(audit.clone());
        self.audit = Some(audit);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn audit(&self) -> Option<&Arc<AuditLogger>> {
        self.audit.as_ref()
    }

    /// Current awareness registry. Re-read on every call so edits to the
    /// file take effect on the next turn.
    pub fn awareness(&self) -> Result<AwarenessRegistry, AwarenessError> {
        match &self.awareness_path {
            Some(path) => AwarenessRegistry::load(path),
            None => Ok(AwarenessRegistry::builtin()),
        }
    }

    /// Ask the model about `input`. `on_fragment` sees the reply as it
    /// arrives (once, whole, when streaming is off).
    pub async fn generate<F>(&self, input: &str, mut on_fragment: F) -> Result<String, Error>
    where
        F: FnMut(&str),
    {
        let registry = self.awareness()?;
        let system = SystemPrompt::build_with_sentinel(&registry, self.sanitizer.sentinel());

        let mut request = ProviderRequest::new(&self.model, system, input).streaming(self.stream);
        request.temperature = self.temperature;

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            stream = self.stream,
            "Calling generator"
        );

        if self.stream {
            let rx = self.provider.stream(request).await?;
            Ok(collect_reply(rx, on_fragment).await?)
        } else {
            let response = self.provider.complete(request).await?;
            on_fragment(&response.message.content);
            Ok(response.message.content)
        }
    }

    /// Full turn: generate, classify, sanitize and execute.
    pub async fn handle_turn<F>(
        &self,
        session: &mut ShellSession,
        input: &str,
        on_fragment: F,
    ) -> Result<TurnOutcome, Error>
    where
        F: FnMut(&str),
    {
        let raw = self.generate(input, on_fragment).await?;
        Ok(self.execute_reply(session, &raw).await)
    }

    /// Classify, sanitize and execute an already generated reply.
    pub async fn execute_reply(&self, session: &mut ShellSession, raw: &str) -> TurnOutcome {
        let reply = Reply::parse(raw, self.sanitizer.sentinel());
        if !reply.is_command() {
            return TurnOutcome::Conversation(reply.text().to_string());
        }

        let verdicts = self.sanitizer.inspect_reply(&reply);
        self.audit_rejections(session, &verdicts);

        let commands: Vec<String> = verdicts
            .into_iter()
            .filter(SegmentVerdict::is_accepted)
            .map(|v| v.text().to_string())
            .collect();

        let report = self.executor.execute(session, &commands).await;
        TurnOutcome::Executed { commands, report }
    }

    fn audit_rejections(&self, session: &ShellSession, verdicts: &[SegmentVerdict]) {
        let cwd = session.current_dir().display().to_string();

        for verdict in verdicts {
            let (event, details) = match verdict {
                SegmentVerdict::Rejected {
                    text,
                    command,
                    reason,
                } => {
                    warn!(segment = %text, command = %command, "Dropped command not in allowlist");
                    (
                        AuditEvent::CommandRejected {
                            command: command.clone(),
                        },
                        Some(reason.clone()),
                    )
                }
                SegmentVerdict::Unparseable { text, reason } => {
                    warn!(segment = %text, reason = %reason, "Dropped unparseable command");
                    (AuditEvent::CommandUnparseable, Some(reason.clone()))
                }
                SegmentVerdict::Accepted { .. } | SegmentVerdict::AcceptedRedirection { .. } => {
                    continue;
                }
            };

            if let Some(audit) = &self.audit {
                audit.log(event, &cwd, verdict.text(), AuditOutcome::Denied, details);
            }
        }
    }
}
