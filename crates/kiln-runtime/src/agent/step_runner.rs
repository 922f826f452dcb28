//! One inference round: stream, translate, validate, execute, record.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use kiln_core::events::{AgentEvent, StreamChunk};
use kiln_core::history::ConversationHistory;
use kiln_core::messages::{FinishReason, Message};
use kiln_llm::{ModelClient, ModelError, ModelRequest, ToolCallRepair, attempt_repair};
use kiln_tools::ToolRegistry;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::agent::event_emitter::EventEmitter;
use crate::agent::stream_translator::{StepContext, StreamTranslator};
use crate::agent::tool_executor::execute_pending;
use crate::agent::usage::UsageAggregator;
use crate::agent::validation::validate_pending;
use crate::errors::RuntimeError;
use crate::types::{AgentConfig, AgentState, Step};

/// How one round ended.
#[derive(Debug)]
pub(crate) struct StepOutcome {
    /// The model's finish reason for the round.
    pub finish_reason: FinishReason,
    /// Whether cancellation cut the round short.
    pub interrupted: bool,
}

/// Run one full round against the model.
///
/// Cancellation is observed at three points: mid-stream (via the biased
/// select), before each tool execution (inside the executor), and after the
/// round settles. A mid-stream abort flushes accumulated assistant text to
/// history before returning.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(step = step_index, model = %config.model.id))]
pub(crate) async fn run_step(
    step_index: u32,
    config: &AgentConfig,
    client: &dyn ModelClient,
    registry: &ToolRegistry,
    history: &Arc<dyn ConversationHistory>,
    repair: Option<&dyn ToolCallRepair>,
    emitter: &EventEmitter,
    aggregator: &UsageAggregator,
    state: &Mutex<AgentState>,
    cancel: &CancellationToken,
) -> Result<StepOutcome, RuntimeError> {
    let _ = emitter.emit(AgentEvent::StepStart { step: step_index });

    let tools = registry.definitions();
    let request = ModelRequest {
        system_prompt: config.system_prompt.clone(),
        messages: history.snapshot(),
        tools: tools.clone(),
    };
    let options = config.model.stream_options();

    let mut stream = client.stream(&request, &options, cancel).await?;

    let mut translator = StreamTranslator::new();
    let mut step_ctx = StepContext::new();
    let mut done = None;
    let started = Instant::now();
    let mut saw_first_chunk = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if !translator.text().is_empty() {
                    history.append(Message::assistant(translator.text()));
                }
                let _ = emitter.emit(AgentEvent::StepStop { step: step_index });
                return Ok(StepOutcome {
                    finish_reason: FinishReason::Other,
                    interrupted: true,
                });
            }
            chunk = stream.next() => {
                let Some(chunk) = chunk else { break };
                let chunk = chunk?;
                if !saw_first_chunk {
                    saw_first_chunk = true;
                    debug!(
                        ttft_ms = started.elapsed().as_millis() as u64,
                        "first chunk received"
                    );
                }
                match chunk {
                    StreamChunk::Done { messages, usage, finish_reason } => {
                        done = Some((messages, usage, finish_reason));
                    }
                    StreamChunk::ToolCall { mut call } => {
                        if call.is_invalid() {
                            if let Some(repair) = repair {
                                let err = ModelError::InvalidToolInput {
                                    message: call.invalid.clone().unwrap_or_default(),
                                };
                                if let Some(fixed) =
                                    attempt_repair(repair, &call, &tools, &err).await
                                {
                                    call = fixed;
                                }
                            }
                        }
                        let chunk = StreamChunk::ToolCall { call };
                        if let Some(event) =
                            translator.translate(&chunk, registry, &mut step_ctx)
                        {
                            let _ = emitter.emit(event);
                        }
                    }
                    other => {
                        if let Some(event) =
                            translator.translate(&other, registry, &mut step_ctx)
                        {
                            let _ = emitter.emit(event);
                        }
                    }
                }
            }
        }
    }

    let (messages, usage, finish_reason) = done.ok_or(ModelError::NoOutput)?;
    history.extend(messages);

    let validation_errors = validate_pending(&mut step_ctx.pending);
    let outcome = execute_pending(
        &step_ctx.pending,
        &validation_errors,
        Arc::clone(history),
        cancel,
    )
    .await;

    // Terminal lifecycle events replay in completion order, each carrying
    // the call's full accumulated list.
    for (id, event) in outcome.lifecycle_events {
        let events = step_ctx.lifecycle.process(&id, event);
        let _ = emitter.emit(AgentEvent::ToolCallLifecycle {
            tool_call_id: id,
            events,
        });
    }

    // Result messages go back in the calls' original order.
    for result in &outcome.results {
        history.append(Message::tool_result(
            result.tool_call_id.clone(),
            result.tool_name.clone(),
            result.output.clone(),
            !result.success,
        ));
    }

    {
        // Invalid calls never executed, so they stay out of the counters.
        let executed = |index: &usize| !validation_errors.iter().any(|e| e.index == *index);
        let mut state = state.lock();
        state.steps.push(Step {
            tool_calls: step_ctx
                .pending
                .iter()
                .enumerate()
                .filter(|(i, _)| executed(i))
                .map(|(_, p)| p.tool_name.clone())
                .collect(),
            tool_results: outcome
                .results
                .iter()
                .enumerate()
                .filter(|(i, _)| executed(i))
                .map(|(_, r)| r.tool_name.clone())
                .collect(),
        });
        aggregator.record(&mut state, usage);
    }

    let interrupted = cancel.is_cancelled();
    let _ = emitter.emit(AgentEvent::StepStop { step: step_index });
    Ok(StepOutcome {
        finish_reason,
        interrupted,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use kiln_core::history::InMemoryHistory;
    use kiln_core::messages::ToolCall;
    use kiln_core::tools::ToolDefinition;
    use kiln_core::usage::ModelUsage;
    use kiln_llm::{ChunkStream, ModelResult, StreamOptions};
    use kiln_tools::{Tool, ToolContext, ToolError};
    use serde_json::{Value, json};

    use super::*;

    /// Client replaying pre-scripted chunk sequences, one per call.
    struct ScriptedClient {
        scripts: Mutex<VecDeque<Vec<Result<StreamChunk, ModelError>>>>,
    }

    impl ScriptedClient {
        fn new(scripts: Vec<Vec<Result<StreamChunk, ModelError>>>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn stream(
            &self,
            _request: &ModelRequest,
            _options: &StreamOptions,
            _cancel: &CancellationToken,
        ) -> ModelResult<ChunkStream> {
            let chunks = self.scripts.lock().pop_front().unwrap_or_default();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("echo", "Echo input back")
        }

        fn display(&self, input: &Value) -> String {
            format!("echo {input}")
        }

        async fn execute(
            &self,
            input: Value,
            _ctx: &ToolContext,
        ) -> Result<Option<Value>, ToolError> {
            Ok(Some(input))
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        reg
    }

    fn done(finish_reason: FinishReason, messages: Vec<Message>) -> Result<StreamChunk, ModelError> {
        Ok(StreamChunk::Done {
            messages,
            usage: ModelUsage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
                ..Default::default()
            },
            finish_reason,
        })
    }

    struct Fixture {
        config: AgentConfig,
        registry: ToolRegistry,
        history: Arc<dyn ConversationHistory>,
        emitter: EventEmitter,
        aggregator: UsageAggregator,
        state: Mutex<AgentState>,
        cancel: CancellationToken,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: AgentConfig::default(),
                registry: registry(),
                history: Arc::new(InMemoryHistory::new()),
                emitter: EventEmitter::new(),
                aggregator: UsageAggregator::new(),
                state: Mutex::new(AgentState::new("scripted")),
                cancel: CancellationToken::new(),
            }
        }

        async fn run(&self, client: &dyn ModelClient) -> Result<StepOutcome, RuntimeError> {
            run_step(
                0,
                &self.config,
                client,
                &self.registry,
                &self.history,
                None,
                &self.emitter,
                &self.aggregator,
                &self.state,
                &self.cancel,
            )
            .await
        }
    }

    #[tokio::test]
    async fn text_only_round_completes() {
        let client = ScriptedClient::new(vec![vec![
            Ok(StreamChunk::TextStart),
            Ok(StreamChunk::TextDelta { delta: "Hel".into() }),
            Ok(StreamChunk::TextDelta { delta: "lo".into() }),
            Ok(StreamChunk::TextEnd),
            done(FinishReason::Stop, vec![Message::assistant("Hello")]),
        ]]);
        let fx = Fixture::new();
        let mut rx = fx.emitter.subscribe();

        let outcome = fx.run(&client).await.unwrap();
        assert_eq!(outcome.finish_reason, FinishReason::Stop);
        assert!(!outcome.interrupted);

        // assistant message landed in history from the done chunk
        let snapshot = fx.history.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].is_assistant());

        // accumulated message events observed
        assert_eq!(rx.recv().await.unwrap().event_type(), "step-start");
        assert_eq!(rx.recv().await.unwrap().event_type(), "message-start");
        let e = rx.recv().await.unwrap();
        assert_eq!(
            e,
            AgentEvent::Message {
                role: "assistant".into(),
                content: "Hel".into()
            }
        );
        let e = rx.recv().await.unwrap();
        assert_eq!(
            e,
            AgentEvent::Message {
                role: "assistant".into(),
                content: "Hello".into()
            }
        );
    }

    #[tokio::test]
    async fn tool_round_appends_results_in_call_order() {
        let client = ScriptedClient::new(vec![vec![
            Ok(StreamChunk::ToolCall {
                call: ToolCall::new("tc-0", "echo", json!("\"first\"")),
            }),
            Ok(StreamChunk::ToolCall {
                call: ToolCall::new("tc-1", "echo", json!("\"second\"")),
            }),
            done(
                FinishReason::ToolCalls,
                vec![Message::Assistant {
                    content: String::new(),
                    reasoning: None,
                    tool_calls: vec![
                        ToolCall::new("tc-0", "echo", json!("first")),
                        ToolCall::new("tc-1", "echo", json!("second")),
                    ],
                }],
            ),
        ]]);
        let fx = Fixture::new();

        let outcome = fx.run(&client).await.unwrap();
        assert_eq!(outcome.finish_reason, FinishReason::ToolCalls);

        let snapshot = fx.history.snapshot();
        // assistant message then two tool results
        assert_eq!(snapshot.len(), 3);
        let Message::ToolResult { tool_call_id, content, is_error, .. } = &snapshot[1] else {
            panic!("expected tool result");
        };
        assert_eq!(tool_call_id, "tc-0");
        assert_eq!(content, "first");
        assert!(!is_error);
        let Message::ToolResult { tool_call_id, .. } = &snapshot[2] else {
            panic!("expected tool result");
        };
        assert_eq!(tool_call_id, "tc-1");

        let state = fx.state.lock();
        assert_eq!(state.steps.len(), 1);
        assert_eq!(state.steps[0].tool_calls, vec!["echo", "echo"]);
        assert_eq!(state.total_usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn stream_without_done_is_no_output() {
        let client = ScriptedClient::new(vec![vec![
            Ok(StreamChunk::TextStart),
            Ok(StreamChunk::TextDelta { delta: "half".into() }),
        ]]);
        let fx = Fixture::new();

        let err = fx.run(&client).await.unwrap_err();
        let RuntimeError::Model(model_err) = err else {
            panic!("expected model error");
        };
        assert!(model_err.is_no_output());
    }

    #[tokio::test]
    async fn mid_stream_cancel_flushes_partial_text() {
        struct HangingClient {
            cancel: CancellationToken,
        }

        #[async_trait]
        impl ModelClient for HangingClient {
            fn model(&self) -> &str {
                "hanging"
            }

            async fn stream(
                &self,
                _request: &ModelRequest,
                _options: &StreamOptions,
                _cancel: &CancellationToken,
            ) -> ModelResult<ChunkStream> {
                let cancel = self.cancel.clone();
                let stream = async_stream::stream! {
                    yield Ok(StreamChunk::TextDelta { delta: "partial answer".into() });
                    cancel.cancel();
                    futures::future::pending::<()>().await;
                    yield Ok(StreamChunk::StreamEnd);
                };
                Ok(Box::pin(stream))
            }
        }

        let fx = Fixture::new();
        let client = HangingClient {
            cancel: fx.cancel.clone(),
        };

        let outcome = fx.run(&client).await.unwrap();
        assert!(outcome.interrupted);

        let snapshot = fx.history.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot[0],
            Message::assistant("partial answer")
        );
    }

    #[tokio::test]
    async fn invalid_call_is_repaired_before_validation() {
        struct FixesInput;

        #[async_trait]
        impl ToolCallRepair for FixesInput {
            async fn repair(
                &self,
                call: &ToolCall,
                _tools: &[ToolDefinition],
                _error: &ModelError,
            ) -> Option<ToolCall> {
                Some(ToolCall::new(&call.id, &call.name, json!("repaired")))
            }
        }

        let broken = ToolCall {
            id: "tc-0".into(),
            name: "echo".into(),
            input: None,
            invalid: Some("argument assembly failed".into()),
        };
        let client = ScriptedClient::new(vec![vec![
            Ok(StreamChunk::ToolCall { call: broken }),
            done(FinishReason::ToolCalls, vec![]),
        ]]);
        let fx = Fixture::new();

        let outcome = run_step(
            0,
            &fx.config,
            &client,
            &fx.registry,
            &fx.history,
            Some(&FixesInput),
            &fx.emitter,
            &fx.aggregator,
            &fx.state,
            &fx.cancel,
        )
        .await
        .unwrap();
        assert_eq!(outcome.finish_reason, FinishReason::ToolCalls);

        // the repaired call executed successfully
        let snapshot = fx.history.snapshot();
        assert_eq!(snapshot.len(), 1);
        let Message::ToolResult { content, is_error, .. } = &snapshot[0] else {
            panic!("expected tool result");
        };
        assert_eq!(content, "repaired");
        assert!(!is_error);
    }

    #[tokio::test]
    async fn invalid_unrepaired_call_settles_as_error_result() {
        let broken = ToolCall {
            id: "tc-0".into(),
            name: "echo".into(),
            input: None,
            invalid: Some("argument assembly failed".into()),
        };
        let client = ScriptedClient::new(vec![vec![
            Ok(StreamChunk::ToolCall { call: broken }),
            done(FinishReason::ToolCalls, vec![]),
        ]]);
        let fx = Fixture::new();

        let outcome = fx.run(&client).await.unwrap();
        assert_eq!(outcome.finish_reason, FinishReason::ToolCalls);

        let snapshot = fx.history.snapshot();
        assert_eq!(snapshot.len(), 1);
        let Message::ToolResult { content, is_error, .. } = &snapshot[0] else {
            panic!("expected tool result");
        };
        assert_eq!(content, "Tool error: argument assembly failed");
        assert!(*is_error);

        // the invalid call never executed, so the step counters exclude it
        let state = fx.state.lock();
        assert!(state.steps[0].tool_calls.is_empty());
        assert!(state.steps[0].tool_results.is_empty());
    }
}
