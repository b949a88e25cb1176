//! Process Command use case — the orchestration loop.
//!
//! Drives the reason-act-observe cycle for one command, in process, across
//! at most `max_iterations` rounds:
//!
//! ```text
//! loop (<= max_iterations):
//!   snapshot  -> digest -> system context        (fresh each round)
//!   reason    -> assistant text + operation calls
//!   validate  -> any rejection fails the command, nothing executes
//!   execute   -> strictly in model order
//!   query-only round? fold results into iteration context, loop again
//!   otherwise terminate: completed, or failed with per-operation detail
//! ```
//!
//! Iteration context fully replaces prior-conversation replay from the
//! second round on (see [`ReasoningRequest::effective_history`]).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use easel_domain::core::string::truncate;
use easel_domain::{
    CanvasPromptTemplate, OperationRegistry, ValidationOutcome, describe_failures,
    estimate_tokens, format_for_prompt, summarize, validate_calls,
};

use crate::config::OrchestratorParams;
use crate::executor::OperationExecutor;
use crate::gateway::ReasoningClient;
use crate::ports::catalog_schema::CatalogSchemaPort;
use crate::ports::document_store::{DocumentStorePort, StoreError};
use crate::ports::processor::{
    CommandFailure, CommandJob, CommandProcessor, CommandVerdict, ErrorKind,
};
use crate::ports::reasoning::{
    GatewayError, IterationRecord, ReasoningBackend, ReasoningRequest, TokenUsage, ToolOutcome,
};

/// The orchestration loop: production implementation of [`CommandProcessor`].
pub struct ProcessCommandUseCase<B: ReasoningBackend, S: DocumentStorePort> {
    client: ReasoningClient<B>,
    store: Arc<S>,
    executor: OperationExecutor<S>,
    registry: OperationRegistry,
    /// Wire catalog rendered once from the registry
    catalog: Vec<serde_json::Value>,
    max_iterations: usize,
}

impl<B: ReasoningBackend, S: DocumentStorePort> ProcessCommandUseCase<B, S> {
    pub fn new(
        backend: Arc<B>,
        store: Arc<S>,
        converter: &dyn CatalogSchemaPort,
        params: OrchestratorParams,
    ) -> Self {
        let registry = OperationRegistry::standard();
        let catalog = converter.catalog_schema(&registry);
        Self {
            client: ReasoningClient::new(backend),
            store: store.clone(),
            executor: OperationExecutor::new(store).with_pacing(params.op_pacing),
            registry,
            catalog,
            max_iterations: params.max_iterations,
        }
    }

    fn store_failure(error: StoreError) -> CommandFailure {
        match error {
            StoreError::DocumentNotFound(id) => CommandFailure::new(
                ErrorKind::DocumentNotFound,
                format!("Document not found: {}", id),
            ),
            other => CommandFailure::new(ErrorKind::InternalError, other.to_string()),
        }
    }

    fn gateway_failure(error: GatewayError) -> CommandFailure {
        let kind = match error {
            GatewayError::Unauthenticated => ErrorKind::AuthenticationRequired,
            GatewayError::BadRequest(_) => ErrorKind::InternalError,
            GatewayError::RateLimited
            | GatewayError::ServerError(_)
            | GatewayError::Timeout
            | GatewayError::MalformedReply(_) => ErrorKind::UpstreamUnavailable,
        };
        CommandFailure::new(kind, error.user_message())
    }
}

#[async_trait]
impl<B: ReasoningBackend, S: DocumentStorePort> CommandProcessor for ProcessCommandUseCase<B, S> {
    async fn process(&self, job: &CommandJob) -> CommandVerdict {
        let command = &job.command;
        let mut usage = TokenUsage::default();
        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut all_results = Vec::new();
        let mut last_text = String::new();

        info!(
            command_id = %command.id,
            document_id = %command.document_id,
            text = %truncate(&command.text, 80),
            "Processing command"
        );

        for iteration in 1..=self.max_iterations {
            // Fresh snapshot every round: stale references cannot persist
            let snapshot = match self.store.read_snapshot(&command.document_id).await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    return CommandVerdict::failed(
                        Self::store_failure(error),
                        last_text,
                        all_results,
                        usage,
                    );
                }
            };

            let digest = summarize(&snapshot);
            let rendered = format_for_prompt(&digest);
            debug!(
                iteration,
                objects = digest.total_objects,
                included = digest.objects.len(),
                digest_tokens = estimate_tokens(&rendered),
                "Digest rendered"
            );

            let request = ReasoningRequest {
                system: CanvasPromptTemplate::system_context(&rendered),
                history: job.history.clone(),
                user_text: command.text.clone(),
                iterations: iterations.clone(),
                catalog: self.catalog.clone(),
            };

            let reply = match self.client.call(&request).await {
                Ok(reply) => reply,
                Err(error) => {
                    return CommandVerdict::failed(
                        Self::gateway_failure(error),
                        last_text,
                        all_results,
                        usage,
                    );
                }
            };
            usage.absorb(&reply.usage);
            last_text = reply.text.clone();

            // No further operations: the command is done
            if reply.calls.is_empty() {
                info!(command_id = %command.id, iteration, "Command completed");
                return CommandVerdict::success(last_text, all_results, usage);
            }

            // Live ids, not snapshot ids: catches objects deleted in between
            let live_ids = match self.store.live_object_ids(&command.document_id).await {
                Ok(ids) => ids,
                Err(error) => {
                    return CommandVerdict::failed(
                        Self::store_failure(error),
                        last_text,
                        all_results,
                        usage,
                    );
                }
            };

            let ValidationOutcome { accepted, rejected } =
                validate_calls(&self.registry, &reply.calls, &live_ids);
            if !rejected.is_empty() {
                // One rejection fails the whole batch; nothing executes
                let detail: Vec<String> = rejected.iter().map(|r| r.describe()).collect();
                warn!(
                    command_id = %command.id,
                    rejected = rejected.len(),
                    "Validation rejected operations"
                );
                return CommandVerdict::failed(
                    CommandFailure::new(ErrorKind::ValidationError, detail.join("; ")),
                    last_text,
                    all_results,
                    usage,
                );
            }

            let results = self.executor.execute(&command.document_id, &accepted).await;

            if accepted.iter().all(|op| op.is_query()) {
                // Observation round: feed results back and reason again
                let outcomes = reply
                    .calls
                    .iter()
                    .zip(results.iter())
                    .map(|(call, result)| ToolOutcome {
                        call_id: call.call_id.clone(),
                        operation: call.name.clone(),
                        output: result
                            .output
                            .clone()
                            .or_else(|| result.error.clone())
                            .unwrap_or_default(),
                    })
                    .collect();
                iterations.push(IterationRecord {
                    assistant_text: reply.text,
                    calls: reply.calls,
                    results: outcomes,
                });
                all_results.extend(results);
                debug!(command_id = %command.id, iteration, "Query round folded back");
                continue;
            }

            // Mutation round terminates the loop
            all_results.extend(results);
            if let Some(failure_detail) = describe_failures(&all_results) {
                return CommandVerdict::failed(
                    CommandFailure::new(
                        ErrorKind::InternalError,
                        format!("Some operations failed: {}", failure_detail),
                    ),
                    last_text,
                    all_results,
                    usage,
                );
            }
            info!(
                command_id = %command.id,
                iteration,
                operations = all_results.len(),
                "Command completed"
            );
            return CommandVerdict::success(last_text, all_results, usage);
        }

        // Cap hit while the model still wanted to continue
        warn!(command_id = %command.id, cap = self.max_iterations, "Iteration cap reached");
        CommandVerdict::failed(
            CommandFailure::new(
                ErrorKind::InvalidRequest,
                format!(
                    "The command could not be completed within {} reasoning steps; it needs a narrower request",
                    self.max_iterations
                ),
            )
            .with_suggestion("Split the request into smaller, more specific commands"),
            last_text,
            all_results,
            usage,
        )
    }
}
