//! The agent loop — bounded plan/act/observe state machine.
//!
//! Each step runs perception, retrieves relevant memories, asks the
//! decision model for a plan, and either terminates with a final answer
//! or executes a tool call, records the observation in memory, and
//! rewrites the working query for the next step. Exhausting the step
//! budget without a final answer is an explicit `Aborted` outcome.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::action::{parse_directive, FINAL_ANSWER_MARKER};
use crate::decision::Decision;
use crate::error::RecallResult;
use crate::memory::MemoryManager;
use crate::perception::Perception;
use crate::provider::LanguageModel;
use crate::tool::ToolRegistry;
use crate::types::{AgentConfig, AgentEvent, AgentOutcome, MemoryItem};

pub struct AgentLoop {
    perception: Perception,
    decision: Decision,
    tools: ToolRegistry,
    memory: MemoryManager,
    config: AgentConfig,
}

/// Options for running one agent session.
pub struct RunOptions {
    pub session_id: String,
    pub query: String,
}

impl RunOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

impl AgentLoop {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: ToolRegistry,
        memory: MemoryManager,
        config: AgentConfig,
    ) -> Self {
        Self {
            perception: Perception::new(model.clone()),
            decision: Decision::new(model),
            tools,
            memory,
            config,
        }
    }

    /// Run the loop until a final answer or the step budget runs out.
    ///
    /// Perception and decision failures are absorbed by those components;
    /// tool failures are recorded in memory and the loop continues. Only
    /// embedding-service failures (memory itself is unavailable) propagate.
    pub async fn run(
        &mut self,
        options: RunOptions,
        event_tx: mpsc::UnboundedSender<AgentEvent>,
    ) -> RecallResult<AgentOutcome> {
        let _ = event_tx.send(AgentEvent::SessionStart {
            session_id: options.session_id.clone(),
        });

        let catalog = self.tools.catalog();
        let original = options.query.clone();
        let mut working = original.clone();
        let mut outcome = AgentOutcome::Aborted {
            steps: self.config.max_steps,
        };

        for step in 0..self.config.max_steps {
            let _ = event_tx.send(AgentEvent::StepStart { step });

            let perception = self.perception.extract(&working).await;
            let _ = event_tx.send(AgentEvent::Perceived {
                intent: perception.intent.clone(),
            });

            let memories = self
                .memory
                .retrieve(&working, self.config.memory_top_k)
                .await?;
            let _ = event_tx.send(AgentEvent::MemoryRecalled {
                count: memories.len(),
            });

            let plan = self.decision.plan(&perception, &memories, &catalog).await;
            let _ = event_tx.send(AgentEvent::PlanProduced { plan: plan.clone() });

            if let Some(answer) = plan.strip_prefix(FINAL_ANSWER_MARKER) {
                let answer = answer.trim().to_string();
                info!(session_id = %options.session_id, step, "Final answer produced");
                let _ = event_tx.send(AgentEvent::FinalAnswer {
                    answer: answer.clone(),
                });
                outcome = AgentOutcome::Done {
                    answer,
                    steps: step + 1,
                };
                break;
            }

            let observation = self.act(&plan, &working, &event_tx).await?;
            working = format!("Original: {original}\nPrevious: {observation}\nNext step?");
        }

        if !outcome.is_done() {
            info!(session_id = %options.session_id, "Step budget exhausted");
        }
        let _ = event_tx.send(AgentEvent::SessionEnd {
            session_id: options.session_id,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Parse and execute one tool-call plan, recording the result — or the
    /// failure — in memory. Returns the observation text for the next step.
    async fn act(
        &mut self,
        plan: &str,
        working: &str,
        event_tx: &mpsc::UnboundedSender<AgentEvent>,
    ) -> RecallResult<String> {
        let directive = match parse_directive(plan) {
            Ok(directive) => directive,
            Err(e) => {
                warn!(error = %e, "Plan was not a well-formed tool call");
                let _ = event_tx.send(AgentEvent::ToolFailed {
                    message: e.to_string(),
                });
                let text = format!("Action failed: {e}");
                self.memory
                    .add(MemoryItem::new(&text).with_user_query(working))
                    .await?;
                return Ok(text);
            }
        };

        let _ = event_tx.send(AgentEvent::ToolStart {
            tool_name: directive.tool_name.clone(),
        });

        match self.tools.execute(&directive).await {
            Ok(result) => {
                self.memory
                    .add_tool_result(&result.tool_name, &result.arguments, &result.result, working)
                    .await?;
                let _ = event_tx.send(AgentEvent::ToolEnd {
                    tool_name: result.tool_name.clone(),
                    result: result.result.clone(),
                });
                Ok(result.result)
            }
            Err(e) => {
                warn!(tool = %directive.tool_name, error = %e, "Tool call failed");
                let _ = event_tx.send(AgentEvent::ToolFailed {
                    message: e.to_string(),
                });
                let text = format!("Tool call failed: {e}");
                self.memory
                    .add(
                        MemoryItem::new(&text)
                            .with_tool_name(directive.tool_name)
                            .with_user_query(working),
                    )
                    .await?;
                Ok(text)
            }
        }
    }
}
