//! Increment agent: one input, one output, publishes `input + 1`.

use super::wiring::{Arity, Wiring};
use super::{format_operand, Agent, AgentHandle};
use crate::error::{AgentError, ComputeError};
use crate::message::Message;
use crate::registry::TopicRegistry;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const NAME: &str = "IncAgent";

/// Adds one to every numeric message on its input topic.
pub struct IncrementAgent {
    uuid: Uuid,
    wiring: Wiring,
    state: Mutex<IncrementState>,
}

#[derive(Default)]
struct IncrementState {
    last_value: Option<f64>,
    equation: String,
}

impl IncrementAgent {
    /// Build the agent and register it on its topics. Requires exactly one
    /// input and one output.
    pub fn new(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        let wiring = Wiring::new(NAME, registry, subs, pubs, Arity { subs: 1, pubs: 1 })?;
        let agent = Arc::new(Self {
            uuid: Uuid::new_v4(),
            wiring,
            state: Mutex::new(IncrementState {
                last_value: None,
                equation: render(None),
            }),
        });
        let handle: AgentHandle = agent.clone();
        agent.wiring.attach(&handle);
        Ok(agent)
    }

    fn compute(value: f64) -> Result<f64, ComputeError> {
        if value.is_nan() {
            return Err(ComputeError::NonNumeric);
        }
        Ok(value + 1.0)
    }
}

fn render(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{} + 1 = {}", format_operand(Some(v)), v + 1.0),
        None => "? + 1".to_string(),
    }
}

impl Agent for IncrementAgent {
    fn name(&self) -> &str {
        NAME
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.last_value = None;
        state.equation = render(None);
    }

    fn callback(&self, topic: &str, message: &Message) {
        if !self.wiring.subscribes_to(topic) {
            debug!(agent = NAME, topic = %topic, "Ignoring message from unknown topic");
            return;
        }

        let result = match Self::compute(message.numeric()) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    agent = NAME,
                    uuid = %self.uuid,
                    topic = %topic,
                    text = %message.text(),
                    error = %e,
                    "Computation skipped, nothing published"
                );
                return;
            }
        };

        {
            let mut state = self.state.lock();
            state.last_value = Some(message.numeric());
            state.equation = render(state.last_value);
        }
        self.wiring.publish(result);
    }

    fn close(&self) {
        self.wiring.detach(&self.uuid);
    }

    fn equation(&self) -> Message {
        Message::from_text(self.state.lock().equation.clone())
    }

    fn subscriptions(&self) -> &[String] {
        self.wiring.subs()
    }

    fn publications(&self) -> &[String] {
        self.wiring.pubs()
    }
}
