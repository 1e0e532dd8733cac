//! Two-input arithmetic agents.
//!
//! Every binary agent remembers the last value seen on each of its two input
//! topics. Once both inputs have delivered at least one message, each further
//! message recomputes and publishes, combining the fresh operand with the
//! other side's latest value.

use super::wiring::{Arity, Wiring};
use super::{format_operand, Agent, AgentHandle};
use crate::error::{AgentError, ComputeError};
use crate::message::Message;
use crate::registry::TopicRegistry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Arithmetic operator of a [`BinaryAgent`]. Operand order follows the
/// declaration order of the subscribed topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Minus,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 5] = [
        BinaryOp::Add,
        BinaryOp::Minus,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Power,
    ];

    /// Agent type label.
    pub fn agent_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "AddAgent",
            BinaryOp::Minus => "MinusAgent",
            BinaryOp::Multiply => "MultiplyAgent",
            BinaryOp::Divide => "DivideAgent",
            BinaryOp::Power => "PowerAgent",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        }
    }

    /// Compute `left <op> right`.
    pub fn apply(self, left: f64, right: f64) -> Result<f64, ComputeError> {
        match self {
            BinaryOp::Add => Ok(left + right),
            BinaryOp::Minus => Ok(left - right),
            BinaryOp::Multiply => Ok(left * right),
            BinaryOp::Divide => {
                if right == 0.0 {
                    return Err(ComputeError::DivisionByZero { numerator: left });
                }
                Ok(left / right)
            }
            BinaryOp::Power => {
                if left == 0.0 && right < 0.0 {
                    return Err(ComputeError::ZeroToNegativePower { exponent: right });
                }
                let result = left.powf(right);
                if !result.is_finite() {
                    return Err(ComputeError::NonFinite);
                }
                Ok(result)
            }
        }
    }
}

struct BinaryState {
    last_values: HashMap<String, f64>,
    equation: String,
}

/// Agent combining two input topics into one output with a [`BinaryOp`].
pub struct BinaryAgent {
    op: BinaryOp,
    uuid: Uuid,
    wiring: Wiring,
    state: Mutex<BinaryState>,
}

impl BinaryAgent {
    /// Build the agent and register it on its topics. Requires exactly two
    /// inputs and one output.
    pub fn new(
        op: BinaryOp,
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        let wiring = Wiring::new(
            op.agent_name(),
            registry,
            subs,
            pubs,
            Arity { subs: 2, pubs: 1 },
        )?;
        let agent = Arc::new(Self {
            op,
            uuid: Uuid::new_v4(),
            wiring,
            state: Mutex::new(BinaryState {
                last_values: HashMap::new(),
                equation: String::new(),
            }),
        });
        agent.state.lock().equation = agent.render(None, None, None);

        let handle: AgentHandle = agent.clone();
        agent.wiring.attach(&handle);
        Ok(agent)
    }

    pub fn add(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        Self::new(BinaryOp::Add, registry, subs, pubs)
    }

    pub fn minus(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        Self::new(BinaryOp::Minus, registry, subs, pubs)
    }

    pub fn multiply(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        Self::new(BinaryOp::Multiply, registry, subs, pubs)
    }

    pub fn divide(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        Self::new(BinaryOp::Divide, registry, subs, pubs)
    }

    pub fn power(
        registry: Arc<TopicRegistry>,
        subs: Vec<String>,
        pubs: Vec<String>,
    ) -> Result<Arc<Self>, AgentError> {
        Self::new(BinaryOp::Power, registry, subs, pubs)
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    /// Latest values of the two inputs, in declaration order.
    pub fn operands(&self) -> (Option<f64>, Option<f64>) {
        let state = self.state.lock();
        self.operands_of(&state)
    }

    fn operands_of(&self, state: &BinaryState) -> (Option<f64>, Option<f64>) {
        let subs = self.wiring.subs();
        (
            state.last_values.get(&subs[0]).copied(),
            state.last_values.get(&subs[1]).copied(),
        )
    }

    fn render(&self, left: Option<f64>, right: Option<f64>, result: Option<f64>) -> String {
        let base = format!(
            "{} {} {}",
            format_operand(left),
            self.op.symbol(),
            format_operand(right)
        );
        match result {
            Some(r) => format!("{} = {}", base, r),
            None => base,
        }
    }
}

impl Agent for BinaryAgent {
    fn name(&self) -> &str {
        self.op.agent_name()
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.last_values.clear();
        state.equation = self.render(None, None, None);
    }

    fn callback(&self, topic: &str, message: &Message) {
        if !self.wiring.subscribes_to(topic) {
            debug!(agent = %self.name(), topic = %topic, "Ignoring message from unknown topic");
            return;
        }

        // Computed under the lock, published after it is released: the
        // publish may cascade back into this agent.
        let outcome = {
            let mut state = self.state.lock();
            state
                .last_values
                .insert(topic.to_string(), message.numeric());

            // Complete once every distinct input has been seen, so `A,A`
            // never fires.
            let complete = state.last_values.len() == self.wiring.subs().len();
            let (left, right) = self.operands_of(&state);
            match (complete, left, right) {
                (true, Some(l), Some(r)) => {
                    let outcome = self.op.apply(l, r);
                    state.equation = self.render(left, right, outcome.ok());
                    Some(outcome)
                }
                _ => {
                    state.equation = self.render(left, right, None);
                    None
                }
            }
        };

        match outcome {
            Some(Ok(result)) => self.wiring.publish(result),
            Some(Err(e)) => {
                warn!(
                    agent = %self.name(),
                    uuid = %self.uuid,
                    topic = %topic,
                    error = %e,
                    "Computation skipped, nothing published"
                );
            }
            None => {}
        }
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
