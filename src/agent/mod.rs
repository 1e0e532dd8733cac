//! Agents
//!
//! An agent maps a fixed set of input topics to a fixed set of output topics.
//! It is registered on its topics at construction, reacts to every message
//! published on its inputs, and keeps a human-readable equation describing
//! its current operands.

mod binary;
mod factory;
mod increment;
mod parallel;
mod wiring;

pub use binary::{BinaryAgent, BinaryOp};
pub use factory::{AgentConstructor, AgentFactory};
pub use increment::IncrementAgent;
pub use parallel::{ParallelAgent, WorkerState};

use crate::message::Message;
use std::sync::Arc;
use uuid::Uuid;

/// Shared, type-erased agent reference as stored in topic sets.
pub type AgentHandle = Arc<dyn Agent>;

/// Reactive unit wired between topics.
///
/// All methods take `&self`; implementations keep their mutable state behind
/// locks because callbacks can arrive from any publisher thread.
pub trait Agent: Send + Sync {
    /// Type label such as `DivideAgent`. Not unique.
    fn name(&self) -> &str;

    /// Identity of this instance.
    fn uuid(&self) -> Uuid;

    /// Forget accumulated inputs. Registrations are kept.
    fn reset(&self);

    /// Handle `message` published on `topic`. Must not panic on bad input.
    fn callback(&self, topic: &str, message: &Message);

    /// Detach from every topic. Safe to call more than once.
    fn close(&self);

    /// Current symbolic state, for example `3 / ?`.
    fn equation(&self) -> Message;

    /// Subscribed topic names in declaration order.
    fn subscriptions(&self) -> &[String] {
        &[]
    }

    /// Published topic names in declaration order.
    fn publications(&self) -> &[String] {
        &[]
    }
}

/// Render an operand for an equation; unknown and non-numeric values are `?`.
pub(crate) fn format_operand(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{}", v),
        _ => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_operand() {
        assert_eq!(format_operand(None), "?");
        assert_eq!(format_operand(Some(f64::NAN)), "?");
        assert_eq!(format_operand(Some(3.0)), "3");
        assert_eq!(format_operand(Some(-2.5)), "-2.5");
    }
}
