use dataflow::{Agent, BinaryAgent, IncrementAgent, Message, TopicRegistry};
use std::sync::Arc;

use crate::support::names;

fn send(registry: &TopicRegistry, topic: &str, text: &str) {
    registry.get_topic(topic).publish(Message::from_text(text));
}

fn value(registry: &TopicRegistry, topic: &str) -> Option<String> {
    registry
        .find_topic(topic)
        .and_then(|t| t.last_message())
        .map(|m| m.text().to_string())
}

#[test]
fn division_then_increment_chain() {
    let registry = TopicRegistry::shared();
    let divide = BinaryAgent::divide(Arc::clone(&registry), names(&["A", "B"]), names(&["C"])).unwrap();
    let _inc = IncrementAgent::new(Arc::clone(&registry), names(&["C"]), names(&["D"])).unwrap();

    send(&registry, "A", "4");
    assert_eq!(value(&registry, "C"), None);
    assert_eq!(divide.equation().text(), "4 / ?");

    send(&registry, "B", "2");
    assert_eq!(value(&registry, "C").as_deref(), Some("2.0"));
    assert_eq!(value(&registry, "D").as_deref(), Some("3.0"));
    assert_eq!(divide.equation().text(), "4 / 2 = 2");
}

#[test]
fn every_later_input_retriggers() {
    let registry = TopicRegistry::shared();
    let _add = BinaryAgent::add(Arc::clone(&registry), names(&["x", "y"]), names(&["sum"])).unwrap();

    send(&registry, "x", "1");
    send(&registry, "y", "2");
    assert_eq!(value(&registry, "sum").as_deref(), Some("3.0"));

    send(&registry, "x", "10");
    assert_eq!(value(&registry, "sum").as_deref(), Some("12.0"));
}

#[test]
fn division_by_zero_publishes_nothing() {
    let registry = TopicRegistry::shared();
    let divide = BinaryAgent::divide(Arc::clone(&registry), names(&["n", "d"]), names(&["q"])).unwrap();

    send(&registry, "n", "5");
    send(&registry, "d", "0");
    assert_eq!(value(&registry, "q"), None);
    assert_eq!(divide.equation().text(), "5 / 0");
}

#[test]
fn closed_agent_stops_reacting() {
    let registry = TopicRegistry::shared();
    let inc = IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["out"])).unwrap();

    send(&registry, "in", "1");
    assert_eq!(value(&registry, "out").as_deref(), Some("2.0"));

    inc.close();
    inc.close();
    send(&registry, "in", "7");
    assert_eq!(value(&registry, "out").as_deref(), Some("2.0"));
    assert_eq!(registry.get_topic("in").subscriber_count(), 0);
}

#[test]
fn text_message_leaves_increment_silent() {
    let registry = TopicRegistry::shared();
    let _inc = IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["out"])).unwrap();

    send(&registry, "in", "hello");
    assert_eq!(value(&registry, "out"), None);
}
