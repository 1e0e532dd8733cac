use dataflow::agent::WorkerState;
use dataflow::{Agent, AgentHandle, IncrementAgent, Message, ParallelAgent, Runtime, TopicRegistry};
use dataflow::config::DataflowConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::support::names;

fn settle(agent: &ParallelAgent) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !agent.is_idle() {
        assert!(Instant::now() < deadline, "agent did not settle");
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn decorated_agent_processes_on_worker() {
    let registry = TopicRegistry::shared();
    let inner: AgentHandle =
        IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["out"])).unwrap();
    let parallel = ParallelAgent::new(inner, 2, &registry).unwrap();

    for i in 0..20 {
        registry.get_topic("in").publish(Message::from_f64(i as f64));
    }
    settle(&parallel);

    let out = registry.get_topic("out").last_message().unwrap();
    assert_eq!(out.numeric(), 20.0);
    assert_eq!(registry.get_topic("in").subscriber_count(), 1);
}

#[test]
fn close_stops_worker_and_detaches() {
    let registry = TopicRegistry::shared();
    let inner: AgentHandle =
        IncrementAgent::new(Arc::clone(&registry), names(&["in"]), names(&["out"])).unwrap();
    let parallel = ParallelAgent::new(inner, 4, &registry).unwrap();
    assert_eq!(parallel.state(), WorkerState::Running);

    registry.get_topic("in").publish(Message::from_text("1"));
    parallel.close();
    assert_eq!(parallel.state(), WorkerState::Stopped);
    assert_eq!(parallel.pending(), 0);
    assert_eq!(registry.get_topic("in").subscriber_count(), 0);
    assert_eq!(registry.get_topic("out").publisher_count(), 0);

    // Messages after close are dropped, not queued.
    parallel.callback("in", &Message::from_text("5"));
    assert_eq!(parallel.pending(), 0);
}

#[test]
fn runtime_settles_long_chain() {
    let mut text = String::new();
    for i in 0..25 {
        text.push_str(&format!("IncAgent\nt{}\nt{}\n", i, i + 1));
    }
    let runtime = Runtime::new(DataflowConfig::default());
    assert_eq!(runtime.load_str(&text).unwrap(), 25);

    runtime.publish("t0", "0");
    runtime.wait_idle().unwrap();

    let last = runtime
        .topics()
        .into_iter()
        .find(|t| t.name == "t25")
        .and_then(|t| t.value);
    assert_eq!(last.as_deref(), Some("25.0"));
}
