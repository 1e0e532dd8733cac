use dataflow::config::DataflowConfig;
use dataflow::graph::NodeKind;
use dataflow::Runtime;

#[test]
fn loop_through_two_agents_is_a_cycle() {
    let runtime = Runtime::new(DataflowConfig::default());
    runtime.load_str("IncAgent\nA\nB\nIncAgent\nB\nA\n").unwrap();

    let graph = runtime.graph();
    assert_eq!(graph.len(), 4);
    assert_eq!(graph.edge_count(), 4);
    let cycle = graph.find_cycle().unwrap();
    assert_eq!(cycle.len(), 4);
    assert!(cycle.contains(&"TA".to_string()));
    assert!(cycle.contains(&"TB".to_string()));
}

#[test]
fn diamond_is_acyclic() {
    let runtime = Runtime::new(DataflowConfig::default());
    runtime
        .load_str(
            "IncAgent\nsrc\nleft\n\
             IncAgent\nsrc\nright\n\
             AddAgent\nleft,right\nsink\n",
        )
        .unwrap();

    let graph = runtime.graph();
    assert!(!graph.has_cycles());
    let topics = graph
        .nodes()
        .iter()
        .filter(|n| n.kind() == NodeKind::Topic)
        .count();
    assert_eq!(topics, 4);
}

#[test]
fn graph_view_carries_values_and_equations() {
    let runtime = Runtime::new(DataflowConfig::default());
    runtime.load_str("MultiplyAgent\na,b\nc\n").unwrap();
    runtime.publish("a", "6");
    runtime.publish("b", "7");
    runtime.wait_idle().unwrap();

    let view = runtime.graph().view();
    let c = view.nodes.iter().find(|n| n.id == "Tc").unwrap();
    assert_eq!(c.value.as_deref(), Some("42.0"));
    let agent = view
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Agent)
        .unwrap();
    assert_eq!(agent.equation.as_deref(), Some("6 * 7 = 42"));
    assert!(!view.has_cycles);
}
