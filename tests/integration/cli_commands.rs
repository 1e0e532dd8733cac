use clap::Parser;
use dataflow::config::DataflowConfig;
use dataflow::tooling::cli::{Cli, CliContext, Commands};
use tempfile::TempDir;

use crate::support::write_agents;

fn context() -> CliContext {
    CliContext::with_config(DataflowConfig::default())
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["dataflow", "types"],
        vec!["dataflow", "validate", "agents.txt"],
        vec!["dataflow", "graph", "agents.txt", "--format", "json"],
        vec!["dataflow", "publish", "agents.txt", "--set", "A=1", "--set", "B=2"],
        vec!["dataflow", "--log-level", "debug", "validate", "agents.txt"],
    ];
    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
    assert!(Cli::try_parse_from(["dataflow", "graph"]).is_err());
}

#[test]
fn validate_json_reports_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_agents(&dir, "IncAgent\nA\nB\nIncAgent\nB\nA\n");

    let output = context()
        .execute(&Commands::Validate { agents: path, format: "json".to_string() })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["agents"].as_u64(), Some(2));
    assert_eq!(parsed["topics"].as_u64(), Some(2));
    assert_eq!(parsed["has_cycles"].as_bool(), Some(true));
    assert!(parsed["cycle"].as_array().is_some());
}

#[test]
fn publish_json_lists_settled_topics() {
    let dir = TempDir::new().unwrap();
    let path = write_agents(&dir, "DivideAgent\nA,B\nC\nIncAgent\nC\nD\n");

    let output = context()
        .execute(&Commands::Publish {
            agents: path,
            set: vec!["A=4".to_string(), "B=2".to_string()],
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let rows = parsed.as_array().unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
    assert_eq!(rows[2]["value"].as_str(), Some("2.0"));
    assert_eq!(rows[3]["value"].as_str(), Some("3.0"));
}

#[test]
fn graph_text_lists_nodes() {
    let dir = TempDir::new().unwrap();
    let path = write_agents(&dir, "AddAgent\nx,y\nz\n");

    let output = context()
        .execute(&Commands::Graph { agents: path, format: "text".to_string() })
        .unwrap();
    assert!(output.contains("Tx"));
    assert!(output.contains("Tz"));
    assert!(output.contains("4 nodes, 3 edges"));
    assert!(output.contains("no cycles"));
}

#[test]
fn bad_definitions_are_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_agents(&dir, "SqrtAgent\nA\nB\n");
    let result = context().execute(&Commands::Validate {
        agents: path,
        format: "text".to_string(),
    });
    assert!(result.unwrap_err().to_string().contains("Unknown agent type"));

    let missing = dir.path().join("missing.txt");
    assert!(context()
        .execute(&Commands::Graph { agents: missing, format: "text".to_string() })
        .is_err());
}

#[test]
fn publish_rejects_malformed_assignment() {
    let dir = TempDir::new().unwrap();
    let path = write_agents(&dir, "IncAgent\nA\nB\n");
    let result = context().execute(&Commands::Publish {
        agents: path,
        set: vec!["A".to_string()],
        format: "text".to_string(),
    });
    assert!(result.is_err());
}
