//! Integration tests for the dataflow engine

mod cli_commands;
mod graph_wiring;
mod parallel_delivery;
mod propagation;
mod support;
