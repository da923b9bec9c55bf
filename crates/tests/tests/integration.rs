//! Integration tests for end-to-end simctl runs.
//!
//! Batch runs go config file → parse → simulation state → kernels → sink;
//! interactive sessions go token stream → parse → evaluate → stdout.

use simctl_foundation::{Phase, Signal};
use simctl_runtime::{Controller, LogSink, SharedSink, SinkConfig};
use simctl_tests::{missing_path, TestHarness};

/// Kernels that never raise run exactly n iterations, in order.
#[test]
fn test_clean_run_completes_every_iteration() {
    let harness = TestHarness::from_source("Iterations = 5");

    assert_eq!(harness.run(), Signal::Success);
    assert_eq!(harness.kernels().iterations(), [1, 2, 3, 4, 5]);
    assert_eq!(harness.kernels().built, 5);
    assert_eq!(harness.sink().count("Bye!"), 1);
    assert!(harness.sink().is_closed());
}

/// The canonical degraded run: n = 3, Abort on iteration 2.
#[test]
fn test_abort_in_second_of_three_iterations() {
    let harness =
        TestHarness::from_source("Iterations = 3").raise_at(2, Phase::Execute, Signal::Abort);

    assert_eq!(harness.run(), Signal::Abort);
    assert_eq!(
        harness.progress(),
        [
            "Starting Simulation iteration: 1/3",
            "Simulation iteration: 1/3 done!",
            "Starting Simulation iteration: 2/3",
            "Simulation run aborted due to error!",
            "Starting Simulation iteration: 3/3",
            "Simulation iteration: 3/3 done!",
        ]
    );
    assert!(harness.kernels().ran(2, Phase::Execute));
    assert!(!harness.kernels().ran(2, Phase::Finalize));
    assert_eq!(harness.sink().error_summaries(), 1);
}

/// Exit stops the run before any later iteration starts.
#[test]
fn test_exit_stops_run() {
    let harness =
        TestHarness::from_source("Iterations = 6").raise_at(3, Phase::Finalize, Signal::Exit);

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().iterations(), [1, 2, 3]);
    assert!(!harness
        .messages()
        .contains(&"Starting Simulation iteration: 4/6".to_string()));
    assert_eq!(harness.sink().summaries(), 1);
    assert_eq!(harness.sink().close_count(), 1);
}

/// An Abort before an Exit does not soften the Exit.
#[test]
fn test_exit_after_abort_is_exit() {
    let harness = TestHarness::from_source("Iterations = 3")
        .raise_at(1, Phase::Initialize, Signal::Abort)
        .raise_at(2, Phase::Execute, Signal::Exit);

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().iterations(), [1, 2]);
    assert!(!harness.kernels().ran(1, Phase::Execute));
}

#[test]
fn test_missing_config_builds_no_kernel() {
    let harness = TestHarness::without_config();

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().built, 0);
    assert_eq!(harness.messages(), ["No input file specified!"]);
}

#[test]
fn test_unreadable_config_builds_no_kernel() {
    let harness = TestHarness::without_config();
    let (_dir, path) = missing_path();

    assert_eq!(harness.run_path(&path), Signal::Exit);
    assert_eq!(harness.kernels().built, 0);
    assert_eq!(
        harness.messages().last().map(String::as_str),
        Some("Simulation initialization failed!")
    );
}

#[test]
fn test_unparseable_config_builds_no_kernel() {
    let harness = TestHarness::from_source("Iterations = 3;\nx = (1 + ;");

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().built, 0);
    assert!(harness.sink().contains("Simulation initialization failed!"));
}

#[test]
fn test_failing_sink_builds_no_kernel() {
    let harness = TestHarness::from_source("Iterations = 3").with_failing_sink();

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().built, 0);
    assert!(harness.sink().is_closed());
}

#[test]
fn test_continue_predicate_ends_run_early() {
    let harness = TestHarness::from_source(
        r#"
        (* run until the budget is spent *)
        Iterations = 100;
        budget = 3;
        Continue := Iteration < budget
        "#,
    );

    assert_eq!(harness.run(), Signal::Success);
    assert_eq!(harness.kernels().iterations(), [1, 2, 3]);
    assert!(harness.sink().contains("Simulation done!"));
}

/// Exit raised by the continuation predicate ends the run like a kernel Exit.
#[test]
fn test_continue_predicate_exit_is_fatal() {
    let harness = TestHarness::from_source(
        r#"
        Iterations = 3;
        Continue := If[Iteration == 1, Exit["stop"], True]
        "#,
    );

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().iterations(), [1]);
    assert_eq!(
        harness.messages(),
        [
            "Starting Simulation iteration: 1/3",
            "Simulation iteration: 1/3 done!",
            "stop",
            "Simulation aborted due to fatal error!",
        ]
    );
    assert_eq!(harness.sink().summaries(), 1);
    assert_eq!(harness.sink().close_count(), 1);
}

#[test]
fn test_continue_predicate_bare_exit_before_first_iteration() {
    let harness = TestHarness::from_source("Iterations = 2; Continue := Exit[]");

    assert_eq!(harness.run(), Signal::Exit);
    assert_eq!(harness.kernels().built, 0);
    assert_eq!(harness.messages(), ["Simulation aborted due to fatal error!"]);
    assert_eq!(harness.sink().summaries(), 1);
    assert!(harness.sink().is_closed());
}

/// Abort or an evaluation error in the predicate degrades the result and stops the loop.
#[test]
fn test_continue_predicate_abort_degrades_result() {
    let harness = TestHarness::from_source(
        "Iterations = 4; Continue := If[Iteration < 2, True, Abort[\"budget exceeded\"]]",
    );

    assert_eq!(harness.run(), Signal::Abort);
    assert_eq!(harness.kernels().iterations(), [1, 2]);
    assert!(harness.sink().contains("budget exceeded"));
    assert!(harness.sink().contains("Simulation run aborted due to error!"));
    assert_eq!(harness.sink().count("Bye!"), 1);

    let harness = TestHarness::from_source("Iterations = 3; Continue := Sqrt[-1] > 0");
    assert_eq!(harness.run(), Signal::Abort);
    assert_eq!(harness.kernels().built, 0);
}

#[test]
fn test_script_kernel_drives_phases_from_config() {
    let harness = TestHarness::from_source(
        r#"
        Iterations = 3;
        total = 0;
        Initialize := step = Iteration * 10;
        Execute := total = total + step;
        Finalize := Print["total ", total];
        "#,
    )
    .with_script_kernel();

    assert_eq!(harness.run(), Signal::Success);
    let messages = harness.messages();
    assert!(messages.contains(&"total 10".to_string()));
    assert!(messages.contains(&"total 30".to_string()));
    assert!(messages.contains(&"total 60".to_string()));
}

#[test]
fn test_script_kernel_abort_with_reason() {
    let harness = TestHarness::from_source(
        r#"
        Iterations = 3;
        Execute := If[Iteration == 2, Abort["unstable step"], Null]
        "#,
    )
    .with_script_kernel();

    assert_eq!(harness.run(), Signal::Abort);
    let messages = harness.messages();
    let reason = messages.iter().position(|m| m == "unstable step").unwrap();
    assert_eq!(messages[reason + 1], "Simulation run aborted due to error!");
    assert!(harness.sink().contains("Simulation iteration: 3/3 done!"));
}

#[test]
fn test_script_kernel_exit() {
    let harness =
        TestHarness::from_source("Iterations = 4; Execute := If[Iteration == 1, Exit[], 0]")
            .with_script_kernel();

    assert_eq!(harness.run(), Signal::Exit);
    assert!(!harness
        .sink()
        .contains("Starting Simulation iteration: 2/4"));
}

#[test]
fn test_online_quit_first_evaluates_nothing() {
    let harness = TestHarness::without_config();
    let (signal, output) = harness.online("q 1+1");

    assert_eq!(signal, Signal::Success);
    assert_eq!(output, "In[1]:");
    assert_eq!(harness.messages(), ["Bye!"]);
}

#[test]
fn test_online_unparseable_then_quit() {
    let harness = TestHarness::without_config();
    let (signal, output) = harness.online("Sqrt[ Quit[]");

    assert_eq!(signal, Signal::Success);
    assert!(!output.contains("Result"));
    assert_eq!(
        harness
            .messages()
            .iter()
            .filter(|m| m.starts_with("Cannot parse command"))
            .count(),
        1
    );
    assert_eq!(harness.messages().last().map(String::as_str), Some("Bye!"));
}

#[test]
fn test_online_session_keeps_scope() {
    let harness = TestHarness::without_config();
    let (signal, output) = harness.online("r=2\nPi*r^2>12\nIf[r==2,\"two\",\"other\"]\nq\n");

    assert_eq!(signal, Signal::Success);
    assert!(output.contains("Result[1]:2\n"));
    assert!(output.contains("Result[2]:True\n"));
    assert!(output.contains("Out[3]:two\nResult[3]:two\n"));
    assert!(output.ends_with("In[4]:"));
}

#[test]
fn test_online_spaced_assignment_splits_into_tokens() {
    let harness = TestHarness::without_config();
    let (_, output) = harness.online("a = 1 q");

    assert!(output.contains("Result[1]:a\n"));
    assert!(harness.sink().contains("Cannot parse command: ="));
    assert!(output.contains("Result[3]:1\n"));
}

#[test]
fn test_online_exit_ends_session_after_next_prompt() {
    let harness = TestHarness::without_config();
    let (signal, output) = harness.online("Exit[\"done\"] 1 2");

    assert_eq!(signal, Signal::Success);
    assert_eq!(output, "In[1]:Out[1]:\nIn[2]:");
    assert_eq!(harness.messages(), ["done", "evaluation error!", "Bye!"]);
    assert_eq!(
        harness.sink().records()[1].severity,
        Some(Signal::Exit)
    );
}

#[test]
fn test_log_sink_writes_run_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.sim");
    let log = dir.path().join("sim.log");
    std::fs::write(&config, "Iterations = 2; Execute := If[Iteration == 2, Abort[], 0]").unwrap();

    let sink: SharedSink = std::rc::Rc::new(std::cell::RefCell::new(LogSink::new()));
    let sink_config = SinkConfig {
        echo: false,
        log_file: Some(log.clone()),
        ..SinkConfig::default()
    };
    let result = Controller::new(sink.clone(), sink_config).simulate(Some(&config));
    assert_eq!(result, Signal::Abort);

    // Closing again after the controller did is harmless.
    sink.borrow_mut().close();

    let contents = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.first(), Some(&"Sim: Starting Simulation iteration: 1/2"));
    assert!(lines.contains(&"Sim: [Abort] Simulation run aborted due to error!"));
    assert!(lines.contains(&"Sim: [Abort] 1 errors (1 aborted, 0 fatal)"));
    assert_eq!(lines.last(), Some(&"Sim: Bye!"));
}
