mod common;

use common::{FakeProbe, process};
use procwatch::control::{Confirmation, GateDecision, KillResult, ProcessController};
use procwatch::system::ProcessState;

fn probe() -> FakeProbe {
    FakeProbe::new(vec![
        process(1, "init", ProcessState::Sleeping, 12, 0.0),
        process(42, "editor", ProcessState::Running, 350, 3.0),
        process(43, "Editor", ProcessState::Running, 20, 0.0),
        process(50, "worker", ProcessState::Running, 10, 0.0),
        process(51, "worker", ProcessState::Sleeping, 10, 0.0),
    ])
}

#[test]
fn unconfirmed_kill_never_signals() {
    let mut probe = probe();
    let result = ProcessController::new(&mut probe).kill("editor", false);

    let KillResult::ConfirmationRequired(pending) = result else {
        panic!("expected a confirmation request, got {result:?}");
    };
    assert_eq!(pending.pid, 42);
    assert_eq!(pending.target_name, "editor");
    assert!(pending.awaiting_confirmation);
    assert!(probe.terminated.is_empty());
}

#[test]
fn confirmed_kill_signals_exactly_once() {
    let mut probe = probe();
    let result = ProcessController::new(&mut probe).kill("editor", true);
    assert_eq!(result, KillResult::Terminated { pid: 42 });
    assert_eq!(probe.terminated, vec![42]);
}

#[test]
fn gate_then_pid_kill_matches_the_interactive_flow() {
    let mut probe = probe();
    let mut controller = ProcessController::new(&mut probe);
    let KillResult::ConfirmationRequired(pending) = controller.kill("editor", false) else {
        panic!("expected a confirmation request");
    };
    let GateDecision::Proceed { pid } = pending.resolve(Confirmation::from_answer("1")) else {
        panic!("answer 1 should proceed");
    };
    assert_eq!(
        controller.kill_confirmed("editor", pid),
        KillResult::Terminated { pid: 42 }
    );
}

#[test]
fn pid_reused_while_confirming_is_not_signalled() {
    let mut probe = probe();
    let KillResult::ConfirmationRequired(pending) =
        ProcessController::new(&mut probe).kill("editor", false)
    else {
        panic!("expected a confirmation request");
    };
    let target = pending.target_name.clone();

    // editor exits and its pid goes to an unrelated process before the answer
    probe.processes = vec![process(42, "sshd", ProcessState::Sleeping, 8, 0.0)];

    let GateDecision::Proceed { pid } = pending.resolve(Confirmation::from_answer("1")) else {
        panic!("answer 1 should proceed");
    };
    let result = ProcessController::new(&mut probe).kill_confirmed(&target, pid);

    assert_eq!(result, KillResult::NotFound);
    assert!(probe.terminated.is_empty());
    assert_eq!(probe.processes.len(), 1);
    assert_eq!(probe.processes[0].name, "sshd");
}

#[test]
fn confirmed_kill_of_missing_name_is_not_found() {
    let mut probe = probe();
    let result = ProcessController::new(&mut probe).kill("ghost", true);
    assert_eq!(result, KillResult::NotFound);
    assert!(probe.terminated.is_empty());
    assert_eq!(probe.processes.len(), 5);
}

#[test]
fn shared_names_are_ambiguous() {
    let mut probe = probe();
    let result = ProcessController::new(&mut probe).kill("worker", true);
    let KillResult::Ambiguous(candidates) = result else {
        panic!("expected ambiguity, got {result:?}");
    };
    let pids: Vec<u32> = candidates.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![50, 51]);
    assert!(probe.terminated.is_empty());
}

#[test]
fn process_that_vanished_before_the_signal_is_not_found() {
    let mut probe = probe();
    let mut controller = ProcessController::new(&mut probe);
    assert_eq!(controller.kill_pid(9999, true), KillResult::NotFound);
    assert_eq!(controller.kill_pid(9999, false), KillResult::NotFound);
}

#[test]
fn refused_signal_leaves_the_table_alone() {
    let mut probe = probe();
    probe.refuse.push(1);
    let result = ProcessController::new(&mut probe).kill_pid(1, true);
    assert_eq!(result, KillResult::Refused { pid: 1 });
    assert_eq!(probe.processes.len(), 5);
}

#[test]
fn search_is_exact_and_case_sensitive() {
    let mut probe = probe();
    let mut controller = ProcessController::new(&mut probe);
    let found = controller.search("editor");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pid, 42);
    assert!(controller.search("edit").is_empty());
    assert!(controller.search("nonexistent").is_empty());
}
