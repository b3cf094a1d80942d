mod common;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use common::{SeqLine, controller};
use dispenser_core::command::{Command, unrecognized_line};
use dispenser_core::mocks::ScriptedPort;
use dispenser_core::{DispenseStatus, OperatingMode, Station};
use dispenser_traits::clock::test_clock::TestClock;
use rstest::rstest;

fn station(
    clock: &TestClock,
    level: i32,
    script: &[u8],
) -> Station<common::RecordingRelay, SeqLine, ScriptedPort> {
    Station::new(
        controller(clock, SeqLine::constant(clock, 10, level)),
        ScriptedPort::new(script),
    )
}

#[rstest]
#[case('A', Command::Attempt)]
#[case('S', Command::Status)]
#[case('T', Command::ToggleMode)]
#[case('Z', Command::Unrecognized('Z'))]
#[case('?', Command::Unrecognized('?'))]
fn parses_commands(#[case] c: char, #[case] expected: Command) {
    assert_eq!(Command::parse(c), expected);
}

#[test]
fn poll_uppercases_and_reports_empty() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"a");
    assert_eq!(st.poll_input().unwrap(), Some('A'));
    assert_eq!(st.poll_input().unwrap(), None);
}

#[test]
fn status_before_any_attempt_is_untried() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"");
    st.dispatch(Some('S')).unwrap();
    assert_eq!(st.port().lines(), ["Status: U"]);
}

#[rstest]
#[case(512, "Status: S")]
#[case(0, "Status: F")]
fn attempt_then_status(#[case] level: i32, #[case] expected: &str) {
    let clock = TestClock::new();
    let mut st = station(&clock, level, b"as");
    st.run_iteration().unwrap();
    st.run_iteration().unwrap();
    assert_eq!(st.port().lines(), [expected]);
    assert_eq!(clock.offset(), Duration::from_millis(1540));
}

#[test]
fn attempt_produces_no_console_output() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"");
    st.dispatch(Some('A')).unwrap();
    assert!(st.port().lines().is_empty());
    assert_eq!(st.controller().status(), DispenseStatus::Success);
}

#[test]
fn toggle_flips_and_double_toggle_restores() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"");
    assert_eq!(st.mode(), OperatingMode::Interactive);
    st.dispatch(Some('T')).unwrap();
    assert_eq!(st.mode(), OperatingMode::Timed);
    st.dispatch(Some('T')).unwrap();
    assert_eq!(st.mode(), OperatingMode::Interactive);
    assert!(st.port().lines().is_empty());
}

#[test]
fn unrecognized_byte_changes_nothing_and_says_so_once() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"");
    st.dispatch(Some('A')).unwrap();
    let before = (st.controller().status(), st.mode());

    st.dispatch(Some('Z')).unwrap();

    assert_eq!((st.controller().status(), st.mode()), before);
    assert_eq!(st.port().lines(), [unrecognized_line('Z')]);
    assert!(st.port().lines()[0].contains('Z'));
    assert_eq!(st.port().lines()[0], "Unrecognized command char: 'Z'");
}

#[test]
fn no_input_is_a_no_op() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"");
    st.dispatch(None).unwrap();
    assert!(!st.run_iteration().unwrap());
    assert!(st.port().lines().is_empty());
    assert_eq!(st.controller().status(), DispenseStatus::Untried);
    assert_eq!(clock.offset(), Duration::ZERO);
}

#[test]
fn timed_iteration_dispenses_reports_and_waits() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"").with_mode(OperatingMode::Timed);

    assert!(st.run_iteration().unwrap());

    assert_eq!(
        st.port().lines(),
        ["0-timed mode, attempting to dispense", "Status: S"]
    );
    assert_eq!(st.controller().attempts(), 1);
    assert_eq!(clock.offset(), Duration::from_millis(1540 + 1000));

    st.run_iteration().unwrap();
    assert_eq!(st.port().lines()[2], "2540-timed mode, attempting to dispense");
}

#[test]
fn command_in_timed_iteration_runs_before_the_cycle() {
    let clock = TestClock::new();
    let mut st = station(&clock, 0, b"s").with_mode(OperatingMode::Timed);
    st.run_iteration().unwrap();
    assert_eq!(
        st.port().lines(),
        [
            "Status: U",
            "0-timed mode, attempting to dispense",
            "Status: F"
        ]
    );
}

#[test]
fn toggle_into_timed_starts_cycling_same_iteration() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"t");
    st.run_iteration().unwrap();
    assert_eq!(st.mode(), OperatingMode::Timed);
    assert_eq!(st.controller().attempts(), 1);
}

#[test]
fn run_stops_when_interactive_input_is_exhausted() {
    let clock = TestClock::new();
    let mut st = Station::new(
        controller(&clock, SeqLine::constant(&clock, 10, 512)),
        ScriptedPort::new(b"sAs").then_idle(),
    );
    let shutdown = AtomicBool::new(false);
    st.run(&shutdown).unwrap();

    let (ctl, port) = st.into_parts();
    assert_eq!(port.lines(), ["Status: U", "Status: S"]);
    assert_eq!(ctl.status(), DispenseStatus::Success);
    assert_eq!(ctl.attempts(), 1);
}

#[test]
fn run_honours_shutdown_flag() {
    let clock = TestClock::new();
    let mut st = station(&clock, 512, b"aaaa");
    let shutdown = AtomicBool::new(true);
    st.run(&shutdown).unwrap();
    assert_eq!(st.controller().attempts(), 0);
}
