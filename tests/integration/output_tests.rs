//! Output layout tests.
//!
//! Checks the order of lines the orchestrator writes for each outcome.

use check_service::cli::output::Console;
use check_service::engine::result::CheckOutcome;
use check_service::CheckOrchestrator;

use crate::mocks::MockChecker;

fn lines(checker: &MockChecker, args: &[&str]) -> Vec<String> {
    let orchestrator = CheckOrchestrator::new(checker);
    let mut console = Console::new(Vec::new(), false);
    orchestrator.run(args.iter().copied(), &mut console);
    String::from_utf8(console.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_banner_comes_first() {
    let checker = MockChecker::returning(CheckOutcome::new(200, "OK", "body"));
    let output = lines(&checker, &["http://svc/"]);

    assert_eq!(output[0], "");
    assert!(output[1].starts_with("check-service "));
    assert!(output[1].ends_with("Checks a REST service."));
    assert_eq!(output[2], "");
}

#[test]
fn test_success_layout() {
    let checker = MockChecker::returning(CheckOutcome::new(200, "OK", "<ok/>"));
    let output = lines(&checker, &["http://svc/", "-d", "node1"]);

    assert_eq!(
        &output[3..],
        [
            "200 OK from HTTP GET to http://svc/ on node1",
            "",
            "<ok/>",
        ]
    );
}

#[test]
fn test_warning_follows_status_line() {
    let checker = MockChecker::returning(
        CheckOutcome::new(200, "OK", "<ok/>").with_warning("SSL certificate issue: expired"),
    );
    let output = lines(&checker, &["http://svc/"]);

    assert_eq!(
        &output[3..],
        [
            "200 OK from HTTP GET to http://svc/",
            "SSL certificate issue: expired",
            "",
            "<ok/>",
        ]
    );
}

#[test]
fn test_usage_follows_banner() {
    let checker = MockChecker::returning(CheckOutcome::new(200, "OK", ""));
    let output = lines(&checker, &[]);

    assert_eq!(output[3], "Performs an HTTP GET on a given host.");
    assert!(output[4].starts_with("Usage:"));
}
