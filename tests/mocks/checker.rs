//! Scripted checker.

use std::cell::RefCell;

use check_service::check::{CheckRequest, Checker};
use check_service::engine::result::CheckOutcome;
use check_service::CheckError;

type Script = Box<dyn Fn(&CheckRequest) -> Result<CheckOutcome, CheckError>>;

/// Checker returning a fixed result and recording every request
pub struct MockChecker {
    script: Script,
    requests: RefCell<Vec<CheckRequest>>,
}

impl MockChecker {
    /// Always return the given outcome
    pub fn returning(outcome: CheckOutcome) -> Self {
        MockChecker {
            script: Box::new(move |_: &CheckRequest| Ok(outcome.clone())),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Always fail with the error built by `make_error`
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> CheckError + 'static,
    {
        MockChecker {
            script: Box::new(move |_: &CheckRequest| Err(make_error())),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CheckRequest> {
        self.requests.borrow().clone()
    }
}

impl Checker for MockChecker {
    fn check(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
        self.requests.borrow_mut().push(request.clone());
        (self.script)(request)
    }
}
