//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Identity: requires `X-User-Id`, injects `UserContext`
//! 2. Audit logger: logs after identity, has the user id

pub mod audit;
pub mod identity;
