//! # iip-judge
//!
//! The console's two comparison tools:
//!
//! - [`diff`]: a positional line diff used to preview artifact writes.
//! - [`engine`]: the auto-judge that turns observed test responses into
//!   per-assertion verdicts and a pass rate.
//!
//! Both are pure functions over `iip-contracts` types. The only clock input
//! is the `now` passed to [`engine::judge`].

pub mod diff;
pub mod engine;

pub use diff::{line_diff, render, simple_line_diff, DiffLine};
pub use engine::{judge, judge_case, pass_rate};
