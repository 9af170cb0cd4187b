//! Test case and auto-judge report types.
//!
//! A `TestCase` pairs a request description with an `Expectation`. Running
//! tests produces one `ObservedCase` per case; the auto-judge then compares
//! the two and emits a `JudgeReport`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single generated API test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable identifier such as "API-001".
    pub id: String,
    pub title: String,
    pub method: String,
    pub path: String,
    pub expect: Expectation,
}

/// What a test case expects to observe.
///
/// Every populated field becomes one or more assertions. An expectation with
/// nothing populated yields no assertions and the case trivially passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    /// Expected HTTP status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Top-level body keys that must be present (value may be anything, including null).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,

    /// Top-level body keys that must equal the given values.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub body_contains: Map<String, Value>,

    /// JSON Schema the whole body must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// The raw response captured for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observed {
    pub status: u16,
    pub latency_ms: u64,
    pub body: Value,
}

/// One executed test case, before judging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedCase {
    pub id: String,
    pub title: String,
    pub observed: Observed,
}

/// The verdict of one assertion within a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    /// Human-readable rule, e.g. `status == 200` or `required field: status`.
    pub name: String,
    pub ok: bool,
    /// What was actually seen, e.g. `observed=200` or `missing`.
    pub evidence: String,
}

/// One case after judging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgedCase {
    #[serde(flatten)]
    pub case: ObservedCase,
    pub passed: bool,
    pub assertions: Vec<Assertion>,
    /// Set on failed cases once the test agent has annotated the report.
    pub root_cause_hint: Option<String>,
}

/// Aggregate counts across all judged cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// `round(100 * passed / total)`.
    pub pass_rate: u32,
}

/// The full output of an auto-judge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeReport {
    pub judged_at: DateTime<Utc>,
    pub summary: JudgeSummary,
    pub results: Vec<JudgedCase>,
    /// Names of the rule families applied.
    pub rules: Vec<String>,
}
