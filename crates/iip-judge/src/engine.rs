//! Rule-based auto-judge.
//!
//! Each populated field of an `Expectation` turns into assertions against
//! the observed response:
//!
//! 1. **Status**: `status == N`, evidence `observed=S`.
//! 2. **Required fields**: one `required field: F` per key, evidence
//!    `present` or `missing`. Presence only; a `null` value counts.
//! 3. **Body contains**: one `body.K == V` per key, strict JSON equality.
//! 4. **Schema**: a single `schema: response body` assertion, validated with
//!    the `jsonschema` crate.
//!
//! A case passes when every assertion holds. A case with no assertions
//! passes trivially. Root-cause hints are left empty; annotating failures
//! is the caller's business.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use iip_contracts::judge::{
    Assertion, Expectation, JudgeReport, JudgeSummary, JudgedCase, ObservedCase, TestCase,
};

/// Rule families always applied.
pub const BASE_RULES: [&str; 3] = ["status code", "required fields", "body contains (basic)"];

/// Rule family added when any expectation carries a schema.
pub const SCHEMA_RULE: &str = "response schema";

/// Judge one observed case against `expect`.
pub fn judge_case(expect: &Expectation, observed: &ObservedCase) -> JudgedCase {
    let body = &observed.observed.body;
    let mut assertions = Vec::new();

    if let Some(status) = expect.status {
        assertions.push(Assertion {
            name: format!("status == {status}"),
            ok: observed.observed.status == status,
            evidence: format!("observed={}", observed.observed.status),
        });
    }

    for field in &expect.required_fields {
        let ok = body.as_object().is_some_and(|o| o.contains_key(field));
        assertions.push(Assertion {
            name: format!("required field: {field}"),
            ok,
            evidence: if ok { "present" } else { "missing" }.to_string(),
        });
    }

    for (key, expected) in &expect.body_contains {
        let actual = body.get(key);
        assertions.push(Assertion {
            name: format!("body.{key} == {}", display_value(Some(expected))),
            ok: actual == Some(expected),
            evidence: format!("observed={}", display_value(actual)),
        });
    }

    if let Some(schema) = &expect.schema {
        assertions.push(schema_assertion(&observed.id, schema, body));
    }

    let passed = assertions.iter().all(|a| a.ok);
    debug!(case = %observed.id, passed, assertions = assertions.len(), "case judged");

    JudgedCase {
        case: observed.clone(),
        passed,
        assertions,
        root_cause_hint: None,
    }
}

/// Judge every observed result against the case with the same id.
///
/// A result with no matching case is judged against an empty expectation
/// and therefore passes.
pub fn judge(cases: &[TestCase], results: &[ObservedCase], now: DateTime<Utc>) -> JudgeReport {
    let empty = Expectation::default();
    let judged: Vec<JudgedCase> = results
        .iter()
        .map(|result| {
            let expect = cases
                .iter()
                .find(|c| c.id == result.id)
                .map(|c| &c.expect)
                .unwrap_or(&empty);
            judge_case(expect, result)
        })
        .collect();

    let total = judged.len();
    let passed = judged.iter().filter(|c| c.passed).count();
    let summary = JudgeSummary {
        total,
        passed,
        failed: total - passed,
        pass_rate: pass_rate(passed, total),
    };

    let mut rules: Vec<String> = BASE_RULES.iter().map(|r| r.to_string()).collect();
    if cases.iter().any(|c| c.expect.schema.is_some()) {
        rules.push(SCHEMA_RULE.to_string());
    }

    debug!(
        total = summary.total,
        failed = summary.failed,
        pass_rate = summary.pass_rate,
        "judge run complete"
    );

    JudgeReport {
        judged_at: now,
        summary,
        results: judged,
        rules,
    }
}

/// `round(100 * passed / total)`, half rounding up. Zero cases is 100.
pub fn pass_rate(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((200 * passed + total) / (2 * total)) as u32
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn schema_assertion(case_id: &str, schema: &Value, body: &Value) -> Assertion {
    let name = "schema: response body".to_string();
    match jsonschema::validator_for(schema) {
        Ok(validator) => {
            let violations: Vec<String> = validator
                .iter_errors(body)
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            Assertion {
                name,
                ok: violations.is_empty(),
                evidence: if violations.is_empty() {
                    "valid".to_string()
                } else {
                    violations.join("; ")
                },
            }
        }
        Err(e) => {
            warn!(case = %case_id, error = %e, "expectation schema does not compile");
            Assertion {
                name,
                ok: false,
                evidence: format!("invalid schema: {e}"),
            }
        }
    }
}

/// Strings render bare, everything else as JSON.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
