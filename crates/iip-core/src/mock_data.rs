//! Canned agent outputs for the IIP console.
//!
//! Everything here is fixed text and fixed numbers describing one fictional
//! integration: an account inquiry API fronting a legacy core-banking
//! system. No external systems are contacted. The data is deliberately
//! imperfect so the pipeline has something to find: test case API-001
//! comes back without `status`, and the first deploy fails on config.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use iip_contracts::{
    artifacts::{
        BuildArtifacts, CauseCandidate, Checklist, ChecklistItem, DeployError, DerivedDesign,
        EvidencePack, IntentConstraints, IntentSummary, LogLine, Metric, PatchFile, Release,
        ReleaseStatus, RootCauseReport, Rollback, Signals, TraceDrilldown, TraceSignal, TraceStep,
        PROPERTIES_PATH,
    },
    judge::{Expectation, Observed, ObservedCase, TestCase},
    pipeline::Env,
};

/// Requirement text a fresh session starts with.
pub const DEFAULT_REQUIREMENT: &str = "As a user, I want an API that receives an order and routes it to legacy system with transformation and retries.";

// ── Intent ────────────────────────────────────────────────────────────────────

pub fn intent_summary(requirement: &str, env: Env) -> IntentSummary {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    IntentSummary {
        requirement: requirement.to_string(),
        constraints: IntentConstraints {
            env,
            approval_model: "[A]/[C]/[H]".to_string(),
            secrets: "Do not log tokens/PII (masking enabled)".to_string(),
        },
        derived: DerivedDesign {
            api_style: "REST".to_string(),
            resources: strings(&["/orders"]),
            legacy_targets: strings(&["TCP/HTTP/File/DB/MQ (placeholder)"]),
            transformations: strings(&["DataWeave mapping required"]),
            tests: strings(&["API tests + E2E workflow tests"]),
            deploy: strings(&["DEV/STG/PRD separated"]),
        },
        plan: strings(&[
            "Design: generate OAS and apply guardrails",
            "Build: generate Mule flows + connector configs + DataWeave",
            "Test: auto-generate cases and run with approval",
            "Deploy: deploy to env with approval",
            "Observe/Debug: collect evidence and localize root cause",
        ]),
    }
}

// ── Design ────────────────────────────────────────────────────────────────────

/// Path template of the single documented operation.
pub const ACCOUNT_PATH: &str = "/accounts/{accountNo}";

/// Schema of the 200 response body.
pub fn account_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "accountNo": { "type": "string" },
            "balance": { "type": "number" },
            "currency": { "type": "string" },
            "status": { "type": "string", "enum": ["ACTIVE", "DORMANT", "CLOSED"] },
            "asOfDate": { "type": "string", "format": "date" }
        },
        "required": ["accountNo", "balance", "currency", "status"]
    })
}

/// OpenAPI 3.0 document for the account inquiry API, stamped with the intent
/// it was generated from.
pub fn account_inquiry_oas(intent: &IntentSummary) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Account Inquiry API",
            "version": "1.0.0",
            "description": "Generated from Intent. Mule flow will call legacy system and return normalized JSON."
        },
        "servers": [{ "url": "https://api.example.com" }],
        "paths": {
            ACCOUNT_PATH: {
                "get": {
                    "summary": "Retrieve account information",
                    "description": "Calls legacy system via Mule flow and transforms response using DataWeave.",
                    "parameters": [
                        {
                            "name": "accountNo",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" },
                            "description": "Account number"
                        },
                        {
                            "name": "asOfDate",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string", "format": "date" },
                            "description": "Inquiry reference date (optional)"
                        },
                        {
                            "name": "customerId",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string" },
                            "description": "Customer identifier (optional)"
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Account detail response",
                            "content": { "application/json": { "schema": account_response_schema() } }
                        },
                        "400": {
                            "description": "Validation error",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "code": { "type": "string", "example": "VALIDATION_ERROR" },
                                            "message": { "type": "string" }
                                        },
                                        "required": ["code", "message"]
                                    }
                                }
                            }
                        },
                        "401": { "description": "Unauthorized" },
                        "403": { "description": "Forbidden" },
                        "500": { "description": "Internal server error" }
                    },
                    "security": [{ "bearerAuth": [] }]
                }
            }
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            }
        },
        "x-generatedFrom": {
            "requirement": intent.requirement,
            "plan": intent.plan,
            "constraints": intent.constraints
        }
    })
}

// ── Build ─────────────────────────────────────────────────────────────────────

const MULE_XML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<mule xmlns:http="http://www.mulesoft.org/schema/mule/http"
      xmlns:ee="http://www.mulesoft.org/schema/mule/ee/core"
      xmlns="http://www.mulesoft.org/schema/mule/core"
      xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
      xsi:schemaLocation="
        http://www.mulesoft.org/schema/mule/core http://www.mulesoft.org/schema/mule/core/current/mule.xsd
        http://www.mulesoft.org/schema/mule/http http://www.mulesoft.org/schema/mule/http/current/mule-http.xsd
        http://www.mulesoft.org/schema/mule/ee/core http://www.mulesoft.org/schema/mule/ee/core/current/mule-ee.xsd">

  <!-- Generated from Intent + OAS -->
  <configuration-properties file="config.properties"/>

  <http:listener-config name="httpListener">
    <http:listener-connection host="${http.host}" port="${http.port}"/>
  </http:listener-config>

  <!-- Legacy call placeholder: can be TCP/HTTP/DB/MQ connector depending on target -->
  <flow name="account-inquiry-flow">
    <http:listener config-ref="httpListener" path="/accounts/{accountNo}" allowedMethods="GET"/>

    <set-variable variableName="accountNo" value="#[attributes.uriParams.accountNo]"/>
    <set-variable variableName="asOfDate" value="#[attributes.queryParams.asOfDate default null]"/>

    <ee:transform doc:name="Build Legacy Request">
      <ee:message>
        <ee:set-payload><![CDATA[%dw 2.0
output application/json
---
{
  accountNo: vars.accountNo,
  asOfDate: vars.asOfDate,
  customerId: attributes.queryParams.customerId default null
}]]></ee:set-payload>
      </ee:message>
    </ee:transform>

    <logger level="INFO" message="Calling legacy system endpoint=${legacy.baseUrl} (placeholder) payload=#[payload]"/>

    <!-- Mock legacy response -->
    <set-payload><![CDATA[{
      "acct_no": "#[vars.accountNo]",
      "bal": 120000.25,
      "ccy": "KRW",
      "acct_status": "ACTIVE",
      "as_of": "2026-02-22"
    }]]></set-payload>

    <ee:transform doc:name="Normalize Response (DataWeave)">
      <ee:message>
        <ee:set-payload><![CDATA[%dw 2.0
import * from dw::core::Strings
output application/json
var src = payload
---
{
  accountNo: src.acct_no as String,
  balance: src.bal as Number,
  currency: src.ccy as String,
  status: upper(src.acct_status as String),
  asOfDate: src.as_of as String
}]]></ee:set-payload>
      </ee:message>
    </ee:transform>

  </flow>
</mule>"##;

const DATAWEAVE: &str = "%dw 2.0
output application/json
// account-inquiry.dwl (Generated)
var src = payload
---
{
  accountNo: src.acct_no as String,
  balance: src.bal as Number,
  currency: src.ccy as String,
  status: upper(src.acct_status as String),
  asOfDate: src.as_of as String
}";

const PROPERTIES: &str = "# config.properties (Generated)
http.host=0.0.0.0
http.port=8081

# legacy endpoint placeholder
legacy.baseUrl=https://legacy.example.com
legacy.timeoutMs=3000
legacy.retry=2
";

/// `config.properties` after the debug patch moves the listener port.
pub const PATCHED_PROPERTIES: &str = "# config.properties (Patched)
http.host=0.0.0.0
http.port=8082

legacy.baseUrl=https://legacy.example.com
legacy.timeoutMs=3000
legacy.retry=2
";

pub fn build_artifacts() -> BuildArtifacts {
    BuildArtifacts {
        mule_xml: MULE_XML.to_string(),
        data_weave: DATAWEAVE.to_string(),
        properties: PROPERTIES.to_string(),
    }
}

// ── Test ──────────────────────────────────────────────────────────────────────

/// The four generated API test cases.
///
/// `response_schema`, when given, is attached to the case that asserts the
/// full success payload.
pub fn api_test_cases(response_schema: Option<Value>) -> Vec<TestCase> {
    let case = |id: &str, title: &str, path: &str, expect: Expectation| TestCase {
        id: id.to_string(),
        title: title.to_string(),
        method: "GET".to_string(),
        path: path.to_string(),
        expect,
    };

    let mut validation = Expectation { status: Some(400), ..Expectation::default() };
    validation.body_contains.insert("code".to_string(), json!("VALIDATION_ERROR"));

    vec![
        case(
            "API-001",
            "200 OK - valid account inquiry",
            "/accounts/12345678?asOfDate=2026-02-22",
            Expectation {
                status: Some(200),
                required_fields: ["accountNo", "balance", "currency", "status"]
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                schema: response_schema,
                ..Expectation::default()
            },
        ),
        case("API-002", "400 - invalid accountNo format", "/accounts/@@@INVALID", validation),
        case(
            "API-003",
            "401 - missing/invalid token",
            "/accounts/12345678",
            Expectation { status: Some(401), ..Expectation::default() },
        ),
        case(
            "API-004",
            "Boundary - asOfDate omitted (optional)",
            "/accounts/12345678",
            Expectation { status: Some(200), ..Expectation::default() },
        ),
    ]
}

/// The mock response for one test case.
///
/// API-001 answers 200 but leaves out `status`.
pub fn observe(case: &TestCase) -> ObservedCase {
    let (status, latency_ms, body) = match case.id.as_str() {
        "API-001" => (
            200,
            120,
            json!({ "accountNo": "12345678", "balance": 120000.25, "currency": "KRW" }),
        ),
        "API-002" => (400, 55, json!({ "code": "VALIDATION_ERROR" })),
        "API-003" => (401, 45, json!({ "message": "Unauthorized" })),
        _ => (200, 90, json!({ "ok": true })),
    };

    ObservedCase {
        id: case.id.clone(),
        title: case.title.clone(),
        observed: Observed { status, latency_ms, body },
    }
}

/// Likely cause of a failed test case.
pub fn root_cause_hint(case_id: &str) -> &'static str {
    match case_id {
        "API-001" => "DataWeave mapping/response builder is missing required field 'status'.",
        _ => "Check API implementation / error model mapping.",
    }
}

// ── Deploy ────────────────────────────────────────────────────────────────────

pub const DEPLOY_TARGET: &str = "CloudHub (mock)";

/// Error reported by the seeded failing deploy.
pub const DEPLOY_FAILURE_MESSAGE: &str =
    "Startup failed: missing property legacy.baseUrl OR port conflict on http.port (EADDRINUSE).";

pub fn predeploy_checklist(env: Env) -> Checklist {
    let checks = ["env vars set", "auth policy attached", "connector creds placeholders", "timeout/retry defaults"]
        .iter()
        .map(|name| ChecklistItem { name: name.to_string(), ok: true })
        .collect();

    Checklist { env, checks, warnings: Vec::new() }
}

pub fn failed_release(env: Env, release_id: String, now: DateTime<Utc>) -> Release {
    Release {
        env,
        status: ReleaseStatus::Failed,
        logs_ref: Some(format!("mock://logs/deploy/{release_id}")),
        release_id,
        deploy_target: DEPLOY_TARGET.to_string(),
        endpoint: None,
        error: Some(DeployError {
            category: "CONFIG".to_string(),
            message: DEPLOY_FAILURE_MESSAGE.to_string(),
        }),
        started_at: now,
    }
}

pub fn successful_release(env: Env, release_id: String, now: DateTime<Utc>) -> Release {
    Release {
        env,
        status: ReleaseStatus::Success,
        release_id,
        deploy_target: DEPLOY_TARGET.to_string(),
        endpoint: Some(format!(
            "https://{}.api.example.com{ACCOUNT_PATH}",
            env.as_str().to_ascii_lowercase()
        )),
        error: None,
        logs_ref: None,
        started_at: now,
    }
}

// ── Observe ───────────────────────────────────────────────────────────────────

/// Evidence for a deployment. `error_message` is the deploy error, if any.
pub fn evidence_pack(
    env: Env,
    release_id: Option<String>,
    error_message: Option<&str>,
    now: DateTime<Utc>,
) -> EvidencePack {
    let at = |ms: i64| now - Duration::milliseconds(ms);
    let log = |ms: i64, level: &str, msg: &str| LogLine { ts: at(ms), level: level.to_string(), msg: msg.to_string() };

    EvidencePack {
        env,
        release_id,
        collected_at: now,
        signals: Signals {
            logs: vec![
                log(5200, "INFO", "Loading config.properties..."),
                log(4800, "ERROR", error_message.unwrap_or("Unknown error")),
                log(4500, "INFO", "Bootstrap aborted."),
            ],
            metrics: vec![
                Metric { name: "startup_time_ms".to_string(), value: 2400.0 },
                Metric { name: "error_rate".to_string(), value: 0.12 },
            ],
            traces: vec![TraceSignal {
                span: "deploy.bootstrap".to_string(),
                status: "ERROR".to_string(),
                evidence: "config missing or port conflict".to_string(),
            }],
        },
        evidence_summary: "Evidence suggests configuration issue (missing legacy.baseUrl) or port binding conflict during startup.".to_string(),
    }
}

// ── Debug ─────────────────────────────────────────────────────────────────────

pub fn trace_drilldown(release_id: Option<String>) -> TraceDrilldown {
    TraceDrilldown {
        release_id,
        steps: vec![
            TraceStep { step: "Load config.properties".to_string(), ok: true, latency_ms: 30, evidence: None },
            TraceStep {
                step: "Init http:listener".to_string(),
                ok: false,
                latency_ms: 12,
                evidence: Some("EADDRINUSE on http.port OR missing legacy.baseUrl".to_string()),
            },
            TraceStep { step: "App started".to_string(), ok: false, latency_ms: 0, evidence: None },
        ],
    }
}

pub fn root_cause_report() -> RootCauseReport {
    RootCauseReport {
        classification: "CONFIG".to_string(),
        confidence: 0.78,
        candidates: vec![
            CauseCandidate { cause: "Missing config property legacy.baseUrl".to_string(), confidence: 0.72 },
            CauseCandidate { cause: "Port conflict on http.port (EADDRINUSE)".to_string(), confidence: 0.55 },
        ],
        recommended_fix: "Ensure legacy.baseUrl exists in config.properties and use a free port for http.port.".to_string(),
    }
}

/// The patched `config.properties` entry.
pub fn patch_file(diff: String, before_sha256: Option<String>, after_sha256: String) -> PatchFile {
    PatchFile { file_path: PROPERTIES_PATH.to_string(), diff, before_sha256, after_sha256 }
}

pub fn patch_rollback() -> Rollback {
    Rollback {
        supported: true,
        note: "Demo rollback would restore previous file snapshot.".to_string(),
    }
}
