//! # iip-scenarios
//!
//! Scripted walkthroughs of the IIP agent console.
//!
//! 1. **Happy path**: intent through build, artifact preview and save, the
//!    API test cycle ending in the seeded 75% auto-judge verdict, and the
//!    pre-deploy checklist.
//! 2. **Deploy and debug**: the seeded deploy failure, evidence collection,
//!    trace drilldown, root-cause localization and the approved config patch.
//! 3. **Guardrails**: every refusal the console can give, exercised in PRD.
//!
//! Every confirmation is scripted. No network calls are made.

pub mod scenarios;

pub use scenarios::Rig;
