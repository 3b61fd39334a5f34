//! # PACW Case Workspace Engine
//!
//! The reconciliation engine behind the prior-authorization case workspace:
//! - Field status resolution (answer store + autofill overlay)
//! - Completeness and citation-coverage scoring
//! - Denial / gap reconciliation and appeal eligibility
//! - The attestation → export gate
//! - The append-only export ledger
//! - Case service client and atomic workspace loading
//!
//! Presentation layers (forms, tabs, buttons) bind to the state exposed here
//! and stay mechanical.

pub mod client;
pub mod gate;
pub mod ledger;
pub mod reconcile;
pub mod registry;
pub mod score;
pub mod status;
pub mod workspace;

pub use client::CaseServiceClient;
pub use gate::{AttestationAck, CaseGate, GateState};
pub use ledger::ExportLedger;
pub use registry::TemplateRegistry;
pub use status::DisplayStatus;
pub use workspace::{load_case_workspace, CaseWorkspace, LoadTicket, WorkspaceState};
