//! # bridge-types
//!
//! Domain model for the Solana contract bridge: self-validating value
//! objects and the [`Contract`] aggregate whose status gates every stage.
//!
//! ```text
//! CodeParams ─▶ Contract(Pending) ─▶ Code ─▶ Generated ─▶ AnalysisResult ─▶ Analyzed ─▶ ProgramId ─▶ Deployed
//! ```
//!
//! Value objects validate on construction (and on deserialization), so a
//! `Code`, `ProgramId`, `Network` or `Severity` in hand is always valid.

#![deny(unsafe_code)]

pub mod code;
pub mod contract;
pub mod error;
pub mod finding;
pub mod params;
pub mod program_id;
pub mod status;

pub use code::{Code, REQUIRED_HEADER};
pub use contract::{Contract, ContractId, ContractView};
pub use error::{ContractError, ContractResult};
pub use finding::{AnalysisResult, Severity, ValidationError};
pub use params::{CodeParams, Network};
pub use program_id::{ProgramId, PROGRAM_ID_LEN};
pub use status::{ContractStatus, StatusType};
