//! Honeypot / tax risk adapter
//!
//! Provider chain: GoPlus (primary) -> honeypot.is (secondary) -> local
//! bytecode heuristic.

pub mod assessor;
pub mod goplus;
pub mod honeypot_is;

pub use assessor::ChainedRiskAssessor;
pub use goplus::GoPlusSource;
pub use honeypot_is::HoneypotIsSource;
