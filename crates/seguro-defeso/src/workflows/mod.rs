pub mod cases;
pub mod eligibility;
pub mod intake;
