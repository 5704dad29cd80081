//! Move representation shared by move generation, execution, and the
//! analyzer.

pub mod types;
