pub mod algorithm;
pub mod hungarian;

pub use algorithm::AssignmentSolver;
pub use hungarian::HungarianSolver;
