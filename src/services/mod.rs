pub mod account_deletion;
pub mod report;

pub use account_deletion::{AccountDeletionService, DeletionError, DeletionOutcome, DeletionStage};
pub use report::{CascadeReport, StepOutcome};
