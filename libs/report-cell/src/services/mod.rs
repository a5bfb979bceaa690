pub mod queries;
pub mod runner;

pub use runner::ReportRunner;
