use std::sync::Arc;

use tracing::{debug, instrument};

use shared_database::{Database, Statement};
use shared_utils::Console;

use crate::models::ReportError;

pub struct ReportRunner {
    db: Arc<dyn Database>,
}

impl ReportRunner {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Prints the result tab-separated and returns how many rows it had.
    /// Column names are printed once, ahead of the first row; an empty
    /// result prints nothing but the closing blank line.
    #[instrument(skip_all)]
    pub async fn run(&self, statement: &Statement, console: &mut Console) -> Result<usize, ReportError> {
        let result = self.db.query(statement).await?;

        for (index, row) in result.rows.iter().enumerate() {
            if index == 0 {
                console.println(&format_row(&result.columns))?;
            }
            console.println(&format_row(row))?;
        }
        console.println("")?;

        debug!("Report printed {} rows", result.len());
        Ok(result.len())
    }
}

/// Every cell is followed by a tab, the last one included.
pub fn format_row<S: AsRef<str>>(cells: &[S]) -> String {
    cells.iter().fold(String::new(), |mut line, cell| {
        line.push_str(cell.as_ref());
        line.push('\t');
        line
    })
}
