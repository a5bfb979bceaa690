use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use shared_database::{Database, DatabaseError, QueryResult, Statement};

use crate::console::Console;

/// Shared in-memory sink standing in for stdout.
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Console fed from `input` with no attempt limit, plus a handle on what it printed.
pub fn scripted_console(input: &str) -> (Console, CapturedOutput) {
    scripted_console_bytes(input.as_bytes())
}

/// Same as `scripted_console`, for input that need not be UTF-8.
pub fn scripted_console_bytes(input: &[u8]) -> (Console, CapturedOutput) {
    let output = CapturedOutput::default();
    let console = Console::new(
        Box::new(Cursor::new(input.to_vec())),
        Box::new(output.clone()),
        None,
    );
    (console, output)
}

pub fn rows(columns: &[&str], values: &[&[&str]]) -> QueryResult {
    QueryResult::new(
        columns.iter().map(|c| c.to_string()).collect(),
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
}

pub fn empty(columns: &[&str]) -> QueryResult {
    rows(columns, &[])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Query(Statement),
    Execute(Statement),
    Begin,
    Commit,
    Rollback,
    Close,
}

#[derive(Default)]
struct ScriptState {
    query_responses: VecDeque<Result<QueryResult, DatabaseError>>,
    execute_overrides: Vec<(String, Result<u64, DatabaseError>)>,
    calls: Vec<RecordedCall>,
}

/// Database double that answers queries from a queue, in order, and records
/// every call. Executes succeed with one affected row unless an override was
/// registered for a matching SQL fragment.
#[derive(Default)]
pub struct ScriptedDatabase {
    state: Mutex<ScriptState>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn respond(self, result: QueryResult) -> Self {
        self.state().query_responses.push_back(Ok(result));
        self
    }

    pub fn respond_error(self, error: DatabaseError) -> Self {
        self.state().query_responses.push_back(Err(error));
        self
    }

    pub fn fail_execute(self, sql_fragment: &str, error: DatabaseError) -> Self {
        self.state()
            .execute_overrides
            .push((sql_fragment.to_string(), Err(error)));
        self
    }

    pub fn affect_rows(self, sql_fragment: &str, affected: u64) -> Self {
        self.state()
            .execute_overrides
            .push((sql_fragment.to_string(), Ok(affected)));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Execute(stmt) => Some(stmt),
                _ => None,
            })
            .collect()
    }

    pub fn queried(&self) -> Vec<Statement> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Query(stmt) => Some(stmt),
                _ => None,
            })
            .collect()
    }

    /// Statements whose SQL starts with INSERT, UPDATE or DELETE, whether
    /// they went through `execute` or through `query` with RETURNING.
    pub fn writes(&self) -> Vec<Statement> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Execute(stmt) | RecordedCall::Query(stmt) => Some(stmt),
                _ => None,
            })
            .filter(|stmt| {
                let sql = stmt.sql().trim_start().to_uppercase();
                sql.starts_with("INSERT") || sql.starts_with("UPDATE") || sql.starts_with("DELETE")
            })
            .collect()
    }

    pub fn pending_responses(&self) -> usize {
        self.state().query_responses.len()
    }
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn execute(&self, statement: &Statement) -> Result<u64, DatabaseError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::Execute(statement.clone()));

        let result = state
            .execute_overrides
            .iter()
            .find(|(fragment, _)| statement.sql().contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or(Ok(1));
        result
    }

    async fn query(&self, statement: &Statement) -> Result<QueryResult, DatabaseError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::Query(statement.clone()));
        let response = state.query_responses.pop_front();
        response.unwrap_or_else(|| {
            Err(DatabaseError::Query(format!(
                "no scripted response for: {}",
                statement.sql()
            )))
        })
    }

    async fn begin(&self) -> Result<(), DatabaseError> {
        self.state().calls.push(RecordedCall::Begin);
        Ok(())
    }

    async fn commit(&self) -> Result<(), DatabaseError> {
        self.state().calls.push(RecordedCall::Commit);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DatabaseError> {
        self.state().calls.push(RecordedCall::Rollback);
        Ok(())
    }

    async fn close(&self) {
        self.state().calls.push(RecordedCall::Close);
    }
}
