use std::io::{self, BufRead, BufReader, Write};

use tracing::debug;

use shared_models::{AppError, ValidationError};

/// Line-oriented console shared by every menu flow.
pub struct Console {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
    max_attempts: Option<usize>,
}

impl Console {
    pub fn new(
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
        max_attempts: Option<usize>,
    ) -> Self {
        Self {
            input,
            output,
            max_attempts,
        }
    }

    pub fn stdio(max_attempts: Option<usize>) -> Self {
        Self::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            max_attempts,
        )
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<usize>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.write_all(b"\n")?;
        self.output.flush()
    }

    /// Prints `prompt` and reads one line without its line ending.
    /// A closed input cancels the running operation; a line that is not
    /// UTF-8 is consumed and rejected as a parse error.
    pub fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        self.print(prompt)?;

        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            debug!("Console input closed");
            return Err(AppError::Cancelled);
        }

        while bytes.ends_with(b"\n") || bytes.ends_with(b"\r") {
            bytes.pop();
        }

        String::from_utf8(bytes).map_err(|_| {
            debug!("Rejected a line that is not UTF-8");
            AppError::from(ValidationError::NotUtf8 { field: "input" })
        })
    }

    /// One attempt only: a rejected value aborts the caller's operation.
    pub fn read_field<T, F>(&mut self, prompt: &str, parse: F) -> Result<T, AppError>
    where
        F: FnOnce(&str) -> Result<T, ValidationError>,
    {
        let line = self.read_line(prompt)?;
        parse(&line).map_err(AppError::from)
    }

    /// Re-prompts until `parse` accepts the line, the input closes, or the
    /// configured attempt limit is reached.
    pub fn prompt_until<T, F>(&mut self, prompt: &str, mut parse: F) -> Result<T, AppError>
    where
        F: FnMut(&str) -> Result<T, ValidationError>,
    {
        let mut attempts = 0usize;
        loop {
            let parsed = match self.read_line(prompt) {
                Ok(line) => parse(&line),
                Err(AppError::Parse(err)) => Err(err),
                Err(err) => return Err(err),
            };

            match parsed {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempts += 1;
                    self.println(&format!("ERROR: Invalid input for {}. {}", err.field(), err))?;

                    if self.max_attempts.is_some_and(|max| attempts >= max) {
                        debug!("Giving up on {} after {} attempts", err.field(), attempts);
                        return Err(AppError::from(err));
                    }
                }
            }
        }
    }
}
