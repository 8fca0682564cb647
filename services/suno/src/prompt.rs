//! Console input helpers

use std::io::{self, BufRead, Write};

use common::{SunoError, SunoResult};

/// Print a question and read one line from stdin
///
/// The read runs on the blocking pool so the runtime thread is not parked on
/// the terminal.
pub async fn ask(question: &str) -> SunoResult<String> {
    let question = question.to_string();

    let line = tokio::task::spawn_blocking(move || -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed before an answer was given",
            ));
        }
        Ok(line)
    })
    .await
    .map_err(|e| SunoError::Input(format!("Console reader failed: {}", e)))??;

    Ok(line.trim().to_string())
}
