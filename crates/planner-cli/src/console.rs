//! Line-based operator console

use std::io::Write;

use async_trait::async_trait;
use planner_core::{AgentError, Operator, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Operator that reads answers line by line and prints output lines
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }
}

impl Console<BufReader<Stdin>, std::io::Stdout> {
    /// Console over the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }
}

#[async_trait]
impl<R, W> Operator for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        self.lines.next_line().await?.ok_or_else(|| {
            AgentError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed before a message was entered",
            ))
        })
    }

    fn show(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::warn!("console write failed: {}", e);
        }
    }
}
