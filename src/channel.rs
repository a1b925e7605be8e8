//! Line-oriented command/response exchange with the controller
//!
//! Every request is one ASCII line terminated with CR+LF. Queries are answered
//! with exactly one newline-terminated line; commands get no reply. The
//! channel owns the transport and handles one exchange at a time.
//!
//! An exchange can be abandoned between the write and the read, for example
//! when the HTTP request driving it is dropped. The channel counts replies it
//! still owes the caller and reads them off the line before the next exchange,
//! so a late reply is never handed to the wrong request.

use crate::config::SerialConfig;
use crate::error::{LakeshoreError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::serial::Transport;
use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::time::{sleep, timeout};

/// Appended to every outgoing line
pub const LINE_TERMINATOR: &str = "\r\n";

/// Whether a request expects a reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Expects one reply line
    Query,
    /// Write only
    Command,
}

/// A formatted instrument request together with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    kind: RequestKind,
    text: String,
}

impl Request {
    pub fn query<S: Into<String>>(text: S) -> Self {
        Self {
            kind: RequestKind::Query,
            text: text.into(),
        }
    }

    pub fn command<S: Into<String>>(text: S) -> Self {
        Self {
            kind: RequestKind::Command,
            text: text.into(),
        }
    }

    /// Classify free-form operator text: a `?` anywhere makes it a query.
    pub fn classify<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        if text.contains('?') {
            Self::query(text)
        } else {
            Self::command(text)
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_query(&self) -> bool {
        self.kind == RequestKind::Query
    }

    /// Exact bytes put on the wire
    pub fn wire_line(&self) -> String {
        format!("{}{}", self.text, LINE_TERMINATOR)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Request/response contract between the device and whatever carries its bytes
#[async_trait]
pub trait InstrumentLink: Send {
    /// Send one request. Queries return the reply line verbatim (possibly
    /// empty or partial after a read timeout); commands return an empty string.
    async fn execute(&mut self, request: &Request) -> Result<String>;

    /// Read one reply line without sending anything
    async fn read_line(&mut self) -> Result<String>;

    /// Send operator text, classified with [`Request::classify`]
    async fn execute_raw(&mut self, text: &str) -> Result<String> {
        let request = Request::classify(text);
        self.execute(&request).await
    }
}

/// Command channel over a serial transport
pub struct SerialCommandChannel<T: Transport> {
    stream: BufStream<T>,
    read_timeout: Duration,
    query_delay: Duration,
    /// Queries written whose reply has not been read yet
    unread_replies: usize,
    logger: StructuredLogger,
}

impl<T: Transport> SerialCommandChannel<T> {
    pub fn new(transport: T, read_timeout: Duration, query_delay: Duration) -> Self {
        Self {
            stream: BufStream::new(transport),
            read_timeout,
            query_delay,
            unread_replies: 0,
            logger: get_logger_with_context(LogContext::new("channel")),
        }
    }

    /// Build a channel using the timing from the serial configuration
    pub fn from_config(transport: T, config: &SerialConfig) -> Self {
        let mut channel = Self::new(
            transport,
            Duration::from_millis(config.timeout_ms),
            Duration::from_millis(config.query_delay_ms),
        );
        channel.logger = get_logger_with_context(LogContext::new("channel").with_port(&config.port));
        channel
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn query_delay(&self) -> Duration {
        self.query_delay
    }

    /// Replies still owed by abandoned queries
    pub fn unread_replies(&self) -> usize {
        self.unread_replies
    }

    pub fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    async fn write_line(&mut self, request: &Request) -> Result<()> {
        let line = request.wire_line();
        self.stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| LakeshoreError::serial(format!("Failed to write '{}': {}", request, e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| LakeshoreError::serial(format!("Failed to flush '{}': {}", request, e)))
    }

    async fn read_reply(&mut self) -> Result<String> {
        let mut buf = Vec::with_capacity(32);
        let outcome = timeout(self.read_timeout, self.stream.read_until(b'\n', &mut buf)).await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::TimedOut => self.warn_short_read(buf.len()),
            Ok(Err(e)) => {
                return Err(LakeshoreError::serial(format!("Failed to read reply: {}", e)));
            }
            Err(_) => self.warn_short_read(buf.len()),
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Read and drop the replies of abandoned queries. The counter only drops
    /// once a line has been consumed, so this is safe to interrupt too.
    async fn discard_unread_replies(&mut self) -> Result<()> {
        while self.unread_replies > 0 {
            let stale = self.read_reply().await?;
            self.unread_replies -= 1;
            self.logger.warn(&format!(
                "Discarded reply of an abandoned query: '{}'",
                stale.trim_end()
            ));
        }
        Ok(())
    }

    fn warn_short_read(&self, received: usize) {
        self.logger.warn(&format!(
            "Read timed out after {:?} with {} byte(s) received",
            self.read_timeout, received
        ));
    }
}

#[async_trait]
impl<T: Transport> InstrumentLink for SerialCommandChannel<T> {
    async fn execute(&mut self, request: &Request) -> Result<String> {
        self.discard_unread_replies().await?;
        self.logger.debug(&format!("-> {}", request));

        // Counted before the write: a query dropped mid-write may still have
        // reached the instrument
        if request.is_query() {
            self.unread_replies += 1;
        }
        if let Err(e) = self.write_line(request).await {
            if request.is_query() {
                self.unread_replies -= 1;
            }
            return Err(e);
        }

        match request.kind() {
            RequestKind::Command => Ok(String::new()),
            RequestKind::Query => {
                if !self.query_delay.is_zero() {
                    sleep(self.query_delay).await;
                }
                let reply = self.read_reply().await?;
                self.unread_replies -= 1;
                self.logger.debug(&format!("<- {}", reply.trim_end()));
                Ok(reply)
            }
        }
    }

    async fn read_line(&mut self) -> Result<String> {
        let line = self.read_reply().await?;
        self.unread_replies = self.unread_replies.saturating_sub(1);
        Ok(line)
    }
}
