//! Replying to the invoker, whatever shape the invocation came in.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use threadtext_core::ThreadTextConfig;
use tracing::{info, warn};
use uuid::Uuid;

pub const OVERSIZED_FILE_NOTICE: &str =
    "A file attempted to be sent was too large. Please tell your maintainer to look for file(s)";

/// A file sent along with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    pub files: Vec<OutgoingFile>,
}

impl ResponseOptions {
    pub fn with_file(mut self, filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.push(OutgoingFile {
            filename: filename.into(),
            bytes: bytes.into(),
        });
        self
    }
}

/// Identifies a delivered reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHandle {
    pub id: Uuid,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Message of {len} characters exceeds the {limit} character limit")]
    MessageTooLong { len: usize, limit: usize },

    #[error("Upload too large: {files:?}")]
    PayloadTooLarge { files: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Responder: Send + Sync {
    fn respond(
        &self,
        text: &str,
        options: ResponseOptions,
    ) -> impl Future<Output = Result<ResponseHandle, DeliveryError>> + Send;
}

/// Log `text`, then deliver it. An oversized upload is replaced by a notice
/// naming the files that were too large.
pub async fn respond_and_log<R: Responder>(
    responder: &R,
    text: &str,
    options: ResponseOptions,
) -> Result<ResponseHandle, DeliveryError> {
    info!("{}", text);
    match responder.respond(text, options).await {
        Err(DeliveryError::PayloadTooLarge { files }) => {
            let notice = format!("{}: {:?}", OVERSIZED_FILE_NOTICE, files);
            warn!("{}", notice);
            responder.respond(&notice, ResponseOptions::default()).await
        }
        other => other,
    }
}

/// Send `text` inline if it fits in one message, otherwise as an attachment
/// named `filename`.
pub async fn deliver_text<R: Responder>(
    responder: &R,
    text: &str,
    max_chars: usize,
    filename: &str,
) -> Result<ResponseHandle, DeliveryError> {
    let len = text.chars().count();
    if len <= max_chars {
        return respond_and_log(responder, text, ResponseOptions::default()).await;
    }
    let summary = format!("Text is {} characters; attached as {}.", len, filename);
    let options = ResponseOptions::default().with_file(filename, text.as_bytes());
    respond_and_log(responder, &summary, options).await
}

/// Writes replies to a terminal-like writer and attachments into a directory,
/// enforcing the platform's size limits.
pub struct ConsoleResponder<W> {
    out: Mutex<W>,
    output_dir: PathBuf,
    max_message_chars: usize,
    max_upload_bytes: u64,
}

impl ConsoleResponder<std::io::Stdout> {
    pub fn stdout(config: &ThreadTextConfig) -> Self {
        Self::new(
            std::io::stdout(),
            &config.output_dir,
            config.max_message_chars,
            config.max_upload_bytes,
        )
    }
}

impl<W: Write + Send> ConsoleResponder<W> {
    pub fn new(out: W, output_dir: &Path, max_message_chars: usize, max_upload_bytes: u64) -> Self {
        Self {
            out: Mutex::new(out),
            output_dir: output_dir.to_path_buf(),
            max_message_chars,
            max_upload_bytes,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Responder for ConsoleResponder<W> {
    async fn respond(
        &self,
        text: &str,
        options: ResponseOptions,
    ) -> Result<ResponseHandle, DeliveryError> {
        let len = text.chars().count();
        if len > self.max_message_chars {
            return Err(DeliveryError::MessageTooLong {
                len,
                limit: self.max_message_chars,
            });
        }

        let oversized: Vec<String> = options
            .files
            .iter()
            .filter(|f| f.bytes.len() as u64 > self.max_upload_bytes)
            .map(|f| f.filename.clone())
            .collect();
        if !oversized.is_empty() {
            return Err(DeliveryError::PayloadTooLarge { files: oversized });
        }

        let mut written = Vec::with_capacity(options.files.len());
        if !options.files.is_empty() {
            std::fs::create_dir_all(&self.output_dir)?;
        }
        for file in &options.files {
            // Only the final path component; attachment names never pick the directory.
            let name = Path::new(&file.filename)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "attachment".into());
            let path = self.output_dir.join(name);
            std::fs::write(&path, &file.bytes)?;
            written.push(path);
        }

        let mut out = self.out.lock();
        writeln!(out, "{}", text)?;
        for path in &written {
            writeln!(out, "[attached {}]", path.display())?;
        }
        out.flush()?;

        Ok(ResponseHandle { id: Uuid::new_v4() })
    }
}
