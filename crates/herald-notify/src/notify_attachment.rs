//! Scoped token attachment files.
//!
//! The file lives in the temp directory under a random 10-character
//! alphanumeric stem with a `.txt` extension and is removed when the
//! [`TokenAttachment`] is closed or dropped.

use std::io::Write;
use std::path::Path;

use herald_tokens::{render_token_attachment, TokenRecord};
use tempfile::NamedTempFile;

use crate::notify_orchestrator::NotifyError;

const ATTACHMENT_STEM_CHARS: usize = 10;
const ATTACHMENT_SUFFIX: &str = ".txt";

#[derive(Debug)]
/// A written token attachment, deleted on drop.
pub struct TokenAttachment {
    file: NamedTempFile,
}

impl TokenAttachment {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the file, surfacing the removal error that drop would swallow.
    pub fn close(self) -> std::io::Result<()> {
        self.file.close()
    }
}

/// Writes `records` as a pretty JSON array into a new attachment file under `dir`,
/// or the system temp directory when `dir` is `None`.
pub fn write_token_attachment(
    records: &[TokenRecord],
    dir: Option<&Path>,
) -> Result<TokenAttachment, NotifyError> {
    let rendered = render_token_attachment(records).map_err(NotifyError::AttachmentEncode)?;
    let mut builder = tempfile::Builder::new();
    builder
        .prefix("")
        .suffix(ATTACHMENT_SUFFIX)
        .rand_bytes(ATTACHMENT_STEM_CHARS);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(NotifyError::Attachment)?;
    file.write_all(rendered.as_bytes())
        .and_then(|()| file.flush())
        .map_err(NotifyError::Attachment)?;
    Ok(TokenAttachment { file })
}
