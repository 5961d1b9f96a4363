use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// An uploaded file spooled to transient storage for the lifetime of one request.
///
/// The backing file is removed when this value is dropped, whichever way the
/// request ends.
#[derive(Debug)]
pub struct SpooledUpload {
    file: NamedTempFile,
    writer: Option<tokio::fs::File>,
    size: usize,
}

impl SpooledUpload {
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("pdfhelper-upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(file.reopen()?);

        tracing::debug!(path = %file.path().display(), "Spooling upload to temporary file");

        Ok(Self {
            file,
            writer: Some(writer),
            size: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "upload already finished")
        })?;
        writer.write_all(chunk).await?;
        self.size += chunk.len();
        Ok(())
    }

    /// Flushes and closes the write handle. Further writes fail.
    pub async fn finish(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.sync_all().await?;
        }
        Ok(())
    }

    /// Where the spooled bytes live. Every read goes through here.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub async fn read_contents(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spooled_bytes_round_trip_and_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = SpooledUpload::create_in(dir.path()).unwrap();
        upload.write_chunk(b"%PDF-1.4\n").await.unwrap();
        upload.write_chunk(b"rest of file").await.unwrap();
        upload.finish().await.unwrap();

        assert_eq!(upload.size(), 21);
        assert_eq!(upload.read_contents().await.unwrap(), b"%PDF-1.4\nrest of file");

        let path = upload.path().to_path_buf();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn writes_after_finish_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut upload = SpooledUpload::create_in(dir.path()).unwrap();
        upload.finish().await.unwrap();
        assert!(upload.write_chunk(b"late").await.is_err());
        assert_eq!(upload.size(), 0);
    }
}
