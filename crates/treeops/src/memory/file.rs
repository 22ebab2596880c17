// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Cursor;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// Shared, mutable content of an in-memory file.
///
/// Uses a std mutex because it is locked from `poll_write`, which
/// cannot await. Critical sections never span a suspension point.
#[derive(Clone, Default)]
pub struct MemoryContent(Arc<Mutex<Vec<u8>>>);

impl MemoryContent {
    fn snapshot(&self) -> std::io::Result<Vec<u8>> {
        self.0
            .lock()
            .map(|content| content.clone())
            .map_err(|_| poisoned())
    }

    pub fn truncate(&self) -> std::io::Result<()> {
        self.0
            .lock()
            .map(|mut content| content.clear())
            .map_err(|_| poisoned())
    }

    /// Reader over the content as it is right now.
    pub fn reader(&self) -> std::io::Result<Cursor<Vec<u8>>> {
        self.snapshot().map(Cursor::new)
    }

    pub fn writer(&self) -> MemoryWriter {
        MemoryWriter {
            content: self.clone(),
            closed: false,
        }
    }
}

fn poisoned() -> std::io::Error {
    std::io::Error::other("memory file lock poisoned")
}

/// Write-through writer: every chunk lands in the file as soon as it is
/// written, so a partially written file is visible if the writer is
/// abandoned half way.
pub struct MemoryWriter {
    content: MemoryContent,
    closed: bool,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        if self.closed {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write after shutdown",
            )));
        }
        let result = self
            .content
            .0
            .lock()
            .map(|mut content| {
                content.extend_from_slice(buf);
                buf.len()
            })
            .map_err(|_| poisoned());
        Poll::Ready(result)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.closed = true;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_writer_is_write_through() {
        let content = MemoryContent::default();
        let mut writer = content.writer();
        writer.write_all(b"abc").await.expect("write");
        assert_eq!(content.snapshot().expect("snapshot"), b"abc");

        writer.shutdown().await.expect("shutdown");
        assert!(writer.write_all(b"d").await.is_err());
        assert_eq!(content.snapshot().expect("snapshot"), b"abc");
    }
}
