// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Streamed single-file copy between two backends.

use crate::backend::{FileReader, FileWriter, Filesystem};
use crate::config::TreeOptions;
use crate::error::{Error, Result};
use diagnostics::*;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Copy one file from `src_fs` to `dst_fs` with default options.
pub async fn copy_file<S, D>(src: &Path, src_fs: &S, dst: &Path, dst_fs: &D) -> Result<u64>
where
    S: Filesystem + ?Sized,
    D: Filesystem + ?Sized,
{
    copy_file_with(src, src_fs, dst, dst_fs, &TreeOptions::default()).await
}

/// Copy one file chunk by chunk, returning the number of bytes written.
///
/// Bytes are passed through unchanged. If the copy fails after the target
/// was opened, both handles are released and a target file left behind is
/// deleted before the original error is returned. An error from that
/// deletion replaces the original one.
pub async fn copy_file_with<S, D>(
    src: &Path,
    src_fs: &S,
    dst: &Path,
    dst_fs: &D,
    options: &TreeOptions,
) -> Result<u64>
where
    S: Filesystem + ?Sized,
    D: Filesystem + ?Sized,
{
    let mut reader = src_fs.open_reader(src).await?;
    let mut writer = dst_fs.open_writer(dst).await?;

    match pump(&mut reader, &mut writer, src, dst, options.chunk_size()).await {
        Ok(bytes) => {
            drop(reader);
            debug!(
                "copied {src} -> {dst} ({bytes} bytes)",
                src: src.display().to_string(),
                dst: dst.display().to_string(),
                bytes: bytes
            );
            Ok(bytes)
        }
        Err(err) => {
            drop(reader);
            drop(writer);

            if let Err(cleanup) = remove_partial(dst, dst_fs, &err).await {
                error!(
                    "could not remove partial copy {dst}, dropping original error: {reason}",
                    dst: dst.display().to_string(),
                    reason: err.to_string()
                );
                return Err(cleanup);
            }
            Err(err)
        }
    }
}

async fn remove_partial<D: Filesystem + ?Sized>(dst: &Path, dst_fs: &D, reason: &Error) -> Result<()> {
    if dst_fs.is_file(dst).await? {
        warn!(
            "removing partial copy {dst}: {reason}",
            dst: dst.display().to_string(),
            reason: reason.to_string()
        );
        dst_fs.delete_file(dst).await?;
    }
    Ok(())
}

/// Move bytes until the reader reports end of stream, then close the writer.
async fn pump(
    reader: &mut FileReader,
    writer: &mut FileWriter,
    src: &Path,
    dst: &Path,
    chunk_size: usize,
) -> Result<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buffer).await.map_err(Error::io_at(src))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buffer[..n])
            .await
            .map_err(Error::io_at(dst))?;
        total += n as u64;
    }
    writer.shutdown().await.map_err(Error::io_at(dst))?;
    Ok(total)
}
