//! Size-bounded streaming copies.
//!
//! A [`SizeLimiter`] admits bytes until a byte budget is spent and refuses the
//! chunk that would cross it. [`copy_bounded`] drives a reader into a writer
//! through a limiter, so the writer never receives more than the budget.

use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// The byte budget of a [`SizeLimiter`] was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exceeds maximum size of {limit} byte(s)")]
pub struct LimitExceeded {
    /// The budget in bytes
    pub limit: u64,
}

/// Failure of [`copy_bounded`].
#[derive(Debug, Error)]
pub enum BoundedCopyError {
    /// More bytes were available than the budget allows
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceeded),

    /// Reading or writing failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Tracks bytes admitted against a fixed budget.
///
/// # Examples
///
/// ```rust
/// use breadcrumbs_cli::utils::SizeLimiter;
///
/// let mut limiter = SizeLimiter::new(10);
/// assert!(limiter.admit(6).is_ok());
/// assert!(limiter.admit(4).is_ok());
/// assert!(limiter.admit(1).is_err());
/// assert_eq!(limiter.admitted(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct SizeLimiter {
    limit: u64,
    admitted: u64,
}

impl SizeLimiter {
    /// Creates a limiter with a budget of `limit` bytes.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            admitted: 0,
        }
    }

    /// Bytes admitted so far.
    #[must_use]
    pub const fn admitted(&self) -> u64 {
        self.admitted
    }

    /// Checks a length that is about to be accepted, without spending it.
    ///
    /// # Errors
    ///
    /// Returns [`LimitExceeded`] if admitting `len` bytes would cross the budget.
    pub fn check(&self, len: u64) -> Result<(), LimitExceeded> {
        match self.admitted.checked_add(len) {
            Some(total) if total <= self.limit => Ok(()),
            _ => Err(LimitExceeded {
                limit: self.limit,
            }),
        }
    }

    /// Spends `len` bytes of the budget.
    ///
    /// A refused chunk does not change the admitted count.
    ///
    /// # Errors
    ///
    /// Returns [`LimitExceeded`] if the chunk would cross the budget.
    pub fn admit(&mut self, len: usize) -> Result<(), LimitExceeded> {
        let len = len as u64;
        self.check(len)?;
        self.admitted += len;
        Ok(())
    }
}

/// Copies `reader` into `writer`, refusing to write past the limiter's budget.
///
/// A source of exactly the budget copies successfully. A larger source fails
/// on the first chunk that would cross the budget; bytes before that chunk
/// have already been written and the caller is expected to discard them.
///
/// # Errors
///
/// - [`BoundedCopyError::LimitExceeded`] if the source holds more than the budget
/// - [`BoundedCopyError::Io`] on any read or write failure
pub async fn copy_bounded<R, W>(
    reader: &mut R,
    writer: &mut W,
    limiter: &mut SizeLimiter,
) -> Result<u64, BoundedCopyError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        limiter.admit(n)?;
        writer.write_all(&buf[..n]).await?;
    }

    writer.flush().await?;
    Ok(limiter.admitted())
}
