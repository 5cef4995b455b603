//! Async API for non-blocking cleaning.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! copyclean = { version = "0.1", features = ["async"] }
//! ```

use crate::cleanup::CleaningResult;
use crate::error::{Error, Result};
use crate::settings::Settings;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Cleans text on the blocking pool.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> copyclean::Result<()> {
/// use copyclean::Settings;
///
/// let result = copyclean::async_api::clean("Hi there [1]".to_string(), Settings::default()).await?;
/// assert_eq!(result.plain_text, "Hi there");
/// # Ok(())
/// # }
/// ```
pub async fn clean(text: String, settings: Settings) -> Result<CleaningResult> {
    // Regex passes are CPU-bound; keep them off the async workers
    tokio::task::spawn_blocking(move || crate::clean(&text, &settings))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// Reads a UTF-8 file and cleans its contents.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> copyclean::Result<()> {
/// use copyclean::Settings;
///
/// let result = copyclean::async_api::clean_file("answer.txt", &Settings::default()).await?;
/// tokio::fs::write("answer.clean.txt", result.plain_text).await?;
/// # Ok(())
/// # }
/// ```
pub async fn clean_file(path: impl AsRef<Path>, settings: &Settings) -> Result<CleaningResult> {
    let text = fs::read_to_string(path).await?;
    clean(text, *settings).await
}

/// Reads an async reader to the end and cleans what it produced.
pub async fn clean_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    settings: &Settings,
) -> Result<CleaningResult> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    let text = String::from_utf8(data).map_err(|e| Error::InvalidInput(e.to_string()))?;
    clean(text, *settings).await
}
