//! Bounded-concurrency batch fetching.

use std::{
    io::Write,
    num::NonZeroU32,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use reqwest::Client;
use tokio::sync::Semaphore;
use url::Url;

use crate::{
    asset::FetchJob,
    error::{KagamiError, KagamiResult},
};

/// Fetches batches of [`FetchJob`]s with a bounded number of requests in
/// flight. A failed job leaves its target file absent without aborting its
/// siblings; only an external interrupt aborts the whole batch.
pub struct ParallelFetcher {
    client: Client,
    run_id: String,
    concurrency: NonZeroU32,
    permits: Arc<Semaphore>,
    verbose: bool,
}

impl ParallelFetcher {
    pub fn new(
        client: Client,
        run_id: impl Into<String>,
        concurrency: NonZeroU32,
        verbose: bool,
    ) -> Self {
        Self {
            client,
            run_id: run_id.into(),
            concurrency,
            permits: Arc::new(Semaphore::new(concurrency.get() as usize)),
            verbose,
        }
    }

    /// Attempts every job in the batch, skipping files that already exist,
    /// and returns once in-flight connections have drained. Jobs with a
    /// scheme other than http/https fail the batch before any request is
    /// issued.
    pub async fn fetch_all(&self, jobs: Vec<FetchJob>) -> KagamiResult<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => Err(KagamiError::Interrupted),
            result = self.run_batch(jobs) => result,
        }
    }

    async fn run_batch(&self, jobs: Vec<FetchJob>) -> KagamiResult<()> {
        let mut batch = Vec::with_capacity(jobs.len());
        for job in jobs {
            let scheme = protocol(&job.url)?;
            batch.push((scheme, job));
        }

        let count = batch.len();
        for (i, (scheme, job)) in batch.into_iter().enumerate() {
            let permit = self.permits.clone().acquire_owned().await.unwrap();
            let client = self.client.clone();
            let run_id = self.run_id.clone();
            let verbose = self.verbose;

            tokio::spawn(async move {
                let result = download_one(client, &job, scheme, &run_id, verbose, i + 1, count).await;
                if let Err(error) = result {
                    tracing::error!("Error opening connection `{url}`: {error}", url = job.url);
                }
                drop(permit);
            });
        }

        // wait for every spawned job to finish
        let _ = self
            .permits
            .acquire_many(self.concurrency.get())
            .await
            .unwrap();

        // let in-flight connections drain before the next stage reads the files
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(())
    }
}

async fn download_one(
    client: Client,
    job: &FetchJob,
    scheme: &'static str,
    run_id: &str,
    verbose: bool,
    index: usize,
    count: usize,
) -> KagamiResult<()> {
    if job.path.exists() {
        return Ok(());
    }

    if verbose {
        tracing::info!("[{scheme} @ {run_id}] Opening `{url}` for reading", url = job.url);
    }
    progress(index, count);

    let response = client.get(&job.url).send().await?;
    if !response.status().is_success() {
        return Err(KagamiError::HttpError(response.status()));
    }
    let bytes = response.bytes().await?;

    write_atomic(&job.path, &bytes).await
}

/// Status line each job overwrites as it starts.
fn progress(index: usize, count: usize) {
    let percentage = format!("{}%", (index as f64 / count as f64 * 100.0).round());
    print!("count={count:<4} index={index:<4} progress={percentage:<6}\r");
    let _ = std::io::stdout().flush();
}

/// Writes through a sibling temporary file so a failed download never leaves
/// partial content at `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> KagamiResult<()> {
    let partial = partial_path(path);
    if let Err(error) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(error.into());
    }
    tokio::fs::rename(&partial, path).await?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Scheme of `url`, restricted to plain HTTP(S).
fn protocol(url: &str) -> KagamiResult<&'static str> {
    let parsed =
        Url::parse(url).map_err(|_| KagamiError::UnsupportedProtocol(url.to_string()))?;
    match parsed.scheme() {
        "https" => Ok("https"),
        "http" => Ok("http"),
        _ => Err(KagamiError::UnsupportedProtocol(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol() {
        assert_eq!(protocol("https://example.com/a.ts").unwrap(), "https");
        assert_eq!(protocol("http://example.com/a.ts").unwrap(), "http");
        assert!(matches!(
            protocol("ftp://example.com/a.ts"),
            Err(KagamiError::UnsupportedProtocol(_))
        ));
        assert!(matches!(
            protocol("seg-000.ts"),
            Err(KagamiError::UnsupportedProtocol(_))
        ));
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("tmp/run/seg_v0.ts")),
            Path::new("tmp/run/seg_v0.ts.part")
        );
    }
}
