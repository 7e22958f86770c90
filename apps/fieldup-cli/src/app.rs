//! Composition root: builds the transport and queue, feeds it the files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use fieldup_upload::{
    CredentialSource, EnvCredential, FileCredential, HttpTransport, QueueEvent, TaskState,
    UploadFile, UploadHandle, UploadOutcome, UploadQueue,
};
use tracing::{debug, error, info, warn};

use crate::config::FieldupConfig;

/// Environment variable holding the bearer token when no token file is set.
pub const TOKEN_ENV: &str = "FIELDUP_TOKEN";

/// Uploads `files` in order and returns how many did not succeed.
pub async fn run(files: &[PathBuf], config: FieldupConfig) -> anyhow::Result<usize> {
    let credentials: Arc<dyn CredentialSource> = match &config.token_file {
        Some(path) => Arc::new(FileCredential::new(path.clone())),
        None => Arc::new(EnvCredential::new(TOKEN_ENV)),
    };

    let transport = HttpTransport::new(&config.transport_config(), credentials)
        .context("failed to build HTTP transport")?;
    info!(endpoint = transport.endpoint(), "uploading");

    let queue = UploadQueue::new(Arc::new(transport), config.queue_config());
    let observer = tokio::spawn(log_events(queue.subscribe()));

    let mut failed = 0;
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let file = match UploadFile::open(path).await {
            Ok(file) => file,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot read file");
                failed += 1;
                continue;
            }
        };
        let name = file.name().to_string();
        match queue.enqueue(file) {
            Ok(handle) => handles.push((name, handle)),
            Err(e) => {
                error!(file = %name, error = %e, "cannot enqueue file");
                failed += 1;
            }
        }
    }

    for (name, handle) in handles {
        if !report(&name, handle).await {
            failed += 1;
        }
    }

    queue.shutdown().await;
    drop(queue);
    if let Err(e) = observer.await {
        warn!(error = %e, "event observer terminated abnormally");
    }

    Ok(failed)
}

/// Follows one upload to its end; returns `true` on success.
async fn report(name: &str, mut handle: UploadHandle) -> bool {
    while let Some(percent) = handle.progress().await {
        info!(file = %name, percent, "progress");
    }

    match handle.wait().await {
        Ok(UploadOutcome::Assembled { url }) => {
            println!("{name}\t{url}");
            true
        }
        Ok(UploadOutcome::Skipped) => {
            info!(file = %name, "empty file, nothing uploaded");
            true
        }
        Err(e) => {
            error!(file = %name, error = %e, "upload failed");
            false
        }
    }
}

async fn log_events(mut events: tokio::sync::broadcast::Receiver<QueueEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(QueueEvent::StateChanged { task_id, state }) => match state {
                TaskState::Retrying { chunk, attempt } => {
                    warn!(task_id, chunk, attempt, "retrying chunk");
                }
                state => debug!(task_id, ?state, "task state"),
            },
            Ok(QueueEvent::Progress { .. }) => {}
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "event observer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
