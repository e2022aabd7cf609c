use crate::error::AppError;
use crate::models::WorkerConfig;
use embroidery_quant::{
    CancelToken, Palette, Pipeline, PipelineOutput, PipelineParams, QuantError, Raster, Stage,
};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Last completed stage of a running job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// `None` until the first stage finishes
    pub stage: Option<Stage>,
    pub percent: u8,
}

impl Progress {
    pub const STARTED: Progress = Progress {
        stage: None,
        percent: 0,
    };

    fn after(stage: Stage) -> Self {
        let percent = match stage {
            Stage::Input => 0,
            Stage::Filter => 33,
            Stage::Palette => 66,
            Stage::Dither => 100,
        };
        Self {
            stage: Some(stage),
            percent,
        }
    }
}

/// Runs pipelines off the async runtime with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct PipelineWorker {
    timeout: Duration,
    preview_max_size: usize,
}

impl PipelineWorker {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            timeout: config.timeout(),
            preview_max_size: config.preview_max_size,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a full pipeline run.
    pub fn submit(&self, raster: Raster, params: PipelineParams) -> PipelineJob {
        self.submit_with_cancel(raster, params, CancelToken::new())
    }

    /// Start a full pipeline run controlled by an existing token.
    pub fn submit_with_cancel(
        &self,
        raster: Raster,
        params: PipelineParams,
        cancel: CancelToken,
    ) -> PipelineJob {
        let (progress_tx, progress_rx) = watch::channel(Progress::STARTED);
        let token = cancel.clone();

        let handle = tokio::task::spawn_blocking(move || {
            Pipeline::new(params).run_with(&raster, &token, |stage| {
                let progress = Progress::after(stage);
                tracing::debug!(stage = %stage, percent = progress.percent, "stage complete");
                progress_tx.send_replace(progress);
            })
        });

        PipelineJob {
            cancel,
            handle,
            progress: progress_rx,
            timeout: self.timeout,
        }
    }

    /// Start a pipeline run on a copy of `raster` shrunk to the preview size.
    pub fn submit_preview(&self, raster: &Raster, params: PipelineParams) -> PipelineJob {
        let preview = raster.downscale_to_fit(self.preview_max_size);
        tracing::debug!(
            width = preview.width(),
            height = preview.height(),
            "preview raster"
        );
        self.submit(preview, params)
    }

    /// Start filtering and dithering against a retained palette.
    pub fn submit_apply(
        &self,
        raster: Raster,
        params: PipelineParams,
        palette: Palette,
    ) -> PipelineJob {
        let (progress_tx, progress_rx) = watch::channel(Progress::STARTED);
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let handle = tokio::task::spawn_blocking(move || -> Result<PipelineOutput, QuantError> {
            let output = Pipeline::new(params).apply_palette(&raster, &palette, &token)?;
            progress_tx.send_replace(Progress::after(Stage::Dither));
            Ok(output)
        });

        PipelineJob {
            cancel,
            handle,
            progress: progress_rx,
            timeout: self.timeout,
        }
    }

    /// Run a full pipeline and wait for it.
    pub async fn process(
        &self,
        raster: Raster,
        params: PipelineParams,
    ) -> Result<PipelineOutput, AppError> {
        self.submit(raster, params).wait().await
    }
}

/// Handle to a submitted pipeline run
#[derive(Debug)]
pub struct PipelineJob {
    cancel: CancelToken,
    handle: JoinHandle<Result<PipelineOutput, QuantError>>,
    progress: watch::Receiver<Progress>,
    timeout: Duration,
}

impl PipelineJob {
    /// Request cancellation; the run stops before its next stage.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Receiver that observes stage completions.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Wait for the run to finish.
    ///
    /// When the timeout elapses first, the job is cancelled and
    /// [`QuantError::Timeout`] is returned; the blocking task stops at its
    /// next stage boundary.
    pub async fn wait(self) -> Result<PipelineOutput, AppError> {
        let PipelineJob {
            cancel,
            mut handle,
            timeout,
            ..
        } = self;

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(joined) => Ok(joined??),
            Err(_) => {
                cancel.cancel();
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Pipeline timed out, cancelling"
                );
                Err(QuantError::Timeout(timeout).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentages() {
        assert_eq!(Progress::after(Stage::Filter).percent, 33);
        assert_eq!(Progress::after(Stage::Palette).percent, 66);
        assert_eq!(Progress::after(Stage::Dither).percent, 100);
        assert_eq!(Progress::STARTED.stage, None);
    }

    #[test]
    fn test_worker_from_config() {
        let worker = PipelineWorker::new(&WorkerConfig {
            timeout_secs: 7,
            preview_max_size: 64,
        });
        assert_eq!(worker.timeout(), Duration::from_secs(7));
        assert_eq!(worker.preview_max_size, 64);
    }
}
