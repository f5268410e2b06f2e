//! Processing Orchestrator Use Case
//!
//! # Overview
//! The `Orchestrator` runs inside each launched task and executes the
//! ten-stage pipeline for one job: download, audio extraction, the
//! parallel audio (diarization → ASR) and visual (scene detection →
//! keyframes) branches, synchronization, classification, summarization,
//! artifact upload, and indexing.
//!
//! # State updates
//! The first stage transitions `dispatched → processing` by compare-and-
//! set; later stages advance the `stage` field and bump `progress` on the
//! existing `processing` row. Successful upload transitions to `completed`
//! with `progress = 1.0`. Any unrecovered fault writes a structured
//! failure report to the blob store and transitions to `failed`.
//!
//! # Degradation
//! Whether a stage fault fails the job comes from
//! [`PipelineStage::is_fatal`] alone: diarization degrades to a single
//! speaker, scene detection to fixed-interval boundaries, keyframes to
//! none, classification to a speaker-count heuristic, and indexing to a
//! warning with the job still completing. Soft timeouts count as stage
//! faults and follow the same policy.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use lifestream_domain::constants::FALLBACK_SCENE_INTERVAL_SECONDS;
use lifestream_domain::constants::{DURATION_DIVERGENCE_THRESHOLD, FALLBACK_SPEAKER_ID};
use lifestream_domain::entities::{
    AudioSegment, ContextType, DailySummary, FailureReport, JobState, Keyframe, PipelineStage,
    SpeakerRegistry, SynchronizedContext, TimeBlock, VideoMetadata,
};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{
    AsrEngine, BlobStore, Diarizer, JobMutation, JobTable, KeyframeExtractor, MediaProbe,
    MeetingClassifier, PipelineRunner, SceneDetector, Summarizer,
};
use lifestream_domain::value_objects::{SpeakerTurn, TaskInput, Waveform};

use crate::pipeline::blocks::{build_time_block, default_block, heuristic_context_type};
use crate::pipeline::markdown::render_markdown;
use crate::pipeline::synchronize::build_contexts;
use crate::settings::PipelineSettings;
use crate::use_cases::indexer::MemoryIndexer;

/// A stage fault carried up to the failure handler.
struct StageFault {
    stage: PipelineStage,
    error: Error,
}

/// Per-run bookkeeping: timings, written artifacts, row ownership.
struct TaskState {
    input: TaskInput,
    work_dir: PathBuf,
    timings: BTreeMap<String, f64>,
    artifacts: Vec<String>,
    processing_started: bool,
}

/// Executes the processing pipeline for one job.
pub struct Orchestrator {
    blob: Arc<dyn BlobStore>,
    jobs: Arc<dyn JobTable>,
    probe: Arc<dyn MediaProbe>,
    diarizer: Arc<dyn Diarizer>,
    asr: Arc<dyn AsrEngine>,
    scene_detector: Arc<dyn SceneDetector>,
    keyframe_extractor: Arc<dyn KeyframeExtractor>,
    classifier: Arc<dyn MeetingClassifier>,
    summarizer: Arc<dyn Summarizer>,
    indexer: Arc<MemoryIndexer>,
    settings: PipelineSettings,
}

impl Orchestrator {
    /// Create a new orchestrator with injected dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        blob: Arc<dyn BlobStore>,
        jobs: Arc<dyn JobTable>,
        probe: Arc<dyn MediaProbe>,
        diarizer: Arc<dyn Diarizer>,
        asr: Arc<dyn AsrEngine>,
        scene_detector: Arc<dyn SceneDetector>,
        keyframe_extractor: Arc<dyn KeyframeExtractor>,
        classifier: Arc<dyn MeetingClassifier>,
        summarizer: Arc<dyn Summarizer>,
        indexer: Arc<MemoryIndexer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            blob,
            jobs,
            probe,
            diarizer,
            asr,
            scene_detector,
            keyframe_extractor,
            classifier,
            summarizer,
            indexer,
            settings,
        }
    }

    async fn execute(
        &self,
        task: &mut TaskState,
        registry: &SpeakerRegistry,
    ) -> std::result::Result<DailySummary, StageFault> {
        let input = task.input.clone();

        // Stage 1: download
        let video_path = self
            .run_stage(task, PipelineStage::Download, self.download(&input))
            .await?;

        // Stage 2: audio extraction
        let (waveform, duration) = self
            .run_stage(
                task,
                PipelineStage::AudioExtraction,
                self.extract_audio(&video_path),
            )
            .await?;
        self.check_duration_divergence(task, duration);

        // Stages 3 and 4: the audio and visual branches run concurrently;
        // the parent future awaits both children, so a fatal fault in one
        // branch drops (cancels) the sibling. Row updates stay out of the
        // branches to keep stage writes serialized.
        self.begin_stage(task, PipelineStage::Diarization)
            .await
            .map_err(|error| StageFault {
                stage: PipelineStage::Diarization,
                error,
            })?;
        let audio_branch = self.audio_branch(&waveform, duration);
        let visual_branch = self.visual_branch(&video_path, duration);
        let ((segments, audio_timings), (keyframes, visual_timings)) =
            tokio::try_join!(audio_branch, visual_branch)?;
        self.record_branch_results(task, audio_timings.into_iter().chain(visual_timings))
            .await?;

        // Stage 5: synchronization
        let contexts = self
            .run_stage(task, PipelineStage::Synchronization, async {
                Ok(build_contexts(
                    &segments,
                    &keyframes,
                    duration,
                    self.settings.chunk_window_seconds,
                ))
            })
            .await?;

        // Stage 6: meeting classification (degrades per context)
        let context_types = self.classify_contexts(task, &contexts).await?;

        // Stage 7: summarization
        let blocks = self
            .run_stage(
                task,
                PipelineStage::Summarization,
                self.summarize_contexts(&contexts, &context_types, registry),
            )
            .await?;

        // Stage 8: upload artifacts and complete the job
        let summary = DailySummary {
            video_id: task.input.job_id.clone(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
            video_metadata: VideoMetadata {
                object_key: task.input.object_key.clone(),
                duration_seconds: duration,
            },
            time_blocks: blocks,
        };
        self.upload_and_complete(task, &summary).await?;

        Ok(summary)
    }

    /// Run one sequential stage with row bookkeeping and the soft timeout.
    ///
    /// Fatal stages propagate faults; degradable stages must not be run
    /// through this helper unless their future is infallible.
    async fn run_stage<T>(
        &self,
        task: &mut TaskState,
        stage: PipelineStage,
        work: impl Future<Output = Result<T>>,
    ) -> std::result::Result<T, StageFault> {
        self.begin_stage(task, stage)
            .await
            .map_err(|error| StageFault { stage, error })?;
        let started = Instant::now();
        let value = match tokio::time::timeout(self.settings.stage_timeout(stage), work).await {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => return Err(StageFault { stage, error }),
            Err(_) => {
                return Err(StageFault {
                    stage,
                    error: Error::StageTimeout {
                        stage: stage.as_str().to_owned(),
                        seconds: self.settings.stage_timeout(stage).as_secs(),
                    },
                });
            }
        };
        self.finish_stage(task, stage, started.elapsed().as_secs_f64())
            .await
            .map_err(|error| StageFault { stage, error })?;
        Ok(value)
    }

    async fn begin_stage(&self, task: &mut TaskState, stage: PipelineStage) -> Result<()> {
        let job_id = task.input.job_id.clone();
        let won = if task.processing_started {
            self.jobs
                .transition(
                    &job_id,
                    JobState::Processing,
                    JobState::Processing,
                    JobMutation {
                        stage: Some(stage),
                        ..JobMutation::default()
                    },
                )
                .await?
        } else {
            self.jobs
                .transition(
                    &job_id,
                    JobState::Dispatched,
                    JobState::Processing,
                    JobMutation::stage_advance(stage, 0.0),
                )
                .await?
        };
        if !won {
            return Err(Error::conflict(
                "job row is no longer owned by this task; aborting",
            ));
        }
        task.processing_started = true;
        info!(job_id = %job_id, stage = %stage, "Stage started");
        Ok(())
    }

    async fn finish_stage(
        &self,
        task: &mut TaskState,
        stage: PipelineStage,
        elapsed_seconds: f64,
    ) -> Result<()> {
        task.timings
            .insert(stage.as_str().to_owned(), elapsed_seconds);
        let won = self
            .jobs
            .transition(
                &task.input.job_id,
                JobState::Processing,
                JobState::Processing,
                JobMutation {
                    progress: Some(stage.progress_after()),
                    record_timing: Some((stage.as_str().to_owned(), elapsed_seconds)),
                    ..JobMutation::default()
                },
            )
            .await?;
        if !won {
            return Err(Error::conflict(
                "job row is no longer owned by this task; aborting",
            ));
        }
        Ok(())
    }

    async fn download(&self, input: &TaskInput) -> Result<PathBuf> {
        let bytes = self.blob.get(&input.object_key).await?;
        let file_name = input
            .object_key
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("input.bin");
        let dir = self.settings.work_dir.join(&input.job_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io_with_source("failed to create task work dir", e))?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::io_with_source("failed to write downloaded video", e))?;
        Ok(path)
    }

    async fn extract_audio(&self, video_path: &std::path::Path) -> Result<(Waveform, f64)> {
        let waveform = self.probe.extract_audio(video_path).await?;
        let probed = self.probe.probe_duration(video_path).await?;
        let duration = if probed > 0.0 {
            probed
        } else {
            waveform.duration_seconds()
        };
        Ok((waveform, duration))
    }

    /// Log when the uploader's duration hint and the probed stream
    /// duration disagree by more than the threshold. The probed duration
    /// wins for all subsequent stages either way.
    fn check_duration_divergence(&self, task: &TaskState, observed: f64) {
        let Some(hint) = task.input.client_duration_hint else {
            return;
        };
        if observed <= 0.0 || hint <= 0.0 {
            return;
        }
        let divergence = (hint - observed).abs() / observed;
        if divergence > DURATION_DIVERGENCE_THRESHOLD {
            warn!(
                job_id = %task.input.job_id,
                client_hint = hint,
                observed = observed,
                divergence = format!("{:.0}%", divergence * 100.0),
                "Client duration hint diverges from the probed stream duration"
            );
        }
    }

    /// Diarization (degradable) followed by ASR (fatal).
    async fn audio_branch(
        &self,
        waveform: &Waveform,
        duration: f64,
    ) -> std::result::Result<(Vec<AudioSegment>, Vec<(PipelineStage, f64)>), StageFault> {
        let mut timings = Vec::new();

        let started = Instant::now();
        let diarization_timeout = self.settings.stage_timeout(PipelineStage::Diarization);
        let turns =
            match tokio::time::timeout(diarization_timeout, self.diarizer.diarize(waveform)).await
            {
                Ok(Ok(turns)) => turns,
                Ok(Err(e)) => {
                    warn!(error = %e, "Diarization failed; degrading to a single speaker");
                    fallback_turns(waveform, duration)
                }
                Err(_) => {
                    warn!("Diarization timed out; degrading to a single speaker");
                    fallback_turns(waveform, duration)
                }
            };
        timings.push((PipelineStage::Diarization, started.elapsed().as_secs_f64()));

        let started = Instant::now();
        let asr_timeout = self.settings.stage_timeout(PipelineStage::Asr);
        let segments = match tokio::time::timeout(
            asr_timeout,
            self.asr.transcribe(waveform, &turns),
        )
        .await
        {
            Ok(Ok(segments)) => segments,
            Ok(Err(error)) => {
                return Err(StageFault {
                    stage: PipelineStage::Asr,
                    error,
                });
            }
            Err(_) => {
                return Err(StageFault {
                    stage: PipelineStage::Asr,
                    error: Error::StageTimeout {
                        stage: PipelineStage::Asr.as_str().to_owned(),
                        seconds: asr_timeout.as_secs(),
                    },
                });
            }
        };
        timings.push((PipelineStage::Asr, started.elapsed().as_secs_f64()));

        Ok((segments, timings))
    }

    /// Scene detection (degradable) followed by keyframes (degradable).
    async fn visual_branch(
        &self,
        video_path: &std::path::Path,
        duration: f64,
    ) -> std::result::Result<(Vec<Keyframe>, Vec<(PipelineStage, f64)>), StageFault> {
        let mut timings = Vec::new();

        let started = Instant::now();
        let detect_timeout = self.settings.stage_timeout(PipelineStage::SceneDetection);
        let mut boundaries = match tokio::time::timeout(
            detect_timeout,
            self.scene_detector
                .detect(video_path, self.settings.scene_detection_frame_skip),
        )
        .await
        {
            Ok(Ok(boundaries)) => boundaries,
            Ok(Err(e)) => {
                warn!(error = %e, "Scene detection failed; degrading to a fixed interval");
                Vec::new()
            }
            Err(_) => {
                warn!("Scene detection timed out; degrading to a fixed interval");
                Vec::new()
            }
        };
        // Zero boundaries (no scene changes, or a degraded detector) fall
        // back to fixed-interval sampling so keyframes still cover the
        // video.
        if boundaries.is_empty() {
            boundaries = fallback_boundaries(duration);
        }
        timings.push((
            PipelineStage::SceneDetection,
            started.elapsed().as_secs_f64(),
        ));

        let started = Instant::now();
        let keyframe_timeout = self.settings.stage_timeout(PipelineStage::Keyframes);
        let keyframes = match tokio::time::timeout(
            keyframe_timeout,
            self.keyframe_extractor.extract(video_path, &boundaries),
        )
        .await
        {
            Ok(Ok(frames)) => frames,
            Ok(Err(e)) => {
                warn!(error = %e, "Keyframe extraction failed; continuing without keyframes");
                Vec::new()
            }
            Err(_) => {
                warn!("Keyframe extraction timed out; continuing without keyframes");
                Vec::new()
            }
        };
        timings.push((PipelineStage::Keyframes, started.elapsed().as_secs_f64()));

        Ok((keyframes, timings))
    }

    /// Merge branch timings into the row after the join.
    async fn record_branch_results(
        &self,
        task: &mut TaskState,
        timings: impl Iterator<Item = (PipelineStage, f64)>,
    ) -> std::result::Result<(), StageFault> {
        for (stage, seconds) in timings {
            self.finish_stage(task, stage, seconds)
                .await
                .map_err(|error| StageFault { stage, error })?;
        }
        Ok(())
    }

    /// Classify every context, degrading to the speaker-count heuristic on
    /// a backend fault or a stage timeout.
    async fn classify_contexts(
        &self,
        task: &mut TaskState,
        contexts: &[SynchronizedContext],
    ) -> std::result::Result<Vec<ContextType>, StageFault> {
        let stage = PipelineStage::MeetingClassification;
        self.begin_stage(task, stage)
            .await
            .map_err(|error| StageFault { stage, error })?;
        let started = Instant::now();

        let classify_all = async {
            let mut types = Vec::with_capacity(contexts.len());
            for context in contexts {
                let context_type = match self.classifier.classify(context).await {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "Classification failed; using heuristic");
                        heuristic_context_type(context)
                    }
                };
                types.push(context_type);
            }
            types
        };
        let types = match tokio::time::timeout(self.settings.stage_timeout(stage), classify_all)
            .await
        {
            Ok(types) => types,
            Err(_) => {
                warn!("Classification timed out; using heuristic for all contexts");
                contexts.iter().map(heuristic_context_type).collect()
            }
        };

        self.finish_stage(task, stage, started.elapsed().as_secs_f64())
            .await
            .map_err(|error| StageFault { stage, error })?;
        Ok(types)
    }

    /// Summarize every context into a time block. Windows with neither
    /// audio nor visual signal skip the LLM and emit the default block.
    async fn summarize_contexts(
        &self,
        contexts: &[SynchronizedContext],
        context_types: &[ContextType],
        registry: &SpeakerRegistry,
    ) -> Result<Vec<TimeBlock>> {
        let mut blocks = Vec::with_capacity(contexts.len());
        for (context, context_type) in contexts.iter().zip(context_types) {
            if !context.has_audio() && !context.has_visual() {
                blocks.push(default_block(context));
                continue;
            }
            let summary = self.summarizer.summarize(context).await?;
            blocks.push(build_time_block(
                context,
                summary,
                registry,
                Some(*context_type),
            ));
        }
        Ok(blocks)
    }

    /// Stage 8: persist `summary.json` and `summary.md`, then transition to
    /// `completed` with `progress = 1.0`.
    async fn upload_and_complete(
        &self,
        task: &mut TaskState,
        summary: &DailySummary,
    ) -> std::result::Result<(), StageFault> {
        let stage = PipelineStage::Upload;
        self.begin_stage(task, stage)
            .await
            .map_err(|error| StageFault { stage, error })?;
        let started = Instant::now();

        let job_id = task.input.job_id.clone();
        let result_key = format!("results/{job_id}/summary.json");
        let markdown_key = format!("results/{job_id}/summary.md");

        // Returns the keys written so far alongside the outcome, so a
        // mid-stage fault still reports its partial artifacts.
        let upload = async {
            let mut written = Vec::new();
            let json = match serde_json::to_vec_pretty(summary) {
                Ok(json) => json,
                Err(e) => return (written, Err(Error::from(e))),
            };
            if let Err(e) = self.blob.put(&result_key, json, "application/json").await {
                return (written, Err(e));
            }
            written.push(result_key.clone());
            let markdown = render_markdown(summary);
            if let Err(e) = self
                .blob
                .put(&markdown_key, markdown.into_bytes(), "text/markdown")
                .await
            {
                return (written, Err(e));
            }
            written.push(markdown_key.clone());
            (written, Ok(()))
        };
        match tokio::time::timeout(self.settings.stage_timeout(stage), upload).await {
            Ok((written, outcome)) => {
                task.artifacts.extend(written);
                if let Err(error) = outcome {
                    return Err(StageFault { stage, error });
                }
            }
            Err(_) => {
                return Err(StageFault {
                    stage,
                    error: Error::StageTimeout {
                        stage: stage.as_str().to_owned(),
                        seconds: self.settings.stage_timeout(stage).as_secs(),
                    },
                });
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        task.timings.insert(stage.as_str().to_owned(), elapsed);
        let won = self
            .jobs
            .transition(
                &job_id,
                JobState::Processing,
                JobState::Completed,
                JobMutation {
                    progress: Some(1.0),
                    result_key: Some(result_key),
                    record_timing: Some((stage.as_str().to_owned(), elapsed)),
                    ..JobMutation::default()
                },
            )
            .await
            .map_err(|error| StageFault { stage, error })?;
        if !won {
            return Err(StageFault {
                stage,
                error: Error::conflict("job row is no longer owned by this task; aborting"),
            });
        }
        info!(job_id = %job_id, "Job completed");
        Ok(())
    }

    /// Stage 9: indexing runs after completion and never fails the job.
    async fn index_best_effort(&self, summary: &DailySummary) {
        let timeout = self.settings.stage_timeout(PipelineStage::Indexing);
        match tokio::time::timeout(timeout, self.indexer.index_summary(summary)).await {
            Ok(Ok(outcome)) if outcome.batches_failed > 0 => {
                warn!(
                    video_id = %summary.video_id,
                    batches_failed = outcome.batches_failed,
                    "Indexing completed partially"
                );
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!(video_id = %summary.video_id, error = %e, "Indexing failed; job stays completed");
            }
            Err(_) => {
                warn!(video_id = %summary.video_id, "Indexing timed out; job stays completed");
            }
        }
    }

    /// Write the failure report and mark the job failed.
    async fn fail(&self, task: &TaskState, fault: &StageFault) {
        let job_id = &task.input.job_id;
        error!(
            job_id = %job_id,
            stage = %fault.stage,
            error = %fault.error,
            "Pipeline failed"
        );

        let report = FailureReport::from_error(
            job_id.clone(),
            fault.stage,
            &fault.error,
            task.timings.clone(),
            task.artifacts.clone(),
        );
        let report_key = format!("results/{job_id}/failure_report.json");
        let mut mutation = JobMutation {
            error_summary: Some(report.summary()),
            ..JobMutation::default()
        };
        match serde_json::to_vec_pretty(&report) {
            Ok(bytes) => match self.blob.put(&report_key, bytes, "application/json").await {
                Ok(()) => mutation.failure_report_key = Some(report_key),
                Err(e) => error!(job_id = %job_id, error = %e, "Failed to upload failure report"),
            },
            Err(e) => error!(job_id = %job_id, error = %e, "Failed to serialize failure report"),
        }

        // The row may be processing (usual case) or still dispatched (fault
        // before the first stage transition).
        for expected in [JobState::Processing, JobState::Dispatched, JobState::Queued] {
            match self
                .jobs
                .transition(job_id, expected, JobState::Failed, mutation.clone())
                .await
            {
                Ok(true) => return,
                Ok(false) => continue,
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Failed to mark job failed");
                    return;
                }
            }
        }
        error!(job_id = %job_id, "Job was in an unexpected state while failing");
    }

    async fn cleanup_work_dir(&self, task: &TaskState) {
        if let Err(e) = tokio::fs::remove_dir_all(&task.work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    job_id = %task.input.job_id,
                    error = %e,
                    "Failed to clean up task work dir"
                );
            }
        }
    }
}

#[async_trait]
impl PipelineRunner for Orchestrator {
    async fn run(&self, input: TaskInput) -> Result<()> {
        let registry = match SpeakerRegistry::load(&self.settings.speaker_registry_path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!(error = %e, "Failed to load speaker registry; using an empty one");
                SpeakerRegistry::empty()
            }
        };

        let work_dir = self.settings.work_dir.join(&input.job_id);
        let mut task = TaskState {
            input,
            work_dir,
            timings: BTreeMap::new(),
            artifacts: Vec::new(),
            processing_started: false,
        };

        let outcome = self.execute(&mut task, &registry).await;
        self.cleanup_work_dir(&task).await;
        match outcome {
            Ok(summary) => {
                self.index_best_effort(&summary).await;
                Ok(())
            }
            Err(fault) => {
                self.fail(&task, &fault).await;
                Err(fault.error)
            }
        }
    }
}

/// Single-speaker fallback when diarization is unavailable. An empty
/// waveform yields no turns, so ASR still sees silence as silence.
fn fallback_turns(waveform: &Waveform, duration: f64) -> Vec<SpeakerTurn> {
    if waveform.is_empty() || duration <= 0.0 {
        return Vec::new();
    }
    vec![SpeakerTurn {
        start_seconds: 0.0,
        end_seconds: duration,
        speaker_id: FALLBACK_SPEAKER_ID.to_owned(),
    }]
}

/// Fixed-interval boundaries when scene detection is unavailable or found
/// no scene changes.
fn fallback_boundaries(duration: f64) -> Vec<f64> {
    if duration <= 0.0 {
        return Vec::new();
    }
    let mut boundaries = Vec::new();
    let mut t = 0.0;
    while t < duration {
        boundaries.push(t);
        t += FALLBACK_SCENE_INTERVAL_SECONDS;
    }
    boundaries
}
