//! Image analysis and audio transcription.

use tracing::warn;
use uuid::Uuid;

use mnema_core::{
    DetectedLabel, Error, ImageAnalysis, MimeCategory, Result, TranscriptPayload,
    TranscriptionStatus,
};

use crate::gather::gather_single;
use crate::guard::ensure_content_access;
use crate::normalize::{clamp_unit, fallback_image_analysis, normalize_image_analysis};
use crate::prompt::PromptTemplate;
use crate::Collaborators;

/// Outcome of a transcription request: finished payload, or a job
/// handle the caller polls.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutcome {
    Complete(TranscriptPayload),
    Pending { job_id: String },
}

/// Analyze one image item.
///
/// Text detection and label detection run in parallel and are joined
/// before the generative step; a failure in either is tolerated with
/// an empty result for that half. A generative failure or unparseable
/// reply degrades to the fixed fallback, which keeps the detected
/// text.
pub async fn run_image_analysis(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    content_id: Uuid,
) -> Result<ImageAnalysis> {
    let record =
        ensure_content_access(collab.metadata.as_ref(), caller_id, scope_id, content_id).await?;
    if record.mime_category != MimeCategory::Image {
        return Err(Error::Validation(
            "Image analysis requires an image item".to_string(),
        ));
    }

    let candidate = gather_single(collab.storage.as_ref(), &record).await?;
    let image = candidate
        .bytes()
        .ok_or_else(|| Error::Internal("Image candidate missing bytes".to_string()))?;

    let (text_result, label_result) = tokio::join!(
        collab.perception.detect_text(image),
        collab.perception.detect_labels(image),
    );
    let lines = text_result.unwrap_or_else(|e| {
        warn!(candidate_id = %content_id, error = %e, "Text detection failed");
        Vec::new()
    });
    let labels = label_result.unwrap_or_else(|e| {
        warn!(candidate_id = %content_id, error = %e, "Label detection failed");
        Vec::new()
    });

    let detected_text = lines.join("\n");
    let evidence = perception_evidence(&lines, &labels);
    let prompt = PromptTemplate::image_analysis().build(&[&evidence]);

    match collab.generation.generate(&prompt.render()).await {
        Ok(raw) => Ok(normalize_image_analysis(&raw, &detected_text)),
        Err(e) => {
            warn!(
                candidate_id = %content_id,
                error = %e,
                "Image analysis generation failed; using fallback"
            );
            Ok(fallback_image_analysis(&detected_text))
        }
    }
}

fn perception_evidence(lines: &[String], labels: &[DetectedLabel]) -> String {
    let labels_text = labels
        .iter()
        .map(|l| format!("{} ({:.2})", l.name, l.confidence))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Detected labels: {}\nDetected text:\n{}",
        if labels_text.is_empty() {
            "none"
        } else {
            &labels_text
        },
        if lines.is_empty() {
            "none".to_string()
        } else {
            lines.join("\n")
        }
    )
}

/// Start transcription for one audio item.
///
/// If the speech service reports completion synchronously the
/// finished transcript is returned; otherwise the job handle surfaces
/// as accepted-but-pending.
pub async fn run_transcription(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    content_id: Uuid,
) -> Result<TranscriptionOutcome> {
    let record =
        ensure_content_access(collab.metadata.as_ref(), caller_id, scope_id, content_id).await?;
    if record.mime_category != MimeCategory::Audio {
        return Err(Error::Validation(
            "Transcription requires an audio item".to_string(),
        ));
    }

    let job = collab.speech.start_transcription(&record.storage_key).await?;
    job_outcome(job.status, job.transcript, job.job_id)
}

/// Poll a previously started transcription job.
pub async fn poll_transcription(
    collab: &Collaborators,
    job_id: &str,
) -> Result<TranscriptionOutcome> {
    let job = collab.speech.get_transcription(job_id).await?;
    job_outcome(job.status, job.transcript, job.job_id)
}

fn job_outcome(
    status: TranscriptionStatus,
    transcript: Option<TranscriptPayload>,
    job_id: String,
) -> Result<TranscriptionOutcome> {
    match status {
        TranscriptionStatus::Completed => {
            let mut payload = transcript.ok_or_else(|| {
                Error::Upstream("Completed transcription job carried no transcript".to_string())
            })?;
            payload.confidence = clamp_unit(payload.confidence);
            Ok(TranscriptionOutcome::Complete(payload))
        }
        TranscriptionStatus::InProgress => Ok(TranscriptionOutcome::Pending { job_id }),
        TranscriptionStatus::Failed => {
            Err(Error::Upstream("Transcription job failed".to_string()))
        }
    }
}
