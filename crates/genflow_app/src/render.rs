use chrono::{DateTime, Local};
use genflow_core::pipeline::{ConfidenceBucket, PipelinePhase, StageStatus};
use genflow_core::{AppViewModel, JobStatus, Notice, NoticeLevel, RetryTarget};

/// Text rendering of the view model, one line per visible fact.
pub fn view_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(reason) = &view.validation_error {
        lines.push(format!("! {reason}"));
    }
    if let Some(job_id) = view.job_id {
        lines.push(format!(
            "job {job_id}: {} (generate {}, detect {}, humanize {})",
            phase_label(view.phase),
            status_label(view.generation),
            status_label(view.detection),
            status_label(view.humanization),
        ));
    }
    if let Some(percent) = view.ai_percentage {
        lines.push(format!("AI likelihood: {percent}%"));
    }
    for phrase in &view.flagged_phrases {
        lines.push(format!(
            "  [{}] {}% \"{}\"",
            bucket_label(phrase.bucket),
            phrase.confidence_percent,
            phrase.phrase
        ));
    }
    if let Some(comparison) = &view.comparison {
        lines.push(format!(
            "Humanized version ready ({} phrases removed){}",
            comparison.phrases_removed_count,
            if comparison.dismissed { ", comparison closed" } else { "" }
        ));
    }
    if let Some(video) = &view.video {
        let status = match video.status {
            JobStatus::Idle if video.launching => "starting".to_string(),
            JobStatus::Idle => "no video".to_string(),
            JobStatus::Pending => format!("rendering, check {}/{}", video.attempts, video.max_attempts),
            JobStatus::Done => "ready".to_string(),
            JobStatus::Failed => "failed".to_string(),
        };
        lines.push(format!("video for {}: {status}", video.subject));
        if let Some(url) = &video.result_url {
            match video.generated_at.as_deref().and_then(local_time) {
                Some(at) => lines.push(format!("  {url} (generated {at})")),
                None => lines.push(format!("  {url}")),
            }
        }
    }
    if let Some(progress) = &view.progress {
        lines.push(format!(
            "scoring: {}/{} ({}%) {}",
            progress.processed, progress.total, progress.percentage_point, progress.message
        ));
    }
    lines
}

pub fn notice_line(notice: &Notice) -> String {
    let prefix = match notice.level {
        NoticeLevel::Info => "i",
        NoticeLevel::Warning => "!",
        NoticeLevel::Error => "x",
    };
    match notice.retry {
        Some(target) => format!("{prefix} {} (retry: {})", notice.message, retry_label(target)),
        None => format!("{prefix} {}", notice.message),
    }
}

fn local_time(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
}

fn phase_label(phase: PipelinePhase) -> String {
    match phase {
        PipelinePhase::Idle => "idle".to_string(),
        PipelinePhase::Generating => "generating".to_string(),
        PipelinePhase::Detecting => "checking for AI phrasing".to_string(),
        PipelinePhase::HumanizeDecision => "about to humanize".to_string(),
        PipelinePhase::Humanizing => "humanizing".to_string(),
        PipelinePhase::AwaitingReconciliation => "waiting for your choice".to_string(),
        PipelinePhase::Ready => "ready".to_string(),
        PipelinePhase::Failed(stage) => format!("{stage} failed"),
    }
}

fn status_label(status: StageStatus) -> &'static str {
    match status {
        StageStatus::NotStarted => "-",
        StageStatus::Running => "running",
        StageStatus::Succeeded => "ok",
        StageStatus::Failed => "failed",
    }
}

fn bucket_label(bucket: ConfidenceBucket) -> &'static str {
    match bucket {
        ConfidenceBucket::High => "high",
        ConfidenceBucket::Medium => "medium",
        ConfidenceBucket::Low => "low",
        ConfidenceBucket::Unflagged => "none",
    }
}

fn retry_label(target: RetryTarget) -> String {
    match target {
        RetryTarget::Stage(stage) => stage.to_string(),
        RetryTarget::VideoJob => "video".to_string(),
        RetryTarget::LongComputation => "scoring".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genflow_core::{SubjectKey, VideoView};

    #[test]
    fn video_line_shows_attempts_and_url() {
        let mut view = AppViewModel {
            video: Some(VideoView {
                subject: SubjectKey::new("project-a"),
                status: JobStatus::Pending,
                launching: false,
                attempts: 3,
                max_attempts: 75,
                result_url: None,
                generated_at: None,
            }),
            ..AppViewModel::default()
        };
        assert_eq!(view_lines(&view), vec!["video for project-a: rendering, check 3/75"]);

        if let Some(video) = view.video.as_mut() {
            video.status = JobStatus::Done;
            video.result_url = Some("https://cdn.example.com/a.mp4".to_string());
            video.generated_at = Some("not a timestamp".to_string());
        }
        assert_eq!(
            view_lines(&view),
            vec!["video for project-a: ready", "  https://cdn.example.com/a.mp4"]
        );
    }

    #[test]
    fn notice_carries_retry_target() {
        let notice = Notice::error("Scoring failed: timeout", RetryTarget::LongComputation);
        assert_eq!(notice_line(&notice), "x Scoring failed: timeout (retry: scoring)");
    }
}
