//! Extract the audio track of a video with ffmpeg.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, ToolError};
use crate::external::ExternalProgram;
use crate::picture::has_extension;
use crate::report::Report;

pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mkv", "mov"];
pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Default output path: the video with an `.mp3` extension.
pub fn default_output(video: &Path) -> PathBuf {
    video.with_extension("mp3")
}

/// Arguments passed to ffmpeg: best VBR quality, audio streams only,
/// overwrite the target.
pub fn ffmpeg_args(video: &Path, audio: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        video.into(),
        "-q:a".into(),
        "0".into(),
        "-map".into(),
        "a".into(),
        "-y".into(),
        audio.into(),
    ]
}

fn validate(video: &Path, audio: &Path) -> Result<()> {
    if !video.is_file() {
        return Err(ToolError::MissingInput(video.to_path_buf()));
    }
    if !has_extension(video, &VIDEO_EXTENSIONS) {
        warn!(
            "{} does not look like a video ({}); trying anyway",
            video.display(),
            VIDEO_EXTENSIONS.join(", ")
        );
    }
    if !has_extension(audio, &AUDIO_EXTENSIONS) {
        return Err(ToolError::UnsupportedFormat(format!(
            "audio output must be .mp3 or .wav: {}",
            audio.display()
        )));
    }
    if video == audio {
        return Err(ToolError::InvalidInput("input and output are the same file".to_string()));
    }
    Ok(())
}

/// Write the audio of `video` to `audio` (or next to the video as mp3).
pub async fn extract_audio(ffmpeg: &ExternalProgram, video: &Path, audio: Option<&Path>) -> Result<Report> {
    let audio = audio.map(Path::to_path_buf).unwrap_or_else(|| default_output(video));
    validate(video, &audio)?;
    ffmpeg.ensure_available("-version").await?;

    if let Some(parent) = audio.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("Extracting audio from {}", video.display());
    ffmpeg.run(ffmpeg_args(video, &audio)).await?;

    let mut report = Report::new("audio-extract");
    report.push_output(&audio);
    Ok(report.with_summary(format!("extracted audio to {}", audio.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ffmpeg_command() {
        let args = ffmpeg_args(Path::new("clip.mp4"), Path::new("clip.mp3"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-i", "clip.mp4", "-q:a", "0", "-map", "a", "-y", "clip.mp3"]);
    }

    #[test]
    fn default_output_is_mp3() {
        assert_eq!(default_output(Path::new("/v/talk.mkv")), PathBuf::from("/v/talk.mp3"));
    }

    #[test]
    fn rejects_missing_video_and_bad_output() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        assert!(matches!(
            validate(&video, &dir.path().join("a.mp3")),
            Err(ToolError::MissingInput(_))
        ));

        std::fs::write(&video, b"").unwrap();
        assert!(matches!(
            validate(&video, &dir.path().join("a.ogg")),
            Err(ToolError::UnsupportedFormat(_))
        ));
        assert!(validate(&video, &dir.path().join("a.WAV")).is_ok());
    }
}
