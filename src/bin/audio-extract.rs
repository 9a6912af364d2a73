//! Audio Extract - save the audio track of a video with ffmpeg
//!
//! Runs `ffmpeg -i VIDEO -q:a 0 -map a -y AUDIO`. Ctrl-C stops ffmpeg.
//! Set `SANYUAN_FFMPEG` when ffmpeg is not on PATH.
//!
//! ```bash
//! audio-extract lecture.mp4
//! audio-extract lecture.mkv -o lecture.wav
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::AudioExtractArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(AudioExtractArgs::parse()).await
}
