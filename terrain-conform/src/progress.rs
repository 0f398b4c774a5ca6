/// Progress bars shared by the pipeline stages
use indicatif::{ProgressBar, ProgressStyle};

/// Row progress bar for one stage; hidden bars cost nothing to update
pub fn stage_bar(rows: usize, message: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(rows as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{bar:40.green/blue}] {pos}/{len} rows ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("▉▊▋▌▍▎▏ "));
    }
    pb.set_message(message);
    pb
}
