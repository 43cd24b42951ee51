//! Best-effort download progress. Compiled out without the `progress` feature.

pub struct Progress {
    #[cfg(feature = "progress")]
    bar: Option<indicatif::ProgressBar>,
}

impl Progress {
    /// Start a bar sized from `total`, or a spinner when the size is unknown.
    pub fn start(label: &str, total: Option<u64>, enabled: bool) -> Self {
        #[cfg(feature = "progress")]
        {
            let bar = enabled.then(|| new_bar(label, total));
            Self { bar }
        }
        #[cfg(not(feature = "progress"))]
        {
            let _ = (label, total, enabled);
            Self {}
        }
    }

    pub fn inc(&self, n: u64) {
        #[cfg(feature = "progress")]
        {
            if let Some(bar) = &self.bar {
                bar.inc(n);
            }
        }
        #[cfg(not(feature = "progress"))]
        let _ = n;
    }

    pub fn finish(&self) {
        #[cfg(feature = "progress")]
        {
            if let Some(bar) = &self.bar {
                bar.finish_and_clear();
            }
        }
    }
}

#[cfg(feature = "progress")]
fn new_bar(label: &str, total: Option<u64>) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let bar = match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "  {prefix:20!} [{elapsed_precise}] [{bar:20!.bright.yellow/dim.white}] {bytes:>8}/{total_bytes:8}",
            ) {
                bar.set_style(style.progress_chars("━━╾─"));
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("  {spinner:.dim} {prefix:20!} {bytes:>8}")
            {
                bar.set_style(style);
            }
            bar
        }
    };
    bar.set_prefix(label.to_string());
    bar
}
