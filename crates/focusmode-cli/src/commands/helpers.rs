//! Formatting helpers for terminal output

/// Render seconds as `MM:SS`, or `H:MM:SS` from one hour up
pub fn format_clock(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Fixed-width ASCII progress bar, e.g. `[#####-----]`
pub fn progress_bar(done: u64, total: u64, width: usize) -> String {
    let filled = if total == 0 {
        width
    } else {
        let cells = done.min(total) * width as u64 / total;
        usize::try_from(cells).unwrap_or(width)
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Whole percentage of `done` over `total`
pub fn percent(done: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        done.min(total) * 100 / total
    }
}
