use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Default chart directory under `base`: dashboard-{YYMMDD}
pub fn generate_default_output_dir(base: &Path) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    base.join(format!("dashboard-{:02}{:02}{:02}", year, month, day))
}
