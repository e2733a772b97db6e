//! Output formatting utilities

use crate::application::MigrationReport;

/// Format the end-of-run summary for display
pub fn format_report(report: &MigrationReport) -> String {
    let mut output = String::new();

    let verb = if report.dry_run { "Would migrate" } else { "Migrated" };
    let noun = if report.posts_written == 1 { "post" } else { "posts" };
    output.push_str(&format!("{} {} {}\n", verb, report.posts_written, noun));

    if report.collisions > 0 {
        output.push_str(&format!(
            "{} post(s) overwritten by a later post with the same date and slug\n",
            report.collisions
        ));
    }

    if report.skipped > 0 {
        output.push_str(&format!(
            "{} post(s) skipped because their slug is not a safe file name\n",
            report.skipped
        ));
    }

    if report.media_processing {
        let tags = &report.tags;
        output.push_str(&format!(
            "Image tags: {} converted, {} failed, {} left unchanged\n",
            tags.rewritten, tags.failed, tags.unrecognized
        ));
    } else {
        output.push_str("Image processing skipped\n");
    }

    output
}
