//! Prompt rendering for the canvas digest.
//!
//! The rendered form is stable and human-diffable: it doubles as the prompt
//! payload and as a debugging/log artifact.

use super::Digest;

/// Render a digest into the stable textual form sent to the reasoning service.
pub fn format_for_prompt(digest: &Digest) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Canvas {} ({} x {})\n",
        digest.document_id, digest.canvas_size.width, digest.canvas_size.height
    ));
    out.push_str(&format!("Objects: {} total", digest.total_objects));
    if digest.truncated {
        out.push_str(&format!(" (showing {})", digest.objects.len()));
    }
    out.push('\n');

    if !digest.kind_counts.is_empty() {
        let breakdown: Vec<String> = digest
            .kind_counts
            .iter()
            .map(|(kind, count)| format!("{}: {}", kind, count))
            .collect();
        out.push_str(&format!("By type: {}\n", breakdown.join(", ")));
    }

    for object in &digest.objects {
        let mut line = format!(
            "- {} {} at ({}, {}) size {}x{} color {}",
            object.id, object.kind, object.x, object.y, object.width, object.height, object.color
        );
        if object.rotation != 0.0 {
            line.push_str(&format!(" rotation {}", object.rotation));
        }
        if let Some(text) = &object.text {
            line.push_str(&format!(" text {:?}", text));
        }
        if object.selected {
            line.push_str(" [selected]");
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Rough token estimate for a rendered digest: 1 token per 4 characters.
///
/// A soft sizing signal for logging and budget decisions, never a hard limit.
pub fn estimate_tokens(rendered: &str) -> usize {
    rendered.len().div_ceil(4)
}
