/// Header boilerplate markers, in priority order
pub const START_MARKERS: [&str; 4] = [
    "*** START OF THIS PROJECT GUTENBERG",
    "*** START OF THE PROJECT GUTENBERG",
    "*END*THE SMALL PRINT",
    "This etext was prepared by",
];

/// Footer boilerplate markers, in priority order
pub const END_MARKERS: [&str; 4] = [
    "*** END OF THIS PROJECT GUTENBERG",
    "*** END OF THE PROJECT GUTENBERG",
    "End of Project Gutenberg",
    "End of the Project Gutenberg",
];

/// Strip the Project Gutenberg header and footer from a raw transcription.
///
/// Content starts on the line after the first start marker found (markers are
/// tried in list order, not by position) and stops at the first end marker
/// found after it. Texts without a start marker come back trimmed but
/// otherwise untouched.
pub fn clean_book_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let Some(start) = find_content_start(text) else {
        return text.trim().to_string();
    };

    let body = &text[start..];
    let end = END_MARKERS
        .iter()
        .find_map(|marker| body.find(marker))
        .unwrap_or(body.len());

    body[..end].trim().to_string()
}

fn find_content_start(text: &str) -> Option<usize> {
    START_MARKERS.iter().find_map(|marker| {
        let marker_at = text.find(marker)?;
        let after_marker = marker_at + marker.len();
        let start = text[after_marker..]
            .find('\n')
            .map(|newline| after_marker + newline + 1)
            .unwrap_or(after_marker);
        Some(start)
    })
}
