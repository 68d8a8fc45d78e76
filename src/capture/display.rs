use super::view::ViewState;

/// Shown before any transcript exists
pub const PLACEHOLDER: &str = "Transcript will appear here...";

/// Shown while a clip is out for transcription
pub const PROCESSING: &str = "Processing...";

/// Map view state to the transcript line shown to the user.
///
/// Processing wins over any previous transcript; an empty transcript shows
/// the placeholder; otherwise the transcript appears verbatim.
pub fn transcript_line(view: &ViewState) -> String {
    if view.is_processing() {
        return PROCESSING.to_string();
    }

    let transcript = view.transcript();
    if transcript.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        transcript
    }
}
