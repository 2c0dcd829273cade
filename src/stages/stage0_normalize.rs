/// Label that opens a provider-side turn
pub const AGENT_LABEL: &str = "PA Agent:";
/// Label that opens a customer-side turn
pub const MEMBER_LABEL: &str = "Member:";

pub const SPEAKER_LABELS: [&str; 2] = [AGENT_LABEL, MEMBER_LABEL];

/// Stage 0: put every speaker turn on its own paragraph.
///
/// 1. Trims the text
/// 2. Inserts a blank line before each speaker label, collapsing any
///    newlines already sitting in front of it
/// 3. Trims again and prefixes a single newline
///
/// Running it on its own output is a no-op.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    for label in SPEAKER_LABELS {
        text = break_before(&text, label);
    }

    let text = text.trim();
    let mut normalized = String::with_capacity(text.len() + 1);
    normalized.push('\n');
    normalized.push_str(text);
    normalized
}

/// Ensure every occurrence of `label` is preceded by exactly two newlines
fn break_before(text: &str, label: &str) -> String {
    let mut output = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for (index, _) in text.match_indices(label) {
        let preceding = text[last..index].trim_end_matches(['\n', '\r']);
        output.push_str(preceding);
        output.push_str("\n\n");
        output.push_str(label);
        last = index + label.len();
    }

    output.push_str(&text[last..]);
    output
}
