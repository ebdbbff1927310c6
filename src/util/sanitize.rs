//! Log hygiene for caller-supplied strings.

/// Escape line breaks and other control characters so an attacker-supplied
/// identifier cannot forge additional log lines.
pub fn sanitize_for_log(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => {
                out.push_str(&format!("\\u{{{:04x}}}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out
}
