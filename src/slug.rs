/// Normalizes a game name into the key shared by the list links and the
/// detail lookup.
///
/// Lower-cases, drops everything that is not an ASCII word character,
/// whitespace or `-`, collapses runs of whitespace/`_`/`-` into one `-`,
/// then trims hyphens from both ends.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for ch in lowered.chars() {
        if is_separator(ch) {
            pending_sep = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('-');
        }
        pending_sep = false;
        out.push(ch);
    }
    out
}

// `_` is a word character but still collapses into the separator run.
// Whitespace follows the browser `\s` class: U+FEFF counts, U+0085 does not.
fn is_separator(ch: char) -> bool {
    match ch {
        '-' | '_' | '\u{feff}' => true,
        '\u{85}' => false,
        _ => ch.is_whitespace(),
    }
}
