//! plugwire CLI UI primitives.
//!
//! Everything here writes to stderr; stdout is reserved for generated code.

use console::style;

use plugwire_compiler::Fingerprint;

/// Color palette
pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

/// Print a success message
pub fn success(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::GREEN),
        msg
    );
}

/// Print an info message
pub fn info(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        msg
    );
}

/// Print a contract line
pub fn contract_line(name: &str, methods: usize) {
    eprintln!(
        "  {}   {:24} {}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(name).bold(),
        style(count(methods, "method")).fg(colors::DIM)
    );
}

/// Print the handshake fingerprint
pub fn fingerprint(fingerprint: &Fingerprint) {
    eprintln!(
        "  {} handshake {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style(fingerprint).bold()
    );
}

/// Print the error header shown before a failed run's diagnostic
pub fn error_header() {
    eprintln!();
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        style("Generation failed.").fg(colors::MAGENTA).bold()
    );
    eprintln!();
}

/// Print timing information
pub fn timing(label: &str, duration_ms: u128) {
    eprintln!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}

/// `1 contract`, `3 contracts`.
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Summary line joining counts with a middle dot.
pub fn summary(parts: &[String]) -> String {
    parts.join(&format!(" {} ", symbols::DOT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pluralizes() {
        assert_eq!(count(1, "contract"), "1 contract");
        assert_eq!(count(0, "warning"), "0 warnings");
        assert_eq!(count(12, "declaration"), "12 declarations");
    }

    #[test]
    fn test_summary_joins() {
        let line = summary(&[count(2, "contract"), count(1, "warning")]);
        assert_eq!(line, "2 contracts \u{00B7} 1 warning");
    }
}
