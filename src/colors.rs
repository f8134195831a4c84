use is_terminal::IsTerminal;

/// ANSI color codes for match/unmatch markers
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub matched: &'static str,   // Green for matched lines
    pub unmatched: &'static str, // Red for unmatched lines
    pub reset: &'static str,
}

impl ColorScheme {
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                matched: "\x1b[32m",
                unmatched: "\x1b[31m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                matched: "",
                unmatched: "",
                reset: "",
            }
        }
    }
}

/// Colors only when stdout is a terminal and NO_COLOR is unset
pub fn should_use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}
