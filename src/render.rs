use crate::Symbol;

/// Configures how automata are rendered as text or in the DOT format. Rendering never
/// influences the behavior of an automaton, it is a read-only projection.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Turns a symbol into the string that labels it.
    pub interpretation: fn(Symbol) -> String,
    /// If set, accepting states in DOT output are labelled `<state>_<tag>`.
    pub prefix_final_states_with_tag_name: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            interpretation: default_interpretation,
            prefix_final_states_with_tag_name: false,
        }
    }
}

impl RenderOptions {
    /// Options that print symbols as unicode code points, see [`unicode_interpretation`].
    pub fn unicode() -> Self {
        Self {
            interpretation: unicode_interpretation,
            ..Default::default()
        }
    }

    /// Returns a copy of `self` that labels accepting states with their tag.
    pub fn with_tag_names(self) -> Self {
        Self {
            prefix_final_states_with_tag_name: true,
            ..self
        }
    }

    /// Renders a single symbol.
    pub fn symbol(&self, symbol: Symbol) -> String {
        (self.interpretation)(symbol)
    }
}

/// Renders symbol `n` as `a_n`.
pub fn default_interpretation(symbol: Symbol) -> String {
    format!("a_{symbol}")
}

/// Renders ASCII letters and digits literally, names a few whitespace characters and falls
/// back to `U+#<n>` for everything else.
pub fn unicode_interpretation(symbol: Symbol) -> String {
    match char::from_u32(symbol) {
        Some('\t') => "TAB".to_string(),
        Some('\n') => "NEWLINE".to_string(),
        Some('\r') => "CR".to_string(),
        Some(' ') => "SPACE".to_string(),
        Some(c) if c.is_ascii_alphanumeric() || c == '*' || c == '/' => c.to_string(),
        _ => format!("U+#{symbol}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretations() {
        assert_eq!(default_interpretation(7), "a_7");
        assert_eq!(unicode_interpretation('x' as Symbol), "x");
        assert_eq!(unicode_interpretation('\n' as Symbol), "NEWLINE");
        assert_eq!(unicode_interpretation(0x3bb), "U+#955");
        assert_eq!(RenderOptions::unicode().symbol('7' as Symbol), "7");
        assert!(RenderOptions::default().with_tag_names().prefix_final_states_with_tag_name);
    }
}
