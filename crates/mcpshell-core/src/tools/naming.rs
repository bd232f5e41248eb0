//! Tool name qualification

/// How discovered tool names are namespaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingScheme {
    /// Prefix with the server name only when more than one server is configured
    #[default]
    Auto,
    /// Always `<server>_<tool>`
    Prefixed,
    /// Never prefix
    Bare,
}

impl NamingScheme {
    /// Whether names should be prefixed given the number of servers
    pub fn prefixes(self, server_count: usize) -> bool {
        match self {
            NamingScheme::Auto => server_count > 1,
            NamingScheme::Prefixed => true,
            NamingScheme::Bare => false,
        }
    }

    /// Settle `Auto` against the number of configured servers
    ///
    /// Names then stay the same whichever of those servers are reachable.
    pub fn for_configured(self, configured: usize) -> Self {
        match self {
            NamingScheme::Auto if configured > 1 => NamingScheme::Prefixed,
            NamingScheme::Auto => NamingScheme::Bare,
            other => other,
        }
    }
}

/// Replace characters that are not valid in a function name with `_`
pub fn sanitize_tool_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the name the model sees for `tool` on `server`
pub fn qualify(server: &str, tool: &str, prefixed: bool) -> String {
    if prefixed {
        sanitize_tool_name(&format!("{}_{}", server, tool))
    } else {
        sanitize_tool_name(tool)
    }
}
