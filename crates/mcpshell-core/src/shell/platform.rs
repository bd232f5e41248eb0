//! Host platform identification

/// Operating system name as reported to tool clients
///
/// `Linux`, `Darwin` or `Windows`; other targets get their platform id
/// with the first letter capitalized.
pub fn os_name() -> String {
    platform_name(std::env::consts::OS)
}

fn platform_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
