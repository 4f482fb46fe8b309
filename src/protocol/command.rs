//! Shell command construction for the listing protocol.

/// Line separating the `ls -la` section from the symlink records.
pub const SEPARATOR: &str = "<<<SEP>>>";

/// Token between a name and its classification letter in symlink records.
///
/// Records are split on the last occurrence, so names containing the token
/// still parse.
pub const ARROW: &str = "->";

/// Quote a path for use inside a POSIX shell command.
///
/// Wraps the path in double quotes and escapes the characters that stay
/// special there.
pub fn quote_path(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Build the composite listing command for `path`.
///
/// In one round trip it changes into `path` (errors suppressed), prints the
/// resulting working directory, runs `ls -la`, prints [`SEPARATOR`], then
/// prints `name->D|F|B` for every symbolic link in the directory depending
/// on whether its target is a directory, a regular file, or missing. Dot
/// names are included in the symlink pass.
pub fn build_listing_command(path: &str) -> String {
    format!(
        "cd {path} 2>/dev/null; pwd; ls -la; echo \"{SEPARATOR}\"; \
         for f in * .[!.]* ..?*; do \
         [ -L \"$f\" ] && ([ -d \"$f\" ] && echo \"$f{ARROW}D\" \
         || ([ -f \"$f\" ] && echo \"$f{ARROW}F\" || echo \"$f{ARROW}B\")); \
         done",
        path = quote_path(path),
    )
}

/// `cd` into `path` and print the new working directory only on success.
pub fn build_cd_command(path: &str) -> String {
    format!("cd {} 2>/dev/null && pwd", quote_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_and_spaces() {
        assert_eq!(quote_path("/sdcard"), "\"/sdcard\"");
        assert_eq!(quote_path("/sdcard/My Files"), "\"/sdcard/My Files\"");
    }

    #[test]
    fn test_quote_special_characters() {
        assert_eq!(quote_path("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_path("$HOME"), "\"\\$HOME\"");
        assert_eq!(quote_path("`id`"), "\"\\`id\\`\"");
        assert_eq!(quote_path("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_listing_command_shape() {
        let cmd = build_listing_command("/sdcard/DCIM");
        assert!(cmd.starts_with("cd \"/sdcard/DCIM\" 2>/dev/null; pwd; ls -la; echo \"<<<SEP>>>\";"));
        assert!(cmd.contains("[ -L \"$f\" ]"));
        assert!(cmd.contains("echo \"$f->D\""));
        assert!(cmd.contains("echo \"$f->F\""));
        assert!(cmd.contains("echo \"$f->B\""));
        assert!(cmd.ends_with("done"));
        assert!(!cmd.contains('\n'));
    }

    #[test]
    fn test_cd_command() {
        assert_eq!(build_cd_command("/data/local/tmp"), "cd \"/data/local/tmp\" 2>/dev/null && pwd");
    }
}
