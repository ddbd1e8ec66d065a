//! Shell command validation.
//!
//! This is a lightweight gate, not a shell parser. It denies any syntax that
//! can smuggle a second command onto the line or substitute untrusted output
//! into it, then checks the command against a substring denylist. False
//! positives are preferred over false negatives.
//!
//! Plain pipelines (`ls | grep test`) are accepted. The terminal stage of a
//! pipeline is not inspected, so `find / | xargs rm` passes the injection
//! check; only the denylist can stop it.

use tracing::debug;

use super::error::SecurityError;

/// Dangerous command substrings seeded into every new validator.
///
/// Matching is case-insensitive and ignores runs of whitespace, so
/// `sudo  SHUTDOWN -h now` hits the `shutdown` entry.
pub const DEFAULT_FORBIDDEN_COMMANDS: &[&str] = &[
    "rm -rf /",
    "rm -fr /",
    "sudo rm -rf",
    "shutdown",
    "reboot",
    "poweroff",
    "init 0",
    "init 6",
    ":(){ :|:& };:",
    "of=/dev/sd",
    "of=/dev/hd",
    "of=/dev/nvme",
    "of=/dev/mmcblk",
    "of=/dev/disk",
    "> /dev/sd",
    "mkfs",
    "chmod 777",
    "chmod -R 777",
];

/// Operator sequences that always indicate chaining or substitution.
const INJECTION_SEQUENCES: &[&str] = &["$(", "`", "&&", "||", "<(", ">(", "\n", "\r"];

/// Validate a shell command against the injection heuristic and `forbidden`.
pub fn validate_command(command: &str, forbidden: &[String]) -> Result<(), SecurityError> {
    if command.trim().is_empty() {
        return Err(SecurityError::EmptyInput);
    }

    if contains_shell_injection(command) {
        return Err(SecurityError::ShellInjectionDetected);
    }

    let normalized = collapse_whitespace(command).to_lowercase();
    for pattern in forbidden {
        let needle = collapse_whitespace(pattern).to_lowercase();
        if !needle.is_empty() && normalized.contains(&needle) {
            return Err(SecurityError::ForbiddenCommand {
                pattern: pattern.clone(),
            });
        }
    }

    debug!("Command passed validation");
    Ok(())
}

/// Whether `command` uses syntax that can run or splice in a second command.
///
/// Flags `$(...)`, backticks, process substitution, `&&`, `||`, an
/// unescaped `;` or background `&`, literal line breaks and IFS tricks.
/// A pipe on its own is never flagged.
pub fn contains_shell_injection(command: &str) -> bool {
    if INJECTION_SEQUENCES.iter().any(|seq| command.contains(seq)) {
        return true;
    }

    has_ifs_obfuscation(command) || has_bare_separator(command)
}

/// `;` or a control `&` that is neither escaped nor part of a redirection.
fn has_bare_separator(command: &str) -> bool {
    let bytes = command.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b';' && b != b'&' {
            return false;
        }
        if is_escaped(bytes, i) {
            return false;
        }
        if b == b';' {
            return true;
        }

        // `2>&1`, `<&3`, `|&`, `&>file`, `&>>file` are redirections.
        let prev = i.checked_sub(1).map(|j| bytes[j]);
        let next = bytes.get(i + 1).copied();
        !matches!(prev, Some(b'>') | Some(b'<') | Some(b'|')) && next != Some(b'>')
    })
}

/// An odd run of backslashes right before `index` escapes the byte.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// `IFS=...`, `$IFS` or `${IFS...}` used to forge word separators.
fn has_ifs_obfuscation(command: &str) -> bool {
    command.match_indices("IFS").any(|(i, _)| {
        let before = command[..i].chars().next_back();
        let after = command[i + 3..].chars().next();
        let is_reference = matches!(before, Some('$') | Some('{'));
        let is_assignment = after == Some('=')
            && !before.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        is_reference || is_assignment
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        DEFAULT_FORBIDDEN_COMMANDS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_injection_operators_detected() {
        for command in [
            "echo $(whoami)",
            "echo `id`",
            "ls && rm file",
            "false || rm file",
            "ls; rm file",
            "ls\nrm file",
            "ls\r\nrm file",
            "cat <(curl evil)",
            "sleep 10 & rm file",
            "IFS=/ cmd",
            "cat${IFS}/etc/passwd",
            "cat$IFS/etc/passwd",
        ] {
            assert!(contains_shell_injection(command), "not flagged: {command:?}");
        }
    }

    #[test]
    fn test_single_pipe_allowed() {
        assert!(!contains_shell_injection("ls | grep test"));
        assert!(!contains_shell_injection("ps aux | grep cargo | wc -l"));
    }

    #[test]
    fn test_pipe_with_chaining_rejected() {
        assert!(contains_shell_injection("ls | grep test && rm -f x"));
        assert!(contains_shell_injection("ls | grep test; id"));
    }

    #[test]
    fn test_redirections_are_not_separators() {
        assert!(!contains_shell_injection("cargo build 2>&1"));
        assert!(!contains_shell_injection("make &> build.log"));
        assert!(!contains_shell_injection("echo warn >&2"));
        assert!(!contains_shell_injection("make 2>&1 | tee log"));
    }

    #[test]
    fn test_escaped_semicolon_allowed() {
        assert!(!contains_shell_injection(r"find . -name '*.tmp' -exec ls {} \;"));
        // An escaped backslash leaves the `;` bare.
        assert!(contains_shell_injection(r"echo \\; id"));
    }

    #[test]
    fn test_ifs_inside_identifiers_ignored() {
        assert!(!contains_shell_injection("echo NOTIFS=3"));
        assert!(!contains_shell_injection("grep MY_IFS_NAME file"));
    }

    #[test]
    fn test_empty_commands_rejected() {
        assert!(matches!(
            validate_command("", &defaults()),
            Err(SecurityError::EmptyInput)
        ));
        assert!(matches!(
            validate_command("   ", &defaults()),
            Err(SecurityError::EmptyInput)
        ));
    }

    #[test]
    fn test_dangerous_commands_rejected() {
        for command in [
            "rm -rf /",
            "shutdown -h now",
            "sudo reboot",
            ":(){ :|:& };:",
            "sudo rm -rf /var",
            "dd if=/dev/zero of=/dev/sda",
            "chmod 777 /etc/passwd",
        ] {
            assert!(
                validate_command(command, &defaults()).is_err(),
                "not rejected: {command:?}"
            );
        }
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let result = validate_command("SHUTDOWN -h now", &defaults());
        assert!(matches!(result, Err(SecurityError::ForbiddenCommand { .. })));

        let result = validate_command("sudo   Reboot", &defaults());
        assert!(matches!(result, Err(SecurityError::ForbiddenCommand { .. })));
    }

    #[test]
    fn test_safe_commands_allowed() {
        for command in ["ls -la", "cargo test", "git status", "ls | grep test"] {
            assert!(validate_command(command, &defaults()).is_ok(), "{command}");
        }
    }

    #[test]
    fn test_pipe_to_destructive_stage_passes_heuristic() {
        // Known gap: only chaining and substitution are flagged.
        assert!(!contains_shell_injection("find / | xargs rm"));
        assert!(validate_command("find / | xargs rm", &defaults()).is_ok());
    }

    #[test]
    fn test_custom_denylist_replaces_defaults() {
        let forbidden = vec!["curl".to_string()];
        assert!(validate_command("curl https://example.com", &forbidden).is_err());
        assert!(validate_command("reboot", &forbidden).is_ok());
    }

    #[test]
    fn test_repeated_validation_is_stable() {
        let forbidden = defaults();
        let first = validate_command("ls; id", &forbidden).map_err(|e| e.kind());
        let second = validate_command("ls; id", &forbidden).map_err(|e| e.kind());
        assert_eq!(first, second);
    }
}
