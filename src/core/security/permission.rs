//! Tool permission dispatch.
//!
//! Maps a tool name to the validator that guards it. This is a narrow gate
//! over known-dangerous operation classes, not a default-deny firewall:
//! tool names that are not listed here pass unconditionally, so a new
//! tool must be wired into [`ToolClass::from_name`] to be checked.

use std::fs;
use std::io;

use serde_json::Value;
use tracing::{debug, warn};

use super::error::SecurityError;
use super::validator::SecurityValidator;

/// Operation class of a tool, as far as the gate is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    /// Runs a shell command (`command` parameter).
    Shell,
    /// Reads, writes or edits a file (`path` parameter).
    FileAccess,
    /// Deletes a single file (`path` parameter).
    Delete,
    /// Anything else; not restricted.
    Unrestricted,
}

impl ToolClass {
    /// Classify a tool by name, case-insensitively.
    pub fn from_name(tool_name: &str) -> Self {
        match tool_name.trim().to_ascii_lowercase().as_str() {
            "bash" | "shell" | "sh" | "exec" | "execute_command" | "run_command" => Self::Shell,
            "read" | "read_file" | "write" | "write_file" | "edit" | "edit_file"
            | "create_file" | "append_file" => Self::FileAccess,
            "delete" | "delete_file" | "remove" | "remove_file" | "rm" => Self::Delete,
            _ => Self::Unrestricted,
        }
    }

    /// Name of the parameter this class validates, if any.
    pub fn required_param(self) -> Option<&'static str> {
        match self {
            Self::Shell => Some("command"),
            Self::FileAccess | Self::Delete => Some("path"),
            Self::Unrestricted => None,
        }
    }
}

impl SecurityValidator {
    /// Decide whether `tool_name` may run with `params`.
    ///
    /// `params` is the tool's argument object. The caller must abort the
    /// invocation on any error; nothing here has side effects.
    pub fn check_permission(&self, tool_name: &str, params: &Value) -> Result<(), SecurityError> {
        let class = ToolClass::from_name(tool_name);
        let result = self.dispatch(class, params);

        match &result {
            Ok(()) => debug!(tool = tool_name, ?class, "Tool invocation allowed"),
            Err(e) => warn!(tool = tool_name, kind = e.kind(), "Tool invocation denied: {}", e),
        }

        result
    }

    fn dispatch(&self, class: ToolClass, params: &Value) -> Result<(), SecurityError> {
        let Some(name) = class.required_param() else {
            return Ok(());
        };
        let value = string_param(params, name)?;

        match class {
            ToolClass::Shell => self.validate_command(value),
            ToolClass::FileAccess => self.validate_path(value).map(|_| ()),
            ToolClass::Delete => {
                let path = self.validate_path(value)?;
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => Ok(()),
                    Ok(_) => Err(SecurityError::InvalidTargetType {
                        path,
                        expected: "regular file",
                    }),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        Err(SecurityError::InvalidTargetType {
                            path,
                            expected: "existing regular file",
                        })
                    }
                    Err(error) => Err(SecurityError::Unresolvable { path, error }),
                }
            }
            ToolClass::Unrestricted => Ok(()),
        }
    }
}

fn string_param<'a>(params: &'a Value, name: &'static str) -> Result<&'a str, SecurityError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or(SecurityError::MissingParameter { name })
}
