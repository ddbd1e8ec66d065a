// Security validation layer for agent tool invocations
//
// Every tool call proposed by the agent goes through this module before it
// runs: shell commands are screened for chaining/substitution syntax and a
// denylist, paths are confined to the workspace and checked for forbidden
// locations and symlink escapes.

pub mod command_validator;
pub mod error;
pub mod path_validator;
pub mod permission;
pub mod sanitizer;
pub mod validator;

pub use command_validator::{DEFAULT_FORBIDDEN_COMMANDS, contains_shell_injection};
pub use error::SecurityError;
pub use path_validator::{DEFAULT_FORBIDDEN_PATHS, PathPolicy};
pub use permission::ToolClass;
pub use sanitizer::PathSanitizer;
pub use validator::SecurityValidator;
