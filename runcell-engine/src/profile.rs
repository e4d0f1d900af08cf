//! Language profiles and the registry that resolves them

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Placeholder replaced with the workspace source path at render time
pub const SOURCE_PLACEHOLDER: &str = "{source}";
/// Placeholder replaced with the workspace binary path at render time
pub const BINARY_PLACEHOLDER: &str = "{binary}";

/// Program plus argument list with workspace-path placeholders.
///
/// Rendering substitutes `{source}` and `{binary}` tokens; the result is handed
/// to the process runner as-is and never interpreted by a shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTemplate {
    /// Program name or path (may itself be a placeholder, e.g. `{binary}`)
    pub program: String,

    /// Arguments, possibly containing placeholders
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Create a template from a program and its arguments
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Bind the template to concrete workspace paths.
    ///
    /// `binary` is only consulted for profiles with a compile step; the registry
    /// guarantees a `{binary}` token never appears without one.
    pub fn render(&self, source: &Path, binary: Option<&Path>) -> Invocation {
        let substitute = |text: &str| {
            let mut out = text.replace(SOURCE_PLACEHOLDER, &source.to_string_lossy());
            if let Some(binary) = binary {
                out = out.replace(BINARY_PLACEHOLDER, &binary.to_string_lossy());
            }
            out
        };

        Invocation {
            program: substitute(&self.program),
            args: self.args.iter().map(|a| substitute(a)).collect(),
        }
    }
}

/// A fully bound command line, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Static descriptor of how to build and run code for one language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Canonical identifier used for lookup
    pub id: String,

    /// Human-readable name for listings
    pub display_name: String,

    /// Source file extension without the dot
    pub source_extension: String,

    /// Compile command; present iff the language requires a build step
    pub compile: Option<CommandTemplate>,

    /// Run command (the binary for compiled languages, interpreter + source otherwise)
    pub run: CommandTemplate,

    /// Wall-clock budget for the compile phase
    pub compile_timeout: Duration,

    /// Wall-clock budget for the run phase
    pub run_timeout: Duration,
}

impl LanguageProfile {
    /// Whether this language has a separate build step
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }
}

/// Read-only mapping from language identifiers to execution profiles.
///
/// Built once at startup and shared across concurrent requests without locking;
/// nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, LanguageProfile>,
    aliases: HashMap<String, String>,
}

impl ProfileRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Create a registry with the stock language set
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for profile in default_profiles() {
            registry = registry.with_profile(profile);
        }
        registry
            .with_alias("py", "python")
            .with_alias("js", "javascript")
            .with_alias("node", "javascript")
            .with_alias("c++", "cpp")
    }

    /// Register (or replace) a profile
    pub fn with_profile(mut self, profile: LanguageProfile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Register an alias resolving to a canonical id
    pub fn with_alias(mut self, alias: impl Into<String>, id: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), id.into());
        self
    }

    /// Resolve a language id or alias, case-insensitively
    pub fn lookup(&self, language_id: &str) -> Result<&LanguageProfile> {
        let normalized = language_id.trim().to_ascii_lowercase();
        let canonical = self
            .aliases
            .get(&normalized)
            .map(String::as_str)
            .unwrap_or(&normalized);

        self.profiles
            .get(canonical)
            .ok_or_else(|| EngineError::UnknownLanguage(language_id.to_string()))
    }

    /// Iterate over the registered profiles (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.profiles.values()
    }

    /// Number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profiles are registered
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(30);

fn default_profiles() -> Vec<LanguageProfile> {
    vec![
        LanguageProfile {
            id: "python".to_string(),
            display_name: "Python".to_string(),
            source_extension: "py".to_string(),
            compile: None,
            run: CommandTemplate::new("python3", &[SOURCE_PLACEHOLDER]),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        },
        LanguageProfile {
            id: "javascript".to_string(),
            display_name: "JavaScript".to_string(),
            source_extension: "js".to_string(),
            compile: None,
            run: CommandTemplate::new("node", &[SOURCE_PLACEHOLDER]),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        },
        LanguageProfile {
            id: "c".to_string(),
            display_name: "C".to_string(),
            source_extension: "c".to_string(),
            compile: Some(CommandTemplate::new(
                "gcc",
                &[SOURCE_PLACEHOLDER, "-o", BINARY_PLACEHOLDER],
            )),
            run: CommandTemplate::new(BINARY_PLACEHOLDER, &[]),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        },
        LanguageProfile {
            id: "cpp".to_string(),
            display_name: "C++".to_string(),
            source_extension: "cpp".to_string(),
            compile: Some(CommandTemplate::new(
                "g++",
                &[SOURCE_PLACEHOLDER, "-o", BINARY_PLACEHOLDER],
            )),
            run: CommandTemplate::new(BINARY_PLACEHOLDER, &[]),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        },
    ]
}
