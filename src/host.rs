//! Host capability probing for external speech programs

use std::env;
use std::path::{Path, PathBuf};

/// Placeholder in configured arguments replaced with the speech locale
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Resolve a program the way a shell would: paths are checked directly,
/// bare names are searched on `PATH`.
pub fn locate_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|full| full.is_file())
}

/// Substitute the locale into configured arguments
pub fn expand_args(args: &[String], locale: &str) -> Vec<String> {
    args.iter()
        .map(|arg| arg.replace(LOCALE_PLACEHOLDER, locale))
        .collect()
}
