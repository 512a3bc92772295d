use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Extension of the rendered pattern files.
pub const PATTERN_EXTENSION: &str = "strudel";

/// Config lives under the platform config dir (`dirs` handles the platform
/// detection): `$XDG_CONFIG_HOME/strudelscribe` on Linux,
/// `~/Library/Application Support/strudelscribe` on macOS.
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Root config directory.
pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strudelscribe")
    })
}

/// Config file path: <config_dir>/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the pattern for `input` goes: `<out_dir>/<stem>.strudel`.
pub fn pattern_path(out_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "pattern".into());
    // Appended by hand: with_extension would eat a dotted stem like "take.2"
    name.push(".");
    name.push(PATTERN_EXTENSION);
    out_dir.join(name)
}
