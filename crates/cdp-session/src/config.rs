//! Browser launch configuration resolved from the process environment.

use std::env;
use std::path::PathBuf;

use which::which;

/// Env var overriding the browser executable path.
const EXECUTABLE_ENV: &str = "FLOOD_CHROME";

/// Env var toggling headless operation. Unset means headful, matching the
/// interactive sessions this tool was written against.
const HEADLESS_ENV: &str = "FLOOD_HEADLESS";

/// Configuration for launching the automation browser.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Explicit executable path; `None` lets chromiumoxide try its own
    /// detection as a last resort.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub window: (u32, u32),
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            executable: detect_executable(),
            headless: resolve_headless(),
            window: (1280, 900),
        }
    }
}

fn resolve_headless() -> bool {
    match env::var(HEADLESS_ENV) {
        Ok(value) => {
            let lower = value.to_ascii_lowercase();
            !matches!(lower.as_str(), "0" | "false" | "no" | "off")
        }
        Err(_) => false,
    }
}

fn detect_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var(EXECUTABLE_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_fallback_paths().into_iter().find(|path| path.exists())
}

fn executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_fallback_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(value) = env::var(key) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    let root = PathBuf::from(trimmed);
                    paths.push(root.join("Google/Chrome/Application/chrome.exe"));
                    paths.push(root.join("Chromium/Application/chrome.exe"));
                }
            }
        }
        paths
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }
}
