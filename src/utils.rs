/*!
 * Utility functions for repotree
 */

use once_cell::sync::Lazy;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// File and directory names skipped during a scan, matched with glob-match
///
/// Binary assets are not listed here; the classifier marks them instead.
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let vcs = [".git", ".svn", ".hg", ".bzr"];
    let os = [".DS_Store", "Thumbs.db", "desktop.ini"];
    let deps = [
        "node_modules",
        "bower_components",
        ".pnpm-store",
        "vendor",
        "Pods",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "Cargo.lock",
        "composer.lock",
    ];
    let build = [
        "target",
        "dist",
        "build",
        "out",
        "obj",
        ".next",
        ".nuxt",
        ".output",
        ".gradle",
        "*.min.js",
        "*.min.css",
        "*.tsbuildinfo",
    ];
    let python = [
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        ".venv",
        "venv",
        "*.egg-info",
        "*.pyc",
    ];
    let editors = [".idea", ".vscode", ".vs", "*.swp", "*~"];
    let caches = [
        ".cache",
        ".eslintcache",
        ".sass-cache",
        "coverage",
        ".nyc_output",
        ".terraform",
        "*.log",
    ];

    let groups: [&[&str]; 7] = [&vcs, &os, &deps, &build, &python, &editors, &caches];
    groups.concat()
});

#[cfg(test)]
mod tests {
    use super::*;
    use glob_match::glob_match;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.00 MB");
    }

    #[test]
    fn test_default_ignore_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for pattern in DEFAULT_IGNORE.iter() {
            assert!(seen.insert(*pattern), "duplicate pattern {}", pattern);
        }
    }

    #[test]
    fn test_default_ignore_matches_common_names() {
        let matches = |name: &str| DEFAULT_IGNORE.iter().any(|p| glob_match(p, name));
        assert!(matches(".git"));
        assert!(matches("node_modules"));
        assert!(matches("debug.log"));
        assert!(!matches("main.rs"));
        assert!(!matches("README.md"));
    }
}
