use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &[
    "website",
    "website/db",
    "website/static",
    "website/static/css",
    "website/static/js",
    "website/templates",
    "website/templates/app",
];

/// Critical template files — the builder UI cannot function without these
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/app/base.html.tera",
    "website/templates/app/dashboard.html.tera",
    "website/templates/app/builder.html.tera",
];

/// Static assets the builder and the embed document link to
const CRITICAL_STATIC: &[&str] = &[
    "website/static/css/app.css",
    "website/static/css/embed.css",
    "website/static/js/embed.js",
];

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about missing files, and
/// aborts if critical dependencies are absent.
pub fn run() {
    info!("Feedframe boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    for dir in REQUIRED_DIRS {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Static assets ───────────────────────────────
    for file in CRITICAL_STATIC {
        if !Path::new(file).exists() {
            warn!(
                "  Missing static asset: {} (pages will render unstyled)",
                file
            );
            warnings += 1;
        }
    }

    // ── 4. Secondary templates ─────────────────────────
    for file in &[
        "website/templates/app/templates.html.tera",
        "website/templates/app/settings.html.tera",
    ] {
        if !Path::new(file).exists() {
            warn!("  Missing template: {} (that page will 500)", file);
            warnings += 1;
        }
    }

    // ── 5. Database directory writable ──────────────────
    let db_dir = Path::new("website/db");
    if db_dir.exists() {
        let test_file = db_dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Database directory not writable: {}", e);
                errors += 1;
            }
        }
    }

    // ── 6. Rocket.toml exists ───────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found — using default config");
        warnings += 1;
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}
