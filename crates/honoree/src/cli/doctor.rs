//! Environment readiness check.

use anyhow::Result;
use honoree::config::{resolve_api_key, API_KEY_ENV};
use honoree::renderer::chromium::{find_chromium, CHROMIUM_PATH_ENV};

/// Check Chromium availability and whether a summarization key is configured.
pub async fn run() -> Result<()> {
    println!("Honoree Doctor");
    println!("==============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or set {CHROMIUM_PATH_ENV}; \
             the ODMP directory needs it."
        ),
    }

    let api_key = resolve_api_key(None);
    match api_key {
        Some(_) => println!("[OK] Summarization API key found"),
        None => println!("[!!] No summarization API key. Set {API_KEY_ENV} or pass --api-key."),
    }

    println!();
    match (chromium_path.is_some(), api_key.is_some()) {
        (true, true) => println!("Status: READY"),
        (false, true) => println!("Status: READY (run with --no-odmp)"),
        (true, false) => println!("Status: READY (run with --no-ai)"),
        (false, false) => println!("Status: READY (run with --no-odmp --no-ai)"),
    }

    Ok(())
}
