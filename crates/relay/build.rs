// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Environment variables read by the relay, with their documentation.
const ENV_VARS: &[(&str, &str)] = &[
    ("WORK_DIR", "directory holding the configuration file"),
    ("RUST_LOG", "controls log level filtering (used by tracing-subscriber)"),
    ("API_ENABLED", "enable the remote API connection"),
    ("API_URL", "base URL of the remote unit API"),
    ("API_TOKEN", "static bearer token for the remote API"),
    ("API_USERNAME", "username exchanged for a bearer token"),
    ("API_PASSWORD", "password exchanged for a bearer token"),
    ("API_TIMEOUT_SECS", "per-request timeout for remote API calls"),
    ("DB_PATH", "path of the local SQLite database"),
    ("API_SYNC_UNITS", "push local units to the remote API at startup"),
    ("DB_LIVECONNECTION_ENABLED", "run the outbox relay loop after startup"),
    ("RELAY_INTERVAL_SECS", "seconds between relay cycles"),
    ("RELAY_MAX_ATTEMPTS", "failed attempts before an outbox row is quarantined"),
    ("STARTUP_RETRY_SECS", "delay before retrying a failed startup"),
];

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cargo:warning=OUT_DIR not set: {e}");
            std::process::exit(1);
        }
    };
    let dest_path = Path::new(&out_dir).join("env_names.rs");

    let mut contents = String::new();
    for (name, doc) in ENV_VARS {
        contents.push_str(&format!(
            "/// Environment variable: {doc}.\npub const {name}: &str = \"{name}\";\n\n"
        ));
    }

    if let Err(e) = fs::File::create(&dest_path).and_then(|mut f| f.write_all(contents.as_bytes()))
    {
        eprintln!("cargo:warning=failed to write env_names.rs: {e}");
        std::process::exit(1);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
