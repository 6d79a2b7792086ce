//! `paths`: show every location the provisioning subsystem reads or writes.

use anyhow::Result;
use serde_json::json;
use streamhost_core::{BackendPreference, BinaryKind, StreamingPaths};

use crate::bootstrap::CliContext;

/// `(label, path)` rows in display order.
pub fn rows(paths: &StreamingPaths) -> Vec<(&'static str, String)> {
    let show = |p: &std::path::Path| p.display().to_string();
    vec![
        ("data_dir", show(paths.data_dir())),
        ("streaming_server_dir", show(&paths.streaming_server_dir())),
        ("server_js", show(&paths.server_js_path())),
        ("ffmpeg", show(&paths.binary_path(BinaryKind::Ffmpeg))),
        ("ffprobe", show(&paths.binary_path(BinaryKind::Ffprobe))),
        ("server_log", show(&paths.log_file_path())),
        (
            "service_flag",
            show(&paths.preference_flag_path(BackendPreference::StremioService)),
        ),
        (
            "server_js_flag",
            show(&paths.preference_flag_path(BackendPreference::ServerJs)),
        ),
        ("service_record", show(&paths.service_record_path())),
    ]
}

pub fn execute(ctx: &CliContext, as_json: bool) -> Result<()> {
    let rows = rows(&ctx.provision.paths);
    if as_json {
        let map: serde_json::Map<String, serde_json::Value> = rows
            .into_iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("platform = {}", ctx.provision.platform);
        for (key, value) in rows {
            println!("{key} = {value}");
        }
    }
    Ok(())
}
