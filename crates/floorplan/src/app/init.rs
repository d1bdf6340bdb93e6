use std::path::PathBuf;

use miette::{Context, IntoDiagnostic, Result};

pub const DATA_DIR_ENV: &str = "FLOORPLAN_DATA_DIR";

/// Floorplan data directory
/// Read from env `FLOORPLAN_DATA_DIR`, or data_local_dir/floorplan where data_local_dir is platform specific.
/// Configuration and logs live inside it. It is created when missing.
pub fn get_data_dir() -> Result<PathBuf> {
    let dir = if let Ok(env_dir) = std::env::var(DATA_DIR_ENV) {
        PathBuf::from(env_dir)
    } else if let Some(project_dir) =
        directories_next::ProjectDirs::from("com.floorplan", "", "floorplan")
    {
        project_dir.data_local_dir().to_path_buf()
    } else {
        return Err(miette::miette!(
            "getting project path failed, set {DATA_DIR_ENV} instead"
        ));
    };
    std::fs::create_dir_all(&dir)
        .into_diagnostic()
        .wrap_err(dir.display().to_string())
        .wrap_err("failed to create floorplan data directory")?;
    Ok(dir)
}
