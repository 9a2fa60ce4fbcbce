//! Settings command handler.

use anyhow::Result;
use ptcoach_core::Settings;

use crate::bootstrap::effective_settings;

/// Print the effective settings as pretty JSON.
pub fn execute(settings: &Settings) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&effective_settings(settings))?
    );
    Ok(())
}
