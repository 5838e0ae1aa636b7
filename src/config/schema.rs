use serde::{Deserialize, Serialize};

/// Example YAML:
/// ```yaml
/// data_file: ~/contests/ural-2025.json
/// user: jury-1
/// export_dir: ~/Downloads
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON data file holding users, contests and entries
    /// (default: ~/.config/photo-jury/contests.json)
    #[serde(default)]
    pub data_file: Option<String>,

    /// Acting user id when --user is not given
    #[serde(default)]
    pub user: Option<String>,

    /// Directory CSV exports are written to when no output path is given
    #[serde(default)]
    pub export_dir: Option<String>,
}
