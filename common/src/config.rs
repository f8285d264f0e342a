use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{chart::OutputTarget, plot::Plot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub plots: Vec<Box<dyn Plot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Relative output paths are resolved against this directory
    pub output_dir: Option<PathBuf>,
    /// Turns off point annotations for every plot when false
    pub annotate: bool,
    /// Open charts in the image viewer instead of writing them to their output paths
    pub show: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            annotate: true,
            show: false,
        }
    }
}

impl Settings {
    pub fn resolve_output(&self, path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn output_target(&self, path: &Path) -> OutputTarget {
        if self.show {
            OutputTarget::Display
        } else {
            OutputTarget::File(self.resolve_output(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn relative_outputs_land_in_output_dir() {
        let settings = Settings {
            output_dir: Some(PathBuf::from("charts/node_scaling")),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve_output(Path::new("client_scaling_4_nodes.png")),
            PathBuf::from("charts/node_scaling/client_scaling_4_nodes.png")
        );
        assert_eq!(
            settings.resolve_output(Path::new("/tmp/plot.png")),
            PathBuf::from("/tmp/plot.png")
        );
    }

    #[test]
    fn show_overrides_file_output() {
        let settings = Settings {
            show: true,
            ..Default::default()
        };
        assert_eq!(settings.output_target(Path::new("plot.png")), OutputTarget::Display);
        assert_eq!(
            Settings::default().output_target(Path::new("plot.png")),
            OutputTarget::File(PathBuf::from("plot.png"))
        );
    }
}
