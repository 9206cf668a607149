//! Application launch metadata (`launch.toml`)

use crate::error::TomcatResult;
use serde::{Deserialize, Serialize};

/// A named way of starting the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "type")]
    pub process_type: String,
    pub command: String,
}

impl Process {
    pub fn new(process_type: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            process_type: process_type.into(),
            command: command.into(),
        }
    }
}

/// Process types published for the launch phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// Sink for launch metadata; each write replaces the previous one
pub trait LaunchMetadataWriter {
    fn write_launch_metadata(&self, metadata: &LaunchMetadata) -> TomcatResult<()>;
}
