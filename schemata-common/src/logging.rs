//! Logging helpers shared by the Schemata crates

use serde::Serialize;
use std::fmt::Debug;

/// Renders a serializable value as a YAML block for tracing output.
///
/// The block starts on its own line so multi-line registries and kwargs stay
/// readable in log files:
///
/// ```ignore
/// use schemata_common::Pretty;
/// use tracing::debug;
///
/// debug!("resolved kwargs: {}", Pretty(&kwargs));
/// ```
///
/// Values that YAML cannot represent fall back to their `{:#?}` form.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("\n")?;
        match serde_yaml::to_string(&self.0) {
            Ok(yaml) => f.write_str(yaml.trim_end()),
            Err(_) => write!(f, "{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
