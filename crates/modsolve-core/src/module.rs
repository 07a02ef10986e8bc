use serde::{Deserialize, Serialize};

/// Lifecycle state of a module in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Installed,
    ToInstall,
    ToUpgrade,
    Uninstalled,
}

impl ModuleState {
    /// Whether the module is waiting to be installed or upgraded.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::ToInstall | Self::ToUpgrade)
    }

    /// The wire name of the state (`installed`, `to_install`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::ToInstall => "to_install",
            Self::ToUpgrade => "to_upgrade",
            Self::Uninstalled => "uninstalled",
        }
    }
}

impl Default for ModuleState {
    fn default() -> Self {
        Self::Uninstalled
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single module record as supplied by an external inventory collector.
///
/// The dependency list is kept exactly as authored: ordered, and possibly
/// naming modules absent from the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub name: String,
    pub state: ModuleState,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ModuleRecord {
    pub fn new(
        name: impl Into<String>,
        state: ModuleState,
        dependencies: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            state,
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for ModuleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_match_the_wire_format() {
        assert_eq!(ModuleState::ToInstall.as_str(), "to_install");
        assert_eq!(ModuleState::Installed.to_string(), "installed");
    }

    #[test]
    fn pending_states() {
        assert!(ModuleState::ToInstall.is_pending());
        assert!(ModuleState::ToUpgrade.is_pending());
        assert!(!ModuleState::Installed.is_pending());
        assert!(!ModuleState::Uninstalled.is_pending());
    }
}
