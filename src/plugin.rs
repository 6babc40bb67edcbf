//! Plugin manifest
//!
//! A plugin is the packaging unit the host loads: a name, a description and
//! the actions it contributes. Lookup accepts an action's name or any of its
//! similes, which is how host-side intent matching addresses actions.

use crate::actions::{Action, ActionDescription, GetCurrentNewsAction};
use crate::config::PluginConfig;
use crate::error::ActionResult;
use std::sync::Arc;
use thiserror::Error;

pub const PLUGIN_NAME: &str = "playground";
pub const PLUGIN_DESCRIPTION: &str = "Agent playground";

/// Plugin registration errors
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Action already registered: {0}")]
    DuplicateAction(String),
}

/// A named set of actions
pub struct Plugin {
    name: String,
    description: String,
    actions: Vec<Arc<dyn Action>>,
}

impl Plugin {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Add an action; names must be unique within the plugin
    pub fn register_action(&mut self, action: Arc<dyn Action>) -> Result<(), PluginError> {
        let name = action.describe().name;
        if self.actions.iter().any(|a| a.describe().name == name) {
            return Err(PluginError::DuplicateAction(name));
        }
        self.actions.push(action);
        Ok(())
    }

    /// Find an action by name or simile (case-insensitive)
    pub fn action(&self, name_or_simile: &str) -> Option<Arc<dyn Action>> {
        self.actions
            .iter()
            .find(|action| action.describe().matches(name_or_simile))
            .cloned()
    }

    /// Get list of registered action names
    pub fn list_actions(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.describe().name).collect()
    }

    /// Metadata for every action, in registration order
    pub fn describe_actions(&self) -> Vec<ActionDescription> {
        self.actions.iter().map(|a| a.describe()).collect()
    }
}

/// The playground plugin with its single news action
pub fn playground_plugin(news_action: GetCurrentNewsAction) -> Plugin {
    let mut plugin = Plugin::new(PLUGIN_NAME, PLUGIN_DESCRIPTION);
    plugin.actions.push(Arc::new(news_action));
    plugin
}

/// Build the playground plugin against the live news API
pub fn playground_plugin_from_config(config: &PluginConfig) -> ActionResult<Plugin> {
    Ok(playground_plugin(GetCurrentNewsAction::from_config(config)?))
}
