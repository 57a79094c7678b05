/**
 * Service Descriptors
 *
 * A `ServiceDescriptor` is the registry's record of one micro-frontend: its
 * unique key, the name shown in navigation, the base URL the shell loads it
 * from, an icon identifier and a short description.
 *
 * # Wire Format
 *
 * The registry endpoint (`GET /api/microfrontends`) serves a JSON object
 * keyed by service key. The key itself is not repeated inside the value;
 * `name` carries the display name:
 *
 * ```json
 * {
 *   "tasks": {
 *     "name": "Tareas",
 *     "url": "/tasks",
 *     "icon": "assignment",
 *     "description": "Gestión de tareas y proyectos"
 *   }
 * }
 * ```
 */
use serde::{Deserialize, Serialize};

/// Registry record for one micro-frontend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Unique registry key (filled from the map key on load)
    #[serde(skip)]
    pub key: String,
    /// Name shown in navigation and frame headers
    #[serde(rename = "name")]
    pub display_name: String,
    /// Base URL of the service
    pub url: String,
    /// Icon identifier (material icon name)
    #[serde(default)]
    pub icon: String,
    /// One-line description
    #[serde(default)]
    pub description: String,
}

impl ServiceDescriptor {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        url: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            url: url.into(),
            icon: icon.into(),
            description: description.into(),
        }
    }

    /// Root document URL (`{url}/`) used by the compositor
    pub fn root_url(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }

    /// Typed icon for this descriptor
    pub fn icon(&self) -> Icon {
        Icon::from_name(&self.icon)
    }
}

/// Known icon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Lock,
    Chat,
    Description,
    Assignment,
    Task,
    /// Identifier not in the table
    Unknown,
}

impl Icon {
    /// Map an icon identifier to its variant; unknown names fall back to `Unknown`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "lock" => Icon::Lock,
            "chat" => Icon::Chat,
            "description" => Icon::Description,
            "assignment" => Icon::Assignment,
            "task" | "task_alt" => Icon::Task,
            _ => Icon::Unknown,
        }
    }

    /// Material icon name rendered for this icon
    pub fn material_name(self) -> &'static str {
        match self {
            Icon::Lock => "lock",
            Icon::Chat => "chat",
            Icon::Description => "description",
            Icon::Assignment => "assignment",
            Icon::Task => "task_alt",
            Icon::Unknown => "extension",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_wire_format() {
        let json = r#"{"name":"Tareas","url":"/tasks","icon":"assignment","description":"Gestión"}"#;
        let descriptor: ServiceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.display_name, "Tareas");
        assert_eq!(descriptor.url, "/tasks");
        assert!(descriptor.key.is_empty());

        let back = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(back["name"], "Tareas");
        assert!(back.get("key").is_none());
    }

    #[test]
    fn test_root_url_has_single_slash() {
        let d = ServiceDescriptor::new("tasks", "Tareas", "http://tasks:5000/", "task", "");
        assert_eq!(d.root_url(), "http://tasks:5000/");
        let d = ServiceDescriptor::new("tasks", "Tareas", "http://tasks:5000", "task", "");
        assert_eq!(d.root_url(), "http://tasks:5000/");
    }

    #[test]
    fn test_icon_lookup_with_fallback() {
        assert_eq!(Icon::from_name("chat"), Icon::Chat);
        assert_eq!(Icon::from_name("LOCK"), Icon::Lock);
        assert_eq!(Icon::from_name("task").material_name(), "task_alt");
        assert_eq!(Icon::from_name("rocket"), Icon::Unknown);
        assert_eq!(Icon::from_name("").material_name(), "extension");
    }
}
