//! Shell index, health and registry endpoints.

use crate::shared::ServiceRegistry;
use axum::{extract::State, response::Html, Json};
use std::sync::Arc;

const SHELL_PAGE: &str = include_str!("../../../templates/shell.html");

/// `GET /` - shell document with one navigation entry per micro-frontend
pub async fn shell_index(State(registry): State<Arc<ServiceRegistry>>) -> Html<String> {
    Html(render_index(&registry))
}

/// `GET /health`
pub async fn shell_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "shell" }))
}

/// `GET /api/microfrontends` - the advertised registry snapshot
pub async fn list_microfrontends(State(registry): State<Arc<ServiceRegistry>>) -> Json<ServiceRegistry> {
    Json(registry.as_ref().clone())
}

/// Render the shell document for a registry
pub fn render_index(registry: &ServiceRegistry) -> String {
    let items: Vec<String> = registry
        .descriptors()
        .map(|service| {
            format!(
                r#"      <li><a href="{}/" target="slot" title="{}"><span class="material-icons">{}</span>{}</a></li>"#,
                escape_html(service.url.trim_end_matches('/')),
                escape_html(&service.description),
                service.icon().material_name(),
                escape_html(&service.display_name),
            )
        })
        .collect();
    SHELL_PAGE.replace("{{services}}", &items.join("\n"))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ServiceDescriptor;

    #[test]
    fn test_render_index_lists_services() {
        let registry = ServiceRegistry::from_descriptors(vec![
            ServiceDescriptor::new("tasks", "Tareas", "/tasks", "assignment", "Gestión de tareas"),
            ServiceDescriptor::new("x", "<b>X</b>", "/x", "rocket", ""),
        ])
        .unwrap();
        let page = render_index(&registry);
        assert!(page.contains(r#"href="/tasks/""#));
        assert!(page.contains("&lt;b&gt;X&lt;/b&gt;"));
        assert!(page.contains(">extension<"));
        assert!(!page.contains("{{services}}"));
    }
}
