//! Installed component inventory for the setup page.
//!
//! The list is static; versions are refreshed best-effort from the backend
//! `Cargo.toml` and the frontend `package.json` on every request.

use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub version: String,
    pub status: String,
    pub description: String,
    pub category: String,
    pub required: bool,
}

impl Component {
    fn installed(name: &str, version: &str, description: &str, category: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            status: "installed".to_string(),
            description: description.to_string(),
            category: category.to_string(),
            required,
        }
    }
}

/// The crate's minimum supported Rust version, not the toolchain that built it
const RUST_DESCRIPTION: &str = "Systems programming language (minimum supported version)";

fn rust_version() -> &'static str {
    match env!("CARGO_PKG_RUST_VERSION") {
        "" => "stable",
        v => v,
    }
}

pub fn default_components() -> Vec<Component> {
    vec![
        Component::installed("Rust", rust_version(), RUST_DESCRIPTION, "Runtime", true),
        Component::installed("PostgreSQL", "15-alpine", "Relational database", "Database", true),
        Component::installed("Redis", "7-alpine", "In-memory cache", "Cache", true),
        Component::installed("React", "18.3.1", "Frontend framework", "Frontend", true),
        Component::installed("TypeScript", "5.6.3", "Type-safe JavaScript", "Language", true),
        Component::installed("Axum", "0.8", "Backend web framework", "Backend", true),
        Component::installed("Vite", "5.4.3", "Frontend build tool", "Build Tool", true),
        Component::installed("Tailwind CSS", "3.4.13", "Utility-first CSS framework", "Frontend", true),
        Component::installed("Docker", "Containerized", "Container platform", "Infrastructure", true),
        Component::installed("Docker Compose", "v2", "Multi-container orchestration", "Infrastructure", true),
        Component::installed("Axios", "1.7.7", "HTTP client library", "Frontend", false),
        Component::installed("sea-orm", "1.1", "PostgreSQL client and ORM for Rust", "Backend", true),
        Component::installed("redis-rs", "0.27", "Redis client for Rust", "Backend", true),
        Component::installed("ESLint", "9.12.0", "Code linting tool", "Development", false),
        Component::installed("Prettier", "3.3.3", "Code formatter", "Development", false),
    ]
}

/// Components reported by the host-side dashboard
pub fn host_components(docker_version: Option<String>) -> Vec<Component> {
    vec![
        Component::installed("Rust", rust_version(), RUST_DESCRIPTION, "Runtime", true),
        Component::installed(
            "Docker",
            docker_version.as_deref().unwrap_or("unknown"),
            "Container platform",
            "Infrastructure",
            true,
        ),
        Component::installed("PostgreSQL", "15", "Database", "Database", true),
        Component::installed("Redis", "7", "Cache", "Cache", true),
    ]
}

/// Drop range operators (`^1.2`, `~1.2`, `=1.2`)
pub fn strip_range(version: &str) -> String {
    version
        .trim()
        .trim_start_matches(['^', '~', '='])
        .to_string()
}

fn set_version(components: &mut [Component], name: &str, version: String) {
    if let Some(component) = components
        .iter_mut()
        .find(|c| c.name.eq_ignore_ascii_case(name))
    {
        component.version = version;
    }
}

/// Version requirement of `name` under `[dependencies]`, either `"1"` or `{ version = "1" }`
fn cargo_dependency(manifest: &toml::Value, name: &str) -> Option<String> {
    let dep = manifest.get("dependencies")?.get(name)?;
    let version = match dep {
        toml::Value::String(v) => v.as_str(),
        toml::Value::Table(t) => t.get("version")?.as_str()?,
        _ => return None,
    };
    Some(strip_range(version))
}

pub fn apply_cargo_manifest(components: &mut [Component], raw: &str) -> Result<(), toml::de::Error> {
    let manifest: toml::Value = toml::from_str(raw)?;

    if let Some(v) = cargo_dependency(&manifest, "axum") {
        set_version(components, "Axum", v);
    }
    if let Some(v) = cargo_dependency(&manifest, "sea-orm") {
        set_version(components, "sea-orm", v.clone());
        set_version(components, "PostgreSQL", format!("15 (sea-orm {})", v));
    }
    if let Some(v) = cargo_dependency(&manifest, "redis") {
        set_version(components, "redis-rs", v.clone());
        set_version(components, "Redis", format!("7 (redis {})", v));
    }

    Ok(())
}

fn npm_dependency(manifest: &serde_json::Value, section: &str, name: &str) -> Option<String> {
    manifest
        .get(section)?
        .get(name)?
        .as_str()
        .map(strip_range)
}

pub fn apply_package_json(components: &mut [Component], raw: &str) -> Result<(), serde_json::Error> {
    let manifest: serde_json::Value = serde_json::from_str(raw)?;

    let patches = [
        ("dependencies", "react", "React"),
        ("dependencies", "axios", "Axios"),
        ("devDependencies", "typescript", "TypeScript"),
        ("devDependencies", "vite", "Vite"),
        ("devDependencies", "tailwindcss", "Tailwind CSS"),
        ("devDependencies", "eslint", "ESLint"),
        ("devDependencies", "prettier", "Prettier"),
    ];
    for (section, dependency, component) in patches {
        if let Some(v) = npm_dependency(&manifest, section, dependency) {
            set_version(components, component, v);
        }
    }

    Ok(())
}

/// Default inventory patched from whichever manifests can be read
pub async fn load_components(backend_manifest: &Path, frontend_manifest: &Path) -> Vec<Component> {
    let mut components = default_components();

    match tokio::fs::read_to_string(backend_manifest).await {
        Ok(raw) => {
            if let Err(e) = apply_cargo_manifest(&mut components, &raw) {
                tracing::warn!("Could not parse {}: {}", backend_manifest.display(), e);
            }
        }
        Err(e) => tracing::warn!("Could not read {}: {}", backend_manifest.display(), e),
    }

    match tokio::fs::read_to_string(frontend_manifest).await {
        Ok(raw) => {
            if let Err(e) = apply_package_json(&mut components, &raw) {
                tracing::warn!("Could not parse {}: {}", frontend_manifest.display(), e);
            }
        }
        Err(e) => tracing::warn!("Could not read {}: {}", frontend_manifest.display(), e),
    }

    components
}
