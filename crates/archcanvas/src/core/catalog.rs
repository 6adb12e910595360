//! Technology catalog
//!
//! Static lookup table of the technologies a node can represent. The editor
//! only resolves ids to display metadata; unknown ids fall back to the
//! generic service entry.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Id of the fallback catalog entry
pub const DEFAULT_TECHNOLOGY_ID: &str = "default";

/// How a technology icon should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    Emoji,
    Svg,
    Url,
    #[default]
    Text,
}

/// Display metadata for one technology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub icon_type: IconType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub color: String,
    pub category: String,
}

impl Technology {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            icon_type: IconType::Text,
            icon_url: None,
            color: color.into(),
            category: category.into(),
        }
    }

    /// The generic entry used when an id cannot be resolved
    pub fn fallback() -> Self {
        Self::new(DEFAULT_TECHNOLOGY_ID, "Service", "●", "#6B7280", "General")
    }
}

/// Shape preset a node can be drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeTypePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Built-in node shapes
pub const NODE_TYPES: &[NodeTypePreset] = &[
    NodeTypePreset { id: "cube", name: "Cube", description: "Standard cube node" },
    NodeTypePreset { id: "service", name: "Service", description: "Service node" },
    NodeTypePreset { id: "database", name: "Database", description: "Database node" },
    NodeTypePreset { id: "device", name: "Device", description: "Device/Hardware node" },
    NodeTypePreset { id: "gate", name: "Gate", description: "Gate node" },
    NodeTypePreset { id: "node", name: "Node-ori", description: "Ori node" },
    NodeTypePreset { id: "node-sss", name: "Nodes", description: "Nodes" },
    NodeTypePreset { id: "shield", name: "Shield", description: "Shield" },
];

// (id, name, icon, color, category)
const BUILTIN: &[(&str, &str, &str, &str, &str)] = &[
    ("react", "React", "⚛", "#1E3A8A", "Frontend"),
    ("vue", "Vue.js", "V", "#1F2937", "Frontend"),
    ("angular", "Angular", "Δ", "#DD0031", "Frontend"),
    ("svelte", "Svelte", "S", "#FF3E00", "Frontend"),
    ("nextjs", "Next.js", "▲", "#F3F4F6", "Frontend"),
    ("spring", "Spring", "❀", "#F3F4F6", "Backend"),
    ("express", "Express.js", "E", "#F3F4F6", "Backend"),
    ("fastapi", "FastAPI", "⚡", "#F3F4F6", "Backend"),
    ("django", "Django", "D", "#F3F4F6", "Backend"),
    ("flask", "Flask", "F", "#F3F4F6", "Backend"),
    ("rails", "Ruby on Rails", "♦", "#F3F4F6", "Backend"),
    ("gin", "Gin", "🍸", "#00ADD8", "Backend"),
    ("javascript", "JavaScript", "JS", "#1F2937", "Languages"),
    ("typescript", "TypeScript", "TS", "#F3F4F6", "Languages"),
    ("python", "Python", "🐍", "#F3F4F6", "Languages"),
    ("java", "Java", "☕", "#1F2937", "Languages"),
    ("go", "Go", "🐹", "#1F2937", "Languages"),
    ("rust", "Rust", "🦀", "#CE422B", "Languages"),
    ("mysql", "MySQL", "🐬", "#F3F4F6", "Database"),
    ("postgres", "PostgreSQL", "🐘", "#F3F4F6", "Database"),
    ("mongodb", "MongoDB", "M", "#F3F4F6", "Database"),
    ("redis", "Redis", "◆", "#F3F4F6", "Database"),
    ("cassandra", "Cassandra", "💎", "#1287B1", "Database"),
    ("elasticsearch", "Elasticsearch", "E", "#F3F4F6", "Database"),
    ("docker", "Docker", "🐳", "#F3F4F6", "DevOps"),
    ("kubernetes", "Kubernetes", "☸", "#F3F4F6", "DevOps"),
    ("jenkins", "Jenkins", "J", "#F3F4F6", "DevOps"),
    ("terraform", "Terraform", "T", "#F3F4F6", "DevOps"),
    ("aws", "AWS", "☁️", "#FF9900", "Cloud"),
    ("azure", "Azure", "⧨", "#F3F4F6", "Cloud"),
    ("gcp", "Google Cloud", "◉", "#F3F4F6", "Cloud"),
    ("kafka", "Apache Kafka", "K", "#F3F4F6", "Messaging"),
    ("rabbitmq", "RabbitMQ", "R", "#1F2937", "Messaging"),
    ("nats", "NATS", "⚡", "#375C93", "Messaging"),
    ("nginx", "Nginx", "N", "#1a651a", "Infrastructure"),
    ("haproxy", "HAProxy", "⚖️", "#106DA9", "Infrastructure"),
    ("envoy", "Envoy", "E", "#AC6199", "Infrastructure"),
    ("nodejs", "Node.js", "N", "#F3F4F6", "Runtime"),
    ("prometheus", "Prometheus", "🔥", "#892810", "Monitoring"),
    ("grafana", "Grafana", "📊", "#F46800", "Monitoring"),
    ("jaeger", "Jaeger", "🔍", "#60D0E4", "Monitoring"),
    ("zipkin", "Zipkin", "🔍", "#FF6B35", "Monitoring"),
    ("datadog", "Datadog", "DD", "#c9aeea", "Monitoring"),
    ("keycloak", "Keycloak", "🔐", "#4D4D4D", "Security"),
    ("auth0", "Auth0", "0", "#333333", "Security"),
    ("vault", "HashiCorp Vault", "V", "#FFD814", "Security"),
    ("kong", "Kong Gateway", "🦍", "#99d5ff", "API"),
    ("istio", "Istio", "🕸️", "#466BB0", "API"),
    ("consul", "Consul", "🏛️", "#CA2171", "API"),
    ("spark", "Apache Spark", "⚡", "#b74815", "Analytics"),
    ("airflow", "Apache Airflow", "🌊", "#017CEE", "Analytics"),
    ("flink", "Apache Flink", "🔄", "#E6526F", "Analytics"),
    ("minio", "MinIO", "🪣", "#C72E29", "Storage"),
    ("gateway", "Gateway", "◎", "#3B82F6", "Service"),
    ("proxy", "Proxy", "◐", "#6366F1", "Service"),
    ("loadbalancer", "Load Balancer", "⚖", "#8B5CF6", "Service"),
];

/// Id-keyed technology lookup with a guaranteed fallback entry
#[derive(Debug, Clone)]
pub struct TechnologyCatalog {
    entries: HashMap<String, Technology>,
    order: Vec<String>,
    fallback: Technology,
}

impl TechnologyCatalog {
    /// An empty catalog holding only the fallback entry
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            fallback: Technology::fallback(),
        }
    }

    /// Catalog preloaded with the built-in technologies
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (id, name, icon, color, category) in BUILTIN {
            catalog.insert(Technology::new(*id, *name, *icon, *color, *category));
        }
        catalog
    }

    /// Catalog built from caller-supplied entries
    pub fn from_entries(entries: impl IntoIterator<Item = Technology>) -> Self {
        let mut catalog = Self::empty();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// Add or replace an entry; insertion order is kept for listing
    pub fn insert(&mut self, technology: Technology) {
        if technology.id == DEFAULT_TECHNOLOGY_ID {
            self.fallback = technology;
            return;
        }
        if !self.entries.contains_key(&technology.id) {
            self.order.push(technology.id.clone());
        }
        self.entries.insert(technology.id.clone(), technology);
    }

    pub fn contains(&self, id: &str) -> bool {
        id == DEFAULT_TECHNOLOGY_ID || self.entries.contains_key(id)
    }

    /// Resolve an id, falling back to the default entry
    pub fn resolve(&self, id: &str) -> &Technology {
        self.entries.get(id).unwrap_or(&self.fallback)
    }

    /// Return `id` when known, otherwise the fallback id
    pub fn resolve_id(&self, id: &str) -> String {
        if self.contains(id) {
            id.to_string()
        } else {
            self.fallback.id.clone()
        }
    }

    pub fn fallback(&self) -> &Technology {
        &self.fallback
    }

    /// Entries in insertion order, fallback last
    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .chain(std::iter::once(&self.fallback))
    }

    /// Distinct category names, sorted
    pub fn categories(&self) -> Vec<String> {
        self.iter()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Entries belonging to one category
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Technology> + 'a {
        self.iter().filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for TechnologyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
