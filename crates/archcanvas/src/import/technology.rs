//! Technology auto-mapping
//!
//! Resolves an imported node to a catalog id: an explicit technology name
//! goes through the alias table first, then the node name is matched
//! against keyword rules. Anything left over gets the default entry.

use tracing::trace;

use crate::core::{TechnologyCatalog, DEFAULT_TECHNOLOGY_ID};

/// Spelling variants that map to a different catalog id
const ALIASES: &[(&str, &str)] = &[
    ("node", "nodejs"),
    ("node.js", "nodejs"),
    ("postgresql", "postgres"),
    ("psql", "postgres"),
    ("k8s", "kubernetes"),
    ("mongo", "mongodb"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("golang", "go"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("next", "nextjs"),
    ("next.js", "nextjs"),
    ("elastic", "elasticsearch"),
    ("rabbit", "rabbitmq"),
    ("load-balancer", "loadbalancer"),
    ("lb", "loadbalancer"),
    ("google-cloud", "gcp"),
    ("amazon", "aws"),
];

/// Keyword rules over the lowercased node name, first match wins
const NAME_RULES: &[(&[&str], &str)] = &[
    (&["keycloak"], "keycloak"),
    (&["auth0"], "auth0"),
    (&["vault"], "vault"),
    (&["opa", "policy"], "opa"),
    (&["auth", "identity", "login"], "keycloak"),
    (&["kong"], "kong"),
    (&["istio"], "istio"),
    (&["consul"], "consul"),
    (&["gateway"], "gateway"),
    (&["proxy"], "proxy"),
    (&["loadbalancer", "load-balancer"], "loadbalancer"),
    (&["kafka"], "kafka"),
    (&["rabbitmq"], "rabbitmq"),
    (&["queue", "messaging"], "kafka"),
    (&["prometheus"], "prometheus"),
    (&["grafana"], "grafana"),
    (&["jaeger"], "jaeger"),
    (&["monitoring", "metrics"], "prometheus"),
    (&["spark"], "spark"),
    (&["airflow"], "airflow"),
    (&["flink"], "flink"),
    (&["elasticsearch", "elastic"], "elasticsearch"),
    (&["solr"], "solr"),
    (&["search", "index"], "elasticsearch"),
    (&["react", "frontend", "ui"], "react"),
    (&["vue"], "vue"),
    (&["angular"], "angular"),
    (&["api", "server", "backend"], "express"),
    (&["node"], "nodejs"),
    (&["nginx"], "nginx"),
    (&["apache"], "apache"),
    (&["database", "db"], "postgres"),
    (&["mongo"], "mongodb"),
    (&["postgres"], "postgres"),
    (&["mysql"], "mysql"),
    (&["redis", "cache"], "redis"),
    (&["aws", "amazon"], "aws"),
    (&["azure", "microsoft"], "azure"),
    (&["gcp", "google"], "gcp"),
    (&["docker", "container"], "docker"),
    (&["kubernetes", "k8s"], "kubernetes"),
    (&["worker", "job"], "worker"),
    (&["scheduler", "cron"], "scheduler"),
    (&["microservice", "micro-service"], "microservice"),
    (&["service"], "service"),
];

/// Candidate id for an explicit technology name, before catalog lookup
pub fn alias_for(technology: &str) -> String {
    let lower = technology.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, id)| id.to_string())
        .unwrap_or(lower)
}

/// Resolve a catalog id for an imported node.
///
/// Candidates that are not in `catalog` are skipped, so the result is
/// always a known id or the default.
pub fn auto_map(name: &str, technology: Option<&str>, catalog: &TechnologyCatalog) -> String {
    if let Some(explicit) = technology.filter(|t| !t.trim().is_empty()) {
        let candidate = alias_for(explicit);
        if catalog.contains(&candidate) {
            trace!(name = %name, technology = %candidate, "Mapped explicit technology");
            return candidate;
        }
    }

    let lower = name.to_lowercase();
    for (keywords, id) in NAME_RULES {
        if keywords.iter().any(|k| lower.contains(k)) && catalog.contains(id) {
            trace!(name = %name, technology = %id, "Mapped technology from name");
            return id.to_string();
        }
    }

    trace!(name = %name, "No technology match, using default");
    DEFAULT_TECHNOLOGY_ID.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TechnologyCatalog {
        TechnologyCatalog::builtin()
    }

    #[test]
    fn test_explicit_aliases() {
        assert_eq!(auto_map("whatever", Some("PostgreSQL"), &catalog()), "postgres");
        assert_eq!(auto_map("whatever", Some("node"), &catalog()), "nodejs");
        assert_eq!(auto_map("whatever", Some("k8s"), &catalog()), "kubernetes");
    }

    #[test]
    fn test_explicit_catalog_id_passes_through() {
        assert_eq!(auto_map("x", Some("redis"), &catalog()), "redis");
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(auto_map("Auth Service", None, &catalog()), "keycloak");
        assert_eq!(auto_map("API Gateway", None, &catalog()), "gateway");
        assert_eq!(auto_map("order-queue", None, &catalog()), "kafka");
        assert_eq!(auto_map("Web Frontend", None, &catalog()), "react");
        assert_eq!(auto_map("user-api", None, &catalog()), "express");
    }

    #[test]
    fn test_unknown_explicit_falls_back_to_name() {
        assert_eq!(auto_map("orders db", Some("foobar"), &catalog()), "postgres");
    }

    #[test]
    fn test_unresolved_is_default() {
        assert_eq!(auto_map("Zebra", None, &catalog()), DEFAULT_TECHNOLOGY_ID);
    }

    #[test]
    fn test_rules_skip_ids_missing_from_catalog() {
        // "scheduler" is not a builtin entry, so the name falls through.
        assert_eq!(auto_map("nightly scheduler", None, &catalog()), DEFAULT_TECHNOLOGY_ID);
    }
}
