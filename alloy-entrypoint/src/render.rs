//! Renders the agent's River configuration from the parsed settings.
//!
//! Rendering is pure (settings in, text out) so it can be tested without
//! touching the environment or the filesystem. Writing the file and handing
//! over to the agent are the binary's job.

use crate::settings::{DiscoverTarget, RemoteConfig, ScrapeTarget, StaticTarget};

/// Produces the full configuration text: one block per scrape target, in
/// order, followed by a single `prometheus.remote_write` block.
pub fn render_config(targets: &[ScrapeTarget], remote: &RemoteConfig) -> String {
    let mut config = String::new();

    for target in targets {
        match target {
            ScrapeTarget::Static(target) => push_scrape_block(&mut config, target),
            ScrapeTarget::Discover(target) => push_discovery_block(&mut config, target),
        }
    }

    push_remote_write_block(&mut config, remote);
    config
}

// River block labels only allow identifier characters, so hyphens in the
// host are mapped to underscores. The scrape address keeps the real host.
fn push_scrape_block(config: &mut String, target: &StaticTarget) {
    let clean_name = target.host.replace('-', "_");
    config.push_str(&format!(
        "prometheus.scrape \"target_{}_{}\" {{\n",
        clean_name, target.port
    ));
    config.push_str(&format!(
        "    targets = [{{__address__ = \"{}:{}\"}}]\n",
        target.host, target.port
    ));
    config.push_str(&format!("    scrape_interval = \"{}\"\n", target.interval));
    config.push_str(&format!("    scrape_timeout = \"{}\"\n", target.timeout));
    if let Some(path) = &target.path {
        config.push_str(&format!("    metrics_path = \"{}\"\n", path));
    }
    config.push_str("    forward_to = [prometheus.remote_write.default.receiver]\n");
    config.push_str("}\n");
}

fn push_discovery_block(config: &mut String, target: &DiscoverTarget) {
    config.push_str(&format!(
        "discovery.kubernetes \"target_{}\" {{\n",
        target.role
    ));
    config.push_str(&format!("    role = \"{}\"\n", target.role));
    for job in &target.jobs {
        config.push_str("    selectors {\n");
        config.push_str("        role = \"pod\"\n");
        config.push_str(&format!("        label = \"name={}\"\n", job));
        config.push_str("    }\n");
    }
    config.push_str("}\n");
}

fn push_remote_write_block(config: &mut String, remote: &RemoteConfig) {
    config.push_str("prometheus.remote_write \"default\" {\n");
    config.push_str("  endpoint {\n");
    config.push_str(&format!("    url = \"{}\"\n", remote.url));
    if let Some((username, password)) = remote.basic_auth() {
        config.push_str("    basic_auth {\n");
        config.push_str(&format!("      username = \"{}\"\n", username));
        config.push_str(&format!("      password = \"{}\"\n", password));
        config.push_str("    }\n");
    }
    config.push_str("  }\n");
    config.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use crate::settings::parse_targets;

    use super::*;

    fn remote(username: Option<&str>, password: Option<&str>) -> RemoteConfig {
        RemoteConfig {
            url: "https://example/push".to_string(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn renders_one_scrape_block_and_one_remote_write_block() {
        let targets =
            parse_targets(r#"[{"host":"botng","port":8118,"interval":"1s","timeout":"1s"}]"#)
                .unwrap();

        let config = render_config(&targets, &remote(None, None));

        assert_eq!(
            config,
            "prometheus.scrape \"target_botng_8118\" {\n\
             \x20   targets = [{__address__ = \"botng:8118\"}]\n\
             \x20   scrape_interval = \"1s\"\n\
             \x20   scrape_timeout = \"1s\"\n\
             \x20   forward_to = [prometheus.remote_write.default.receiver]\n\
             }\n\
             prometheus.remote_write \"default\" {\n\
             \x20 endpoint {\n\
             \x20   url = \"https://example/push\"\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn one_block_per_target_in_array_order() {
        let targets = parse_targets(
            r#"[{"host":"first","port":1},{"host":"second","port":2},{"host":"third","port":3}]"#,
        )
        .unwrap();

        let config = render_config(&targets, &remote(None, None));

        let first = config.find("target_first_1").unwrap();
        let second = config.find("target_second_2").unwrap();
        let third = config.find("target_third_3").unwrap();
        assert!(first < second && second < third);
        assert_eq!(config.matches("prometheus.scrape").count(), 3);
        assert_eq!(
            config.matches("prometheus.remote_write \"default\" {").count(),
            1
        );
    }

    #[test]
    fn discover_renders_discovery_block_not_scrape_block() {
        let targets = parse_targets(r#"[{"type":"discover"}]"#).unwrap();

        let config = render_config(&targets, &remote(None, None));

        assert!(config.starts_with("discovery.kubernetes \"target_pod\" {\n    role = \"pod\"\n}\n"));
        assert!(!config.contains("prometheus.scrape"));
    }

    #[test]
    fn discovery_jobs_render_selectors() {
        let targets =
            parse_targets(r#"[{"type":"discover","role":"pod","jobs":["botng"]}]"#).unwrap();

        let config = render_config(&targets, &remote(None, None));

        assert!(config.contains(
            "    selectors {\n        role = \"pod\"\n        label = \"name=botng\"\n    }\n"
        ));
    }

    #[test]
    fn hyphenated_host_is_sanitized_in_label_only() {
        let targets = parse_targets(r#"[{"host":"bot-ng","port":8118}]"#).unwrap();

        let config = render_config(&targets, &remote(None, None));

        assert!(config.contains("prometheus.scrape \"target_bot_ng_8118\""));
        assert!(config.contains("__address__ = \"bot-ng:8118\""));
    }

    #[test]
    fn metrics_path_is_emitted_only_when_set() {
        let targets =
            parse_targets(r#"[{"host":"botng","port":8118,"path":"/actuator/prometheus"}]"#)
                .unwrap();
        let config = render_config(&targets, &remote(None, None));
        assert!(config.contains("    metrics_path = \"/actuator/prometheus\"\n"));

        let targets = parse_targets(r#"[{"host":"botng","port":8118}]"#).unwrap();
        let config = render_config(&targets, &remote(None, None));
        assert!(!config.contains("metrics_path"));
    }

    #[test]
    fn credentials_emit_basic_auth_block() {
        let targets = parse_targets(r#"[{"host":"botng","port":8118}]"#).unwrap();

        let config = render_config(&targets, &remote(Some("user"), Some("secret")));

        assert!(config.contains(
            "    basic_auth {\n      username = \"user\"\n      password = \"secret\"\n    }\n"
        ));
    }

    #[test]
    fn no_credentials_means_no_auth_block() {
        let targets = parse_targets(r#"[{"host":"botng","port":8118}]"#).unwrap();

        let config = render_config(&targets, &remote(None, None));
        assert!(!config.contains("basic_auth"));

        // Half a credential pair renders the same as none.
        let config = render_config(&targets, &remote(Some("user"), None));
        assert!(!config.contains("basic_auth"));
    }
}
