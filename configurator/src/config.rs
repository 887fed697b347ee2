use reconciler::{Config as Options, RelationSnapshot};
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    /// Host options handed to the reconciler on `config-changed`.
    #[serde(default)]
    pub options: Options,
    /// Ingress relation as seen by the host.
    #[serde(default)]
    pub relations: RelationSnapshot,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconciler::{IngressProvider, RelationId, Requester};
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            logging:
                sentry_dsn: https://public@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            options:
                access_rules: '{"id": "some-id"}'
                root_url: "http://foo.bar/{{model_name}}-{{unit_name}}"
            relations:
                - id: 4
                  units:
                    - name: remote/0
                      data:
                        model: testing
                        name: remote/0
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert!(config.common.logging.is_some());
        assert!(config.options.access_rules_configured());
        assert_eq!(config.options.rule, None);
        assert_eq!(config.relations.canonical_relation(), Some(RelationId(4)));
        assert!(
            config
                .relations
                .is_requester_ready(RelationId(4), &Requester::new("remote/0"))
        );
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("options: {}\n");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.common.metrics.is_none());
        assert!(config.common.logging.is_none());
        assert_eq!(config.relations.canonical_relation(), None);
    }

    #[test]
    fn config_errors() {
        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/configurator.yaml")),
            Err(ConfigError::LoadError(_))
        ));

        let tmp = write_tmp_file("metrics:\n    statsd_port: not-a-port\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
