use crate::config::{Config, ConfigError};
use crate::logging::{self, LoggingError};
use crate::metrics::{self, MetricsError};
use clap::{Args, ValueEnum};
use reconciler::{
    Event, ReconcileError, ReconcileState, Reconciler, RelationError, RelationSnapshot,
    RequesterData, Status, StatusSink,
};
use route_config::{ProxyConfig, RenderError, RouteTemplate, ValidationError};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code when the final status is not active.
const EXIT_BLOCKED: u8 = 2;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
    #[error("invalid requester: {0}")]
    Relation(#[from] RelationError),
    #[error("invalid route config: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to render the route config: {0}")]
    Render(#[from] RenderError),
    #[error("could not serialize the proxy config: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("could not write the proxy config: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventKind {
    ConfigChanged,
    RelationChanged,
    UpdateStatus,
}

impl EventKind {
    fn into_event(self, config: &reconciler::Config) -> Event {
        match self {
            EventKind::ConfigChanged => Event::ConfigChanged(config.clone()),
            EventKind::RelationChanged => Event::RelationChanged,
            EventKind::UpdateStatus => Event::UpdateStatus,
        }
    }
}

const DEFAULT_EVENTS: [EventKind; 3] = [
    EventKind::ConfigChanged,
    EventKind::RelationChanged,
    EventKind::UpdateStatus,
];

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Configurator YAML file with options and the relation snapshot.
    #[arg(long)]
    pub config: PathBuf,
    /// Events to deliver, in order. Defaults to config-changed, relation-changed, update-status.
    #[arg(long = "event", value_enum)]
    pub events: Vec<EventKind>,
    /// Where to write the proxy config. Defaults to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[arg(long)]
    pub root_url: String,
    #[arg(long)]
    pub rule: Option<String>,
    /// Model of the requesting unit.
    #[arg(long)]
    pub model: String,
    /// Unit name of the requester, e.g. `remote/0`.
    #[arg(long)]
    pub unit: String,
}

/// Logs every status change, like a host would surface it to the operator.
#[derive(Default)]
struct LoggedStatus {
    current: Option<Status>,
}

impl StatusSink for LoggedStatus {
    fn set_status(&mut self, status: Status) {
        if self.current.as_ref() != Some(&status) {
            tracing::info!(%status, "status changed");
        }
        self.current = Some(status);
    }
}

pub fn reconcile(args: ReconcileArgs) -> Result<ExitCode, CliError> {
    let config = Config::from_file(&args.config)?;
    let _guard = logging::init(config.common.logging.as_ref())?;
    if let Some(metrics_config) = &config.common.metrics {
        metrics::init(metrics_config)?;
    }

    let events = if args.events.is_empty() {
        DEFAULT_EVENTS.to_vec()
    } else {
        args.events
    };

    let mut reconciler = Reconciler::new(config.relations, LoggedStatus::default());
    let mut state = ReconcileState::new();
    let mut status = Status::Maintenance("no events delivered".into());
    let mut proxy_config = None;

    for kind in events {
        let event = kind.into_event(&config.options);
        tracing::debug!(event = event.name(), "delivering event");
        let result = reconciler.reconcile(event, &mut state)?;
        if result.deferred {
            tracing::info!(?kind, "event deferred");
        }
        if result.proxy_config.is_some() {
            proxy_config = result.proxy_config;
        }
        status = result.status;
    }

    for published in reconciler.ingress().published() {
        tracing::info!(
            relation = %published.relation,
            requester = %published.requester,
            url = %published.url,
            "published url"
        );
    }

    write_proxy_config(&proxy_config.unwrap_or_default(), args.output.as_ref())?;

    tracing::info!(%status, "final status");
    Ok(exit_code(&status))
}

pub fn render(args: RenderArgs) -> Result<ExitCode, CliError> {
    let _guard = logging::init(None)?;

    let template = RouteTemplate::new(args.root_url, args.rule);
    template.validate()?;

    let data = RequesterData {
        model: args.model,
        name: args.unit,
    };
    let descriptor = template.render(&data.template_context()?)?;
    write_proxy_config(&route_config::merge(&[descriptor]), None)?;

    Ok(ExitCode::SUCCESS)
}

/// Checks only the options; the relation state in the file is ignored.
pub fn validate(config_path: PathBuf) -> Result<ExitCode, CliError> {
    let config = Config::from_file(&config_path)?;
    let _guard = logging::init(config.common.logging.as_ref())?;

    let mut reconciler = Reconciler::new(RelationSnapshot::new(), LoggedStatus::default());
    let result = reconciler.reconcile(
        Event::ConfigChanged(config.options),
        &mut ReconcileState::new(),
    )?;

    match result.status {
        Status::Blocked(blocker) if !blocker.is_transient() => {
            eprintln!("invalid config: {blocker}");
            Ok(ExitCode::FAILURE)
        }
        _ => {
            eprintln!("config ok");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn write_proxy_config(
    proxy_config: &ProxyConfig,
    output: Option<&PathBuf>,
) -> Result<(), CliError> {
    let yaml = serde_yaml::to_string(proxy_config)?;
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(yaml.as_bytes())?;
            tracing::info!(path = %path.display(), "wrote proxy config");
        }
        None => io::stdout().write_all(yaml.as_bytes())?,
    }
    Ok(())
}

fn exit_code(status: &Status) -> ExitCode {
    if status.is_active() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_BLOCKED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        let options = reconciler::Config::default();
        assert_eq!(
            EventKind::ConfigChanged.into_event(&options),
            Event::ConfigChanged(options.clone())
        );
        assert_eq!(
            EventKind::UpdateStatus.into_event(&options),
            Event::UpdateStatus
        );
    }

    #[test]
    fn test_logged_status_keeps_latest() {
        let mut sink = LoggedStatus::default();
        sink.set_status(Status::Active);
        sink.set_status(Status::Active);
        assert_eq!(sink.current, Some(Status::Active));
    }

    #[test]
    fn test_write_proxy_config_to_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("routes.yaml");
        let template = RouteTemplate::new("http://foo.bar/{{unit_name}}", None);
        let descriptor = template
            .render(&route_config::TemplateContext::new("testing", "remote-0", "remote"))
            .unwrap();
        let proxy_config = route_config::merge(&[descriptor]);

        write_proxy_config(&proxy_config, Some(&path)).unwrap();

        let written: ProxyConfig =
            serde_yaml::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(written, proxy_config);
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(&Status::Active), ExitCode::SUCCESS);
        assert_eq!(
            exit_code(&Status::Blocked(reconciler::Blocker::RelationNotFound)),
            ExitCode::from(EXIT_BLOCKED)
        );
    }
}
