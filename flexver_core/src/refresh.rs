/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::refresh
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Service the view's refresh request: resolve an action from
    an action file, the daemon, or local mode, reduce it into
    the store, and render the view from the new snapshot.

  Security / Safety Notes:
    Reads operator-supplied action files and performs GET
    requests through the release client only.

  Dependencies:
    tokio mpsc for the refresh request channel.

  Operational Scope:
    Called once per session by the composition root.

  Revision History:
    2025-11-14 COD  Split refresh wiring out of the entry point.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fetch failures never reach the view
    - Failures still map to deterministic exit codes
============================================================*/

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tokio::sync::mpsc;

use crate::comparator::VersionComparator;
use crate::error::{FlexverError, Result};
use crate::logger::Logger;
use crate::release::ReleaseClient;
use crate::store::{Action, VersionPayload, VersionStore};
use crate::view::{Rendered, VersionView, ViewProps};

/// Where a refresh takes its action from, besides the daemon.
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    /// Reduce this JSON action instead of fetching.
    pub action_file: Option<PathBuf>,
    /// Running FlexGet version for local mode (no daemon configured).
    pub current: Option<String>,
}

/// Request emitted by the view's `getVersion` capability.
#[derive(Debug)]
struct RefreshRequest;

/// Rendering after the refresh, plus the fetch failure if there was one.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub rendered: Rendered,
    pub failure: Option<FlexverError>,
}

impl RefreshOutcome {
    pub fn exit_code(&self) -> ExitCode {
        self.failure
            .as_ref()
            .map_or(ExitCode::SUCCESS, FlexverError::exit_code)
    }
}

/// Mount the view, service its refresh request, and render from the store.
pub async fn mount_and_refresh(
    props: ViewProps,
    store: &mut VersionStore,
    options: &RefreshOptions,
    client: &ReleaseClient,
    comparator: &dyn VersionComparator,
    logger: &Logger,
) -> RefreshOutcome {
    let (requests, mut pending) = mpsc::unbounded_channel::<RefreshRequest>();
    let mut view = VersionView::mount(props, || {
        if requests.send(RefreshRequest).is_err() {
            logger.warn("REFRESH", "Refresh channel closed before request");
        }
    });
    drop(requests);

    let mut failure = None;
    while let Some(request) = pending.recv().await {
        logger.debug("REFRESH", format!("Servicing {request:?}"));
        match resolve_action(options, client, logger).await {
            Ok(action) => store.dispatch(&action, logger),
            Err(err) => {
                logger.error("FETCH", format!("Version refresh failed: {err}"));
                failure = Some(err);
            }
        }
    }

    view.set_props(ViewProps {
        version: store.state().clone(),
        ..view.props().clone()
    });
    RefreshOutcome {
        rendered: view.render(comparator),
        failure,
    }
}

/// Produce the action that answers a refresh request.
///
/// Without a daemon, `options.current` is required. A missing
/// `latest_version` is filled from the release index when it answers.
pub async fn resolve_action(
    options: &RefreshOptions,
    client: &ReleaseClient,
    logger: &Logger,
) -> Result<Action> {
    if let Some(path) = &options.action_file {
        logger.info("ACTION", format!("Reading action from {}", path.display()));
        return read_action(path);
    }

    let mut payload = if client.has_server() {
        match client.fetch_server_version().await? {
            Action::VersionReceived(payload) => payload,
            other => return Ok(other),
        }
    } else {
        let current = options.current.clone().ok_or_else(|| {
            FlexverError::Config("Provide --server/server.base_url or --current".into())
        })?;
        VersionPayload {
            flexget_version: current,
            ..VersionPayload::default()
        }
    };

    if payload.latest_version.is_empty() {
        match client.fetch_latest_release().await {
            Ok(latest) => payload.latest_version = latest,
            Err(err) => logger.warn("RELEASE", format!("Latest release unknown: {err}")),
        }
    }

    Ok(Action::VersionReceived(payload))
}

pub fn read_action(path: &Path) -> Result<Action> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        FlexverError::Filesystem(format!("Failed to read action file {}: {err}", path.display()))
    })?;
    Action::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::SemverComparator;
    use crate::test_support::{client, serve};
    use crate::version_info::VersionInfo;
    use crate::view::UpdateAffordance;
    use pretty_assertions::assert_eq;

    const DAEMON_NO_LATEST: &str =
        r#"{"api_version": "1.1.2", "flexget_version": "2.10.11", "latest_version": ""}"#;

    fn quiet() -> Logger {
        Logger::new(None, false).unwrap()
    }

    async fn refresh(options: &RefreshOptions, client: &ReleaseClient) -> (VersionStore, RefreshOutcome) {
        let mut store = VersionStore::new();
        let outcome = mount_and_refresh(
            ViewProps::new(VersionInfo::default()),
            &mut store,
            options,
            client,
            &SemverComparator,
            &quiet(),
        )
        .await;
        (store, outcome)
    }

    #[tokio::test]
    async fn missing_latest_is_filled_from_release_index() {
        let daemon = serve(vec![(200, DAEMON_NO_LATEST)]).await;
        let pypi = serve(vec![(200, r#"{"info": {"version": "2.10.60"}}"#)]).await;
        let client = client(Some(daemon), &pypi);

        let (store, outcome) = refresh(&RefreshOptions::default(), &client).await;
        assert_eq!(store.state(), &VersionInfo::new("1.1.2", "2.10.11", "2.10.60"));
        assert!(outcome.failure.is_none());
        assert!(outcome.rendered.update_available());
    }

    #[tokio::test]
    async fn release_index_failure_leaves_latest_empty() {
        let daemon = serve(vec![(200, DAEMON_NO_LATEST)]).await;
        let pypi = serve(vec![(500, "{}"), (500, "{}")]).await;
        let client = client(Some(daemon), &pypi);

        let (store, outcome) = refresh(&RefreshOptions::default(), &client).await;
        assert_eq!(store.state(), &VersionInfo::new("1.1.2", "2.10.11", ""));
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.rendered.update, UpdateAffordance::Absent);
    }

    #[tokio::test]
    async fn local_mode_requires_current_version() {
        let client = client(None, "http://unused.invalid");
        let err = resolve_action(&RefreshOptions::default(), &client, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, FlexverError::Config(_)));
    }

    #[tokio::test]
    async fn local_mode_uses_current_and_release_index() {
        let pypi = serve(vec![(200, r#"{"info": {"version": "3.0.0"}}"#)]).await;
        let client = client(None, &pypi);
        let options = RefreshOptions {
            current: Some("2.10.11".into()),
            ..RefreshOptions::default()
        };

        let (store, outcome) = refresh(&options, &client).await;
        assert_eq!(store.state(), &VersionInfo::new("", "2.10.11", "3.0.0"));
        assert!(outcome.rendered.update_available());
    }

    #[tokio::test]
    async fn action_file_is_reduced_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("action.json");
        std::fs::write(
            &path,
            r#"{"type": "GET_VERSION", "payload": {"api_version": "1.0", "flexget_version": "2.10.11", "latest_version": "2.10.11"}}"#,
        )
        .unwrap();
        let client = client(Some("http://unused.invalid".into()), "http://unused.invalid");
        let options = RefreshOptions {
            action_file: Some(path),
            ..RefreshOptions::default()
        };

        let (store, outcome) = refresh(&options, &client).await;
        assert_eq!(store.state(), &VersionInfo::new("1.0", "2.10.11", "2.10.11"));
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.rendered.to_string(), "Flexget: 2.10.11\nAPI: 1.0");
    }

    #[tokio::test]
    async fn failed_fetch_renders_unchanged_state_and_keeps_error() {
        let daemon = serve(vec![(503, "{}"), (503, "{}")]).await;
        let client = client(Some(daemon), "http://unused.invalid");

        let (store, outcome) = refresh(&RefreshOptions::default(), &client).await;
        assert_eq!(store.state(), &VersionInfo::default());
        assert_eq!(outcome.rendered.to_string(), "Flexget: \nAPI: ");
        let failure = outcome.failure.as_ref().unwrap();
        assert!(matches!(failure, FlexverError::Network(_)));
        assert_eq!(
            format!("{:?}", outcome.exit_code()),
            format!("{:?}", ExitCode::from(30))
        );
    }

    #[test]
    fn missing_action_file_is_a_filesystem_error() {
        let err = read_action(Path::new("/nonexistent/flexver/action.json")).unwrap_err();
        assert!(matches!(err, FlexverError::Filesystem(_)));
    }
}
