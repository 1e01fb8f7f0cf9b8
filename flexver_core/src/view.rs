/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::view
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Present a version snapshot and decide whether the update
    affordance (changelog link) is offered.

  Security / Safety Notes:
    Holds no mutable state; the refresh capability is invoked
    once at mount and never again.

  Dependencies:
    serde for the JSON rendering consumed by `--json`.

  Operational Scope:
    Mounted by the composition root, re-rendered whenever the
    store snapshot changes.

  Revision History:
    2025-11-12 COD  Authored version view.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Rendering is a pure function of props
    - Explicit initialisation instead of hidden lifecycle hooks
============================================================*/

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::comparator::VersionComparator;
use crate::version_info::VersionInfo;

/// Where the update affordance points.
pub const DEFAULT_CHANGELOG_URL: &str = "https://flexget.com/ChangeLog";

/// Inputs of the version view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewProps {
    pub version: VersionInfo,
    pub class_name: String,
    pub changelog_url: String,
}

impl ViewProps {
    pub fn new(version: VersionInfo) -> Self {
        Self {
            version,
            class_name: String::new(),
            changelog_url: DEFAULT_CHANGELOG_URL.to_string(),
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_changelog_url(mut self, url: impl Into<String>) -> Self {
        self.changelog_url = url.into();
        self
    }
}

/// Whether the "update available" link is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UpdateAffordance {
    Absent,
    Available { latest: String, changelog_url: String },
}

/// Output of a single render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub class_name: String,
    pub flexget_line: String,
    pub api_line: String,
    pub update: UpdateAffordance,
}

impl Rendered {
    pub fn update_available(&self) -> bool {
        matches!(self.update, UpdateAffordance::Available { .. })
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.flexget_line)?;
        write!(f, "{}", self.api_line)?;
        if let UpdateAffordance::Available {
            latest,
            changelog_url,
        } = &self.update
        {
            write!(f, "\nUpdate available: {latest} ({changelog_url})")?;
        }
        Ok(())
    }
}

/// Presentation unit for daemon version metadata.
#[derive(Debug)]
pub struct VersionView {
    props: ViewProps,
}

impl VersionView {
    /// Mount the view, requesting a refresh through `get_version` exactly once.
    pub fn mount<F>(props: ViewProps, get_version: F) -> Self
    where
        F: FnOnce(),
    {
        get_version();
        Self { props }
    }

    pub fn props(&self) -> &ViewProps {
        &self.props
    }

    /// Replace props after a store update. Does not request another refresh.
    pub fn set_props(&mut self, props: ViewProps) {
        self.props = props;
    }

    pub fn render(&self, comparator: &dyn VersionComparator) -> Rendered {
        let version = &self.props.version;
        let update = if should_offer_update(version, comparator) {
            UpdateAffordance::Available {
                latest: version.latest.clone(),
                changelog_url: self.props.changelog_url.clone(),
            }
        } else {
            UpdateAffordance::Absent
        };

        Rendered {
            class_name: self.props.class_name.clone(),
            flexget_line: format!("Flexget: {}", version.flexget),
            api_line: format!("API: {}", version.api),
            update,
        }
    }
}

/// True only when `latest` is known and strictly newer than the running build.
pub fn should_offer_update(version: &VersionInfo, comparator: &dyn VersionComparator) -> bool {
    match version.latest() {
        Some(latest) => matches!(
            comparator.compare(latest, &version.flexget),
            Ok(Ordering::Greater)
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::SemverComparator;
    use crate::error::{FlexverError, Result};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Fixed(Result<Ordering>);

    impl VersionComparator for Fixed {
        fn compare(&self, a: &str, _b: &str) -> Result<Ordering> {
            match &self.0 {
                Ok(ordering) => Ok(*ordering),
                Err(_) => Err(FlexverError::Version {
                    input: a.to_string(),
                    reason: "fixed".into(),
                }),
            }
        }
    }

    fn mounted(version: VersionInfo) -> VersionView {
        VersionView::mount(ViewProps::new(version), || {})
    }

    #[test]
    fn mount_requests_refresh_exactly_once() {
        let calls = Cell::new(0);
        let mut view = VersionView::mount(ViewProps::new(VersionInfo::default()), || {
            calls.set(calls.get() + 1)
        });
        assert_eq!(calls.get(), 1);

        view.set_props(ViewProps::new(VersionInfo::new("1.0", "2.0.0", "")));
        let _ = view.render(&SemverComparator);
        let _ = view.render(&SemverComparator);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn renders_update_when_latest_is_newer() {
        let view = mounted(VersionInfo::new("1.0", "2.10.11", "2.10.60"));
        let rendered = view.render(&SemverComparator);
        assert_eq!(rendered.flexget_line, "Flexget: 2.10.11");
        assert_eq!(rendered.api_line, "API: 1.0");
        assert_eq!(
            rendered.update,
            UpdateAffordance::Available {
                latest: "2.10.60".into(),
                changelog_url: DEFAULT_CHANGELOG_URL.into(),
            }
        );
        assert_eq!(
            rendered.to_string(),
            "Flexget: 2.10.11\nAPI: 1.0\nUpdate available: 2.10.60 (https://flexget.com/ChangeLog)"
        );
    }

    #[test]
    fn hides_update_when_versions_match() {
        let view = mounted(VersionInfo::new("1.0", "2.10.11", "2.10.11"));
        let rendered = view.render(&SemverComparator);
        assert_eq!(rendered.update, UpdateAffordance::Absent);
        assert_eq!(rendered.to_string(), "Flexget: 2.10.11\nAPI: 1.0");
    }

    #[test]
    fn hides_update_when_latest_unknown_regardless_of_comparator() {
        let view = mounted(VersionInfo::new("1.0", "2.10.11", ""));
        assert!(!view.render(&Fixed(Ok(Ordering::Greater))).update_available());
    }

    #[test]
    fn only_strictly_greater_shows_update() {
        let view = mounted(VersionInfo::new("1.0", "2.10.11", "2.10.60"));
        assert!(view.render(&Fixed(Ok(Ordering::Greater))).update_available());
        assert!(!view.render(&Fixed(Ok(Ordering::Equal))).update_available());
        assert!(!view.render(&Fixed(Ok(Ordering::Less))).update_available());
        let failing = Fixed(Err(FlexverError::Network("unused".into())));
        assert!(!view.render(&failing).update_available());
    }

    #[test]
    fn malformed_versions_suppress_update() {
        let view = mounted(VersionInfo::new("1.0", "dev", "2.10.60"));
        assert!(!view.render(&SemverComparator).update_available());
    }

    #[test]
    fn class_name_defaults_empty_and_is_carried() {
        let view = mounted(VersionInfo::default());
        assert_eq!(view.render(&SemverComparator).class_name, "");

        let props = ViewProps::new(VersionInfo::default())
            .with_class_name("sidebar")
            .with_changelog_url("https://example.invalid/log");
        let mut view = mounted(VersionInfo::default());
        view.set_props(props.clone());
        assert_eq!(view.props(), &props);
        assert_eq!(view.render(&SemverComparator).class_name, "sidebar");
    }

    #[test]
    fn json_rendering_tags_affordance_state() {
        let view = mounted(VersionInfo::new("1.0", "2.10.11", "2.10.60"));
        let json = serde_json::to_value(view.render(&SemverComparator)).unwrap();
        assert_eq!(json["update"]["state"], "available");
        assert_eq!(json["update"]["latest"], "2.10.60");
    }
}
