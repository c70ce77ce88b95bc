//! Rules and strategy names.
//!
//! A [`Rule`] is selected for a request by an external matcher. The strategies
//! only read two things from it: whether a successful network response should
//! be written back to the store, and an optional bundle of resources to prime
//! in the background.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::UnknownStrategy;

/// Name of a resolution strategy.
///
/// Each variant has a canonical policy name and an alias kept for rules
/// written against the older naming scheme.
///
/// | Variant | Name | Alias |
/// |---------|------|-------|
/// | [`LocalFirst`](Self::LocalFirst) | `local-first` | `offline-first` |
/// | [`RemoteFirst`](Self::RemoteFirst) | `remote-first` | `online-first` |
/// | [`Race`](Self::Race) | `race` | `fastest` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Read from the store, fetching and populating on a miss.
    #[serde(rename = "local-first", alias = "offline-first")]
    LocalFirst,
    /// Fetch from the network, falling back to the store and then to a
    /// synthesized substitute.
    #[serde(rename = "remote-first", alias = "online-first")]
    RemoteFirst,
    /// Query network and store in parallel, first usable answer wins.
    #[serde(rename = "race", alias = "fastest")]
    Race,
}

impl StrategyKind {
    /// All strategies, in registration order.
    pub const ALL: [StrategyKind; 3] = [Self::LocalFirst, Self::RemoteFirst, Self::Race];

    /// Canonical policy name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFirst => "local-first",
            Self::RemoteFirst => "remote-first",
            Self::Race => "race",
        }
    }

    /// Alias accepted in place of the canonical name.
    pub const fn alias(&self) -> &'static str {
        match self {
            Self::LocalFirst => "offline-first",
            Self::RemoteFirst => "online-first",
            Self::Race => "fastest",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.alias() == s)
            .ok_or_else(|| UnknownStrategy(SmolStr::new(s)))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actions attached to a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    /// Resources to prime into the store in the background.
    #[serde(default)]
    pub bundle: Option<Vec<SmolStr>>,
    /// Write successful network responses back to the store.
    #[serde(default)]
    pub cache: bool,
}

/// Static policy selected by the rule matcher for one request.
///
/// # Example
///
/// ```
/// use fetchbox_core::{Rule, StrategyKind};
///
/// let rule = Rule::new(StrategyKind::Race)
///     .with_cache(true)
///     .with_bundle(["/app.js", "/app.css"]);
///
/// assert!(rule.action.cache);
/// assert_eq!(rule.bundle().map(<[_]>::len), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Name of the rule, used in logs only.
    #[serde(default)]
    pub name: SmolStr,
    /// Strategy used to resolve matching requests.
    pub strategy: StrategyKind,
    /// Actions to apply.
    #[serde(default)]
    pub action: RuleAction,
}

impl Rule {
    /// Creates an unnamed rule without actions.
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            name: SmolStr::default(),
            strategy,
            action: RuleAction::default(),
        }
    }

    /// Sets the rule name.
    pub fn with_name(self, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Sets the cache flag.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.action.cache = cache;
        self
    }

    /// Sets the bundle of resources to prime.
    pub fn with_bundle<I, S>(mut self, bundle: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.action.bundle = Some(bundle.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the bundle to prime. An empty list is still a bundle.
    pub fn bundle(&self) -> Option<&[SmolStr]> {
        self.action.bundle.as_deref()
    }
}
