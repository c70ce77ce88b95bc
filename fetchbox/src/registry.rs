//! Strategy lookup by name.

use fetchbox_core::{
    Event, MatchingContext, Request, Response, Rule, StrategyKind, UnknownStrategy,
};
use futures::future::BoxFuture;

use crate::Collaborators;
use crate::strategy::{LocalFirst, Race, RemoteFirst, Strategy};

/// The three strategies, built once over shared [`Collaborators`].
///
/// # Example
///
/// ```ignore
/// let strategies = Strategies::new(collaborators);
/// let response = strategies.dispatch(rule, request, event, matching).await;
/// ```
#[derive(Debug, Clone)]
pub struct Strategies {
    collaborators: Collaborators,
    local_first: LocalFirst,
    remote_first: RemoteFirst,
    race: Race,
}

impl Strategies {
    /// Builds every strategy over `collaborators`.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            local_first: LocalFirst::new(collaborators.clone()),
            remote_first: RemoteFirst::new(collaborators.clone()),
            race: Race::new(collaborators.clone()),
            collaborators,
        }
    }

    /// The strategy implementing `kind`.
    pub fn strategy(&self, kind: StrategyKind) -> &dyn Strategy {
        match kind {
            StrategyKind::LocalFirst => &self.local_first,
            StrategyKind::RemoteFirst => &self.remote_first,
            StrategyKind::Race => &self.race,
        }
    }

    /// Looks a strategy up by name or alias, e.g. `"race"` or `"fastest"`.
    pub fn get(&self, name: &str) -> Option<&dyn Strategy> {
        name.parse::<StrategyKind>()
            .ok()
            .map(|kind| self.strategy(kind))
    }

    /// Resolves `request` with the strategy named by `rule`.
    pub fn dispatch(
        &self,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> BoxFuture<'static, Response> {
        self.strategy(rule.strategy)
            .resolve(rule, request, event, matching)
    }

    /// Resolves `request` with the strategy called `name`, ignoring
    /// `rule.strategy`.
    pub fn resolve_named(
        &self,
        name: &str,
        rule: Rule,
        request: Request,
        event: Event,
        matching: MatchingContext,
    ) -> Result<BoxFuture<'static, Response>, UnknownStrategy> {
        let kind = name.parse::<StrategyKind>()?;
        Ok(self.strategy(kind).resolve(rule, request, event, matching))
    }

    /// The shared collaborators.
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}
