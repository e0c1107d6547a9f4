//! The stateful guard: one-shot redirects and the session watch loop.

use tokio::sync::watch;
use warden_session::{AuthView, Session};

use crate::{decide, Decision, GateConfig};

/// Performs a redirect in whatever UI hosts the guard.
///
/// Any `Fn(&str)` closure is a navigator.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// A gate for one screen.
///
/// Wraps [`decide`] and remembers the previous decision, so the navigator is
/// called once when the decision turns into a redirect, not on every
/// re-evaluation that produces the same redirect. A change of redirect
/// target counts as a new redirect.
///
/// ## Usage
///
/// ```rust,ignore
/// let mut guard = RouteGuard::new(GateConfig::default(), |path: &str| router.push(path));
/// guard
///     .watch(store.subscribe(), |decision, _view| {
///         if let Some(page) = render(decision, || admin_page()) {
///             draw(page);
///         }
///     })
///     .await;
/// ```
pub struct RouteGuard<N> {
    config: GateConfig,
    navigator: N,
    last: Option<Decision>,
}

impl<N: Navigator> RouteGuard<N> {
    pub fn new(config: GateConfig, navigator: N) -> Self {
        Self {
            config,
            navigator,
            last: None,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The decision from the most recent evaluation.
    pub fn last_decision(&self) -> Option<&Decision> {
        self.last.as_ref()
    }

    /// Decides for `view`, navigating if this is a new redirect.
    pub fn evaluate(&mut self, view: &AuthView) -> Decision {
        let decision = decide(view, &self.config);
        if let Decision::Redirect(path) = &decision {
            if self.last.as_ref() != Some(&decision) {
                tracing::debug!(path = %path, role = %self.config.role, "redirecting");
                self.navigator.navigate(path);
            }
        }
        self.last = Some(decision.clone());
        decision
    }

    /// Re-evaluates on every session change until the store is dropped.
    ///
    /// `on_change` receives each decision with the view it was made from,
    /// which is where a UI re-renders. The current session is evaluated
    /// immediately, before waiting for the first change.
    pub async fn watch(
        &mut self,
        mut sessions: watch::Receiver<Session>,
        mut on_change: impl FnMut(&Decision, &AuthView),
    ) {
        loop {
            let view = sessions.borrow_and_update().view();
            let decision = self.evaluate(&view);
            on_change(&decision, &view);

            if sessions.changed().await.is_err() {
                tracing::debug!("session store dropped, guard stopping");
                return;
            }
        }
    }
}
