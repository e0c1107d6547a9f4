//! The pure render/redirect decision.

use warden_protocol::{Identity, Role};
use warden_session::AuthView;

use crate::GateConfig;

/// What a gated screen should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The session is not settled yet; show nothing (no content, no redirect).
    RenderNothing,
    /// Navigate to this path.
    Redirect(String),
    /// Show the protected content.
    RenderChildren,
}

impl Decision {
    /// The redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

/// Whether `user` holds `role`. Super admins hold every role.
pub fn has_role(role: Role, user: &Identity) -> bool {
    match role {
        Role::SuperAdmin => user.roles.is_super_admin,
        Role::OrganizationAdmin => {
            user.roles.is_organization_admin || user.roles.is_super_admin
        }
    }
}

/// Decides what a screen gated by `config` does for `view`.
///
/// Pure: the same inputs always give the same decision. Until the view is
/// hydrated and idle the answer is [`Decision::RenderNothing`], so a
/// restored identity is never redirected away before it had a chance to
/// load.
pub fn decide(view: &AuthView, config: &GateConfig) -> Decision {
    if !view.hydrated || view.loading {
        return Decision::RenderNothing;
    }
    let user = match &view.user {
        Some(user) if view.is_authenticated => user,
        _ => return Decision::Redirect(config.login_path.clone()),
    };
    if let Some(role) = config.role.role() {
        if !has_role(role, user) {
            return Decision::Redirect(config.resolved_fallback().to_string());
        }
    }
    Decision::RenderChildren
}

/// Runs `children` only when the decision is [`Decision::RenderChildren`].
pub fn render<T>(decision: &Decision, children: impl FnOnce() -> T) -> Option<T> {
    match decision {
        Decision::RenderChildren => Some(children()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use warden_protocol::{Roles, UserId};

    use super::*;

    fn user(is_super_admin: bool, is_organization_admin: bool) -> Identity {
        Identity::new(
            UserId::Number(1),
            "ada@example.com",
            Roles {
                is_super_admin,
                is_organization_admin,
            },
        )
    }

    fn view(hydrated: bool, loading: bool, user: Option<Identity>) -> AuthView {
        AuthView {
            is_authenticated: user.is_some(),
            user,
            loading,
            error: None,
            hydrated,
        }
    }

    // -- has_role ---------------------------------------------------------

    #[test]
    fn test_has_role_super_admin_subsumes_organization_admin() {
        let sa = user(true, false);
        assert!(has_role(Role::SuperAdmin, &sa));
        assert!(has_role(Role::OrganizationAdmin, &sa));
    }

    #[test]
    fn test_has_role_organization_admin_is_not_super_admin() {
        let oa = user(false, true);
        assert!(has_role(Role::OrganizationAdmin, &oa));
        assert!(!has_role(Role::SuperAdmin, &oa));
    }

    #[test]
    fn test_has_role_plain_user_has_none() {
        let plain = user(false, false);
        assert!(!has_role(Role::OrganizationAdmin, &plain));
        assert!(!has_role(Role::SuperAdmin, &plain));
    }

    // -- decide -----------------------------------------------------------

    #[test]
    fn test_decide_not_hydrated_with_user_renders_nothing() {
        // A restored identity may still be on its way: never redirect here.
        let v = view(false, false, Some(user(false, false)));
        let gated = GateConfig::default().require(Role::SuperAdmin);

        assert_eq!(decide(&v, &GateConfig::default()), Decision::RenderNothing);
        assert_eq!(decide(&v, &gated), Decision::RenderNothing);
    }

    #[test]
    fn test_decide_not_hydrated_without_user_renders_nothing() {
        let v = view(false, false, None);
        assert_eq!(decide(&v, &GateConfig::default()), Decision::RenderNothing);
    }

    #[test]
    fn test_decide_loading_renders_nothing() {
        let v = view(true, true, None);
        assert_eq!(decide(&v, &GateConfig::default()), Decision::RenderNothing);
    }

    #[test]
    fn test_decide_hydrated_without_user_redirects_to_login() {
        let v = view(true, false, None);
        assert_eq!(
            decide(&v, &GateConfig::default()),
            Decision::Redirect("/login".into())
        );
    }

    #[test]
    fn test_decide_custom_login_path() {
        let v = view(true, false, None);
        let config = GateConfig::default().login_path("/signin");
        assert_eq!(decide(&v, &config), Decision::Redirect("/signin".into()));
    }

    #[test]
    fn test_decide_authenticated_without_requirement_renders() {
        let v = view(true, false, Some(user(false, false)));
        assert_eq!(decide(&v, &GateConfig::default()), Decision::RenderChildren);
    }

    #[test]
    fn test_decide_super_admin_on_organization_admin_route_renders() {
        let v = view(true, false, Some(user(true, false)));
        let config = GateConfig::default().require(Role::OrganizationAdmin);
        assert_eq!(decide(&v, &config), Decision::RenderChildren);
    }

    #[test]
    fn test_decide_non_admin_on_super_admin_route_redirects_to_fallback() {
        let v = view(true, false, Some(user(false, false)));
        let config = GateConfig::default()
            .require(Role::SuperAdmin)
            .fallback("/dashboard");
        assert_eq!(decide(&v, &config), Decision::Redirect("/dashboard".into()));
    }

    #[test]
    fn test_decide_fallback_equal_to_login_redirects_to_landing() {
        let v = view(true, false, Some(user(false, true)));
        let config = GateConfig::default()
            .landing_path("/home")
            .require(Role::SuperAdmin)
            .fallback("/login");
        assert_eq!(decide(&v, &config), Decision::Redirect("/home".into()));
    }

    // -- render -----------------------------------------------------------

    #[test]
    fn test_render_only_for_render_children() {
        assert_eq!(render(&Decision::RenderChildren, || "page"), Some("page"));
        assert_eq!(render(&Decision::RenderNothing, || "page"), None);
        assert_eq!(render(&Decision::Redirect("/login".into()), || "page"), None);
    }

    #[test]
    fn test_render_does_not_build_children_when_hidden() {
        let mut built = false;
        render(&Decision::RenderNothing, || built = true);
        assert!(!built);
    }
}
