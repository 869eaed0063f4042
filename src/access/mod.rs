use uuid::Uuid;

use crate::database::models::Role;

/// Explicit permitted-role set, built once per request and checked by
/// membership only.
#[derive(Debug, Clone, Copy)]
pub struct RoleSet {
    roles: &'static [Role],
}

impl RoleSet {
    pub const fn new(roles: &'static [Role]) -> Self {
        Self { roles }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Roles allowed through agency-level pages and mutations.
pub const AGENCY_STAFF: RoleSet = RoleSet::new(&[Role::AgencyOwner, Role::AgencyAdmin]);

/// Identity facts the gate needs about the current request.
#[derive(Debug, Clone, Copy)]
pub struct GateSubject {
    pub role: Role,
    /// Agency resolved for this session (own agency or accepted invitation)
    pub resolved_agency_id: Option<Uuid>,
}

/// Outcome of the access gate for a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Proceed,
    RedirectLanding,
    RedirectAgencyPicker,
    RedirectUnauthorized,
}

impl AccessDecision {
    /// Redirect target for the non-proceed outcomes.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Proceed => None,
            AccessDecision::RedirectLanding => Some("/"),
            AccessDecision::RedirectAgencyPicker => Some("/agency"),
            AccessDecision::RedirectUnauthorized => Some("/agency/unauthorized"),
        }
    }
}

/// Decide whether a request may reach an agency page.
///
/// Checks run strictly in order: identity, then tenant resolution, then
/// role. An unauthenticated request must never observe a role-mismatch
/// signal.
pub fn evaluate(
    subject: Option<GateSubject>,
    path_agency_id: Option<Uuid>,
    permitted: RoleSet,
) -> AccessDecision {
    let Some(subject) = subject else {
        return AccessDecision::RedirectLanding;
    };

    if subject.resolved_agency_id.is_none() || path_agency_id.is_none() {
        return AccessDecision::RedirectAgencyPicker;
    }

    if !permitted.contains(subject.role) {
        return AccessDecision::RedirectUnauthorized;
    }

    AccessDecision::Proceed
}
