use shared::session::AdminRole;

pub const ACCESS_SETTINGS: &str = "/studies/:id/access-settings";
pub const STUDY_BUILDER: &str = "/studies/builder/:id";
pub const PARTICIPANT_MANAGER: &str = "/studies/:id/participant-manager";
pub const ADHERENCE_DATA: &str = "/studies/:id/adherence";
pub const STUDY_DATA: &str = "/studies/:id/study-data";

fn restricted_paths(role: AdminRole) -> &'static [&'static str] {
    match role {
        AdminRole::OrgAdmin => &[ACCESS_SETTINGS],
        AdminRole::StudyDesigner => &[STUDY_BUILDER],
        AdminRole::StudyCoordinator => &[PARTICIPANT_MANAGER, ADHERENCE_DATA, STUDY_DATA],
        AdminRole::Developer | AdminRole::Researcher => &[],
    }
}

pub fn is_in_admin_role(roles: &[AdminRole]) -> bool {
    roles.contains(&AdminRole::OrgAdmin)
}

/// True when `path`, with its first `:id` filled in, falls under one of the restricted
/// sections the roles grant for `study_id`.
pub fn is_path_allowed(roles: &[AdminRole], study_id: &str, path: &str) -> bool {
    let path = path.replacen(":id", study_id, 1);
    roles
        .iter()
        .flat_map(|role| restricted_paths(*role))
        .map(|allowed| allowed.replacen(":id", study_id, 1))
        .any(|allowed| path.contains(&allowed))
}
