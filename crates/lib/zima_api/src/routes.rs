//! Route paths.

pub const GET_HEALTH: &str = "/";

pub const POST_AUTH_SIGNUP: &str = "/auth/signup";
pub const POST_AUTH_LOGIN: &str = "/auth/login";
pub const GET_AUTH_ME: &str = "/auth/me";

pub const POST_LICENSES_CREATE: &str = "/licenses/create";
pub const GET_LICENSES: &str = "/licenses";
pub const GET_LICENSES_VALIDATE_SECRET: &str = "/licenses/validate/{secret}";
pub const POST_LICENSES_REVOKE: &str = "/licenses/revoke";

/// `GET` lists accounts, `POST` creates or updates one.
pub const ADMIN_USERS: &str = "/admin/users";
pub const DELETE_ADMIN_USERS_ID: &str = "/admin/users/{id}";
pub const POST_ADMIN_USER_ROLE: &str = "/admin/user/role";
pub const POST_ADMIN_USER_PLAN: &str = "/admin/user/plan";
pub const GET_ADMIN_DASHBOARD: &str = "/admin/dashboard";
