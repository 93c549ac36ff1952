/// Seed data for creating a user with one standard role.
#[derive(Debug, Clone)]
pub struct UserSeed {
    pub email: String,
    pub full_name: String,
    pub is_temporary_password: bool,
    pub role: &'static str,
}
