//! User rows as seen by the authentication layer.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user of the customer-service back office.
///
/// Only the identity fields needed to build a principal are loaded; the rest
/// of the user profile belongs to the CRM store.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    /// Forces the password-change flow in the front-end.
    pub is_temporary_password: bool,
}
