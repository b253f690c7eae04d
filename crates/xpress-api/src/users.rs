// User and role endpoints

use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::models::{RoleAssignment, UserRecord};

impl Client {
    /// `GET /users`
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        self.get("users", &[]).await
    }

    /// `GET /users?role={role}`. Vendors are users with the `vendor` role.
    pub async fn list_users_by_role(&self, role: &str) -> Result<Vec<UserRecord>, Error> {
        self.get("users", &[("role", role.to_owned())]).await
    }

    /// `POST /users/role` with `{uid, role}`.
    pub async fn assign_role(&self, uid: &str, role: &str) -> Result<Value, Error> {
        let body = RoleAssignment {
            uid: uid.to_owned(),
            role: role.to_owned(),
        };
        self.post("users/role", &body).await
    }
}
