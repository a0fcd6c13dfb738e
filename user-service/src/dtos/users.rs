use crate::models::{NewUser, Role, User, UserChanges};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Body of `POST /api/users`. Required fields are optional here so that a
/// missing one surfaces as a validation error rather than a parse error.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name cannot be empty")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email")
    )]
    pub email: Option<String>,
    #[validate(range(min = 0, message = "Age must be a non-negative integer"))]
    pub age: Option<i32>,
    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn into_new_user(mut self) -> Result<NewUser, AppError> {
        self.name = self.name.map(|name| normalize_name(&name));
        self.email = self.email.map(|email| normalize_email(&email));
        self.validate()?;

        let new_user = NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age: self.age,
            role: self.role.unwrap_or_default(),
        };
        new_user.validate()?;

        Ok(new_user)
    }
}

/// Body of `PUT /api/users/:id`. Only these fields can be changed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(range(min = 0, message = "Age must be a non-negative integer"))]
    pub age: Option<i32>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn into_changes(mut self) -> Result<UserChanges, AppError> {
        self.name = self.name.map(|name| normalize_name(&name));
        self.email = self.email.map(|email| normalize_email(&email));
        self.validate()?;

        Ok(UserChanges {
            name: self.name,
            email: self.email,
            age: self.age,
            role: self.role,
        })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            age: user.age,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}
