use crate::model::DrawId;
use serde::{Deserialize, Serialize};

/// What a user may do on the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Student,
    Rep,
    Admin,
}

/// A student's declared housing preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    OnCampus,
    OffCampus,
    Undeclared,
}

impl Intent {
    /// Students who still need a bed: everybody who has not opted out.
    pub fn needs_housing(self) -> bool {
        !matches!(self, Intent::OffCampus)
    }
}

/// A person taking part in (or running) a draw.
///
/// `old_draw` holds the draw pointer saved while the user sits in a drawless group, so
/// disbanding that group can put them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: crate::model::UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub intent: Intent,
    pub draw: Option<DrawId>,
    pub old_draw: Option<DrawId>,
}

/// Payload for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub intent: Intent,
    pub draw: Option<DrawId>,
}

impl UserCreate {
    /// A student with the given intent, not yet placed in a draw.
    pub fn student(name: impl Into<String>, intent: Intent) -> Self {
        let name = name.into();
        Self {
            email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
            name,
            role: Role::Student,
            intent,
            draw: None,
        }
    }

    /// Places the new user in `draw`.
    pub fn in_draw(mut self, draw: DrawId) -> Self {
        self.draw = Some(draw);
        self
    }
}
