use serde::{Deserialize, Serialize};

/// User role as encoded by the backend.
///
/// Immutable after registration from this client's point of view. Any
/// wire value outside {1, 2} is treated as "no usable role" by the
/// navigation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_u8(self) -> u8 {
        match self {
            Role::Doctor => 1,
            Role::Patient => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Role::Doctor),
            2 => Some(Role::Patient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> u8 {
        role.as_u8()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Role::from_u8(value).ok_or_else(|| format!("Unknown user type: {value}"))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile confirmation echoed by the register endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: Option<u8>,
    #[serde(default)]
    pub address: Option<String>,
}

impl RegisteredUser {
    pub fn role(&self) -> Option<Role> {
        self.user_type.and_then(Role::from_u8)
    }
}
