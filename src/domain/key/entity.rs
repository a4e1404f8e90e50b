//! Provisioned and management key records

use serde::{Deserialize, Serialize};

use crate::domain::identity::Secret;

/// A provisioned API key and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub secret: Secret,
    pub label: String,
}

impl ApiKeyRecord {
    pub fn new(secret: Secret, label: impl Into<String>) -> Self {
        Self {
            secret,
            label: label.into(),
        }
    }
}

/// A management key, stored apart from provisioned keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementKey {
    pub secret: Secret,
    pub label: String,
}

impl ManagementKey {
    pub fn new(secret: Secret, label: impl Into<String>) -> Self {
        Self {
            secret,
            label: label.into(),
        }
    }
}

/// Which identity set a caller was resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Management,
    Provisioned,
}

/// A caller that passed an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub secret: Secret,
    pub role: Role,
}

impl Principal {
    pub fn management(secret: Secret) -> Self {
        Self {
            secret,
            role: Role::Management,
        }
    }

    pub fn provisioned(secret: Secret) -> Self {
        Self {
            secret,
            role: Role::Provisioned,
        }
    }

    pub fn is_management(&self) -> bool {
        self.role == Role::Management
    }
}
