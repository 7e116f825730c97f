use crate::errors::ValidationError;
use crate::utils::{require_non_empty, wire_enum};

wire_enum! {
    /// SASL/SCRAM mechanism.
    pub enum ScramMechanism {
        Unknown = 0 => "UNKNOWN",
        ScramSha256 = 1 => "SCRAM-SHA-256",
        ScramSha512 = 2 => "SCRAM-SHA-512",
    }
}

/// Mechanism and iteration count of a user SCRAM credential.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScramCredentialInfo {
    pub mechanism: ScramMechanism,
    pub iterations: i32,
}

/// Description of the SCRAM credentials of a user.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserScramCredentialsDescription {
    pub user: String,
    pub scram_credential_infos: Vec<ScramCredentialInfo>,
}

/// A change to the SCRAM credentials of a user.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserScramCredentialAlteration {
    /// Create or update a credential.
    Upsertion {
        user: String,
        scram_credential_info: ScramCredentialInfo,
        password: Vec<u8>,

        /// Salt to use; when absent, one is generated by the native client.
        salt: Option<Vec<u8>>,
    },

    /// Delete a credential.
    Deletion { user: String, mechanism: ScramMechanism },
}

impl UserScramCredentialAlteration {
    pub fn user(&self) -> &str {
        match self {
            UserScramCredentialAlteration::Upsertion { user, .. } => user,
            UserScramCredentialAlteration::Deletion { user, .. } => user,
        }
    }

    pub fn mechanism(&self) -> ScramMechanism {
        match self {
            UserScramCredentialAlteration::Upsertion {
                scram_credential_info, ..
            } => scram_credential_info.mechanism,
            UserScramCredentialAlteration::Deletion { mechanism, .. } => *mechanism,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(self.user(), "user")?;
        if self.mechanism() == ScramMechanism::Unknown {
            return Err(ValidationError::ValueNotAllowed {
                entity: "UserScramCredentialAlteration",
                field: "mechanism",
                value: ScramMechanism::Unknown.to_string(),
            });
        }

        if let UserScramCredentialAlteration::Upsertion {
            scram_credential_info,
            password,
            salt,
            ..
        } = self
        {
            if password.is_empty() {
                return Err(ValidationError::EmptyField("password"));
            }
            if salt.as_ref().is_some_and(Vec::is_empty) {
                return Err(ValidationError::EmptyField("salt"));
            }
            if scram_credential_info.iterations < 1 {
                return Err(ValidationError::NonPositiveValue {
                    field: "iterations",
                    value: scram_credential_info.iterations.into(),
                });
            }
        }

        Ok(())
    }
}
