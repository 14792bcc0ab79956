// ── API-to-domain type conversions ──
//
// Bridges raw `userdeck_api::types` into canonical `crate::model` types
// and back into request bodies.

use userdeck_api::types::{CreateUserBody, ProfileResponse, UpdateUserBody, UserResponse};

use crate::model::{NewUser, Profile, ProfileId, User, UserId, UserPatch};

impl From<UserResponse> for User {
    fn from(raw: UserResponse) -> Self {
        Self {
            id: UserId::from(raw.id),
            first_name: raw.first_name,
            last_name: raw.last_name,
            email: raw.email,
            profile_id: raw.profile_id.filter(|p| !p.is_empty()).map(ProfileId::from),
            is_active: raw.is_active,
        }
    }
}

impl From<ProfileResponse> for Profile {
    fn from(raw: ProfileResponse) -> Self {
        Self {
            id: ProfileId::from(raw.id),
            name: raw.name,
        }
    }
}

impl From<&NewUser> for CreateUserBody {
    fn from(user: &NewUser) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            profile_id: user.profile_id.as_ref().map(|p| p.as_str().to_owned()),
            is_active: user.is_active,
        }
    }
}

impl From<&UserPatch> for UpdateUserBody {
    fn from(patch: &UserPatch) -> Self {
        Self {
            first_name: patch.first_name.clone(),
            last_name: patch.last_name.clone(),
            email: patch.email.clone(),
            profile_id: patch.profile_id.as_ref().map(|p| p.as_str().to_owned()),
            is_active: patch.is_active,
        }
    }
}
