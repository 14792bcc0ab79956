// ── Create/edit drafts ──
//
// Unsaved form state. Drafts never validate field contents; the server
// is the only judge of what is acceptable.

use crate::model::{NewUser, ProfileId, User, UserId, UserPatch};

/// Form buffer for a user that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_id: Option<ProfileId>,
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            profile_id: None,
            is_active: true,
        }
    }
}

impl UserDraft {
    /// Request body for this draft, with surrounding whitespace trimmed.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            profile_id: self.profile_id.clone(),
            is_active: self.is_active,
        }
    }
}

/// Form buffer for changes to an existing user.
///
/// Keeps the user as loaded so that only changed fields are submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    original: User,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_id: Option<ProfileId>,
}

impl EditDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            original: user.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            profile_id: user.profile_id.clone(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.original.id
    }

    pub fn original(&self) -> &User {
        &self.original
    }

    /// Fields that differ from the loaded user.
    pub fn patch(&self) -> UserPatch {
        fn changed(edited: &str, original: &str) -> Option<String> {
            let edited = edited.trim();
            (edited != original).then(|| edited.to_owned())
        }

        UserPatch {
            first_name: changed(&self.first_name, &self.original.first_name),
            last_name: changed(&self.last_name, &self.original.last_name),
            email: changed(&self.email, &self.original.email),
            profile_id: self
                .profile_id
                .clone()
                .filter(|p| self.original.profile_id.as_ref() != Some(p)),
            is_active: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.patch().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> User {
        User {
            id: UserId::from("u1"),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@example.com".into(),
            profile_id: Some(ProfileId::from("p1")),
            is_active: true,
        }
    }

    #[test]
    fn new_draft_defaults_to_active() {
        let draft = UserDraft::default();
        assert!(draft.is_active);
        assert!(draft.to_new_user().is_active);
    }

    #[test]
    fn new_user_is_trimmed() {
        let draft = UserDraft {
            first_name: "  Ana ".into(),
            email: "ana@example.com\n".into(),
            ..UserDraft::default()
        };
        let user = draft.to_new_user();
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn untouched_edit_has_empty_patch() {
        let draft = EditDraft::from_user(&loaded());
        assert!(draft.patch().is_empty());
        assert!(!draft.is_dirty());
        assert_eq!(draft.user_id().as_str(), "u1");
    }

    #[test]
    fn edit_patch_contains_only_changes() {
        let mut draft = EditDraft::from_user(&loaded());
        draft.email = "ana.silva@example.com".into();
        draft.profile_id = Some(ProfileId::from("p2"));
        draft.first_name = "Ana ".into();

        let patch = draft.patch();
        assert_eq!(patch.email.as_deref(), Some("ana.silva@example.com"));
        assert_eq!(patch.profile_id, Some(ProfileId::from("p2")));
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.last_name, None);
    }
}
