// ── Filter selection ──

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::QueryFilter;
use crate::model::Profile;

/// What the list shows: everyone, or users holding one named profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterSelection {
    #[default]
    All,
    Profile(String),
}

impl FilterSelection {
    /// Resolve to a server-side filter against the loaded profiles.
    ///
    /// Names match case-insensitively; every profile carrying the name is
    /// included. `None` means the name matched nothing, which callers
    /// render as an empty list without issuing a request.
    pub fn resolve(&self, profiles: &[Profile]) -> Option<QueryFilter> {
        match self {
            Self::All => Some(QueryFilter::All),
            Self::Profile(name) => {
                let ids: BTreeSet<_> = profiles
                    .iter()
                    .filter(|p| p.name_matches(name))
                    .map(|p| p.id.clone())
                    .collect();
                (!ids.is_empty()).then_some(QueryFilter::Profiles(ids))
            }
        }
    }

    /// The selection after this one when cycling `All -> each profile -> All`.
    ///
    /// Names differing only in case select the same profiles, so each is
    /// visited once, spelled as its first occurrence.
    pub fn cycle(&self, profiles: &[Profile]) -> Self {
        let mut names: Vec<&str> = Vec::new();
        for profile in profiles {
            if !names.iter().any(|name| profile.name_matches(name)) {
                names.push(&profile.name);
            }
        }

        let next = match self {
            Self::All => names.first(),
            Self::Profile(current) => names
                .iter()
                .position(|name| name.eq_ignore_ascii_case(current.trim()))
                .and_then(|i| names.get(i + 1)),
        };
        next.map_or(Self::All, |name| Self::Profile((*name).to_owned()))
    }
}

impl FromStr for FilterSelection {
    type Err = std::convert::Infallible;

    /// `"all"` (any case) or an empty string selects everyone; anything
    /// else is taken as a profile name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Profile(trimmed.to_owned()))
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Profile(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ProfileId;

    fn profiles() -> Vec<Profile> {
        vec![
            Profile {
                id: ProfileId::from("p1"),
                name: "admin".into(),
            },
            Profile {
                id: ProfileId::from("p2"),
                name: "user".into(),
            },
        ]
    }

    #[test]
    fn parses_all_case_insensitively() {
        assert_eq!("ALL".parse::<FilterSelection>().unwrap(), FilterSelection::All);
        assert_eq!("".parse::<FilterSelection>().unwrap(), FilterSelection::All);
        assert_eq!(
            " Admin ".parse::<FilterSelection>().unwrap(),
            FilterSelection::Profile("Admin".into())
        );
    }

    #[test]
    fn resolves_name_case_insensitively() {
        let filter = FilterSelection::Profile("ADMIN".into())
            .resolve(&profiles())
            .unwrap();
        assert_eq!(
            filter,
            QueryFilter::Profiles([ProfileId::from("p1")].into())
        );
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert_eq!(FilterSelection::Profile("guest".into()).resolve(&profiles()), None);
        assert_eq!(FilterSelection::Profile("admin".into()).resolve(&[]), None);
    }

    #[test]
    fn cycles_through_profiles_and_back() {
        let profiles = profiles();
        let mut selection = FilterSelection::All;
        let mut seen = Vec::new();
        for _ in 0..3 {
            selection = selection.cycle(&profiles);
            seen.push(selection.to_string());
        }
        assert_eq!(seen, ["admin", "user", "all"]);
        assert_eq!(
            FilterSelection::Profile("gone".into()).cycle(&profiles),
            FilterSelection::All
        );
    }

    #[test]
    fn cycle_visits_case_insensitive_duplicates_once() {
        let profiles: Vec<Profile> = [("p1", "Admin"), ("p2", "user"), ("p3", "admin")]
            .into_iter()
            .map(|(id, name)| Profile {
                id: ProfileId::from(id),
                name: name.into(),
            })
            .collect();

        let mut selection = FilterSelection::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            selection = selection.cycle(&profiles);
            seen.push(selection.to_string());
        }
        assert_eq!(seen, ["Admin", "user", "all", "Admin"]);
        assert_eq!(
            FilterSelection::Profile("ADMIN".into()).cycle(&profiles),
            FilterSelection::Profile("user".into())
        );
    }
}
