// ── Query keys ──
//
// A key addresses one cached read: which resource, which filter, which
// page. Equality of keys decides hit/miss; prefixes decide invalidation.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::ProfileId;

/// The remote collection a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Users,
    Profiles,
}

/// Server-side filter applied to a read.
///
/// Profile ids are kept in a sorted set so that equal selections always
/// produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum QueryFilter {
    #[default]
    All,
    Profiles(BTreeSet<ProfileId>),
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Profiles(ids) => {
                let joined: Vec<&str> = ids.iter().map(ProfileId::as_str).collect();
                write!(f, "profiles={}", joined.join(","))
            }
        }
    }
}

/// 1-based page number plus page size. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn number(self) -> u32 {
        self.number
    }

    pub fn size(self) -> u32 {
        self.size
    }
}

/// Identifier of one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub filter: QueryFilter,
    pub page: Option<Page>,
}

impl QueryKey {
    pub fn users(filter: QueryFilter, page: Page) -> Self {
        Self {
            resource: Resource::Users,
            filter,
            page: Some(page),
        }
    }

    pub fn profiles() -> Self {
        Self {
            resource: Resource::Profiles,
            filter: QueryFilter::All,
            page: None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.resource, self.filter)?;
        if let Some(page) = self.page {
            write!(f, "@{}x{}", page.number, page.size)?;
        }
        Ok(())
    }
}

/// Matches every key sharing a resource and, optionally, a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
    resource: Resource,
    filter: Option<QueryFilter>,
}

impl KeyPrefix {
    /// Every read of `resource`, whatever its filter or page.
    pub fn resource(resource: Resource) -> Self {
        Self {
            resource,
            filter: None,
        }
    }

    /// Every page of `resource` under one filter.
    pub fn filtered(resource: Resource, filter: QueryFilter) -> Self {
        Self {
            resource,
            filter: Some(filter),
        }
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        key.resource == self.resource
            && self.filter.as_ref().is_none_or(|f| *f == key.filter)
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "{}[{filter}]", self.resource),
            None => write!(f, "{}[*]", self.resource),
        }
    }
}
