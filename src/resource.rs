/// Backend resources
///
/// The dashboard backend serves one paginated collection per view under a
/// common base path, plus a history endpoint for single SIM cards.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/internal/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Devices,
    Kiwi,
    Info,
    M2m,
    Renewals,
    Pools,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Devices,
        Resource::Kiwi,
        Resource::Info,
        Resource::M2m,
        Resource::Renewals,
        Resource::Pools,
    ];

    /// Path segment under the API base
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Devices => "devices",
            Resource::Kiwi => "kiwi",
            Resource::Info => "info",
            Resource::M2m => "m2m",
            Resource::Renewals => "renewals",
            Resource::Pools => "pools",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.path().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownResource(s.to_string()))
    }
}

/// `limit`/`offset` query parameters of a collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl PageParams {
    /// Parameters for a 1-based `page` of `limit` records. Page 0 is treated
    /// as page 1.
    ///
    /// ```
    /// use dashtable::resource::PageParams;
    ///
    /// assert_eq!(PageParams::for_page(3, 50), PageParams { limit: 50, offset: 100 });
    /// ```
    pub fn for_page(page: usize, limit: usize) -> Self {
        PageParams {
            limit,
            offset: page.saturating_sub(1).saturating_mul(limit),
        }
    }

    /// Applies the window to a slice, clamping at its end.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

/// Collection URL for `resource` under `base`.
pub fn resource_url(base: &str, resource: Resource) -> String {
    format!("{}/{}", base.trim_end_matches('/'), resource.path())
}

/// History URL for one SIM card.
pub fn history_url(base: &str, icc: &str) -> String {
    format!("{}/m2m/{}/history", base.trim_end_matches('/'), icc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parsing() {
        assert_eq!("pools".parse::<Resource>().ok(), Some(Resource::Pools));
        assert_eq!(" M2M ".parse::<Resource>().ok(), Some(Resource::M2m));
        for r in Resource::ALL {
            assert_eq!(r.path().parse::<Resource>().ok(), Some(r));
        }

        let err = "pool".parse::<Resource>().unwrap_err();
        assert!(matches!(err, Error::UnknownResource(ref name) if name == "pool"));
        assert_eq!(err.to_string(), "unknown resource 'pool'");
    }

    #[test]
    fn test_page_params() {
        assert_eq!(PageParams::for_page(1, 10).offset, 0);
        assert_eq!(PageParams::for_page(0, 10).offset, 0);
        assert_eq!(PageParams::for_page(4, 25).offset, 75);
    }

    #[test]
    fn test_window_clamps() {
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(PageParams { limit: 5, offset: 5 }.window(&items), &[5, 6]);
        assert!(PageParams { limit: 5, offset: 50 }.window(&items).is_empty());
    }

    #[test]
    fn test_urls() {
        let base = "http://localhost:8000/internal/dashboard/";
        assert_eq!(resource_url(base, Resource::Devices), "http://localhost:8000/internal/dashboard/devices");
        assert_eq!(history_url(base, "8934"), "http://localhost:8000/internal/dashboard/m2m/8934/history");
        assert_eq!(serde_json::to_string(&Resource::M2m).unwrap(), "\"m2m\"");
    }
}
