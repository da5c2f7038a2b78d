//! Grouping, ordering and filtering of site collections.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::Site;

/// An ordered collection of sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSet {
    sites: Vec<Site>,
}

impl SiteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, site: Site) {
        self.sites.push(site);
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    pub fn as_slice(&self) -> &[Site] {
        &self.sites
    }

    /// Partition the set by sector.
    ///
    /// Each group keeps the relative order the sites had in this set.
    pub fn by_sector(&self) -> BTreeMap<String, SiteSet> {
        let mut sectors: BTreeMap<String, SiteSet> = BTreeMap::new();
        for site in &self.sites {
            sectors
                .entry(site.sector.clone())
                .or_default()
                .push(site.clone());
        }
        sectors
    }

    /// Sort in place: most downtime first, then most outages, then by name.
    pub fn sort_by_downtime(&mut self) {
        self.sites.sort_by(downtime_order);
    }

    /// Return the sites with at most `limit` seconds of downtime.
    pub fn filter_downtime_over(&self, limit: u64) -> SiteSet {
        self.sites
            .iter()
            .filter(|s| s.downtime_secs <= limit)
            .cloned()
            .collect()
    }

    /// Outage counts as a numeric series, in set order.
    pub fn outages(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.outages as f64).collect()
    }

    /// Downtime seconds as a numeric series, in set order.
    pub fn downtimes(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.downtime_secs as f64).collect()
    }
}

/// Total order used by the worst-offender ranking.
pub fn downtime_order(a: &Site, b: &Site) -> Ordering {
    b.downtime_secs
        .cmp(&a.downtime_secs)
        .then_with(|| b.outages.cmp(&a.outages))
        .then_with(|| a.name.cmp(&b.name))
}

impl From<Vec<Site>> for SiteSet {
    fn from(sites: Vec<Site>) -> Self {
        Self { sites }
    }
}

impl FromIterator<Site> for SiteSet {
    fn from_iter<I: IntoIterator<Item = Site>>(iter: I) -> Self {
        Self {
            sites: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SiteSet {
    type Item = Site;
    type IntoIter = std::vec::IntoIter<Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.into_iter()
    }
}

impl<'a> IntoIterator for &'a SiteSet {
    type Item = &'a Site;
    type IntoIter = std::slice::Iter<'a, Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}
