use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::company::CompanyCatalog;
use crate::values::Quantity;

/// Why a [`TraderConfig`] could not be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTraderConfig {
    #[error("Company name is empty")]
    EmptyCompany,

    #[error("Share count must be positive")]
    ZeroShares,

    #[error("Company catalog is empty")]
    EmptyCatalog,
}

/// What a trader trades, fixed for its whole lifetime
///
/// Fields are private: once built, the configuration cannot be mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraderConfig {
    company: String,
    share_count: Quantity,
}

impl TraderConfig {
    /// Default upper bound for [`TraderConfig::pick`]
    pub const DEFAULT_MAX_SHARES: Quantity = 7;

    pub fn new(
        company: impl Into<String>,
        share_count: Quantity,
    ) -> Result<Self, InvalidTraderConfig> {
        let company = company.into();
        if company.trim().is_empty() {
            return Err(InvalidTraderConfig::EmptyCompany);
        }
        if share_count == 0 {
            return Err(InvalidTraderConfig::ZeroShares);
        }
        Ok(Self {
            company,
            share_count,
        })
    }

    /// Pick a company uniformly from the catalog and a share count in `1..=max_shares`
    pub fn pick<R: Rng + ?Sized>(
        rng: &mut R,
        catalog: &CompanyCatalog,
        max_shares: Quantity,
    ) -> Result<Self, InvalidTraderConfig> {
        if catalog.is_empty() {
            return Err(InvalidTraderConfig::EmptyCatalog);
        }
        if max_shares == 0 {
            return Err(InvalidTraderConfig::ZeroShares);
        }
        let company = &catalog.companies()[rng.gen_range(0..catalog.len())];
        let share_count = rng.gen_range(1..=max_shares);
        Self::new(company.name.clone(), share_count)
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn share_count(&self) -> Quantity {
        self.share_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_rejects_invalid() {
        assert_eq!(
            TraderConfig::new("", 3),
            Err(InvalidTraderConfig::EmptyCompany)
        );
        assert_eq!(
            TraderConfig::new("MacroHard", 0),
            Err(InvalidTraderConfig::ZeroShares)
        );
        let config = TraderConfig::new("MacroHard", 3).unwrap();
        assert_eq!(config.company(), "MacroHard");
        assert_eq!(config.share_count(), 3);
    }

    #[test]
    fn test_pick_stays_in_catalog_and_range() {
        let catalog = CompanyCatalog::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let config =
                TraderConfig::pick(&mut rng, &catalog, TraderConfig::DEFAULT_MAX_SHARES).unwrap();
            assert!(catalog.find(config.company()).is_some());
            assert!((1..=TraderConfig::DEFAULT_MAX_SHARES).contains(&config.share_count()));
        }
    }

    #[test]
    fn test_pick_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = TraderConfig::pick(&mut rng, &CompanyCatalog::new(vec![]), 5);
        assert_eq!(result, Err(InvalidTraderConfig::EmptyCatalog));
    }
}
