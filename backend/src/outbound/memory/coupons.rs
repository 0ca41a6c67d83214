//! In-memory `CouponCatalogue`.

use async_trait::async_trait;

use crate::domain::ports::{CouponCatalogue, CouponCatalogueError};
use crate::domain::{Coupon, CouponCategory};

/// Fixed coupon pool supplied at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCouponCatalogue {
    coupons: Vec<Coupon>,
}

impl InMemoryCouponCatalogue {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    /// One coupon image per category, served from `base_url`.
    pub fn seeded(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let coupons = [
            CouponCategory::Basic,
            CouponCategory::Standard,
            CouponCategory::Premium,
        ]
        .into_iter()
        .map(|category| Coupon {
            category,
            image_url: format!("{base_url}/coupons/{category}.png"),
        })
        .collect();
        Self::new(coupons)
    }
}

#[async_trait]
impl CouponCatalogue for InMemoryCouponCatalogue {
    async fn coupons_for(
        &self,
        category: CouponCategory,
    ) -> Result<Vec<Coupon>, CouponCatalogueError> {
        Ok(self
            .coupons
            .iter()
            .filter(|coupon| coupon.category == category)
            .cloned()
            .collect())
    }
}
