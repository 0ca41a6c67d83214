//! Reward points and coupon categories.

use std::fmt;

use super::user::Username;

/// Points credited to whoever claims a listing.
pub const CLAIM_REWARD_POINTS: i64 = 10;

/// Message returned once the current score has been redeemed.
pub const ALREADY_REDEEMED_MESSAGE: &str = "Coupon already redeemed for this score.";
/// Message returned when the category pool has no coupons.
pub const NO_COUPONS_MESSAGE: &str = "No coupons available for your category.";

/// Coupon tier unlocked by a score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouponCategory {
    Basic,
    Standard,
    Premium,
}

impl CouponCategory {
    /// Category unlocked by `score`, if any.
    ///
    /// # Examples
    /// ```
    /// use ecoswap::domain::CouponCategory;
    ///
    /// assert_eq!(CouponCategory::for_score(20), Some(CouponCategory::Basic));
    /// assert_eq!(CouponCategory::for_score(151), Some(CouponCategory::Premium));
    /// assert_eq!(CouponCategory::for_score(19), None);
    /// ```
    pub fn for_score(score: i64) -> Option<Self> {
        match score {
            20..=50 => Some(Self::Basic),
            51..=150 => Some(Self::Standard),
            151.. => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for CouponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CouponCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown coupon category: {other}")),
        }
    }
}

/// Coupon artwork available for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub category: CouponCategory,
    pub image_url: String,
}

/// Reward ledger entry for a user.
///
/// ## Invariants
/// - `score` never decreases.
/// - `redeemed_points` is the score at the last redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardAccount {
    pub username: Username,
    pub score: i64,
    pub redeemed_points: i64,
}

impl RewardAccount {
    /// Whether a new coupon may be issued for the current score.
    pub fn can_redeem(&self) -> bool {
        self.redeemed_points < self.score
    }
}

/// Outcome of a reward status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardStatus {
    /// A coupon was issued and the score marked redeemed.
    Coupon { score: i64, coupon_image: String },
    /// The score was already redeemed.
    AlreadyRedeemed { score: i64 },
    /// The score does not reach any category.
    NoCategory { score: i64 },
    /// The category pool is empty.
    PoolEmpty { score: i64 },
}

impl RewardStatus {
    pub fn score(&self) -> i64 {
        match self {
            Self::Coupon { score, .. }
            | Self::AlreadyRedeemed { score }
            | Self::NoCategory { score }
            | Self::PoolEmpty { score } => *score,
        }
    }

    /// Human readable note for outcomes that issue nothing.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyRedeemed { .. } => Some(ALREADY_REDEEMED_MESSAGE),
            Self::PoolEmpty { .. } => Some(NO_COUPONS_MESSAGE),
            Self::Coupon { .. } | Self::NoCategory { .. } => None,
        }
    }
}
