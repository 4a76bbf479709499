// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ledger reset after an on-chain claim.
//!
//! The client reports a confirmed claim transaction and the balance is
//! zeroed so the same points cannot be claimed twice through the app. The
//! report is trusted as-is; the vault contract enforces its own lifetime cap.

use crate::error::Result;
use crate::services::PointsLedger;

#[derive(Clone)]
pub struct ClaimService {
    ledger: PointsLedger,
}

impl ClaimService {
    pub fn new(ledger: PointsLedger) -> Self {
        Self { ledger }
    }

    /// Zero the balance and return what the store now holds.
    pub async fn reset_after_claim(&self, fid: &str) -> Result<i64> {
        self.ledger.reset_points(fid).await?;

        let points = self.ledger.get_points(fid).await?;
        if points != 0 {
            tracing::warn!(fid, points, "Balance not zero after claim reset");
        }
        Ok(points)
    }
}
