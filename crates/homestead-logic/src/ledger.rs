//! Shared-treasury rules — debit, credit, balance clamping.
//!
//! The homestead runs one purse for everyone. Only the authoritative server
//! mutates the balance; clients hold read-only mirrors updated by broadcast.
//! These functions are the validation rules the server applies.

/// Hard ceiling on the shared balance. Credits past it clamp, never error.
pub const MAX_BALANCE: i64 = 99_999_999;

/// Result of a debit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Applied {
        new_balance: i64,
    },
    /// Nothing was mutated. `shortfall` is how many coins were missing
    /// (zero when the amount itself was invalid).
    Rejected {
        shortfall: i64,
    },
}

impl DebitOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, DebitOutcome::Applied { .. })
    }
}

/// Result of a credit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Applied {
        new_balance: i64,
        /// True when the credit hit [`MAX_BALANCE`] and excess was dropped.
        clamped: bool,
    },
    /// Negative amount — nothing mutated. The wire contract never sends
    /// one; the rule still refuses to trust the caller.
    Rejected,
}

impl CreditOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, CreditOutcome::Applied { .. })
    }
}

/// Debit `amount` from `balance`. Rejects a negative amount or a balance
/// that cannot cover it; a rejected debit mutates nothing.
pub fn try_debit(balance: i64, amount: i64) -> DebitOutcome {
    if amount < 0 {
        return DebitOutcome::Rejected { shortfall: 0 };
    }
    if balance < amount {
        return DebitOutcome::Rejected {
            shortfall: amount - balance,
        };
    }
    DebitOutcome::Applied {
        new_balance: balance - amount,
    }
}

/// Credit `amount` to `balance`, clamping at [`MAX_BALANCE`]. Always
/// succeeds for non-negative amounts.
pub fn try_credit(balance: i64, amount: i64) -> CreditOutcome {
    if amount < 0 {
        return CreditOutcome::Rejected;
    }
    let raw = balance.saturating_add(amount);
    CreditOutcome::Applied {
        new_balance: raw.min(MAX_BALANCE),
        clamped: raw > MAX_BALANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_within_balance() {
        assert_eq!(
            try_debit(100, 40),
            DebitOutcome::Applied { new_balance: 60 }
        );
        assert_eq!(try_debit(100, 100), DebitOutcome::Applied { new_balance: 0 });
    }

    #[test]
    fn test_debit_overdraw_rejected_with_shortfall() {
        assert_eq!(try_debit(100, 150), DebitOutcome::Rejected { shortfall: 50 });
        assert_eq!(try_debit(0, 1), DebitOutcome::Rejected { shortfall: 1 });
    }

    #[test]
    fn test_debit_negative_amount_rejected() {
        assert_eq!(try_debit(100, -1), DebitOutcome::Rejected { shortfall: 0 });
    }

    #[test]
    fn test_debit_zero_is_noop_success() {
        assert_eq!(try_debit(100, 0), DebitOutcome::Applied { new_balance: 100 });
    }

    #[test]
    fn test_credit_plain() {
        assert_eq!(
            try_credit(100, 50),
            CreditOutcome::Applied {
                new_balance: 150,
                clamped: false
            }
        );
        assert_eq!(
            try_credit(0, 0),
            CreditOutcome::Applied {
                new_balance: 0,
                clamped: false
            }
        );
    }

    #[test]
    fn test_credit_clamps_at_max() {
        assert_eq!(
            try_credit(MAX_BALANCE - 10, 50),
            CreditOutcome::Applied {
                new_balance: MAX_BALANCE,
                clamped: true
            }
        );
        // Exactly at the ceiling is not a clamp.
        assert_eq!(
            try_credit(MAX_BALANCE - 10, 10),
            CreditOutcome::Applied {
                new_balance: MAX_BALANCE,
                clamped: false
            }
        );
    }

    #[test]
    fn test_credit_saturates_on_extreme_amounts() {
        assert_eq!(
            try_credit(i64::MAX - 1, i64::MAX),
            CreditOutcome::Applied {
                new_balance: MAX_BALANCE,
                clamped: true
            }
        );
    }

    #[test]
    fn test_credit_negative_rejected() {
        assert_eq!(try_credit(100, -5), CreditOutcome::Rejected);
    }

    #[test]
    fn test_spend_then_refund_scenario() {
        // balance=100: debit(150) rejected, debit(100) -> 0, then a credit
        // against a tiny ceiling clamps.
        let balance = 100;
        assert!(!try_debit(balance, 150).applied());
        let DebitOutcome::Applied { new_balance } = try_debit(balance, 100) else {
            panic!("covered debit must apply");
        };
        assert_eq!(new_balance, 0);
        match try_credit(new_balance, 50) {
            CreditOutcome::Applied { new_balance, .. } => assert_eq!(new_balance, 50),
            CreditOutcome::Rejected => panic!("non-negative credit must apply"),
        }
    }
}
