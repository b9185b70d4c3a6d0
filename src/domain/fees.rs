use super::amount::AmountType;

/// Withdrawal fee charged by default, in whole currency units
pub const DEFAULT_WITHDRAWAL_FEE: i64 = 1;

/// Inter-branch transfer fee charged by default, in whole currency units
pub const DEFAULT_INTER_BRANCH_TRANSFER_FEE: i64 = 8;

/// Fixed fees applied by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule<A: AmountType> {
    pub withdrawal: A,
    pub inter_branch_transfer: A,
}

impl<A: AmountType> FeeSchedule<A> {
    pub fn new(withdrawal: A, inter_branch_transfer: A) -> Self {
        Self {
            withdrawal,
            inter_branch_transfer,
        }
    }

    /// Fee charged to the source of a transfer; transfers within a branch are free
    pub fn transfer_fee(&self, source_branch: u32, destination_branch: u32) -> A {
        if source_branch == destination_branch {
            A::zero()
        } else {
            self.inter_branch_transfer
        }
    }
}

impl<A: AmountType> Default for FeeSchedule<A> {
    fn default() -> Self {
        Self::new(
            A::from_units(DEFAULT_WITHDRAWAL_FEE),
            A::from_units(DEFAULT_INTER_BRANCH_TRANSFER_FEE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedPoint;

    #[test]
    fn default_fees() {
        let fees = FeeSchedule::<FixedPoint>::default();
        assert_eq!(fees.withdrawal, FixedPoint::from_units(1));
        assert_eq!(fees.inter_branch_transfer, FixedPoint::from_units(8));
    }

    #[test]
    fn same_branch_transfer_is_free() {
        let fees = FeeSchedule::<FixedPoint>::default();
        assert_eq!(fees.transfer_fee(10, 10), FixedPoint::zero());
        assert_eq!(fees.transfer_fee(10, 47), FixedPoint::from_units(8));
    }
}
