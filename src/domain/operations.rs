use std::cmp::Ordering;

use super::account::Account;
use super::amount::AmountType;
use super::error::DomainError;
use super::fees::FeeSchedule;

/// Reject zero and negative amounts
pub fn ensure_positive<A: AmountType>(amount: A) -> Result<(), DomainError> {
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount(amount.to_decimal_string()));
    }
    Ok(())
}

/// Apply a deposit to an account
pub fn apply_deposit<A: AmountType>(account: &mut Account<A>, amount: A) -> Result<(), DomainError> {
    ensure_positive(amount)?;
    credit(account, amount)
}

/// Apply a withdrawal, charging `fee` on top of `amount`
pub fn apply_withdrawal<A: AmountType>(
    account: &mut Account<A>,
    amount: A,
    fee: A,
) -> Result<(), DomainError> {
    ensure_positive(amount)?;
    let total = amount.checked_add(fee).ok_or(DomainError::Overflow)?;
    debit(account, total, fee)
}

/// Balance movements of a validated transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan<A: AmountType> {
    /// Taken from the source: amount plus fee
    pub debit: A,
    /// Given to the destination
    pub credit: A,
    pub fee: A,
}

impl<A: AmountType> TransferPlan<A> {
    pub fn apply_to_source(&self, account: &mut Account<A>) -> Result<(), DomainError> {
        debit(account, self.debit, self.fee)
    }

    pub fn apply_to_destination(&self, account: &mut Account<A>) -> Result<(), DomainError> {
        credit(account, self.credit)
    }

    /// Give the debit back to the source after a failed commit
    pub fn revert_source(&self, account: &mut Account<A>) -> Result<(), DomainError> {
        credit(account, self.debit)
    }
}

/// Validate a transfer and compute the balance movements
///
/// The fee depends on whether both accounts share a branch and is charged
/// to the source only.
pub fn plan_transfer<A: AmountType>(
    source: &Account<A>,
    destination: &Account<A>,
    amount: A,
    fees: &FeeSchedule<A>,
) -> Result<TransferPlan<A>, DomainError> {
    ensure_positive(amount)?;
    let fee = fees.transfer_fee(source.branch(), destination.branch());
    let debit = amount.checked_add(fee).ok_or(DomainError::Overflow)?;
    ensure_funds(source, debit, fee)?;
    destination
        .balance()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    Ok(TransferPlan {
        debit,
        credit: amount,
        fee,
    })
}

/// Ordering used to rank a branch's clients: highest balance first, then holder name
pub fn richest_first<A: AmountType>(a: &Account<A>, b: &Account<A>) -> Ordering {
    b.balance()
        .cmp(&a.balance())
        .then_with(|| a.holder_name().cmp(b.holder_name()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Pick the account to move into the private branch
pub fn select_richest<'a, A, I>(accounts: I) -> Option<&'a Account<A>>
where
    A: AmountType,
    I: IntoIterator<Item = &'a Account<A>>,
{
    accounts.into_iter().min_by(|a, b| richest_first(a, b))
}

/// Reassign an account to the private branch; the balance is untouched
pub fn apply_migration<A: AmountType>(account: &mut Account<A>, private_branch: u32) {
    account.move_to_branch(private_branch);
}

fn ensure_funds<A: AmountType>(account: &Account<A>, total: A, fee: A) -> Result<(), DomainError> {
    if account.balance() < total {
        return Err(DomainError::InsufficientFunds {
            number: account.number(),
            fee: fee.to_decimal_string(),
            available: account.balance().to_decimal_string(),
        });
    }
    Ok(())
}

fn debit<A: AmountType>(account: &mut Account<A>, total: A, fee: A) -> Result<(), DomainError> {
    ensure_funds(account, total, fee)?;
    let new_balance = account
        .balance()
        .checked_sub(total)
        .ok_or(DomainError::Overflow)?;
    account.set_balance(new_balance);
    Ok(())
}

fn credit<A: AmountType>(account: &mut Account<A>, amount: A) -> Result<(), DomainError> {
    let new_balance = account
        .balance()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;
    account.set_balance(new_balance);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, NewAccount};
    use crate::domain::amount::FixedPoint;
    use proptest::prelude::*;

    fn account(id: u64, branch: u32, number: u32, name: &str, units: i64) -> Account<FixedPoint> {
        Account::new(
            AccountId::new(id),
            NewAccount::new(branch, number, name, FixedPoint::from_units(units)).unwrap(),
        )
    }

    fn units(n: i64) -> FixedPoint {
        FixedPoint::from_units(n)
    }

    #[test]
    fn deposit_increases_balance() {
        let mut acc = account(1, 10, 1001, "Ana", 100);
        apply_deposit(&mut acc, units(25)).unwrap();
        assert_eq!(acc.balance(), units(125));
    }

    #[test]
    fn deposit_zero_or_negative_fails() {
        let mut acc = account(1, 10, 1001, "Ana", 100);

        assert_eq!(
            apply_deposit(&mut acc, FixedPoint::zero()),
            Err(DomainError::InvalidAmount("0.0000".to_string()))
        );
        assert!(apply_deposit(&mut acc, FixedPoint::from_raw(-1)).is_err());
        assert_eq!(acc.balance(), units(100));
    }

    #[test]
    fn deposit_overflow_leaves_balance_untouched() {
        let mut acc = account(1, 10, 1001, "Ana", 0);
        acc.set_balance(FixedPoint::from_raw(i64::MAX));

        assert_eq!(
            apply_deposit(&mut acc, FixedPoint::from_raw(1)),
            Err(DomainError::Overflow)
        );
        assert_eq!(acc.balance(), FixedPoint::from_raw(i64::MAX));
    }

    #[test]
    fn withdrawal_charges_fee() {
        let mut acc = account(1, 10, 1001, "Ana", 100);
        apply_withdrawal(&mut acc, units(10), units(1)).unwrap();
        assert_eq!(acc.balance(), units(89));
    }

    #[test]
    fn withdrawal_of_entire_balance_minus_fee_reaches_zero() {
        let mut acc = account(1, 10, 1001, "Ana", 11);
        apply_withdrawal(&mut acc, units(10), units(1)).unwrap();
        assert_eq!(acc.balance(), FixedPoint::zero());
    }

    #[test]
    fn withdrawal_insufficient_funds_reports_fee_and_balance() {
        let mut acc = account(1, 10, 1001, "Ana", 5);

        let result = apply_withdrawal(&mut acc, units(10), units(1));
        assert_eq!(
            result,
            Err(DomainError::InsufficientFunds {
                number: 1001,
                fee: "1.0000".to_string(),
                available: "5.0000".to_string(),
            })
        );
        assert_eq!(acc.balance(), units(5));
    }

    #[test]
    fn withdrawal_fee_alone_can_exceed_balance() {
        let mut acc = account(1, 10, 1001, "Ana", 10);
        assert!(matches!(
            apply_withdrawal(&mut acc, units(10), units(1)),
            Err(DomainError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn withdrawal_zero_fails() {
        let mut acc = account(1, 10, 1001, "Ana", 10);
        assert!(matches!(
            apply_withdrawal(&mut acc, FixedPoint::zero(), units(1)),
            Err(DomainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn inter_branch_transfer_plan_charges_fee() {
        let fees = FeeSchedule::default();
        let a = account(1, 1, 100, "A", 100);
        let b = account(2, 2, 200, "B", 50);

        let plan = plan_transfer(&a, &b, units(20), &fees).unwrap();
        assert_eq!(plan.debit, units(28));
        assert_eq!(plan.credit, units(20));
        assert_eq!(plan.fee, units(8));
    }

    #[test]
    fn intra_branch_transfer_plan_is_free() {
        let fees = FeeSchedule::default();
        let a = account(1, 1, 100, "A", 20);
        let b = account(2, 1, 200, "B", 50);

        let plan = plan_transfer(&a, &b, units(20), &fees).unwrap();
        assert_eq!(plan.debit, units(20));
        assert_eq!(plan.fee, FixedPoint::zero());
    }

    #[test]
    fn transfer_plan_checks_amount_plus_fee() {
        let fees = FeeSchedule::default();
        let a = account(1, 1, 100, "A", 25);
        let b = account(2, 2, 200, "B", 0);

        assert_eq!(
            plan_transfer(&a, &b, units(20), &fees),
            Err(DomainError::InsufficientFunds {
                number: 100,
                fee: "8.0000".to_string(),
                available: "25.0000".to_string(),
            })
        );
    }

    #[test]
    fn plan_applies_to_both_sides() {
        let fees = FeeSchedule::default();
        let mut a = account(1, 1, 100, "A", 100);
        let mut b = account(2, 2, 200, "B", 50);

        let plan = plan_transfer(&a, &b, units(20), &fees).unwrap();
        plan.apply_to_source(&mut a).unwrap();
        plan.apply_to_destination(&mut b).unwrap();

        assert_eq!(a.balance(), units(72));
        assert_eq!(b.balance(), units(70));

        plan.revert_source(&mut a).unwrap();
        assert_eq!(a.balance(), units(100));
    }

    #[test]
    fn select_richest_prefers_balance_then_name() {
        let accounts = vec![
            account(1, 5, 1, "Zeca", 500),
            account(2, 5, 2, "Bruna", 900),
            account(3, 5, 3, "Ana", 900),
            account(4, 5, 4, "Carlos", 100),
        ];

        let richest = select_richest(&accounts).unwrap();
        assert_eq!(richest.holder_name(), "Ana");
    }

    #[test]
    fn select_richest_of_empty_branch_is_none() {
        let accounts: Vec<Account<FixedPoint>> = Vec::new();
        assert!(select_richest(&accounts).is_none());
    }

    #[test]
    fn migration_keeps_balance() {
        let mut acc = account(1, 5, 1, "Ana", 900);
        apply_migration(&mut acc, 99);
        assert_eq!(acc.branch(), 99);
        assert_eq!(acc.migrated_from(), Some(5));
        assert_eq!(acc.balance(), units(900));
    }

    proptest! {
        #[test]
        fn deposit_adds_exact_amount(balance in 0i64..1_000_000_000, amount in 1i64..1_000_000_000) {
            let mut acc = account(1, 1, 1, "P", 0);
            acc.set_balance(FixedPoint::from_raw(balance));
            apply_deposit(&mut acc, FixedPoint::from_raw(amount)).unwrap();
            prop_assert_eq!(acc.balance(), FixedPoint::from_raw(balance + amount));
        }

        #[test]
        fn withdrawal_never_overdraws(balance in 0i64..1_000_000, amount in 1i64..1_000_000) {
            let fee = FixedPoint::from_units(1);
            let mut acc = account(1, 1, 1, "P", 0);
            acc.set_balance(FixedPoint::from_raw(balance));

            let result = apply_withdrawal(&mut acc, FixedPoint::from_raw(amount), fee);
            if amount + fee.raw() > balance {
                let is_insufficient = matches!(result, Err(DomainError::InsufficientFunds { .. }));
                prop_assert!(is_insufficient);
                prop_assert_eq!(acc.balance(), FixedPoint::from_raw(balance));
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(acc.balance(), FixedPoint::from_raw(balance - amount - fee.raw()));
            }
        }

        #[test]
        fn transfer_conserves_value_minus_fee(
            src in 0i64..1_000_000,
            dst in 0i64..1_000_000,
            amount in 1i64..1_000_000,
            same_branch in any::<bool>(),
        ) {
            let fees = FeeSchedule::<FixedPoint>::default();
            let mut a = account(1, 1, 1, "A", 0);
            let mut b = account(2, if same_branch { 1 } else { 2 }, 2, "B", 0);
            a.set_balance(FixedPoint::from_raw(src));
            b.set_balance(FixedPoint::from_raw(dst));

            if let Ok(plan) = plan_transfer(&a, &b, FixedPoint::from_raw(amount), &fees) {
                plan.apply_to_source(&mut a).unwrap();
                plan.apply_to_destination(&mut b).unwrap();
                let expected_fee = if same_branch { 0 } else { fees.inter_branch_transfer.raw() };
                prop_assert!(a.balance() >= FixedPoint::zero());
                prop_assert_eq!(
                    a.balance().raw() + b.balance().raw(),
                    src + dst - expected_fee
                );
            }
        }
    }
}
