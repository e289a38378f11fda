//! Property tests for balance mutation
//!
//! Random sequences of deposits, withdrawals and transfers are applied to a
//! small in-memory ledger. After every step no balance is negative, and the
//! ledger total moves only by what deposits and withdrawals account for.
//!
//! Run with: cargo test --test ledger_properties_test -- --nocapture

use proptest::prelude::*;

use ledger_core::{Account, AccountNumber, ErrorKind, LedgerContext};

const ACCOUNTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Transfer(usize, usize, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 1i64..500).prop_map(|(a, amount)| Op::Deposit(a, amount)),
        (0..ACCOUNTS, 1i64..800).prop_map(|(a, amount)| Op::Withdraw(a, amount)),
        (0..ACCOUNTS, 0..ACCOUNTS, -5i64..800)
            .prop_map(|(from, to, amount)| Op::Transfer(from, to, amount)),
    ]
}

fn setup(openings: &[i64]) -> (LedgerContext, Vec<Account>) {
    let ledger = LedgerContext::in_memory().unwrap();
    let user = ledger.user_service.create_user("Prop", "Tester").unwrap();
    let accounts = openings
        .iter()
        .enumerate()
        .map(|(i, opening)| {
            let account = ledger
                .account_service
                .open_account(user.id, AccountNumber::new(i as i64 + 1).unwrap(), "Prop")
                .unwrap();
            if *opening > 0 {
                ledger.transfer_engine.deposit(account.id, *opening).unwrap();
            }
            account
        })
        .collect();
    (ledger, accounts)
}

fn balances(ledger: &LedgerContext, accounts: &[Account]) -> Vec<i64> {
    accounts
        .iter()
        .map(|a| ledger.account_service.account_by_id(a.id).unwrap().balance)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn balances_stay_non_negative_and_total_is_conserved(
        openings in prop::collection::vec(0i64..1_000, ACCOUNTS),
        ops in prop::collection::vec(op_strategy(), 1..25),
    ) {
        let (ledger, accounts) = setup(&openings);
        let mut expected_total: i64 = openings.iter().sum();

        for op in ops {
            let before = balances(&ledger, &accounts);
            match op {
                Op::Deposit(a, amount) => {
                    ledger.transfer_engine.deposit(accounts[a].id, amount).unwrap();
                    expected_total += amount;
                }
                Op::Withdraw(a, amount) => {
                    match ledger.transfer_engine.withdraw(accounts[a].id, amount) {
                        Ok(_) => expected_total -= amount,
                        Err(e) => {
                            prop_assert_eq!(e.kind(), ErrorKind::InsufficientFunds);
                            prop_assert!(before[a] < amount);
                        }
                    }
                }
                Op::Transfer(from, to, amount) => {
                    let result = ledger.transfer_engine.transfer(
                        accounts[from].account_number,
                        accounts[to].account_number,
                        amount,
                    );
                    let after = balances(&ledger, &accounts);
                    match result {
                        Ok(receipt) => {
                            prop_assert_eq!(after[from] + after[to], before[from] + before[to]);
                            prop_assert_eq!(receipt.from_balance, after[from]);
                            prop_assert_eq!(receipt.to_balance, after[to]);
                        }
                        Err(e) => {
                            let expected = if amount <= 0 || from == to {
                                ErrorKind::Validation
                            } else {
                                ErrorKind::InsufficientFunds
                            };
                            prop_assert_eq!(e.kind(), expected);
                            prop_assert_eq!(&after, &before);
                        }
                    }
                }
            }

            let after = balances(&ledger, &accounts);
            prop_assert!(after.iter().all(|b| *b >= 0), "negative balance in {:?}", after);
            prop_assert_eq!(after.iter().sum::<i64>(), expected_total);
        }
    }
}
