//! Account-related types for the ledger simulator
//!
//! This module defines the `Account` balance cell. Each account carries its own
//! lock, so operations on different accounts never contend with each other.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Account identifier (index into the ledger, `0..N`)
pub type AccountId = usize;

/// Account balance and transfer amount
///
/// Unsigned, so a balance can never be observed below zero.
pub type Balance = u64;

/// Independently lockable balance cell
///
/// Withdrawals and deposits are atomic with respect to other calls on the
/// same account. The lock is held only for the duration of a single
/// operation and is never held across a call into the ledger.
#[derive(Debug)]
pub struct Account {
    /// The account ID (fixed at construction)
    id: AccountId,

    /// Current balance
    balance: Mutex<Balance>,

    /// Signalled whenever a deposit lands
    deposited: Condvar,
}

impl Account {
    /// Create a new account holding `initial_balance`
    pub fn new(id: AccountId, initial_balance: Balance) -> Self {
        Account {
            id,
            balance: Mutex::new(initial_balance),
            deposited: Condvar::new(),
        }
    }

    /// The account ID
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Current balance
    ///
    /// Only consistent with the rest of the ledger when read during an audit.
    pub fn balance(&self) -> Balance {
        *self.balance.lock()
    }

    /// Withdraw funds if enough are available
    ///
    /// Compare-and-decrement under the account lock.
    ///
    /// # Returns
    ///
    /// * `true` - `amount <= balance`; the balance was decreased by `amount`
    /// * `false` - insufficient funds; the balance is unchanged
    pub fn withdraw(&self, amount: Balance) -> bool {
        let mut balance = self.balance.lock();
        if amount <= *balance {
            *balance -= amount;
            true
        } else {
            false
        }
    }

    /// Deposit funds
    ///
    /// Always succeeds. Saturates at `Balance::MAX`; inside a ledger the
    /// expected total bounds every balance, so that limit is never reached.
    /// Wakes anyone blocked in [`Account::wait_for_funds`].
    pub fn deposit(&self, amount: Balance) {
        let mut balance = self.balance.lock();
        *balance = balance.saturating_add(amount);
        self.deposited.notify_all();
    }

    /// Block until the balance covers `amount` or `timeout` elapses
    ///
    /// # Returns
    ///
    /// `true` if the balance reached `amount` before the deadline.
    pub fn wait_for_funds(&self, amount: Balance, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut balance = self.balance.lock();
        while *balance < amount {
            if self.deposited.wait_until(&mut balance, deadline).timed_out() {
                return *balance >= amount;
            }
        }
        true
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Account[{}] balance {}", self.id, self.balance())
    }
}
