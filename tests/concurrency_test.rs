// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Concurrent withdrawals against one machine.
//!
//! Uses parking_lot's deadlock detector (the `deadlock_detection` feature is
//! enabled for tests) while many threads withdraw from a shared machine and
//! a shared in-memory bank.

use atm_demo_rs::{
    AtMachine, Banknote, BanknotesPack, Card, Currency, ErrorCode, InMemoryBank, Money,
    MoneyDeposit, PinCode,
};
use parking_lot::deadlock;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// === Deadlock Detection Infrastructure ===

struct Detector {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Starts a background thread that checks for deadlocks.
fn start_deadlock_detector() -> Detector {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);

    let handle = thread::spawn(move || {
        while flag.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
            let deadlocks = deadlock::check_deadlock();
            if !deadlocks.is_empty() {
                eprintln!("\n=== DEADLOCK DETECTED ===");
                for (i, threads) in deadlocks.iter().enumerate() {
                    eprintln!("\nDeadlock #{}", i + 1);
                    for t in threads {
                        eprintln!("Thread ID: {:?}", t.thread_id());
                        eprintln!("Backtrace:\n{:#?}", t.backtrace());
                    }
                }
                panic!("Deadlock detected! See output above for details.");
            }
        }
    });

    Detector { running, handle }
}

/// Stops the detector and fails the test if it found a deadlock.
fn stop_deadlock_detector(detector: Detector) {
    detector.running.store(false, Ordering::SeqCst);
    assert!(detector.handle.join().is_ok(), "deadlock detector reported a deadlock");
}

// === Fixtures ===

const CARDS: u32 = 20;

fn pin() -> PinCode {
    PinCode::create([1, 2, 3, 4]).unwrap()
}

fn card(i: u32) -> Card {
    Card::create(format!("{:04}", i))
}

fn pln(amount: Decimal) -> Money {
    Money::new(amount, Currency::Pln).unwrap()
}

/// Machine with 10 x 200 + 10 x 100 and a bank with `CARDS` rich accounts.
fn shared_machine() -> Arc<AtMachine<Arc<InMemoryBank>>> {
    let bank = Arc::new(InMemoryBank::new());
    for i in 0..CARDS {
        bank.open_account(card(i), pin(), pln(dec!(1_000_000)));
    }

    let machine = AtMachine::new(bank, Currency::Pln);
    let deposit = MoneyDeposit::create(
        Currency::Pln,
        [
            BanknotesPack::create(10, Banknote::Pl200),
            BanknotesPack::create(10, Banknote::Pl100),
        ],
    )
    .unwrap();
    machine.set_deposit(deposit).unwrap();
    Arc::new(machine)
}

// === Tests ===

/// Many threads race for a vault that can satisfy only a few of them.
#[test]
fn concurrent_withdrawals_never_overdraw_vault() {
    let detector = start_deadlock_detector();
    let machine = shared_machine();

    const NUM_THREADS: u32 = 16;
    const OPS_PER_THREAD: usize = 50;

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let machine = Arc::clone(&machine);
            thread::spawn(move || {
                let card = card(t % CARDS);
                let mut dispensed = Decimal::ZERO;
                for _ in 0..OPS_PER_THREAD {
                    match machine.withdraw(&pin(), &card, &pln(dec!(300))) {
                        Ok(withdrawal) => dispensed += withdrawal.total(),
                        Err(e) => assert_eq!(e.code(), ErrorCode::WrongAmount),
                    }
                    // Readers contend on the same lock.
                    let _ = machine.deposit().total();
                }
                dispensed
            })
        })
        .collect();

    let dispensed: Decimal = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .sum();

    stop_deadlock_detector(detector);

    let vault = machine.deposit();
    assert_eq!(vault.total() + dispensed, dec!(3000));
    assert_eq!(vault.total(), Decimal::ZERO);
}

/// Every attempt is charged exactly once, whether or not notes come out.
#[test]
fn charges_match_attempts_under_contention() {
    let detector = start_deadlock_detector();
    let machine = shared_machine();

    let outcomes: Vec<bool> = (0..200u32)
        .into_par_iter()
        .map(|i| {
            machine
                .withdraw(&pin(), &card(i % CARDS), &pln(dec!(100)))
                .is_ok()
        })
        .collect();

    stop_deadlock_detector(detector);

    let successes = outcomes.iter().filter(|ok| **ok).count();
    // Only the ten 100s can pay 100; the 200s stay in the vault.
    assert_eq!(successes, 10);
    let vault = machine.deposit();
    assert_eq!(vault.available(Banknote::Pl100), 0);
    assert_eq!(vault.available(Banknote::Pl200), 10);

    // Each attempt is charged: the bank debits before the vault is consulted.
    let charged: Decimal = (0..CARDS)
        .map(|i| dec!(1_000_000) - machine.bank().balance(&card(i)).unwrap().amount())
        .sum();
    assert_eq!(charged, dec!(20000));
}

/// Withdrawals mixed with vault replacement stay consistent.
#[test]
fn no_deadlock_with_concurrent_reloads() {
    let detector = start_deadlock_detector();
    let machine = shared_machine();

    let reloader = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            for _ in 0..50 {
                let deposit = MoneyDeposit::create(
                    Currency::Pln,
                    [BanknotesPack::create(5, Banknote::Pl100)],
                )
                .unwrap();
                machine.set_deposit(deposit).unwrap();
                thread::yield_now();
            }
        })
    };

    (0..500u32).into_par_iter().for_each(|i| {
        if let Ok(withdrawal) = machine.withdraw(&pin(), &card(i % CARDS), &pln(dec!(200))) {
            assert_eq!(withdrawal.total(), dec!(200));
        }
    });

    reloader.join().expect("Reloader panicked");
    stop_deadlock_detector(detector);

    let vault = machine.deposit();
    assert!(vault.total() >= Decimal::ZERO);
    assert_eq!(vault.available(Banknote::Pl500), 0);
}
