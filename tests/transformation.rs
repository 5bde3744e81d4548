//! map, try_map, flat_map and the filter family.

use std::cell::Cell;
use std::io;

use thiserror::Error;
use try_this::{result, Cause, NoSuchElement, Panicked, Try};

#[derive(Debug, Error, PartialEq)]
enum Rejected {
    #[error("null pointer #{0}")]
    NullPointer(u32),
    #[error("runtime #{0}")]
    Runtime(u32),
    #[error("illegal argument #{0}")]
    IllegalArgument(u32),
}

fn failing(id: u32) -> Try<i32> {
    Try::failure(Rejected::IllegalArgument(id))
}

fn root(t: Try<i32>) -> Rejected {
    t.get_cause().downcast::<Rejected>().unwrap()
}

#[test]
fn map_success() {
    assert_eq!(Try::success(2).map(|v| v * 10), Try::success(20));
}

#[test]
fn map_matches_of_for_total_functions() {
    let f = |v: i32| v.to_string();
    assert_eq!(Try::success(7).map(f), Try::of(|| result::Ok(f(7))));
}

#[test]
fn map_panic_becomes_failure() {
    let mapped: Try<i32> = Try::success(0).map(|v| 10 / v);
    assert!(mapped.get_cause().is::<Panicked>());
}

#[test]
fn map_skips_failure() {
    let called = Cell::new(false);
    let mapped = failing(1).map(|v| {
        called.set(true);
        v + 1
    });
    assert!(!called.get());
    assert_eq!(root(mapped), Rejected::IllegalArgument(1));
}

#[test]
fn try_map_error_becomes_failure() {
    let mapped: Try<u8> = Try::success("300").try_map(|s| Ok(s.parse::<u8>()?));
    assert!(mapped.get_cause().is::<std::num::ParseIntError>());
}

#[test]
fn flat_map_success() {
    let t = Try::of(|| result::Ok(Try::of(|| result::Ok(1)))).flat_map(|inner| inner);
    assert_eq!(t, Try::of(|| result::Ok(1)));
}

#[test]
fn flat_map_failure() {
    let t: Try<i32> = Try::of(|| result::Ok(failing(4))).flat_map(|inner| inner);
    assert!(t.is_failure());
    assert_eq!(root(t), Rejected::IllegalArgument(4));
}

#[test]
fn flat_map_does_not_nest() {
    let t: Try<Try<i32>> = Try::success(Try::success(1));
    let flat: Try<i32> = t.flat_map(|inner| inner);
    assert_eq!(flat.get(), 1);
}

#[test]
fn filter_try_passes() {
    let t = Try::of(|| result::Ok(1)).filter_try(|v| Ok(*v > 0));
    assert!(t.is_success());
    assert_eq!(t, Try::of(|| result::Ok(1)));
}

#[test]
fn filter_try_not_passes() {
    let t = Try::of(|| result::Ok(1)).filter_try(|v| Ok(*v > 10));
    assert!(t.is_failure());
    let cause = t.get_cause();
    assert!(cause.is::<NoSuchElement>());
    assert_eq!(cause.message(), "Predicate does not hold for 1");
}

#[test]
fn filter_try_predicate_error_is_cause() {
    let t = Try::success(1).filter_try(|_| Err(Cause::wrap(Rejected::NullPointer(2))));
    assert_eq!(root(t), Rejected::NullPointer(2));
}

#[test]
fn filter_try_predicate_panic_is_cause() {
    let t = Try::success(1).filter_try(|_| panic!("predicate blew up"));
    assert_eq!(t.get_cause().downcast::<Panicked>().unwrap().message(), "predicate blew up");
}

#[test]
fn filter_try_skips_failure() {
    let called = Cell::new(false);
    let t = failing(5).filter_try(|_| {
        called.set(true);
        Ok(true)
    });
    assert!(!called.get());
    assert_eq!(root(t), Rejected::IllegalArgument(5));
}

#[test]
fn filter_try_or_passes() {
    let t = Try::of(|| result::Ok(1)).filter_try_or(|x| Ok(*x > 0), |_| Rejected::Runtime(0));
    assert_eq!(t, Try::of(|| result::Ok(1)));
}

#[test]
fn filter_try_or_not_passes_uses_error_fn() {
    let t = Try::of(|| result::Ok(1)).filter_try_or(|x| Ok(*x > 10), |v| Rejected::Runtime(*v as u32));
    assert_eq!(root(t), Rejected::Runtime(1));
}

#[test]
fn filter_try_or_failure_never_calls_error_fn() {
    let called = Cell::new(false);
    let t = failing(6).filter_try_or(
        |x| Ok(*x > 0),
        |_| {
            called.set(true);
            Rejected::Runtime(0)
        },
    );
    assert!(!called.get());
    assert_eq!(root(t), Rejected::IllegalArgument(6));
}

#[test]
fn filter_try_or_predicate_error_wins() {
    let called = Cell::new(false);
    let t = Try::success(1).filter_try_or(
        |_| Err(Cause::wrap(Rejected::NullPointer(8))),
        |_| {
            called.set(true);
            Rejected::Runtime(0)
        },
    );
    assert!(!called.get());
    assert_eq!(root(t), Rejected::NullPointer(8));
}

#[test]
fn filter_try_or_failure_with_raising_predicate() {
    let t = failing(9).filter_try_or(
        |_| Err(Cause::wrap(Rejected::NullPointer(0))),
        |_| Rejected::Runtime(0),
    );
    assert_eq!(root(t), Rejected::IllegalArgument(9));
}

#[test]
fn filter_try_or_error_fn_panic_is_cause() {
    let t = Try::success(1).filter_try_or(|_| Ok(false), |_| -> io::Error { panic!("no error for you") });
    assert_eq!(t.get_cause().downcast::<Panicked>().unwrap().message(), "no error for you");
}

#[test]
fn filter_infallible() {
    assert!(Try::success(3).filter(|v| v % 2 == 1).is_success());
    assert!(Try::success(4).filter(|v| v % 2 == 1).get_cause().is::<NoSuchElement>());
}
