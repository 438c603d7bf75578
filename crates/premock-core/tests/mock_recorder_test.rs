//! Integration tests for call recording, return programming and argument checks.

use std::ffi::{c_char, c_int};
use std::ptr;

use premock_core::{VerifyError, intercept, mock, render::PLACEHOLDER};

fn other_zero() -> i32 {
    42
}

fn other_one(i: i32) -> i32 {
    i * 42
}

fn other_two(i: i32, j: i32) -> i32 {
    i * j
}

fn other_three(_i: f64, _j: i32, _k: *const c_char) {}

/// Handle type with no textual form.
#[derive(PartialEq)]
struct Handle {
    raw: i32,
}

fn other_close(handle: Handle) -> bool {
    handle.raw >= 0
}

unsafe fn other_fill(out: *mut c_int, len: usize) -> isize {
    // SAFETY: callers pass a writable int.
    unsafe { *out = 1 };
    len as isize
}

intercept! {
    fn ut_zero() -> i32 {
        slot: zero_func,
        real: other_zero,
    }

    fn ut_one(i: i32) -> i32 {
        slot: one_func,
        real: other_one,
    }

    fn ut_two(i: i32, j: i32) -> i32 {
        slot: two_func,
        real: other_two,
    }

    fn ut_three(i: f64, j: i32, k: *const c_char) {
        slot: three_func,
        real: other_three,
    }

    fn ut_close(handle: Handle) -> bool {
        slot: close_func,
        real: other_close,
    }

    unsafe extern "C" fn ut_fill(out: *mut c_int, len: usize) -> isize {
        slot: fill_func,
        real: other_fill,
    }
}

fn prod_zero() -> i32 {
    ut_zero()
}

fn prod_one(i: i32) -> i32 {
    ut_one(i + 1)
}

fn prod_two(i: i32, j: i32) -> i32 {
    ut_one(j + 2);
    ut_two(i - 1, j + 1)
}

fn prod_three(i: f64, j: i32, k: *const c_char) {
    ut_three(i + 1.0, j + 2, k);
}

fn prod_fill() -> (c_int, isize) {
    let mut value: c_int = 0;
    // SAFETY: `value` is a live, writable int for the duration of the call.
    let written = unsafe { ut_fill(&mut value, 4) };
    (value, written)
}

#[test]
fn untouched_slots_forward_to_real_functions() {
    assert_eq!(prod_zero(), 42);
    assert_eq!(prod_one(1), 84);
    assert_eq!(prod_two(3, 4), 10);
    assert_eq!(prod_fill(), (1, 4));
}

#[test]
fn single_programmed_value_is_returned_for_every_call() -> Result<(), VerifyError> {
    let m = mock!(two_func);
    m.return_value(5);
    assert_eq!(prod_two(99, 999), 5);
    m.expect_called_once()?.with_values((98, 1000))?;

    assert_eq!(prod_two(1, 1), 5);
    assert_eq!(prod_two(2, 2), 5);
    m.expect_called(2)?.with_value_list([(0, 2), (1, 3)])?;
    Ok(())
}

#[test]
fn two_func_scenario_checks_whole_window() -> Result<(), VerifyError> {
    let m = mock!(two_func);
    m.return_values([11, 22, 33]);
    assert_eq!(prod_two(99, 999), 11);
    assert_eq!(prod_two(9, 10), 22);
    assert_eq!(prod_two(5, 5), 33);
    m.expect_called(3)?
        .with_value_list([(98, 1000), (8, 11), (4, 6)])?;
    Ok(())
}

#[test]
fn two_func_scenario_single_check_uses_last_call() -> Result<(), VerifyError> {
    let m = mock!(two_func);
    m.return_values([11, 22, 33]);
    prod_two(99, 999);
    prod_two(9, 10);
    prod_two(5, 5);
    m.expect_called(3)?.with_values((4, 6))?;
    Ok(())
}

#[test]
fn two_func_scenario_reports_third_position() {
    let m = mock!(two_func);
    m.return_values([11, 22, 33]);
    prod_two(99, 999);
    prod_two(9, 10);
    prod_two(5, 5);
    let err = m
        .expect_called(3)
        .and_then(|checker| checker.with_value_list([(98, 1000), (8, 11), (4, 7)]))
        .unwrap_err();
    assert_eq!(
        err,
        VerifyError::ValueMismatch {
            symbol: "ut_two",
            index: 2,
            expected: "(4, 7)".into(),
            actual: "(4, 6)".into(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("-(4, 7)"), "{message}");
    assert!(message.contains("+(4, 6)"), "{message}");
}

#[test]
fn return_sequence_repeats_last_value() {
    let m = mock!(one_func);
    m.return_values([1, 2, 3]);
    let returned: Vec<i32> = (0..6).map(prod_one).collect();
    assert_eq!(returned, [1, 2, 3, 3, 3, 3]);
    assert_eq!(m.total_calls(), 6);
}

#[test]
fn recording_completeness_for_several_counts() {
    for k in 0..6 {
        let m = mock!(zero_func);
        for _ in 0..k {
            prod_zero();
        }
        for n in (0..8).filter(|&n| n != k) {
            let err = m.expect_called(n).unwrap_err();
            assert!(matches!(
                err,
                VerifyError::CallCount { expected, actual, .. } if expected == n && actual == k
            ));
        }
        assert!(m.expect_called(k).is_ok());
        assert!(m.expect_called(k).is_ok() == (k == 0));
    }
}

#[test]
fn verified_calls_never_reappear() -> Result<(), VerifyError> {
    let m = mock!(one_func);
    prod_one(1);
    prod_one(2);
    m.expect_called(2)?.with_value_list([(2,), (3,)])?;
    prod_one(10);
    let checker = m.expect_called_once()?;
    assert_eq!(checker.calls(), &[(11,)]);
    m.expect_not_called()?;
    Ok(())
}

#[test]
fn size_mismatch_states_both_counts() {
    let m = mock!(two_func);
    prod_two(1, 1);
    prod_two(2, 2);
    let err = m
        .expect_called(2)
        .and_then(|checker| checker.with_value_list([(0, 2), (1, 3), (2, 4)]))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains('3'), "{message}");
    assert!(message.contains('2'), "{message}");
    assert!(matches!(
        err,
        VerifyError::ListSize {
            expected: 3,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn sub_range_checks_only_requested_calls() -> Result<(), VerifyError> {
    let m = mock!(one_func);
    for i in 0..5 {
        prod_one(i);
    }
    m.expect_called(5)?
        .with_value_list_in([(3,), (4,)], 2..4)?;
    Ok(())
}

#[test]
fn unprintable_arguments_render_placeholder() {
    let m = mock!(close_func);
    ut_close(Handle { raw: 3 });
    let err = m
        .expect_called_once()
        .and_then(|checker| checker.with_values((Handle { raw: 4 },)))
        .unwrap_err();
    let expected_text = format!("({PLACEHOLDER})");
    assert_eq!(
        err,
        VerifyError::ValueMismatch {
            symbol: "ut_close",
            index: 0,
            expected: expected_text.clone(),
            actual: expected_text,
        }
    );
    assert!(err.to_string().contains("renderings identical"));
}

#[test]
fn printable_arguments_render_their_text() {
    let m = mock!(three_func);
    prod_three(0.5, 1, ptr::null());
    let err = m
        .expect_called_once()
        .and_then(|checker| checker.with_values((2.0, 3, ptr::null())))
        .unwrap_err();
    let VerifyError::ValueMismatch { expected, actual, .. } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(expected, "(2.0, 3, 0x0)");
    assert_eq!(actual, "(1.5, 3, 0x0)");
}

#[test]
fn unit_return_recorder_records_calls() -> Result<(), VerifyError> {
    let m = mock!(three_func);
    prod_three(0.0, 1, ptr::null());
    prod_three(1.0, 2, ptr::null());
    m.expect_called(2)?
        .with_value_list([(1.0, 3, ptr::null()), (2.0, 4, ptr::null())])?;
    Ok(())
}

#[test]
fn output_parameter_is_written_by_replacement() -> Result<(), VerifyError> {
    let m = mock!(fill_func);
    m.return_value(-1);
    assert_eq!(prod_fill(), (0, -1));
    let checker = m.expect_called_once()?;
    let (out, len) = checker.calls()[0];
    assert!(!out.is_null());
    assert_eq!(len, 4);
    drop(m);

    let _guard = fill_func().replace(|out: *mut c_int, len: usize| {
        // SAFETY: the production caller passes a writable int.
        unsafe { *out = 77 };
        len as isize * 2
    });
    assert_eq!(prod_fill(), (77, 8));
    Ok(())
}

#[test]
fn several_recorders_run_at_once() -> Result<(), VerifyError> {
    let ones = mock!(one_func);
    let twos = mock!(two_func);
    twos.return_value(7);
    assert_eq!(prod_two(10, 20), 7);
    ones.expect_called_once()?.with_values((22,))?;
    twos.expect_called_once()?.with_values((9, 21))?;
    Ok(())
}

#[test]
fn dropping_the_recorder_restores_the_real_function() {
    {
        let m = mock!(zero_func);
        m.return_value(3);
        assert_eq!(prod_zero(), 3);
    }
    assert_eq!(prod_zero(), 42);
    assert!(zero_func().is_real());
}
