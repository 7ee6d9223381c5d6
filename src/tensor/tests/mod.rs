/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 张量基础属性测试
 */

use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_new_row_major_layout() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.size(), 6);
    assert_eq!(t.data().as_slice().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
#[should_panic(expected = "不匹配")]
fn test_new_with_wrong_length() {
    let _ = Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]);
}

#[test]
fn test_number_only_for_single_element() {
    assert_eq!(Tensor::new(&[7.0], &[1, 1]).number(), Some(7.0));
    assert_eq!(Tensor::zeros(&[2]).number(), None);
}

#[test]
fn test_reductions() {
    let t = Tensor::new(&[1.0, -2.0, 3.0], &[3]);
    assert_abs_diff_eq!(t.sum_squares(), 14.0);
    assert_abs_diff_eq!(t.mean(), 2.0 / 3.0);
    assert_eq!(Tensor::zeros(&[0]).mean(), 0.0);
}

#[test]
fn test_normal_with_seeded_rng_is_reproducible() {
    let mut rng1 = StdRng::seed_from_u64(42);
    let mut rng2 = StdRng::seed_from_u64(42);
    let a = Tensor::normal_with_rng(0.0, 1.0, &[3, 5], &mut rng1);
    let b = Tensor::normal_with_rng(0.0, 1.0, &[3, 5], &mut rng2);
    assert_eq!(a, b);
    assert_eq!(a.shape(), &[3, 5]);
}
