//! Property tests for the vector accessors
//!
//! - plain and optional access agree everywhere except at the NA sentinel
//! - matrix cells address column-major storage
//! - reads past the end always fail with `IndexOutOfRange`

use proptest::prelude::*;
use rinspect_engine::na::{self, NA_INTEGER, NA_LOGICAL};
use rinspect_engine::{vector, BridgeError, Heap, Protected};

fn logical_with_na() -> impl Strategy<Value = i32> {
    prop_oneof![
        1 => Just(NA_LOGICAL),
        2 => prop::sample::select(vec![0, 1]),
        2 => any::<i32>(),
    ]
}

fn int_with_na() -> impl Strategy<Value = i32> {
    prop_oneof![
        1 => Just(NA_INTEGER),
        4 => any::<i32>(),
    ]
}

fn real_with_na() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(na::na_real()),
        1 => Just(f64::NAN),
        4 => any::<f64>(),
    ]
}

proptest! {
    #[test]
    fn prop_logical_opt_agrees_with_plain(values in prop::collection::vec(logical_with_na(), 0..32)) {
        let heap = Heap::new();
        let v = Protected::new(&heap, heap.alloc_logical_raw(&values));
        for (i, &raw) in values.iter().enumerate() {
            prop_assert_eq!(vector::get_logical_raw(&heap, v.get(), i).unwrap(), raw);
            let plain = vector::get_logical(&heap, v.get(), i).unwrap();
            let opt = vector::get_logical_opt(&heap, v.get(), i).unwrap();
            prop_assert_eq!(plain, raw != 0);
            if raw == NA_LOGICAL {
                prop_assert_eq!(opt, None);
            } else {
                prop_assert_eq!(opt, Some(plain));
            }
        }
    }

    #[test]
    fn prop_integer_opt_agrees_with_plain(values in prop::collection::vec(int_with_na(), 0..32)) {
        let heap = Heap::new();
        let v = Protected::new(&heap, heap.alloc_integer(&values));
        for (i, &raw) in values.iter().enumerate() {
            let plain = vector::get_integer(&heap, v.get(), i).unwrap();
            let opt = vector::get_integer_opt(&heap, v.get(), i).unwrap();
            prop_assert_eq!(plain, raw);
            if raw == NA_INTEGER {
                prop_assert_eq!(opt, None);
            } else {
                prop_assert_eq!(opt, Some(plain));
            }
        }
    }

    #[test]
    fn prop_real_opt_agrees_with_plain(values in prop::collection::vec(real_with_na(), 0..32)) {
        let heap = Heap::new();
        let v = Protected::new(&heap, heap.alloc_real(&values));
        for (i, &raw) in values.iter().enumerate() {
            let plain = vector::get_real(&heap, v.get(), i).unwrap();
            let opt = vector::get_real_opt(&heap, v.get(), i).unwrap();
            prop_assert_eq!(plain.to_bits(), raw.to_bits());
            match opt {
                None => prop_assert!(na::is_na_real(raw)),
                Some(x) => prop_assert_eq!(x.to_bits(), raw.to_bits()),
            }
        }
    }

    #[test]
    fn prop_string_opt_agrees_with_plain(
        values in prop::collection::vec(prop::option::of("[a-zA-Z0-9 ]{0,8}"), 0..16)
    ) {
        let heap = Heap::new();
        let refs: Vec<Option<&str>> = values.iter().map(|s| s.as_deref()).collect();
        let v = Protected::new(&heap, heap.alloc_string(&refs));
        for (i, expected) in values.iter().enumerate() {
            let opt = vector::get_string_opt(&heap, v.get(), i).unwrap();
            prop_assert_eq!(&opt, expected);
            if let Some(s) = expected {
                prop_assert_eq!(vector::get_string(&heap, v.get(), i).unwrap(), s.clone());
            }
        }
    }

    #[test]
    fn prop_matrix_is_column_major(nrow in 1usize..8, ncol in 1usize..8, seed in any::<i32>()) {
        let heap = Heap::new();
        let values: Vec<i32> = (0..nrow * ncol).map(|k| seed.wrapping_add(k as i32)).collect();
        let m = Protected::new(&heap, heap.alloc_integer(&values));
        heap.set_dim(m.get(), nrow, ncol).unwrap();

        for column in 0..ncol {
            for row in 0..nrow {
                prop_assert_eq!(
                    vector::get_integer_2d(&heap, m.get(), row, column),
                    vector::get_integer(&heap, m.get(), column * nrow + row)
                );
            }
        }
        let is_out_of_range = matches!(
            vector::get_integer_2d(&heap, m.get(), nrow, 0),
            Err(BridgeError::MatrixIndexOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn prop_past_end_is_out_of_range(len in 0usize..32, extra in 0usize..64) {
        let heap = Heap::new();
        let v = Protected::new(&heap, heap.alloc_real(&vec![0.0; len]));
        prop_assert_eq!(
            vector::get_real(&heap, v.get(), len + extra),
            Err(BridgeError::IndexOutOfRange { offset: len + extra, length: len })
        );
    }
}
