//! Property-based tests for value coercion.

use ck_convert::{num_to_string, to_f64, to_i32, to_i64, to_u16, ConvertError};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Integral values never render a decimal point and parse back exactly.
    #[test]
    fn integral_numbers_render_without_point(n in -1_000_000_000_i64..1_000_000_000) {
        let text = num_to_string(n as f64).unwrap();
        prop_assert!(!text.contains('.'), "rendered {text}");
        prop_assert_eq!(to_i64(text.as_str()).unwrap(), n);
    }

    /// Rendered floats parse back to the identical value.
    #[test]
    fn floats_round_trip_through_text(v in -1.0e12_f64..1.0e12) {
        let text = num_to_string(v).unwrap();
        prop_assert_eq!(to_f64(text.as_str()).unwrap(), v);
    }

    /// Values inside i32 convert, values outside are rejected, never wrapped.
    #[test]
    fn i32_never_truncates(n in any::<i64>()) {
        match to_i32(n) {
            Ok(v) => prop_assert_eq!(i64::from(v), n),
            Err(ConvertError::TooLarge { .. }) => prop_assert!(n > i64::from(i32::MAX)),
            Err(ConvertError::TooSmall { .. }) => prop_assert!(n < i64::from(i32::MIN)),
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    /// u16 conversion of strings agrees with native parsing.
    #[test]
    fn u16_from_strings(n in 0_u32..200_000) {
        let parsed = to_u16(n.to_string());
        if n <= u32::from(u16::MAX) {
            prop_assert_eq!(parsed.unwrap(), n as u16);
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}
