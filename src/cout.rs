//! Format numbers the way a default C++ `std::ostream` does.
//!
//! `std::cout << 1e6` prints `1e+06`, not `1000000`. The printed sums keep
//! that format, so output can be compared with the C++ block line by line.

/// Default `std::ostream` precision.
pub const DEFAULT_PRECISION: usize = 6;

/// Format a double like `std::cout << v`.
#[must_use]
pub fn format_double(v: f64) -> String {
    format_general(v, DEFAULT_PRECISION)
}

/// Format like printf `%.<precision>g`, without the `#` flag.
#[must_use]
pub fn format_general(v: f64, precision: usize) -> String {
    let p = std::cmp::max(precision, 1);
    if v.is_nan() {
        return if v.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to precision can bump the exponent (999999.7 -> 1e+06), so
    // take the exponent from the rounded form.
    let sci = format!("{:.*e}", p - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp) as usize;
        trim_zeros(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn like_cout() {
        for (v, want) in [
            (0.0, "0"),
            (45.0, "45"),
            (0.5, "0.5"),
            (-2.5, "-2.5"),
            (1e6, "1e+06"),
            (123456.0, "123456"),
            (1234567.0, "1.23457e+06"),
            (999999.7, "1e+06"),
            (0.0001, "0.0001"),
            (0.00001, "1e-05"),
            (0.1 + 0.2, "0.3"),
            (1.23456789, "1.23457"),
            (1e100, "1e+100"),
            (-1.5e-7, "-1.5e-07"),
            (f64::NAN, "nan"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
        ] {
            assert_eq!(format_double(v), want, "formatting {v:?}");
        }
    }

    #[test]
    fn other_precision() {
        assert_eq!(format_general(1.23456789, 3), "1.23");
        assert_eq!(format_general(1234.0, 2), "1.2e+03");
        assert_eq!(format_general(1234.0, 0), "1e+03");
    }
}
