//! REAL to text the way `sqlite3_column_text` renders a REAL column.
//!
//! The engine formats with `%!.17g`. It scales the double by a tabled power of ten to get 18
//! decimal digits, rounds half-up to 17, and keeps a shorter prefix when that prefix reads back
//! as the same double. The 18-digit step is approximate, so the tables and the scaling
//! arithmetic are reproduced exactly; a correctly rounded conversion disagrees with the engine
//! in the last digit for a fraction of a percent of values.

/// `10^p` for `p` in `0..27`, normalized so bit 63 is set.
static BASE: [u64; 27] = [
    0x8000_0000_0000_0000,
    0xa000_0000_0000_0000,
    0xc800_0000_0000_0000,
    0xfa00_0000_0000_0000,
    0x9c40_0000_0000_0000,
    0xc350_0000_0000_0000,
    0xf424_0000_0000_0000,
    0x9896_8000_0000_0000,
    0xbebc_2000_0000_0000,
    0xee6b_2800_0000_0000,
    0x9502_f900_0000_0000,
    0xba43_b740_0000_0000,
    0xe8d4_a510_0000_0000,
    0x9184_e72a_0000_0000,
    0xb5e6_20f4_8000_0000,
    0xe35f_a931_a000_0000,
    0x8e1b_c9bf_0400_0000,
    0xb1a2_bc2e_c500_0000,
    0xde0b_6b3a_7640_0000,
    0x8ac7_2304_89e8_0000,
    0xad78_ebc5_ac62_0000,
    0xd8d7_26b7_177a_8000,
    0x8786_7832_6eac_9000,
    0xa968_163f_0a57_b400,
    0xd3c2_1bce_cced_a100,
    0x8459_5161_4014_84a0,
    0xa56f_a5b9_9019_a5c8,
];

/// Top 64 bits of `10^(27k)`, `k` in `-13..=12`. Slot 13 holds `10^-1` instead of `10^0`.
static SCALE: [u64; 26] = [
    0x8049_a4ac_0c58_11ae,
    0xcf42_894a_5dce_35ea,
    0xa76c_5823_38ed_2621,
    0x873e_4f75_e222_4e68,
    0xda7f_5bf5_9096_6848,
    0xb080_392c_c434_9dec,
    0x8e93_8662_882a_f53e,
    0xe658_29b3_046b_0afa,
    0xba12_1a46_50e4_ddeb,
    0x964e_858c_91ba_2655,
    0xf2d5_6790_ab41_c2a2,
    0xc428_d05a_a475_1e4c,
    0x9e74_d1b7_91e0_7e48,
    0xcccc_cccc_cccc_cccc,
    0xcecb_8f27_f420_0f3a,
    0xa70c_3c40_a64e_6c51,
    0x86f0_ac99_b4e8_dafd,
    0xda01_ee64_1a70_8de9,
    0xb01a_e745_b101_e9e4,
    0x8e41_ade9_fbeb_c27d,
    0xe5d3_ef28_2a24_2e81,
    0xb9a7_4a06_37ce_2ee1,
    0x95f8_3d0a_1fb6_9cd9,
    0xf24a_01a7_3cf2_dccf,
    0xc3b8_3581_09e8_4f07,
    0x9e19_db92_b4e3_1ba9,
];

/// The 32 bits following each [`SCALE`] entry.
static SCALE_LO: [u32; 26] = [
    0x205b_896d,
    0x5206_4cad,
    0xaf2a_f2b8,
    0x5a77_44a7,
    0xaf39_a475,
    0xbd8d_794e,
    0x547e_b47b,
    0x0cb4_a5a3,
    0x92f3_4d62,
    0x3a6a_07f9,
    0xfae2_7299,
    0xaa97_e14c,
    0x775e_a265,
    0xcccc_cccc,
    0x0000_0000,
    0x9990_90b6,
    0x69a0_28bb,
    0xe80e_6f48,
    0x5ec0_5dd0,
    0x1458_8f14,
    0x8f16_68c9,
    0x6d95_3e2c,
    0x4abd_af10,
    0xbc63_3b39,
    0x0a86_2f81,
    0x6c07_a2c2,
];


fn pwr10_to_2(p: i32) -> i32 {
    (p * 108_853) >> 15
}

fn pwr2_to_10(p: i32) -> i32 {
    (p * 78_913) >> 18
}

/// Upper 64 bits of `(a << 32 | a_lo) * b >> 32`, plus the 32 bits that follow them.
#[allow(clippy::cast_possible_truncation)]
fn multiply160(a: u64, a_lo: u32, b: u64) -> (u64, u32) {
    let r = u128::from(a) * u128::from(b) + ((u128::from(a_lo) * u128::from(b)) >> 32);
    ((r >> 64) as u64, (r >> 32) as u32)
}

/// Most significant 64 bits of `10^p`, `p` in `-348..=347`.
#[allow(clippy::cast_sign_loss)]
fn power_of_ten(p: i32) -> u64 {
    let (g, n) = if p < 0 {
        if p == -1 {
            return SCALE[13];
        }
        let (g, n) = (p / 27, p % 27);
        if n == 0 { (g, n) } else { (g - 1, n + 27) }
    } else if p < 27 {
        return BASE[p as usize];
    } else {
        (p / 27, p % 27)
    };

    let slot = (g + 13) as usize;
    if n == 0 {
        return SCALE[slot];
    }
    let (x, lo) = multiply160(SCALE[slot], SCALE_LO[slot], BASE[n as usize]);
    if x & (1 << 63) == 0 {
        (x << 1) | u64::from(lo >> 31)
    } else {
        x
    }
}

/// `m * 2^e` as `d * 10^p` with `d` holding at least 18 digits.
#[allow(clippy::cast_possible_truncation)]
fn eighteen_digits(m: u64, e: i32) -> (u64, i32) {
    let p = 17 - pwr2_to_10(e + 63);
    let h = ((u128::from(m) * u128::from(power_of_ten(p))) >> 64) as u64;
    let h = h >> (-(e + pwr10_to_2(p) + 2)).unsigned_abs();
    (h.wrapping_add((h << 1) & 2) >> 1, -p)
}

fn len_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn digits_value(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0, |acc, &d| acc * 10 + u64::from(d - b'0'))
}

#[allow(clippy::float_cmp)]
fn reads_back_as(mantissa: u64, exp10: i32, value: f64) -> bool {
    format!("{mantissa}e{exp10}")
        .parse::<f64>()
        .is_ok_and(|parsed| parsed == value)
}

/// Significant digits of a positive finite `value`, without trailing zeros, and the position
/// of the decimal point relative to the first digit: `83.25` is `("8325", 2)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn significant_digits(value: f64) -> (Vec<u8>, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let mut m = bits & 0x000f_ffff_ffff_ffff;
    let e = if biased == 0 {
        let shift = m.leading_zeros();
        m <<= shift;
        -1074 - shift as i32
    } else {
        m = (m << 11) | (1 << 63);
        biased - 1086
    };

    let (d, exp10) = eighteen_digits(m, e);
    let mut z = d.to_string().into_bytes();
    let mut point = len_i32(z.len()) + exp10;

    let mut keep = 17;
    if keep < z.len() {
        if z[15] == b'9' && z[14] == b'9' {
            let mut jj = 14;
            while jj > 0 && z[jj - 1] == b'9' {
                jj -= 1;
            }
            let shorter = if jj == 0 { 1 } else { digits_value(&z[..jj]) + 1 };
            if reads_back_as(shorter, point - len_i32(jj), value) {
                keep = jj + 1;
            }
        } else if point >= len_i32(z.len()) || z[13..16] == *b"000" {
            let mut jj = 13;
            while jj > 1 && z[jj - 1] == b'0' {
                jj -= 1;
            }
            if reads_back_as(digits_value(&z[..jj]), point - len_i32(jj), value) {
                keep = jj + 1;
            }
        }

        let round_up = z[keep] >= b'5';
        z.truncate(keep);
        if round_up {
            let mut j = keep;
            loop {
                if j == 0 {
                    z.insert(0, b'1');
                    point += 1;
                    break;
                }
                j -= 1;
                if z[j] < b'9' {
                    z[j] += 1;
                    break;
                }
                z[j] = b'0';
            }
        }
    }

    while z.len() > 1 && z.last() == Some(&b'0') {
        z.pop();
    }
    (z, point)
}

/// Text for a REAL column: `1.0`, `0.33333333333333332`, `1.0e+20`, `1.0e-07`.
///
/// Plain notation always keeps a fractional digit; decimal exponents outside `-4..=16` use
/// `d.ddde+XX`. Negative zero prints as `0.0`, infinities as `Inf` and `-Inf`.
pub(crate) fn render(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return (if value.is_sign_negative() { "-Inf" } else { "Inf" }).to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    let (z, point) = significant_digits(value.abs());
    let digits: String = z.into_iter().map(char::from).collect();
    let mut out = String::with_capacity(digits.len() + 8);
    if value < 0.0 {
        out.push('-');
    }

    let exp = point - 1;
    if !(-4..=16).contains(&exp) {
        out.push_str(&digits[..1]);
        out.push('.');
        out.push_str(if digits.len() > 1 { &digits[1..] } else { "0" });
        let sign = if exp < 0 { '-' } else { '+' };
        out.push_str(&format!("e{sign}{:02}", exp.unsigned_abs()));
    } else if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', point.unsigned_abs() as usize));
        out.push_str(&digits);
    } else {
        let whole = point.unsigned_abs() as usize;
        if digits.len() <= whole {
            out.push_str(&digits);
            out.extend(std::iter::repeat_n('0', whole - digits.len()));
            out.push_str(".0");
        } else {
            out.push_str(&digits[..whole]);
            out.push('.');
            out.push_str(&digits[whole..]);
        }
    }
    out
}
