//! CPU versions of the helper functions in generated fragment programs.
//!
//! These evaluate TEV arithmetic the same way the generated code does, including the 8 bit
//! register wraparound, so results can be checked or computed without a GPU.

#![allow(missing_docs)]

use crate::program_ir::TevOpIr;

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Emulates 8 bit wraparound of a color component: `fract(x * 255/256) * 256/255`.
pub fn tev_overflow_color(x: f32) -> f32 {
    fract(x * (255.0 / 256.0)) * (256.0 / 255.0)
}

/// Emulates 8 bit wraparound of an alpha value: `(i32(a * 255) % 256) / 255`.
pub fn tev_overflow_alpha(a: f32) -> f32 {
    ((a * 255.0) as i32 % 256) as f32 / 255.0
}

/// Applies [tev_overflow_color] to rgb and [tev_overflow_alpha] to alpha.
pub fn tev_overflow(v: [f32; 4]) -> [f32; 4] {
    [
        tev_overflow_color(v[0]),
        tev_overflow_color(v[1]),
        tev_overflow_color(v[2]),
        tev_overflow_alpha(v[3]),
    ]
}

pub fn mix(a: f32, b: f32, c: f32) -> f32 {
    a * (1.0 - c) + b * c
}

/// Evaluates one component of a TEV combiner. `a`, `b` and `c` are expected to have
/// overflow already applied.
pub fn tev_combine(
    op: TevOpIr,
    [a, b, c, d]: [f32; 4],
    bias: f32,
    scale: f32,
    clamp: bool,
) -> f32 {
    let v = match op {
        TevOpIr::Add => (mix(a, b, c) + d + bias) * scale,
        TevOpIr::Sub => (mix(a, b, c) - d + bias) * scale,
        TevOpIr::CompR8Gt => {
            if a > b {
                c
            } else {
                0.0
            }
        }
    };
    if clamp {
        v.clamp(0.0, 1.0)
    } else {
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_overflow_wraps() {
        // Wraps instead of clamping to 1
        assert_close(tev_overflow_color(1.2), 0.19608);
        assert_close(fract(1.0 * 255.0 / 256.0), 0.99609);
        assert_close(tev_overflow_color(1.0), 1.0);
        assert_close(tev_overflow_color(0.5), 0.5);
        assert_close(tev_overflow_color(0.0), 0.0);
    }

    #[test]
    fn test_overflow_alpha() {
        assert_close(tev_overflow_alpha(1.0), 1.0);
        assert_close(tev_overflow_alpha(0.5), 127.0 / 255.0);
        assert_close(tev_overflow_alpha(2.0), 254.0 / 255.0);

        let v = tev_overflow([1.2, 0.0, 1.0, 1.2]);
        assert_close(v[0], 0.19608);
        assert_close(v[3], 50.0 / 255.0);
    }

    #[test]
    fn test_combine() {
        assert_close(tev_combine(TevOpIr::Add, [0.2, 0.8, 0.5, 0.1], 0.0, 1.0, true), 0.6);
        assert_close(tev_combine(TevOpIr::Sub, [0.2, 0.8, 0.5, 0.1], 0.5, 2.0, false), 1.8);
        assert_close(tev_combine(TevOpIr::Add, [0.0, 1.0, 1.0, 0.5], 0.0, 1.0, true), 1.0);
        assert_close(tev_combine(TevOpIr::CompR8Gt, [0.6, 0.5, 0.3, 0.9], 0.5, 4.0, true), 0.3);
        assert_close(tev_combine(TevOpIr::CompR8Gt, [0.4, 0.5, 0.3, 0.9], 0.0, 1.0, true), 0.0);
    }
}
