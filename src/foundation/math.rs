pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Byte length of a `width × height` RGBA8 buffer, erroring on overflow.
pub(crate) fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div255_identity_at_255() {
        for x in [0u16, 1, 127, 200, 255] {
            assert_eq!(mul_div255_u16(x, 255), x);
            assert_eq!(u16::from(mul_div255_u8(x, 255)), x);
        }
    }

    #[test]
    fn rgba8_len_is_w_h_4() {
        assert_eq!(rgba8_len(3, 2), Some(24));
        assert_eq!(rgba8_len(0, 9), Some(0));
        assert_eq!(rgba8_len(u32::MAX, u32::MAX), None);
    }
}
