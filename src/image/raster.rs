/// Decoded 8-bit raster, row-major with interleaved channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channel_count: u16,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub const BITS_PER_CHANNEL: u8 = 8;

    /// Wrap `pixels`, or `None` if the buffer length does not match
    /// `width * height * channel_count`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, channel_count: u16, pixels: Vec<u8>) -> Option<Self> {
        let expected = usize::try_from(width).ok()?
            .checked_mul(usize::try_from(height).ok()?)?
            .checked_mul(usize::from(channel_count))?;

        (channel_count > 0 && pixels.len() == expected).then_some(Self {
            width,
            height,
            channel_count,
            pixels,
        })
    }

    #[inline(always)]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    #[must_use]
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    #[inline(always)]
    #[must_use]
    pub fn bits_per_channel(&self) -> u8 {
        Self::BITS_PER_CHANNEL
    }

    #[inline(always)]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_must_match_geometry() {
        assert!(RasterImage::from_raw(2, 2, 1, vec![0; 4]).is_some());
        assert!(RasterImage::from_raw(2, 2, 3, vec![0; 12]).is_some());
        assert!(RasterImage::from_raw(2, 2, 3, vec![0; 11]).is_none());
        assert!(RasterImage::from_raw(2, 2, 0, Vec::new()).is_none());
    }
}
