//! The MTEXT color model.
//!
//! A color is either an AutoCAD Color Index (ACI) — a palette index in
//! `[0, 256]`, where 256 means "inherit from layer" — or a 24-bit RGB
//! value, never both. The two assignment paths clear each other so that
//! the invariant holds under any operation order.

/// The ACI value meaning "inherit the color from the layer".
pub const BY_LAYER: u16 = 256;

/// Error returned when an ACI value outside `[0, 256]` is assigned.
///
/// This is the one condition in the crate that surfaces as an error
/// instead of degrading to literal text: it can only be reached through
/// direct state manipulation. The `\C` command path ignores out-of-range
/// values instead of raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorIndexError {
    /// The rejected index.
    pub index: u16,
}

impl std::fmt::Display for ColorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write![
            f,
            "color index {} is outside the AutoCAD color index range [0, 256]",
            self.index
        ]
    }
}

impl std::error::Error for ColorIndexError {}

/// An ACI or RGB color.
///
/// RGB is stored as a packed `0xRRGGBB` integer. The default color is
/// ACI 256 ("by layer").
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    aci: Option<u16>,
    rgb: Option<u32>,
}

impl Default for Color {
    fn default() -> Self {
        Color {
            aci: Some(BY_LAYER),
            rgb: None,
        }
    }
}

impl Color {
    /// Create a color from an ACI value.
    pub fn from_aci(index: u16) -> Result<Color, ColorIndexError> {
        let mut color = Color { aci: None, rgb: None };
        color.set_aci(index)?;
        Ok(color)
    }

    /// Create a color from an RGB triple.
    pub fn from_rgb(rgb: (u8, u8, u8)) -> Color {
        let mut color = Color { aci: None, rgb: None };
        color.set_rgb(Some(rgb));
        color
    }

    /// The ACI value, or [`None`] if the color is RGB.
    #[inline]
    pub fn aci(&self) -> Option<u16> {
        self.aci
    }

    /// Assign an ACI value and clear any RGB value.
    ///
    /// Fails with a [`ColorIndexError`] if `index` is not in `[0, 256]`.
    pub fn set_aci(&mut self, index: u16) -> Result<(), ColorIndexError> {
        if index > BY_LAYER {
            return Err(ColorIndexError { index });
        }
        self.aci = Some(index);
        self.rgb = None;
        Ok(())
    }

    /// Clear the ACI value without touching the RGB value.
    ///
    /// This is the one operation that may leave the color with neither
    /// field set.
    pub fn clear_aci(&mut self) {
        self.aci = None;
    }

    /// The RGB triple, or [`None`] if the color is an ACI.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        self.rgb.map(|v| {
            (
                ((v >> 16) & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
            )
        })
    }

    /// Assign an RGB triple, clearing the ACI, or clear the RGB value
    /// only by passing [`None`].
    pub fn set_rgb(&mut self, rgb: Option<(u8, u8, u8)>) {
        match rgb {
            Some((r, g, b)) => {
                self.set_rgb_value(((r as u32) << 16) | ((g as u32) << 8) | b as u32);
            }
            None => self.rgb = None,
        }
    }

    /// The packed `0xRRGGBB` value, or [`None`] if the color is an ACI.
    #[inline]
    pub fn rgb_value(&self) -> Option<u32> {
        self.rgb
    }

    /// Assign the packed `0xRRGGBB` value directly, clearing the ACI.
    ///
    /// Only the low 24 bits are kept.
    pub fn set_rgb_value(&mut self, value: u32) {
        self.rgb = Some(value & 0xFF_FFFF);
        self.aci = None;
    }
}

/// Pack an RGB triple into the DXF integer byte order `(b<<16)|(g<<8)|r`.
///
/// This is the reverse of the conventional `0xRRGGBB` packing; the order
/// is kept for compatibility with existing consumers of the integer form.
pub fn rgb_to_int((r, g, b): (u8, u8, u8)) -> u32 {
    ((b as u32) << 16) | ((g as u32) << 8) | r as u32
}

/// Unpack an integer packed by [`rgb_to_int`] back into an RGB triple.
pub fn int_to_rgb(value: u32) -> (u8, u8, u8) {
    (
        (value & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        ((value >> 16) & 0xFF) as u8,
    )
}
