mod bitmask;

pub use bitmask::Bitmask;

/// A fieldless enum whose variants map to distinct bits of a `u64`.
///
/// Usually implemented with `#[derive(Bit)]` from `joystick-bit-derive`.
pub trait Bitable: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];
    /// Union of the bits of every variant.
    const ALL: u64;

    fn bit(&self) -> u64;
    fn index(&self) -> u32;
}
