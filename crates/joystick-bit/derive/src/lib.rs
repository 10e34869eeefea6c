mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Derives `joystick_bit_mask::Bitable` for a fieldless enum.
///
/// Variants get consecutive bits in declaration order. The first bit can be
/// moved with `#[bit(offset = N)]` on the enum.
#[proc_macro_derive(Bit, attributes(bit))]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
