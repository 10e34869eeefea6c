use joystick_bit_derive::Bit;
use joystick_bit_mask::{Bitable, Bitmask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Bit)]
enum Plain {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Bit)]
#[bit(offset = 16)]
enum Shifted {
    Low,
    High,
}

#[test]
fn bits_follow_declaration_order() {
    assert_eq!(Plain::First.bit(), 1);
    assert_eq!(Plain::Second.bit(), 2);
    assert_eq!(Plain::Third.bit(), 4);
    assert_eq!(Plain::Third.index(), 2);
    assert_eq!(Plain::ALL, 0b111);
    assert_eq!(Plain::VARIANTS, &[Plain::First, Plain::Second, Plain::Third]);
}

#[test]
fn offset_moves_first_bit() {
    assert_eq!(Shifted::Low.bit(), 1 << 16);
    assert_eq!(Shifted::High.index(), 17);
    assert_eq!(Shifted::ALL, (1 << 16) | (1 << 17));
}

#[test]
fn shifted_masks_ignore_other_ranges() {
    let mask = Bitmask::<Shifted>::from_known(0xffff | (1 << 17));
    assert!(!mask.contains(Shifted::Low));
    assert!(mask.contains(Shifted::High));
    assert_eq!(mask.count(), 1);
}
