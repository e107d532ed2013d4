//! Item flag word decoding.
//!
//! The exported dataset carries a 16-bit flag mask per item; the bits follow
//! the retail client's conventions.

pub const WALLHANGING: i32 = 0x0001;
pub const RARE: i32 = 0x0004;
pub const INSCRIBABLE: i32 = 0x0010;
pub const NO_NPC_SALE: i32 = 0x0020;
pub const EXCLUSIVE: i32 = 0x0040;
pub const NO_AUCTION: i32 = 0x1000;
pub const SCROLL: i32 = 0x2000;
pub const LINKSHELL: i32 = 0x4000;
pub const CAN_USE: i32 = 0x8000;

const NAMED_FLAGS: [(&str, i32); 9] = [
    ("Wallhanging", WALLHANGING),
    ("Rare", RARE),
    ("Inscribable", INSCRIBABLE),
    ("No NPC Sale", NO_NPC_SALE),
    ("Exclusive", EXCLUSIVE),
    ("No Auction", NO_AUCTION),
    ("Scroll", SCROLL),
    ("Linkshell", LINKSHELL),
    ("Usable", CAN_USE),
];

/// Only one may be held per character.
pub fn is_rare(flags: i32) -> bool {
    flags & RARE != 0
}

/// Cannot be traded, bazaared, or sent.
pub fn is_exclusive(flags: i32) -> bool {
    flags & EXCLUSIVE != 0
}

/// Names of all flags set in the mask, in bit order.
pub fn describe_flags(flags: i32) -> Vec<&'static str> {
    NAMED_FLAGS
        .iter()
        .filter(|(_, bit)| flags & bit != 0)
        .map(|(name, _)| *name)
        .collect()
}
