/// High bit of a per-element index byte, set while another element follows.
pub const CONTINUATION_BIT: u8 = 0x80;

/// Key byte closing an entity-metadata style sequence.
pub const END_OF_SEQUENCE: u8 = 0xFF;
