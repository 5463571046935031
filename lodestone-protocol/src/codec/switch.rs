use std::fmt::Debug;

use log::debug;

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

/// A tagged union whose tag was decoded earlier in the enclosing record.
///
/// Each switch site is its own enum with one variant per arm. Neither
/// method reads or writes the discriminant itself.
pub trait Switch: Sized {
    type Discriminant: Debug + ?Sized;

    /// Used in error messages.
    const NAME: &'static str;

    fn decode(
        read: &mut impl NetworkReadExt,
        discriminant: &Self::Discriminant,
    ) -> Result<Self, ReadingError>;

    /// Fails when `self` is not the arm `discriminant` selects.
    fn encode(
        &self,
        write: &mut impl NetworkWriteExt,
        discriminant: &Self::Discriminant,
    ) -> Result<(), WritingError>;
}

pub fn unknown_read_discriminant<S: Switch>(discriminant: &S::Discriminant) -> ReadingError {
    debug!("{} has no arm for {discriminant:?}", S::NAME);
    ReadingError::UnknownDiscriminant {
        switch: S::NAME,
        discriminant: format!("{discriminant:?}"),
    }
}

pub fn unknown_write_discriminant<S: Switch>(discriminant: &S::Discriminant) -> WritingError {
    debug!("{} cannot be written with discriminant {discriminant:?}", S::NAME);
    WritingError::UnknownDiscriminant {
        switch: S::NAME,
        discriminant: format!("{discriminant:?}"),
    }
}

#[cfg(test)]
mod test {
    use crate::bytebuf::PacketBuf;
    use crate::codec::block_pos::BlockPos;
    use crate::codec::identifier::Identifier;
    use crate::codec::switch::{unknown_read_discriminant, unknown_write_discriminant, Switch};
    use crate::codec::var_int::VarInt;
    use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

    #[derive(Debug, PartialEq)]
    enum Target {
        Entity(VarInt),
        Block(BlockPos),
    }

    impl Switch for Target {
        type Discriminant = bool;
        const NAME: &'static str = "Target";

        fn decode(
            read: &mut impl NetworkReadExt,
            is_entity: &bool,
        ) -> Result<Self, ReadingError> {
            if *is_entity {
                Ok(Self::Entity(read.get_var_int()?))
            } else {
                Ok(Self::Block(read.get_block_pos()?))
            }
        }

        fn encode(
            &self,
            write: &mut impl NetworkWriteExt,
            is_entity: &bool,
        ) -> Result<(), WritingError> {
            match (self, is_entity) {
                (Self::Entity(id), true) => write.write_var_int(id),
                (Self::Block(pos), false) => write.write_block_pos(pos),
                _ => Err(unknown_write_discriminant::<Self>(is_entity)),
            }
        }
    }

    #[derive(Debug, PartialEq)]
    enum Action {
        Interact { hand: VarInt },
        Attack,
        InteractAt { is_entity: bool, target: Target },
    }

    impl Switch for Action {
        type Discriminant = u8;
        const NAME: &'static str = "Action";

        fn decode(read: &mut impl NetworkReadExt, action: &u8) -> Result<Self, ReadingError> {
            match action {
                0 => Ok(Self::Interact {
                    hand: read.get_var_int()?,
                }),
                1 => Ok(Self::Attack),
                2 => {
                    let is_entity = read.get_bool()?;
                    let target = read.get_switch(&is_entity)?;
                    Ok(Self::InteractAt { is_entity, target })
                }
                _ => Err(unknown_read_discriminant::<Self>(action)),
            }
        }

        fn encode(&self, write: &mut impl NetworkWriteExt, action: &u8) -> Result<(), WritingError> {
            match (self, action) {
                (Self::Interact { hand }, 0) => write.write_var_int(hand),
                (Self::Attack, 1) => Ok(()),
                (Self::InteractAt { is_entity, target }, 2) => {
                    write.write_bool(*is_entity)?;
                    write.write_switch(target, is_entity)
                }
                _ => Err(unknown_write_discriminant::<Self>(action)),
            }
        }
    }

    #[derive(Debug, PartialEq)]
    enum Payload {
        Brand(String),
        Register(Vec<Identifier>),
        Other(Box<[u8]>),
    }

    impl Payload {
        const KNOWN: [&'static str; 2] = ["minecraft:brand", "minecraft:register"];
    }

    impl Switch for Payload {
        type Discriminant = str;
        const NAME: &'static str = "Payload";

        fn decode(read: &mut impl NetworkReadExt, channel: &str) -> Result<Self, ReadingError> {
            match channel {
                "minecraft:brand" => Ok(Self::Brand(read.get_string()?)),
                "minecraft:register" => {
                    let channels = read.get_list(|read| read.get_identifier())?;
                    Ok(Self::Register(channels))
                }
                _ => Ok(Self::Other(read.get_rest_buffer()?)),
            }
        }

        fn encode(&self, write: &mut impl NetworkWriteExt, channel: &str) -> Result<(), WritingError> {
            match (self, channel) {
                (Self::Brand(brand), "minecraft:brand") => write.write_string(brand),
                (Self::Register(channels), "minecraft:register") => {
                    write.write_list(channels.as_slice(), |write, channel| {
                        write.write_identifier(channel)
                    })
                }
                (Self::Other(data), _) if !Self::KNOWN.iter().any(|known| *known == channel) => {
                    write.write_rest_buffer(data)
                }
                _ => Err(unknown_write_discriminant::<Self>(channel)),
            }
        }
    }

    fn round_trip<S>(value: S, discriminant: &S::Discriminant) -> Vec<u8>
    where
        S: Switch + std::fmt::Debug + PartialEq,
    {
        let mut buf = PacketBuf::new();
        buf.write_switch(&value, discriminant).unwrap();
        let bytes = buf.to_bytes().to_vec();

        let mut buf = PacketBuf::from(bytes.clone());
        assert_eq!(buf.get_switch::<S>(discriminant).unwrap(), value);
        assert_eq!(buf.readable_bytes(), 0);
        bytes
    }

    #[test]
    fn test_void_arm_is_empty() {
        assert!(round_trip(Action::Attack, &1).is_empty());
    }

    #[test]
    fn test_integer_discriminant() {
        let bytes = round_trip(Action::Interact { hand: VarInt(1) }, &0);
        assert_eq!(bytes, [0x01]);
    }

    #[test]
    fn test_nested_switch() {
        let bytes = round_trip(
            Action::InteractAt {
                is_entity: true,
                target: Target::Entity(VarInt(300)),
            },
            &2,
        );
        assert_eq!(bytes, [0x01, 0xAC, 0x02]);

        let bytes = round_trip(
            Action::InteractAt {
                is_entity: false,
                target: Target::Block(BlockPos::new(1, 2, 3)),
            },
            &2,
        );
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn test_string_discriminant() {
        let bytes = round_trip(Payload::Brand("vanilla".to_string()), "minecraft:brand");
        assert_eq!(bytes[0], 7);

        round_trip(
            Payload::Register(vec![Identifier::new("lodestone", "debug")]),
            "minecraft:register",
        );
        let bytes = round_trip(Payload::Other(vec![1, 2, 3].into_boxed_slice()), "mod:data");
        assert_eq!(bytes, [1, 2, 3]);

        let mut buf = PacketBuf::new();
        assert!(buf
            .write_switch(&Payload::Other(Box::default()), "minecraft:brand")
            .is_err());
    }

    #[test]
    fn test_unknown_discriminant_on_read() {
        let mut buf = PacketBuf::from(vec![0x00]);
        let err = buf.get_switch::<Action>(&7).unwrap_err();
        assert!(matches!(
            err,
            ReadingError::UnknownDiscriminant { switch: "Action", ref discriminant } if discriminant == "7"
        ));
    }

    #[test]
    fn test_unknown_discriminant_on_write() {
        let mut buf = PacketBuf::new();
        assert!(matches!(
            buf.write_switch(&Action::Attack, &9),
            Err(WritingError::UnknownDiscriminant { switch: "Action", .. })
        ));
        // A known discriminant that selects a different arm
        assert!(matches!(
            buf.write_switch(&Action::Attack, &0),
            Err(WritingError::UnknownDiscriminant { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_mismatched_nested_discriminant() {
        let mut buf = PacketBuf::new();
        let action = Action::InteractAt {
            is_entity: true,
            target: Target::Block(BlockPos::new(0, 0, 0)),
        };
        assert!(matches!(
            buf.write_switch(&action, &2),
            Err(WritingError::UnknownDiscriminant { switch: "Target", .. })
        ));
    }
}
