use crate::error::{TlvError, TlvResult};
use std::fmt;
use tdm_types::ProfileId;

const CONTROL_SHIFT: u8 = 5;

const ANONYMOUS: u8 = 0;
const CONTEXT: u8 = 1;
const COMMON_2: u8 = 2;
const COMMON_4: u8 = 3;
const IMPLICIT_2: u8 = 4;
const IMPLICIT_4: u8 = 5;
const FULLY_QUALIFIED_6: u8 = 6;
const FULLY_QUALIFIED_8: u8 = 7;

/// An element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No tag; used for array members and top-level elements.
    Anonymous,
    /// Tag scoped to the enclosing structure; property tags use this form.
    Context(u8),
    /// Tag in the common profile.
    CommonProfile(u32),
    /// Tag in the profile implied by the surrounding protocol.
    Implicit(u32),
    /// Tag qualified by an explicit profile.
    FullyQualified { profile: ProfileId, tag: u32 },
}

impl Tag {
    /// Context tag for a property, failing if the tag does not fit in a byte.
    pub fn for_property(tag: u32) -> TlvResult<Self> {
        u8::try_from(tag)
            .map(Tag::Context)
            .map_err(|_| TlvError::InvalidTag(format!("context tag {tag} exceeds 255")))
    }

    /// Whether this is the anonymous tag.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Tag::Anonymous)
    }

    /// The context tag number, if this is a context tag.
    pub fn context_number(&self) -> Option<u8> {
        match self {
            Tag::Context(n) => Some(*n),
            _ => None,
        }
    }

    /// Appends the control byte and tag bytes.
    pub(crate) fn encode(&self, element_type: u8, out: &mut Vec<u8>) {
        match *self {
            Tag::Anonymous => out.push(control(ANONYMOUS, element_type)),
            Tag::Context(n) => {
                out.push(control(CONTEXT, element_type));
                out.push(n);
            }
            Tag::CommonProfile(n) => match u16::try_from(n) {
                Ok(short) => {
                    out.push(control(COMMON_2, element_type));
                    out.extend_from_slice(&short.to_le_bytes());
                }
                Err(_) => {
                    out.push(control(COMMON_4, element_type));
                    out.extend_from_slice(&n.to_le_bytes());
                }
            },
            Tag::Implicit(n) => match u16::try_from(n) {
                Ok(short) => {
                    out.push(control(IMPLICIT_2, element_type));
                    out.extend_from_slice(&short.to_le_bytes());
                }
                Err(_) => {
                    out.push(control(IMPLICIT_4, element_type));
                    out.extend_from_slice(&n.to_le_bytes());
                }
            },
            Tag::FullyQualified { profile, tag } => {
                let short = u16::try_from(tag).ok();
                let ctl = if short.is_some() {
                    FULLY_QUALIFIED_6
                } else {
                    FULLY_QUALIFIED_8
                };
                out.push(control(ctl, element_type));
                out.extend_from_slice(&profile.vendor_id().to_le_bytes());
                out.extend_from_slice(&profile.trait_id().to_le_bytes());
                match short {
                    Some(short) => out.extend_from_slice(&short.to_le_bytes()),
                    None => out.extend_from_slice(&tag.to_le_bytes()),
                }
            }
        }
    }

    /// Number of tag bytes following the control byte.
    pub(crate) fn encoded_len(&self) -> usize {
        match *self {
            Tag::Anonymous => 0,
            Tag::Context(_) => 1,
            Tag::CommonProfile(n) | Tag::Implicit(n) => {
                if n <= u16::MAX as u32 {
                    2
                } else {
                    4
                }
            }
            Tag::FullyQualified { tag, .. } => {
                if tag <= u16::MAX as u32 {
                    6
                } else {
                    8
                }
            }
        }
    }

    /// Decodes the tag selected by `control` from the front of `bytes`.
    /// Returns the tag and the number of bytes consumed.
    pub(crate) fn decode(control: u8, bytes: &[u8]) -> TlvResult<(Self, usize)> {
        let need = |n: usize| {
            if bytes.len() < n {
                Err(TlvError::UnexpectedEnd)
            } else {
                Ok(())
            }
        };
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        match control >> CONTROL_SHIFT {
            ANONYMOUS => Ok((Tag::Anonymous, 0)),
            CONTEXT => {
                need(1)?;
                Ok((Tag::Context(bytes[0]), 1))
            }
            COMMON_2 => {
                need(2)?;
                Ok((Tag::CommonProfile(u16_at(0) as u32), 2))
            }
            COMMON_4 => {
                need(4)?;
                Ok((Tag::CommonProfile(u32_at(0)), 4))
            }
            IMPLICIT_2 => {
                need(2)?;
                Ok((Tag::Implicit(u16_at(0) as u32), 2))
            }
            IMPLICIT_4 => {
                need(4)?;
                Ok((Tag::Implicit(u32_at(0)), 4))
            }
            FULLY_QUALIFIED_6 => {
                need(6)?;
                let profile = ProfileId::new(u16_at(0), u16_at(2));
                Ok((
                    Tag::FullyQualified {
                        profile,
                        tag: u16_at(4) as u32,
                    },
                    6,
                ))
            }
            FULLY_QUALIFIED_8 => {
                need(8)?;
                let profile = ProfileId::new(u16_at(0), u16_at(2));
                Ok((
                    Tag::FullyQualified {
                        profile,
                        tag: u32_at(4),
                    },
                    8,
                ))
            }
            _ => unreachable!("tag control is three bits"),
        }
    }
}

fn control(tag_control: u8, element_type: u8) -> u8 {
    (tag_control << CONTROL_SHIFT) | element_type
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Anonymous => write!(f, "anonymous"),
            Tag::Context(n) => write!(f, "[{n}]"),
            Tag::CommonProfile(n) => write!(f, "common:{n}"),
            Tag::Implicit(n) => write!(f, "implicit:{n}"),
            Tag::FullyQualified { profile, tag } => write!(f, "{profile}:{tag}"),
        }
    }
}
