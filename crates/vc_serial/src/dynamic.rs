//! Best-effort values for nodes without a known type.
//!
//! Untagged mappings and sequences read without an expected type, and
//! nodes with an unresolved tag under error tolerance, become a
//! [`DynamicNode`]. It keeps every tag and writes back the events it was
//! read from.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome};
use crate::error::{FormatError, SerialError};
use crate::event::{CollectionStart, DataStyle, Event, EventReader, EventReaderExt};
use crate::event::{ScalarEvent, ScalarStyle};
use crate::info::{NonGenericTypeInfoCell, TypeInfo, TypeKind, TypePath, Typed};
use crate::serializers::YamlSerializable;

// -----------------------------------------------------------------------------
// DynamicNode

/// A document node kept as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicNode {
    Scalar {
        tag: Option<String>,
        value: String,
        style: ScalarStyle,
    },
    Sequence {
        tag: Option<String>,
        items: Vec<DynamicNode>,
    },
    Mapping {
        tag: Option<String>,
        entries: Vec<(DynamicNode, DynamicNode)>,
    },
}

impl Default for DynamicNode {
    fn default() -> Self {
        Self::Mapping {
            tag: None,
            entries: Vec::new(),
        }
    }
}

impl DynamicNode {
    /// An untagged plain scalar.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar {
            tag: None,
            value: value.into(),
            style: ScalarStyle::Plain,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Scalar { tag, .. } | Self::Sequence { tag, .. } | Self::Mapping { tag, .. } => {
                tag.as_deref()
            }
        }
    }

    /// The text of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[DynamicNode]> {
        match self {
            Self::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The value of the first entry whose key is the scalar `key`.
    pub fn get(&self, key: &str) -> Option<&DynamicNode> {
        match self {
            Self::Mapping { entries, .. } => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Reads the node under the cursor of `reader`.
    pub fn read_from<R: EventReader + ?Sized>(reader: &mut R) -> Result<Self, SerialError> {
        let parsed = reader.take()?;
        match parsed.event {
            Event::Scalar(scalar) => Ok(Self::Scalar {
                tag: scalar.tag,
                value: scalar.value,
                style: scalar.style,
            }),
            Event::SequenceStart(start) => {
                let mut items = Vec::new();
                while !reader.take_if(|event| matches!(event, Event::SequenceEnd))? {
                    items.push(Self::read_from(reader)?);
                }
                Ok(Self::Sequence {
                    tag: start.tag,
                    items,
                })
            }
            Event::MappingStart(start) => {
                let mut entries = Vec::new();
                while !reader.take_if(|event| matches!(event, Event::MappingEnd))? {
                    let key = Self::read_from(reader)?;
                    let value = Self::read_from(reader)?;
                    entries.push((key, value));
                }
                Ok(Self::Mapping {
                    tag: start.tag,
                    entries,
                })
            }
            other => Err(FormatError::new(
                parsed.start,
                parsed.end,
                format!("expected a node, found {}", other.name()),
            )
            .into()),
        }
    }

    /// Emits the events of this node.
    pub fn write_to(&self, emit: &mut dyn FnMut(Event) -> Result<(), SerialError>) -> Result<(), SerialError> {
        match self {
            Self::Scalar { tag, value, style } => {
                let mut scalar = ScalarEvent::new(value.clone(), *style);
                scalar.tag = tag.clone();
                emit(Event::Scalar(scalar))
            }
            Self::Sequence { tag, items } => {
                emit(Event::SequenceStart(CollectionStart::new(tag.clone(), DataStyle::Any)))?;
                for item in items {
                    item.write_to(emit)?;
                }
                emit(Event::SequenceEnd)
            }
            Self::Mapping { tag, entries } => {
                emit(Event::MappingStart(CollectionStart::new(tag.clone(), DataStyle::Any)))?;
                for (key, value) in entries {
                    key.write_to(emit)?;
                    value.write_to(emit)?;
                }
                emit(Event::MappingEnd)
            }
        }
    }
}

impl TypePath for DynamicNode {
    fn type_path() -> &'static str {
        "vc_serial::dynamic::DynamicNode"
    }

    fn type_name() -> &'static str {
        "DynamicNode"
    }

    fn type_ident() -> &'static str {
        "DynamicNode"
    }

    fn module_path() -> Option<&'static str> {
        Some("vc_serial::dynamic")
    }
}

impl Typed for DynamicNode {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::new::<Self>(TypeKind::Opaque)
                .with_default::<Self>()
                .with_compiler_generated(true)
        })
    }
}

// -----------------------------------------------------------------------------
// DynamicNodeSerializer

/// Reads and writes [`DynamicNode`]s, bound by every selector.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicNodeSerializer;

impl YamlSerializable for DynamicNodeSerializer {
    fn read_yaml(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        existing: Option<&mut dyn Any>,
    ) -> Result<ReadOutcome, SerialError> {
        let node = DynamicNode::read_from(cx.context().reader()?)?;
        match existing.and_then(|existing| existing.downcast_mut::<DynamicNode>()) {
            Some(existing) => {
                *existing = node;
                Ok(ReadOutcome::Merged)
            }
            None => Ok(ReadOutcome::Value(Box::new(node))),
        }
    }

    fn write_yaml(&self, cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
        let Some(node) = value.downcast_ref::<DynamicNode>() else {
            return Err(SerialError::Mismatch {
                expected: DynamicNode::type_path(),
                found: String::from("a value of another type"),
            });
        };
        let context = cx.context();
        node.write_to(&mut |event| context.emit(event))
    }
}

#[cfg(test)]
mod tests {
    use super::DynamicNode;
    use crate::event::{EventBuffer, EventReader, EventWriter};

    #[test]
    fn read_and_write_back() {
        let text = "\
+MAP <!Widget>
=VAL :name
=VAL 'knob
=VAL :sizes
+SEQ []
=VAL :1
=VAL <!!int> :2
-SEQ
-MAP
";
        let mut buffer = EventBuffer::from_test_events(text).unwrap();
        let node = DynamicNode::read_from(&mut buffer).unwrap();
        assert!(buffer.current().is_none());

        assert_eq!(node.tag(), Some("!Widget"));
        assert_eq!(node.get("name").and_then(DynamicNode::as_str), Some("knob"));
        let sizes = node.get("sizes").and_then(DynamicNode::items).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[1].tag(), Some("!!int"));

        let mut out = EventBuffer::new();
        node.write_to(&mut |event| out.emit(event)).unwrap();
        let round = DynamicNode::read_from(&mut out).unwrap();
        assert_eq!(round, node);
    }
}
