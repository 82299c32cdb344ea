use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::context::{ObjectContext, ReadOutcome, ReplayReader};
use crate::descriptor::TypeDescriptor;
use crate::dynamic::DynamicNode;
use crate::error::{ConfigurationError, FormatError, SerialError};
use crate::event::{DataStyle, Event, EventReader, EventReaderExt, EventWriter};
use crate::event::{Mark, ParsedEvent, ScalarEvent};
use crate::info::{TypeInfo, TypeKind, Typed};
use crate::registry::MappedType;
use crate::schema::ParsedScalar;
use crate::settings::SerializerSettings;

enum Direction<'a> {
    Reading(ReplayReader<'a>),
    Writing(&'a mut dyn EventWriter),
}

// -----------------------------------------------------------------------------
// SerializerContext

/// State of one top-level read or write pass.
///
/// A context is bound to exactly one reader or one writer. The member mask
/// and error tolerance are copied from the settings when it is created.
pub struct SerializerContext<'a> {
    settings: &'a SerializerSettings,
    direction: Direction<'a>,
    member_mask: u32,
    error_tolerant: bool,
    remap_occurred: bool,
    anchor_count: u32,
}

impl<'a> SerializerContext<'a> {
    /// A reading context positioned on the current event of `reader`.
    pub fn for_reading(
        settings: &'a SerializerSettings,
        reader: &'a mut dyn EventReader,
    ) -> Result<Self, SerialError> {
        Ok(Self::new(settings, Direction::Reading(ReplayReader::new(reader)?)))
    }

    pub fn for_writing(settings: &'a SerializerSettings, writer: &'a mut dyn EventWriter) -> Self {
        Self::new(settings, Direction::Writing(writer))
    }

    fn new(settings: &'a SerializerSettings, direction: Direction<'a>) -> Self {
        let options = settings.options();
        Self {
            settings,
            direction,
            member_mask: options.member_mask,
            error_tolerant: options.error_tolerant,
            remap_occurred: false,
            anchor_count: 0,
        }
    }

    #[inline]
    pub fn settings(&self) -> &'a SerializerSettings {
        self.settings
    }

    /// `true` when bound to a writer.
    #[inline]
    pub fn is_serializing(&self) -> bool {
        matches!(self.direction, Direction::Writing(_))
    }

    #[inline]
    pub fn member_mask(&self) -> u32 {
        self.member_mask
    }

    #[inline]
    pub fn is_error_tolerant(&self) -> bool {
        self.error_tolerant
    }

    /// Whether a tag was read through an alias or could not be resolved.
    /// Once set, it stays set.
    #[inline]
    pub fn remap_occurred(&self) -> bool {
        self.remap_occurred
    }

    pub fn mark_remap(&mut self) {
        self.remap_occurred = true;
    }

    /// Allocates an anchor name: `1`, `2`, ...
    pub fn next_anchor(&mut self) -> String {
        self.anchor_count += 1;
        format!("{}", self.anchor_count)
    }

    pub fn reader(&mut self) -> Result<&mut ReplayReader<'a>, SerialError> {
        match &mut self.direction {
            Direction::Reading(reader) => Ok(reader),
            Direction::Writing(_) => Err(ConfigurationError::NotBound("reader").into()),
        }
    }

    pub fn emit(&mut self, event: Event) -> Result<(), SerialError> {
        match &mut self.direction {
            Direction::Writing(writer) => writer.emit(event),
            Direction::Reading(_) => Err(ConfigurationError::NotBound("writer").into()),
        }
    }

    // -------------------------------------------------------------------------
    // Lookups

    pub fn find_type_descriptor(&self, info: &'static TypeInfo) -> Arc<TypeDescriptor> {
        self.settings.descriptor_factory().find(info)
    }

    pub fn type_from_tag(&self, tag: &str) -> Option<MappedType> {
        self.settings.tag_registry().type_from_tag(tag)
    }

    pub fn tag_from_type(&self, info: &'static TypeInfo) -> String {
        self.settings.tag_registry().tag_from_type(info)
    }

    pub fn resolve_type(&self, full_name: &str) -> Option<&'static TypeInfo> {
        self.settings.tag_registry().resolve_type(full_name)
    }

    /// Resolves a scalar with the schema, parsing its value.
    pub fn try_parse_scalar(&self, scalar: &ScalarEvent) -> Option<ParsedScalar> {
        self.settings.schema().try_parse(scalar, true)
    }

    fn is_null(&self, scalar: &ScalarEvent) -> bool {
        self.settings
            .schema()
            .try_parse(scalar, true)
            .and_then(|parsed| parsed.value)
            .is_some_and(|value| value.is::<()>())
    }

    fn is_schema_tag(&self, tag: &str) -> bool {
        let schema = self.settings.schema();
        schema.is_schema_tag(&schema.shorten_tag(tag))
    }

    // -------------------------------------------------------------------------
    // Read

    /// Reads the node under the cursor.
    ///
    /// - `existing`: a value to read into, used when its type matches the
    ///   node. [`ReadOutcome::Merged`] is returned in that case.
    /// - `expected`: the declared type, `None` for untyped reads.
    ///
    /// Errors other than [`FormatError`]s are wrapped into one carrying the
    /// position of the node.
    pub fn read_yaml(
        &mut self,
        existing: Option<&mut dyn Any>,
        expected: Option<&'static TypeInfo>,
    ) -> Result<ReadOutcome, SerialError> {
        self.read_tagged(existing, expected, None)
    }

    /// Like [`read_yaml`](Self::read_yaml), with `tag` standing for
    /// `expected` on the node, as written by
    /// [`write_tagged`](Self::write_tagged).
    pub fn read_tagged(
        &mut self,
        existing: Option<&mut dyn Any>,
        expected: Option<&'static TypeInfo>,
        tag: Option<&str>,
    ) -> Result<ReadOutcome, SerialError> {
        let (start, end) = match self.reader()?.current() {
            Some(parsed) => (parsed.start, parsed.end),
            None => (Mark::default(), Mark::default()),
        };

        self.read_node(existing, expected, tag).map_err(|err| match err {
            SerialError::Format(err) => SerialError::Format(err),
            other => FormatError::new(start, end, format!("{other}"))
                .with_source(other)
                .into(),
        })
    }

    fn read_node(
        &mut self,
        existing: Option<&mut dyn Any>,
        expected: Option<&'static TypeInfo>,
        expected_tag: Option<&str>,
    ) -> Result<ReadOutcome, SerialError> {
        let parsed = self.reader()?.expect_current()?.clone();

        match expected.map(TypeInfo::kind) {
            Some(TypeKind::Dynamic(dynamic)) => {
                let value = self.read_node(None, None, None)?.into_value()?;
                return Ok(ReadOutcome::Value(dynamic.wrap(value)));
            }
            Some(TypeKind::Nullable(nullable)) => {
                if let Event::Scalar(scalar) = &parsed.event
                    && self.is_null(scalar)
                {
                    self.reader()?.move_next()?;
                    return Ok(ReadOutcome::Value(nullable.none()));
                }
                let value = self
                    .read_node(None, Some(nullable.inner_info()), expected_tag)?
                    .into_value()?;
                return match nullable.some(value) {
                    Some(value) => Ok(ReadOutcome::Value(value)),
                    None => Err(SerialError::Mismatch {
                        expected: nullable.inner_info().type_path(),
                        found: String::from("a value of another type"),
                    }),
                };
            }
            _ => {}
        }

        let tag = match &parsed.event {
            Event::Scalar(scalar) => scalar.tag.as_deref(),
            Event::MappingStart(start) | Event::SequenceStart(start) => start.tag.as_deref(),
            other => {
                return Err(FormatError::new(
                    parsed.start,
                    parsed.end,
                    format!("expected a node, found {}", other.name()),
                )
                .into());
            }
        };
        // `!` only marks a node as not implicitly resolved.
        let tag = tag.filter(|tag| *tag != "!");
        // A member tag stands for the declared type.
        let member_tagged = expected.is_some() && tag.is_some() && tag == expected_tag;
        let schema_tag = tag.is_some_and(|tag| self.is_schema_tag(tag));

        if let Event::Scalar(scalar) = &parsed.event
            && expected.is_none()
            && (tag.is_none() || schema_tag)
        {
            return self.read_implicit_scalar(&parsed, scalar);
        }

        let mut resolved = expected;
        if let Some(tag) = tag
            && !member_tagged
            && !(schema_tag && expected.is_some())
        {
            match self.type_from_tag(tag) {
                Some(mapped) => {
                    if mapped.is_alias {
                        self.remap_occurred = true;
                    }
                    resolved = Some(mapped.info);
                }
                None if self.error_tolerant => {
                    log::debug!("tag `{tag}` at {} is unresolved, reading best effort", parsed.start);
                    self.remap_occurred = true;
                    resolved = Some(expected.unwrap_or_else(DynamicNode::type_info));
                }
                None => {
                    return Err(FormatError::new(
                        parsed.start,
                        parsed.end,
                        format!("unable to resolve tag `{tag}`"),
                    )
                    .into());
                }
            }
        }
        let resolved = resolved.unwrap_or_else(DynamicNode::type_info);

        if let Some(expected) = expected
            && expected.id() != resolved.id()
        {
            return Err(SerialError::Mismatch {
                expected: expected.type_path(),
                found: String::from(resolved.type_path()),
            });
        }
        if matches!(resolved.kind(), TypeKind::Dynamic(_) | TypeKind::Nullable(_)) {
            return Err(FormatError::new(
                parsed.start,
                parsed.end,
                format!("`{}` cannot be named by a tag", resolved.type_path()),
            )
            .into());
        }

        let tag = tag.map(String::from);
        let existing = existing.filter(|value| (**value).type_id() == resolved.id());
        let descriptor = self.find_type_descriptor(resolved);
        let serializer = self.settings.selector().get_serializer(self, &descriptor)?;
        let mut cx = ObjectContext::new(self, descriptor, tag, DataStyle::Any);
        serializer.read_yaml(&mut cx, existing)
    }

    fn read_implicit_scalar(
        &mut self,
        parsed: &ParsedEvent,
        scalar: &ScalarEvent,
    ) -> Result<ReadOutcome, SerialError> {
        let value = self.try_parse_scalar(scalar).and_then(|parsed| parsed.value);
        let Some(value) = value else {
            return Err(FormatError::new(
                parsed.start,
                parsed.end,
                format!(
                    "`{}` is not a valid `{}` scalar",
                    scalar.value,
                    scalar.tag.as_deref().unwrap_or("!")
                ),
            )
            .into());
        };
        self.reader()?.move_next()?;
        Ok(ReadOutcome::Value(value))
    }

    // -------------------------------------------------------------------------
    // Write

    /// Writes `value`, whose type is looked up among registered types
    /// unless it is `expected`.
    ///
    /// A tag is written when the runtime type is not `expected`.
    pub fn write_yaml(
        &mut self,
        value: &dyn Any,
        expected: Option<&'static TypeInfo>,
        style: DataStyle,
    ) -> Result<(), SerialError> {
        self.write_tagged(value, expected, style, None)
    }

    /// Like [`write_yaml`](Self::write_yaml), writing `tag` instead of the
    /// type's own tag when `value` is of the `expected` type.
    pub fn write_tagged(
        &mut self,
        value: &dyn Any,
        expected: Option<&'static TypeInfo>,
        style: DataStyle,
        tag: Option<&str>,
    ) -> Result<(), SerialError> {
        let runtime = match expected {
            Some(expected) if expected.id() == value.type_id() => expected,
            _ => self.runtime_info(value, expected)?,
        };
        self.write_node(value, runtime, expected, style, tag)
    }

    /// The registered type of `value`, held in a slot of type `declared`.
    fn runtime_info(
        &self,
        value: &dyn Any,
        declared: Option<&'static TypeInfo>,
    ) -> Result<&'static TypeInfo, SerialError> {
        self.settings
            .tag_registry()
            .type_info_by_id(value.type_id())
            .ok_or_else(|| {
                ConfigurationError::UnregisteredType {
                    declared: declared.map_or_else(
                        || String::from("an untyped node"),
                        |declared| format!("`{}`", declared.type_path()),
                    ),
                }
                .into()
            })
    }

    /// Writes `value` of the known type `runtime`.
    pub fn write_typed(
        &mut self,
        value: &dyn Any,
        runtime: &'static TypeInfo,
        expected: Option<&'static TypeInfo>,
        style: DataStyle,
    ) -> Result<(), SerialError> {
        self.write_node(value, runtime, expected, style, None)
    }

    fn write_node(
        &mut self,
        value: &dyn Any,
        runtime: &'static TypeInfo,
        expected: Option<&'static TypeInfo>,
        style: DataStyle,
        member_tag: Option<&str>,
    ) -> Result<(), SerialError> {
        match runtime.kind() {
            TypeKind::Dynamic(dynamic) => {
                let Some(held) = dynamic.unwrap(value) else {
                    return Err(SerialError::Mismatch {
                        expected: runtime.type_path(),
                        found: String::from("a value of another type"),
                    });
                };
                let held_info = self.runtime_info(held, Some(runtime))?;
                return self.write_node(held, held_info, None, style, None);
            }
            TypeKind::Nullable(nullable) => {
                return match nullable.get(value) {
                    Some(inner) => {
                        let inner_info = nullable.inner_info();
                        let inner_expected = expected
                            .is_some_and(|expected| expected.id() == runtime.id())
                            .then_some(inner_info);
                        self.write_node(inner, inner_info, inner_expected, style, member_tag)
                    }
                    None => self.emit(Event::Scalar(ScalarEvent::plain("null"))),
                };
            }
            _ => {}
        }

        let declared = expected.is_some_and(|expected| expected.id() == runtime.id());
        let tag = if !self.settings.options().emit_tags {
            None
        } else if let Some(tag) = member_tag.filter(|_| declared) {
            Some(String::from(tag))
        } else {
            (!declared && !runtime.is_compiler_generated()).then(|| self.tag_from_type(runtime))
        };

        let descriptor = self.find_type_descriptor(runtime);
        let serializer = self.settings.selector().get_serializer(self, &descriptor)?;
        let mut cx = ObjectContext::new(self, descriptor, tag, style);
        serializer.write_yaml(&mut cx, value)
    }
}

impl fmt::Debug for SerializerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerContext")
            .field("serializing", &self.is_serializing())
            .field("member_mask", &self.member_mask)
            .field("error_tolerant", &self.error_tolerant)
            .field("remap_occurred", &self.remap_occurred)
            .finish_non_exhaustive()
    }
}
