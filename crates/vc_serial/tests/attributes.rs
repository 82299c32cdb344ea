//! Attribute resolution and descriptor building.

use std::sync::Arc;

use vc_serial::attributes::{Attribute, AttributeRegistry, AttributeTarget};
use vc_serial::derive::Typed;
use vc_serial::descriptor::{DefaultTypeDescriptorFactory, SerializeMode, TypeDescriptorFactory};
use vc_serial::event::EventBuffer;
use vc_serial::info::Typed;
use vc_serial::settings::{SerializerOptions, SerializerSettings};
use vc_serial::Serializer;

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Entity {
    id: u64,
    #[serial(rename = "Name")]
    name: String,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Player {
    #[serial(base)]
    entity: Entity,
    #[serial(alias = "hp", order = 0)]
    health: i32,
    #[serial(skip)]
    session: u32,
    // Hides `Entity::id`.
    id: u64,
}

fn names(info: &'static vc_serial::info::TypeInfo, registry: Arc<AttributeRegistry>) -> Vec<String> {
    let factory = DefaultTypeDescriptorFactory::new(registry, Some(str::cmp));
    factory
        .find(info)
        .members()
        .iter()
        .map(|member| String::from(member.name()))
        .collect()
}

#[test]
fn base_members_are_flattened() {
    let names = names(Player::type_info(), Arc::new(AttributeRegistry::new()));
    assert_eq!(names, ["health", "Name", "id"]);
}

#[test]
fn flattened_members_round_trip() {
    let serializer = Serializer::new(SerializerSettings::new());
    let player = Player {
        entity: Entity {
            id: 0,
            name: String::from("ada"),
        },
        health: 90,
        session: 0,
        id: 12,
    };

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&player, &mut buffer).unwrap();
    let text = buffer.to_test_events();
    assert!(text.contains("=VAL :Name\n=VAL :ada\n"));
    assert!(!text.contains("session"));

    let read: Player = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, player);
}

#[test]
fn alternative_names_are_read() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events("+MAP\n=VAL :hp\n=VAL :40\n-MAP\n").unwrap();

    let player: Player = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(player.health, 40);
}

#[test]
fn registered_attributes_are_appended() {
    let registry = AttributeRegistry::new();
    let target = AttributeTarget::member::<Entity>("id").unwrap();

    let before = registry.get_attributes(target, true);
    assert!(before.is_empty());

    registry.register(target, Attribute::Rename("Id".into()));
    let after = registry.get_attributes(target, true);
    assert_eq!(after.len(), 1);
    assert!(matches!(&after[0], Attribute::Rename(name) if name == "Id"));

    // Lists handed out earlier are untouched.
    assert!(before.is_empty());
    assert_eq!(registry.get_attributes(target, false).len(), 1);
}

#[test]
fn declared_attributes_come_first() {
    let registry = AttributeRegistry::new();
    let target = AttributeTarget::member::<Entity>("name").unwrap();
    registry.register(target, Attribute::Rename("label".into()));

    let attributes = registry.get_attributes(target, true);
    assert!(matches!(&attributes[0], Attribute::Rename(name) if name == "Name"));
    assert!(matches!(&attributes[1], Attribute::Rename(name) if name == "label"));

    // The last rename wins.
    let names = names(Entity::type_info(), Arc::new(registry));
    assert_eq!(names, ["id", "label"]);
}

#[test]
fn unknown_members_have_no_target() {
    assert!(AttributeTarget::member::<Entity>("missing").is_none());
    assert!(AttributeTarget::member::<u32>("id").is_none());
}

#[test]
fn remap_hook_rewrites_attributes() {
    let registry = AttributeRegistry::new();
    registry.set_attribute_remap(|attribute| match attribute {
        Attribute::Rename(name) => Some(Attribute::Rename(name.to_lowercase().into())),
        other => Some(other.clone()),
    });

    let names = names(Entity::type_info(), Arc::new(registry));
    assert_eq!(names, ["id", "name"]);
}

#[test]
fn remap_hook_can_drop_attributes() {
    let registry = AttributeRegistry::new();
    registry.set_attribute_remap(|attribute| match attribute {
        Attribute::Ignore => None,
        other => Some(other.clone()),
    });

    let names = names(Player::type_info(), Arc::new(registry));
    assert_eq!(names, ["health", "Name", "id", "session"]);
}

#[test]
fn prepare_members_runs_last() {
    let registry = AttributeRegistry::new();
    registry.set_prepare_members(|info, members| {
        if info.id() == Entity::type_info().id() {
            members.retain(|member| member.original_name() != "id");
            for member in members.iter_mut() {
                member.set_mode(SerializeMode::Assign);
            }
        }
    });

    let factory = DefaultTypeDescriptorFactory::new(Arc::new(registry), Some(str::cmp));
    let descriptor = factory.find(Entity::type_info());
    assert_eq!(descriptor.members().len(), 1);
    assert_eq!(descriptor.members()[0].mode(), SerializeMode::Assign);
}

#[test]
fn descriptors_are_cached() {
    let factory = DefaultTypeDescriptorFactory::new(Arc::new(AttributeRegistry::new()), None);
    let first = factory.find(Player::type_info());
    let second = factory.find(Player::type_info());
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn declaration_order_without_sorting() {
    let options = SerializerOptions {
        sort_members: false,
        ..SerializerOptions::default()
    };
    let settings = SerializerSettings::from_options(options);
    let descriptor = settings.descriptor_factory().find(Player::type_info());
    let names: Vec<_> = descriptor.members().iter().map(|member| member.name()).collect();
    assert_eq!(names, ["health", "Name", "id"]);
}

#[test]
fn settings_registry_feeds_descriptors() {
    let settings = SerializerSettings::new();
    settings.attribute_registry().register(
        AttributeTarget::member::<Entity>("id").unwrap(),
        Attribute::Mode(SerializeMode::Never),
    );
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer
        .serialize_as(
            &Entity {
                id: 3,
                name: String::from("x"),
            },
            &mut buffer,
        )
        .unwrap();
    assert!(!buffer.to_test_events().contains(":id"));
}
